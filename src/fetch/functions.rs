//! The impls and functions
//!
use std::time::Instant;
use log::*;
use crate::config::Config;
use crate::error::PipelineError;

/// Read the complete heap profile from `config.profile_url`.
///
/// This is a blocking call, and must not be made from an async task directly.
pub fn fetch_profile(
    config: &Config,
) -> Result<Vec<u8>, PipelineError>
{
    let url = &config.profile_url;
    let timer = Instant::now();
    let fetch_error = |source: reqwest::Error| PipelineError::Fetch { url: url.to_string(), source };

    let mut client = reqwest::blocking::Client::builder()
        .danger_accept_invalid_certs(config.accept_invalid_certs);
    if let Some(timeout) = config.fetch_timeout {
        client = client.timeout(timeout);
    }
    let response = client
        .build()
        .map_err(fetch_error)?
        .get(url)
        .send()
        .map_err(fetch_error)?;

    if !response.status().is_success() {
        debug!("Non success response: {} = {}", url, response.status());
        return Err(PipelineError::FetchStatus { url: url.to_string(), status: response.status().as_u16() });
    }
    debug!("Success response: {} = {}", url, response.status());

    let data = response
        .bytes()
        .map_err(fetch_error)?
        .to_vec();
    if data.is_empty() {
        return Err(PipelineError::EmptyProfile { url: url.to_string() });
    }
    if !data.starts_with(b"heap profile") {
        warn!("{} did not return a heap profile header, converting anyway", url);
    }

    debug!("fetched {} bytes from {} in {:?}", data.len(), url, timer.elapsed());
    Ok(data)
}
