//! The impls and functions
//!
use std::{collections::BTreeMap, env, fs, io::Write, path::{Path, PathBuf}, time::Duration};
use anyhow::{bail, Context, Result};
use itertools::Itertools;
use log::*;
use regex::Regex;
use crate::config::*;

pub type ChangedOptions = BTreeMap<&'static str, String>;

/// Upper bound for the interval and the fetch timeout: one day.
const MAX_SECONDS: Duration = Duration::from_secs(86_400);

impl Default for Config {
    fn default() -> Self {
        Config {
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            reference_binary: PathBuf::from(DEFAULT_REFERENCE_BINARY),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            interval: Duration::from_secs(30),
            listen_address: DEFAULT_LISTEN.to_string(),
            labels: vec![Label { key: String::from("service_name"), value: String::from("cpp-heap") }],
            converter: DEFAULT_CONVERTER.to_string(),
            uploader: DEFAULT_UPLOADER.to_string(),
            fetch_timeout: None,
            accept_invalid_certs: false,
        }
    }
}

impl Config {
    /// Resolve the configuration from the switches, the environment (`.env` must already be loaded) and the defaults.
    /// Every setting that was not a default is added to `changed_options`.
    pub fn from_opts(
        options: &Opts,
        changed_options: &mut ChangedOptions,
    ) -> Result<Config>
    {
        Config::from_opts_with(options, changed_options, |key| env::var(key).ok())
    }
    /// As [`Config::from_opts`], with the environment lookup provided by the caller.
    pub fn from_opts_with<F>(
        options: &Opts,
        changed_options: &mut ChangedOptions,
        lookup: F,
    ) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut setting = |option: &Option<String>, key: &'static str, default: &str| {
            resolve_setting(option, key, default, changed_options, &lookup)
        };

        let profile_url = setting(&options.profile_url, "HEAPBRIDGE_PROFILE_URL", DEFAULT_PROFILE_URL);
        let reference_binary = setting(&options.reference_binary, "HEAPBRIDGE_REFERENCE_BINARY", DEFAULT_REFERENCE_BINARY);
        let temp_dir = setting(&options.temp_dir, "HEAPBRIDGE_TEMP_DIR", DEFAULT_TEMP_DIR);
        let backend_url = setting(&options.backend_url, "HEAPBRIDGE_BACKEND_URL", DEFAULT_BACKEND_URL);
        let interval = setting(&options.interval, "HEAPBRIDGE_INTERVAL", DEFAULT_INTERVAL);
        let listen_address = setting(&options.listen, "HEAPBRIDGE_LISTEN", DEFAULT_LISTEN);
        let labels = setting(&options.labels, "HEAPBRIDGE_LABELS", DEFAULT_LABELS);
        let converter = setting(&options.converter, "HEAPBRIDGE_CONVERTER", DEFAULT_CONVERTER);
        let uploader = setting(&options.uploader, "HEAPBRIDGE_UPLOADER", DEFAULT_UPLOADER);
        let fetch_timeout = setting(&options.fetch_timeout, "HEAPBRIDGE_FETCH_TIMEOUT", DEFAULT_FETCH_TIMEOUT);

        let interval = parse_seconds(&interval)
            .with_context(|| format!("Invalid interval: {}", interval))?;
        if interval.is_zero() {
            bail!("Invalid interval: the interval must be at least one second");
        }
        if interval > MAX_SECONDS {
            bail!("Invalid interval: the interval can be at most {} seconds", MAX_SECONDS.as_secs());
        }
        let fetch_timeout = parse_seconds(&fetch_timeout)
            .with_context(|| format!("Invalid fetch timeout: {}", fetch_timeout))?;
        if fetch_timeout > MAX_SECONDS {
            bail!("Invalid fetch timeout: the timeout can be at most {} seconds", MAX_SECONDS.as_secs());
        }
        let labels = parse_labels(&labels)?;
        if labels.is_empty() {
            bail!("Invalid labels: at least one label is required");
        }

        Ok(Config {
            profile_url,
            reference_binary: PathBuf::from(reference_binary),
            temp_dir: PathBuf::from(temp_dir),
            backend_url,
            interval,
            listen_address,
            labels,
            converter,
            uploader,
            fetch_timeout: if fetch_timeout.is_zero() { None } else { Some(fetch_timeout) },
            accept_invalid_certs: options.accept_invalid_certs,
        })
    }
    /// The address to bind the listener to; the `:port` shorthand binds all interfaces.
    pub fn bind_address(&self) -> String {
        if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        }
    }
    pub fn labels_text(&self) -> String {
        self.labels.iter().join(",")
    }
    pub fn log_settings(&self) {
        info!("profile url: {}", self.profile_url);
        info!("reference binary: {}", self.reference_binary.display());
        info!("temp dir: {}", self.temp_dir.display());
        info!("backend url: {}", self.backend_url);
        info!("labels: {}", self.labels_text());
        info!("interval: {:?}", self.interval);
        info!("converter: {}, uploader: {}", self.converter, self.uploader);
    }
}

fn resolve_setting<F>(
    option: &Option<String>,
    key: &'static str,
    default: &str,
    changed_options: &mut ChangedOptions,
    lookup: &F,
) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match option {
        Some(value) => {
            info!("{} set via argument: using: {}", key, value);
            changed_options.insert(key, value.to_string());
            value.to_string()
        }
        None => match lookup(key) {
            Some(set_var) => {
                info!("{} not set: set via .env: {}", key, set_var);
                changed_options.insert(key, set_var.to_owned());
                set_var
            }
            None => {
                debug!("{} not set: and not set via .env: using default: {}", key, default);
                default.to_string()
            }
        },
    }
}

fn parse_seconds(text: &str) -> Result<Duration> {
    let seconds: u64 = text.trim().parse()
        .with_context(|| format!("Not a number of seconds: {}", text))?;
    Ok(Duration::from_secs(seconds))
}

/// Parse `key=value[,key=value]`. Keys follow the usual label naming: `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn parse_labels(text: &str) -> Result<Vec<Label>> {
    let key_format = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$")?;
    let mut labels = Vec::new();
    for pair in text.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=')
            .with_context(|| format!("Invalid label, expected key=value: {}", pair))?;
        let (key, value) = (key.trim(), value.trim());
        if !key_format.is_match(key) {
            bail!("Invalid label name: {}", key);
        }
        if value.is_empty() {
            bail!("Invalid label, empty value: {}", pair);
        }
        labels.push(Label { key: key.to_string(), value: value.to_string() });
    }
    Ok(labels)
}

pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: &ChangedOptions,
) -> Result<()>
{
    if !changed_options.is_empty() && write_dotenv {
        info!("Writing .env file");
        write_dotenv_file(Path::new(".env"), changed_options)?;
    }
    Ok(())
}

fn write_dotenv_file(
    dotenv_file: &Path,
    changed_options: &ChangedOptions,
) -> Result<()>
{
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dotenv_file)
        .with_context(|| format!("Error writing .env file: {}", dotenv_file.display()))?;

    for (key, value) in changed_options {
        file.write_all(format!("{}={}\n", key, value).as_bytes())
            .with_context(|| format!("Error writing .env file: {}", dotenv_file.display()))?;
        info!("{}={}", key, value);
    }
    Ok(())
}
