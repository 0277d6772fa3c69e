//! The impls and functions
//!
use std::{fmt, path::Path, time::Instant};
use log::*;
use crate::config::{Config, Label};
use crate::error::{CommandFailure, PipelineError};
use crate::runner::ProcessRunner;
use crate::upload::UploadReceipt;

impl fmt::Display for UploadReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn uploader_args(
    backend_url: &str,
    labels: &[Label],
    binary_path: &Path,
) -> Vec<String>
{
    let mut args = vec![
        String::from("upload"),
        format!("--url={}", backend_url),
    ];
    args.extend(labels.iter().map(|label| format!("--extra-labels={}", label)));
    args.push(binary_path.display().to_string());
    args
}

/// Ship the protobuf profile in `binary_path` to `config.backend_url`, with `config.labels` attached.
pub fn upload_profile(
    runner: &dyn ProcessRunner,
    config: &Config,
    binary_path: &Path,
) -> Result<UploadReceipt, PipelineError>
{
    let timer = Instant::now();
    let command = &config.uploader;
    let failed = |failure: CommandFailure| PipelineError::Upload { command: command.to_string(), failure };

    let output = runner
        .run(command, &uploader_args(&config.backend_url, &config.labels, binary_path))
        .map_err(|e| failed(CommandFailure::Launch(e)))?;
    output.log_stderr(command);

    if !output.success() {
        return Err(failed(CommandFailure::Exit { code: output.code, stderr: output.stderr_text() }));
    }

    let receipt = UploadReceipt(output.stdout_text());
    info!("{} upload success: {}", command, receipt);
    debug!("uploaded {} to {} in {:?}", binary_path.display(), config.backend_url, timer.elapsed());
    Ok(receipt)
}
