//! The impls and functions
//!
use std::{fs, path::Path, time::Instant};
use log::*;
use crate::config::Config;
use crate::error::{CommandFailure, PipelineError};
use crate::runner::ProcessRunner;

pub fn converter_args(
    reference_binary: &Path,
    text_path: &Path,
) -> Vec<String>
{
    vec![
        String::from("--proto"),
        reference_binary.display().to_string(),
        text_path.display().to_string(),
    ]
}

/// Convert the profile text in `text_path` into a protobuf profile in `binary_path`.
/// Returns the size of the protobuf profile.
pub fn convert_profile(
    runner: &dyn ProcessRunner,
    config: &Config,
    text_path: &Path,
    binary_path: &Path,
) -> Result<u64, PipelineError>
{
    let timer = Instant::now();
    let command = &config.converter;
    let failed = |failure: CommandFailure| PipelineError::Conversion { command: command.to_string(), failure };

    let output = runner
        .run(command, &converter_args(&config.reference_binary, text_path))
        .map_err(|e| failed(CommandFailure::Launch(e)))?;
    output.log_stderr(command);

    if !output.success() {
        return Err(failed(CommandFailure::Exit { code: output.code, stderr: output.stderr_text() }));
    }
    if output.stdout.is_empty() {
        return Err(failed(CommandFailure::EmptyOutput));
    }

    fs::write(binary_path, &output.stdout)
        .map_err(|e| PipelineError::io("cannot write", binary_path, e))?;

    debug!("converted {} to {} ({} bytes) in {:?}", text_path.display(), binary_path.display(), output.stdout.len(), timer.elapsed());
    Ok(output.stdout.len() as u64)
}
