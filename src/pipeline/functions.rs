//! The impls and functions
//!
use std::{fmt, sync::Arc, time::Instant};
use log::*;
use crate::config::Config;
use crate::convert::convert_profile;
use crate::error::PipelineError;
use crate::fetch::fetch_profile;
use crate::pipeline::{Pipeline, RunReport, Trigger};
use crate::runner::ProcessRunner;
use crate::scratch::{RunId, ScratchFiles};
use crate::upload::{upload_profile, UploadReceipt};

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Scheduled => "scheduled",
            Trigger::Manual => "manual",
            Trigger::Once => "once",
        };
        write!(f, "{}", name)
    }
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self
    {
        Pipeline { config, runner }
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// Perform one fetch, convert and upload.
    ///
    /// This blocks for the duration of the run; from async code, call it via `tokio::task::spawn_blocking`.
    pub fn run_once(
        &self,
        trigger: Trigger,
    ) -> Result<RunReport, PipelineError>
    {
        let run_id = RunId::next();
        info!("begin run {} ({})", run_id, trigger);
        let timer = Instant::now();

        let scratch = ScratchFiles::acquire(&self.config.temp_dir, &run_id)?;
        let result = self.run_stages(&scratch);
        let cleanup = scratch.close();

        let (profile_bytes, artifact_bytes, receipt) = match (result, cleanup) {
            (Ok(stages), Ok(())) => stages,
            (Ok(_), Err(cleanup_error)) => return Err(cleanup_error),
            (Err(error), Ok(())) => return Err(error),
            (Err(error), Err(cleanup_error)) => {
                warn!("run {}: {}", run_id, cleanup_error);
                return Err(error);
            }
        };

        info!("end run {}: {:?}", run_id, timer.elapsed());
        Ok(RunReport {
            run_id,
            trigger,
            profile_bytes,
            artifact_bytes,
            receipt,
            elapsed: timer.elapsed(),
        })
    }
    fn run_stages(
        &self,
        scratch: &ScratchFiles,
    ) -> Result<(usize, u64, UploadReceipt), PipelineError>
    {
        debug!("run {}: fetch {}", scratch.run_id, self.config.profile_url);
        let profile = fetch_profile(&self.config)?;
        scratch.write_text(&profile)?;

        debug!("run {}: convert {}", scratch.run_id, scratch.text_path.display());
        let artifact_bytes = convert_profile(self.runner.as_ref(), &self.config, &scratch.text_path, &scratch.binary_path)?;

        debug!("run {}: upload {}", scratch.run_id, scratch.binary_path.display());
        let receipt = upload_profile(self.runner.as_ref(), &self.config, &scratch.binary_path)?;

        Ok((profile.len(), artifact_bytes, receipt))
    }
}
