//! Module for a single pipeline run: fetch, convert, upload.
//!
//! [`Pipeline::run_once`] is the one unit of work of heap_bridge, called by the scheduler and by the `/profile` endpoint.
//! A run:
//! - creates its temporary files (an unwritable temporary directory fails the run here, before fetching).
//! - fetches the profile text, and writes it to the text file.
//! - converts the text file into the binary file.
//! - uploads the binary file.
//! - removes the temporary files, whatever happened before.
//!
//! A failing stage ends the run, later stages are skipped, and the error is returned with its stage.
//! The pipeline has no mutable state, so any number of runs can be active at the same time.
//!
mod functions;

pub use functions::*;

use std::{sync::Arc, time::Duration};
use crate::config::Config;
use crate::runner::ProcessRunner;
use crate::scratch::RunId;
use crate::upload::UploadReceipt;

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduled,
    Manual,
    Once,
}

#[derive(Clone)]
pub struct Pipeline {
    config: Arc<Config>,
    runner: Arc<dyn ProcessRunner>,
}

/// The result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub trigger: Trigger,
    pub profile_bytes: usize,
    pub artifact_bytes: u64,
    pub receipt: UploadReceipt,
    pub elapsed: Duration,
}
