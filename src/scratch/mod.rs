//! Module for the temporary files of a pipeline run.
//!
//! Every run gets a [`RunId`], and the two files the run needs are named after it:
//! - `heap-<run id>.txt`: the heap profile text as fetched.
//! - `heap-<run id>.pprof`: the converted protobuf profile.
//!
//! Both files are created when the run starts, which checks the temporary directory is writable before anything is fetched,
//! and both are removed when the [`ScratchFiles`] is closed or dropped, whatever the outcome of the run.
//! Because a run id is never handed out twice, and the files are created exclusively,
//! concurrent runs never share a file.
//!
mod functions;

pub use functions::*;

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(pub(crate) String);

#[derive(Debug)]
pub struct ScratchFiles {
    pub run_id: RunId,
    pub text_path: PathBuf,
    pub binary_path: PathBuf,
    removed: bool,
}
