//! Module for running the external tools.
//!
//! The converter and the uploader are command line tools.
//! They are run through the [`ProcessRunner`] trait, so tests can replace them with a fake that doesn't start anything.
//! [`SystemRunner`] is the implementation that runs the real commands.
//!
mod functions;

pub use functions::*;

use std::io;

/// What a finished command left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// The exit code, `None` if the command was ended by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` to completion, capturing stdout and stderr.
    /// An `Err` means the command could not be run at all.
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;
