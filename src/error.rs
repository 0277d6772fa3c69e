//! Errors of the bridge.
//!
//! Every failure of a pipeline run is a [`PipelineError`], which knows the [`Stage`] it happened in.
//! The scheduler and the `/profile` endpoint log or report these and carry on.
//! The only fatal error is [`ListenerError`], raised when the inbound listener cannot bind.
//!
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// The pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Network,
    Io,
    Conversion,
    Upload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Network => "network",
            Stage::Io => "io",
            Stage::Conversion => "conversion",
            Stage::Upload => "upload",
        };
        write!(f, "{}", name)
    }
}

/// Why an external command did not produce a usable result.
#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("could not be started: {0}")]
    Launch(#[source] io::Error),
    #[error("exited with {}: {stderr}", exit_code_text(.code))]
    Exit {
        code: Option<i32>,
        stderr: String,
    },
    #[error("produced no output")]
    EmptyOutput,
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => String::from("a signal"),
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    FetchStatus {
        url: String,
        status: u16,
    },
    #[error("{url} returned an empty profile")]
    EmptyProfile {
        url: String,
    },
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{command} conversion {failure}")]
    Conversion {
        command: String,
        failure: CommandFailure,
    },
    #[error("{command} upload {failure}")]
    Upload {
        command: String,
        failure: CommandFailure,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Fetch { .. }
            | PipelineError::FetchStatus { .. }
            | PipelineError::EmptyProfile { .. } => Stage::Network,
            PipelineError::Io { .. } => Stage::Io,
            PipelineError::Conversion { .. } => Stage::Conversion,
            PipelineError::Upload { .. } => Stage::Upload,
        }
    }
    /// The HTTP status the profile source answered with, if that is what failed the run.
    pub fn status(&self) -> Option<u16> {
        match self {
            PipelineError::FetchStatus { status, .. } => Some(*status),
            PipelineError::Fetch { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::Io { action, path: path.into(), source }
    }
}

/// The inbound listener could not be bound; the process cannot serve and exits.
#[derive(Debug, Error)]
#[error("cannot listen on {address}: {source}")]
pub struct ListenerError {
    pub address: String,
    #[source]
    pub source: io::Error,
}
