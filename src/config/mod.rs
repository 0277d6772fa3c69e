//! Module for the bridge configuration.
//!
//! All settings are resolved once at startup, in this order:
//! - the command line switch, if set.
//! - the environment variable `HEAPBRIDGE_*`, which can be set via a `.env` file in the current directory.
//! - the built-in default.
//!
//! Settings that came from the command line or the environment can be written to `.env` with `--write-dotenv`,
//! so a next start picks them up without specifying them again.
//!
//! The result is the immutable [`Config`], which is shared by the scheduler, the `/profile` endpoint and the pipeline.
//!
mod functions;

pub use functions::*;

use std::{fmt, path::PathBuf, time::Duration};
use clap::Parser;

pub const DEFAULT_PROFILE_URL: &str = "http://cpp-app:8080/debug/pprof/heap";
pub const DEFAULT_REFERENCE_BINARY: &str = "/build-output/heap_profile_server";
pub const DEFAULT_TEMP_DIR: &str = "/tmp";
pub const DEFAULT_BACKEND_URL: &str = "http://host.docker.internal:4040";
pub const DEFAULT_INTERVAL: &str = "30";
pub const DEFAULT_LISTEN: &str = ":8081";
pub const DEFAULT_LABELS: &str = "service_name=cpp-heap";
pub const DEFAULT_CONVERTER: &str = "pprof";
pub const DEFAULT_UPLOADER: &str = "profilecli";
pub const DEFAULT_FETCH_TIMEOUT: &str = "0";

/// Fetch a heap profile, convert it to pprof protobuf and upload it, periodically and on demand.
#[derive(Debug, Default, Parser)]
#[command(version, about)]
pub struct Opts {
    /// URL of the text heap profile endpoint of the profiled process
    #[arg(long, value_name = "URL")]
    pub profile_url: Option<String>,
    /// binary of the profiled process, used by the converter for symbolization
    #[arg(long, value_name = "PATH")]
    pub reference_binary: Option<String>,
    /// directory for the temporary profile files of a run
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<String>,
    /// URL of the profile aggregation backend
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,
    /// seconds between scheduled runs
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<String>,
    /// address for the /profile endpoint, ':port' listens on all interfaces
    #[arg(long, value_name = "ADDRESS")]
    pub listen: Option<String>,
    /// labels attached to every upload, as key=value[,key=value]
    #[arg(long, value_name = "LABELS")]
    pub labels: Option<String>,
    /// conversion command
    #[arg(long, value_name = "COMMAND")]
    pub converter: Option<String>,
    /// upload command
    #[arg(long, value_name = "COMMAND")]
    pub uploader: Option<String>,
    /// seconds before a profile fetch is abandoned, 0 uses the transport default
    #[arg(long, value_name = "SECONDS")]
    pub fetch_timeout: Option<String>,
    /// accept invalid TLS certificates from the profile endpoint
    #[arg(long)]
    pub accept_invalid_certs: bool,
    /// perform a single run and exit
    #[arg(long)]
    pub once: bool,
    /// write the settings that were set to .env
    #[arg(long)]
    pub write_dotenv: bool,
}

/// A key/value annotation attached to every uploaded profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub key: String,
    pub value: String,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub profile_url: String,
    pub reference_binary: PathBuf,
    pub temp_dir: PathBuf,
    pub backend_url: String,
    pub interval: Duration,
    pub listen_address: String,
    pub labels: Vec<Label>,
    pub converter: String,
    pub uploader: String,
    pub fetch_timeout: Option<Duration>,
    pub accept_invalid_certs: bool,
}
