//! heap_bridge fetches the text heap profile of a process, converts it to the pprof protobuf format,
//! and uploads it to a profile aggregation backend.
//!
//! This happens every configured interval, and on demand via `GET /profile`.
//!
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod runner;
pub mod scheduler;
pub mod scratch;
pub mod server;
pub mod upload;

pub use config::{Config, Opts};
pub use error::{ListenerError, PipelineError, Stage};
pub use pipeline::{Pipeline, RunReport, Trigger};
