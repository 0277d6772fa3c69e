//! Module for uploading the protobuf profile to the profile aggregation backend.
//!
//! The upload is done by the configured uploader (`profilecli` by default), run as:
//! `profilecli upload --url=<backend url> --extra-labels=<key>=<value> ... <binary file>`.
//!
//! The stdout of the uploader is kept as the receipt of the upload, and logged.
//! A failed upload is not retried, and the binary file is removed with the rest of the run.
//!
mod functions;

pub use functions::*;

/// The stdout of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt(pub String);
