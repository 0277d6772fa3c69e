//! Module for converting the text heap profile to the pprof protobuf format.
//!
//! The conversion is done by the configured converter (`pprof` by default), run as:
//! `pprof --proto <reference binary> <text file>`.
//! The reference binary is the binary of the profiled process, which is used to symbolize the addresses in the profile.
//! Its existence is not checked here: a missing reference binary is reported by the converter.
//!
//! The stdout of the converter is the protobuf profile, which is written to the binary file of the run.
//!
mod functions;

pub use functions::*;
