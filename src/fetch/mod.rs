//! Module for reading the heap profile from the profiled process.
//!
//! The profiled process exposes its gperftools heap profile as text, usually on `/debug/pprof/heap`.
//!
//! heap_bridge doesn't interpret the profile, it only:
//! - performs a HTTP GET on the configured profile url.
//! - checks the response status is a success, and the body isn't empty.
//! - warns if the body doesn't start with "heap profile", but passes it on anyway.
//!
//! There are no retries here: a failed fetch fails the run, and the next scheduled run tries again.
//!
mod functions;

pub use functions::*;
