//! Module for the HTTP endpoints of heap_bridge.
//!
//! - `GET /profile`: perform a run right now, independent of the scheduler, and respond when it is done.
//!   A successful run responds 200 with a confirmation, a failed run responds 500 with the failed stage and the error.
//! - `GET /healthz`: responds 200 `ok` as long as the process serves requests.
//!
//! Failing to bind the listener is the one error heap_bridge exits on.
//!
mod functions;

pub use functions::*;
