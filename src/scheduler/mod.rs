//! Module for the scheduled runs.
//!
//! The scheduler performs a run every configured interval, starting one interval after startup.
//! It waits for a run to finish before it looks at the clock again, so scheduled runs never overlap.
//! A run that takes longer than the interval makes the next run start right after it, after which the original cadence continues;
//! missed ticks are not made up for.
//!
//! The outcome of every run is logged, a failed run never stops the scheduler.
//!
mod functions;

pub use functions::*;
