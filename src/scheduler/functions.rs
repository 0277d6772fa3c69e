//! The impls and functions
//!
use log::*;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use crate::pipeline::{Pipeline, Trigger};

/// Run the pipeline every `interval` of its configuration, until `shutdown` is cancelled.
/// A run in progress is finished first. Returns the number of runs performed.
pub async fn run_schedule(
    pipeline: Pipeline,
    shutdown: CancellationToken,
) -> u64
{
    let interval = pipeline.config().interval;
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("scheduler started, interval: {:?}", interval);

    let mut runs = 0;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let run_pipeline = pipeline.clone();
        match tokio::task::spawn_blocking(move || run_pipeline.run_once(Trigger::Scheduled)).await {
            Ok(Ok(report)) => info!("Continuous profiling uploaded successfully: run {} in {:?}", report.run_id, report.elapsed),
            Ok(Err(e)) => error!("Error in continuous profiling: {} stage: {}", e.stage(), e),
            Err(e) => error!("Error in continuous profiling: run did not complete: {}", e),
        }
        runs += 1;
    }

    info!("scheduler stopped after {} runs", runs);
    runs
}
