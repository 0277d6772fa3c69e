use std::{process, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::*;
use tokio_util::sync::CancellationToken;

use heap_bridge::config::{dotenv_writer, ChangedOptions};
use heap_bridge::runner::SystemRunner;
use heap_bridge::{scheduler, server, Config, Opts, Pipeline, Trigger};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenv::dotenv().ok();

    let options = Opts::parse();
    let mut changed_options = ChangedOptions::new();
    let config = Config::from_opts(&options, &mut changed_options)
        .with_context(|| "Invalid configuration")?;
    dotenv_writer(options.write_dotenv, &changed_options)?;
    config.log_settings();

    let pipeline = Pipeline::new(Arc::new(config), Arc::new(SystemRunner));

    if options.once {
        return run_single(pipeline);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "Cannot build tokio runtime")?;
    runtime.block_on(run(pipeline))
}

fn run_single(pipeline: Pipeline) -> Result<()> {
    match pipeline.run_once(Trigger::Once) {
        Ok(report) => {
            println!("{} run {}: {} bytes profile, {} bytes uploaded in {:?}", "success".green(), report.run_id, report.profile_bytes, report.artifact_bytes, report.elapsed);
            println!("{}", report.receipt);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {} stage: {}", "failed".red(), e.stage(), e);
            process::exit(1);
        }
    }
}

async fn run(pipeline: Pipeline) -> Result<()> {
    let bind_address = pipeline.config().bind_address();
    let listener = server::bind(&bind_address)
        .await
        .with_context(|| "Cannot start the bridging server")?;

    let shutdown = CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.cancel();
    });

    let scheduler = tokio::spawn(scheduler::run_schedule(pipeline.clone(), shutdown.clone()));

    let served = server::serve(listener, pipeline, shutdown.clone()).await;

    // a server error ends the scheduler as well
    shutdown.cancel();
    scheduler.await.with_context(|| "Scheduler did not stop cleanly")?;
    served.with_context(|| "Bridging server failed")?;

    info!("heap_bridge stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("Cannot register SIGTERM handler: {}", e);
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received SIGINT, shutting down");
            }
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received SIGINT, shutting down");
    }
}
