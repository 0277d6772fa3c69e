//! The impls and functions
//!
use std::io;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use log::*;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use crate::error::ListenerError;
use crate::pipeline::{Pipeline, Trigger};

pub const PROFILE_SUCCESS: &str = "Profile fetched and uploaded successfully!";

pub async fn bind(
    address: &str,
) -> Result<TcpListener, ListenerError>
{
    TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError { address: address.to_string(), source })
}

pub fn router(
    pipeline: Pipeline,
) -> Router
{
    Router::new()
        .route("/profile", get(profile_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(pipeline)
}

/// Serve the endpoints on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    pipeline: Pipeline,
    shutdown: CancellationToken,
) -> io::Result<()>
{
    if let Ok(address) = listener.local_addr() {
        info!("Bridging server listening on {}", address);
    }
    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn profile_handler(
    State(pipeline): State<Pipeline>,
) -> (StatusCode, String)
{
    match tokio::task::spawn_blocking(move || pipeline.run_once(Trigger::Manual)).await {
        Ok(Ok(report)) => {
            info!("manual run {} uploaded: {}", report.run_id, report.receipt);
            (StatusCode::OK, format!("{}\nrun: {}\n", PROFILE_SUCCESS, report.run_id))
        }
        Ok(Err(e)) => {
            error!("Error fetching/uploading profile: {} stage: {}", e.stage(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to profile: {} stage: {}\n", e.stage(), e))
        }
        Err(e) => {
            error!("Error fetching/uploading profile: run did not complete: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to profile: run did not complete: {}\n", e))
        }
    }
}

async fn healthz_handler() -> &'static str {
    "ok"
}
