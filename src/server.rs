// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP server for metrics and Kubernetes probes.
//!
//! - `/metrics` - Prometheus metrics in text format
//! - `/healthz` - liveness probe, always 200
//! - `/readyz` - readiness probe, 200 once the controller is running

use crate::metrics::gather_metrics;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct ServerState {
    pub is_ready: Arc<AtomicBool>,
}

/// Routes served by the metrics/probe listener.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(state)
}

/// Serve [`router`] on `0.0.0.0:port` until the listener fails.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server stops with an I/O error.
pub async fn start_server(port: u16, state: Arc<ServerState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {e}"),
            )
        }
    }
}

async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn readyz_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if state.is_ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
