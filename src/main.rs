// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use custom_domains_operator::{
    config::{Args, OperatorConfig},
    constants::TOKIO_WORKER_THREADS,
    controller,
    reconcilers::CustomDomainReconciler,
    server::{start_server, ServerState},
    store::KubeStore,
};
use kube::Client;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("custom-domains-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

/// Format: timestamp file:line LEVEL message
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing();

    info!("Starting Custom Domains Operator");
    let config = OperatorConfig::try_from(args)?;
    debug!(?config, "Configuration loaded");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics_port = config.metrics_port;
    let reconciler = CustomDomainReconciler::new(Arc::new(KubeStore::new(client)), Arc::new(config));
    let state = Arc::new(ServerState {
        is_ready: Arc::new(AtomicBool::new(false)),
    });

    // Both tasks should run forever; whichever returns first ends the process
    tokio::select! {
        result = controller::run(reconciler, Arc::clone(&state.is_ready)) => {
            match &result {
                Ok(()) => info!("CustomDomain controller stopped"),
                Err(e) => error!("CRITICAL: CustomDomain controller exited: {:?}", e),
            }
            result
        }
        result = start_server(metrics_port, Arc::clone(&state)) => {
            error!("CRITICAL: HTTP server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("HTTP server exited unexpectedly without error")
        }
    }
}
