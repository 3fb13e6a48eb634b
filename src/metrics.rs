// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the custom domains operator.
//!
//! All metrics carry the namespace prefix `customdomains_managed_openshift_io`
//! (prometheus-safe version of "customdomains.managed.openshift.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - passes by outcome, duration, requeues
//! - **Resource Lifecycle Metrics** - dependent objects created, updated, deleted
//! - **Error Metrics** - errors by category
//! - **Domain Metrics** - readiness of every `CustomDomain`
//!
//! # Example
//!
//! ```rust,no_run
//! use custom_domains_operator::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("CustomDomain", std::time::Duration::from_millis(20));
//! ```

use prometheus::{CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all operator metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "customdomains_managed_openshift_io";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (`CustomDomain`)
/// - `status`: Outcome (`success`, `error`, `requeue`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of requeue operations
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `reason`: Reason for requeue (`dns_record_pending`, `conflict`, `error`)
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_requeues_total"),
        "Total number of requeue operations by resource type and reason",
    );
    let counter = CounterVec::new(opts, &["resource_type", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Resource Lifecycle Metrics
// ============================================================================

/// Total number of dependent objects created
pub static RESOURCES_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_created_total"),
        "Total number of dependent resources created by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of dependent objects updated
pub static RESOURCES_UPDATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_updated_total"),
        "Total number of dependent resources updated by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of dependent objects deleted
pub static RESOURCES_DELETED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_deleted_total"),
        "Total number of dependent resources deleted by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by resource type and error category
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `error_type`: Category of error (`invalid_name`, `secret_not_found`, `conflict`, ...)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by resource type and error category",
    );
    let counter = CounterVec::new(opts, &["resource_type", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Domain Metrics
// ============================================================================

/// Readiness of each `CustomDomain` (1 = Ready, 0 = NotReady)
pub static DOMAIN_READY: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_domain_ready"),
        "Whether a CustomDomain is Ready (1) or not (0)",
    );
    let gauge = GaugeVec::new(opts, &["name"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a reconciliation requeue
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled
/// * `reason` - Reason for requeue (e.g., `dns_record_pending`, `conflict`)
pub fn record_reconciliation_requeue(resource_type: &str, reason: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "requeue"])
        .inc();
    REQUEUE_TOTAL
        .with_label_values(&[resource_type, reason])
        .inc();
}

pub fn record_resource_created(resource_type: &str) {
    RESOURCES_CREATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

pub fn record_resource_updated(resource_type: &str) {
    RESOURCES_UPDATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

pub fn record_resource_deleted(resource_type: &str) {
    RESOURCES_DELETED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record an error
///
/// # Arguments
/// * `resource_type` - The kind of resource where error occurred
/// * `error_type` - Category of error, see [`crate::errors::ReconcileError::error_type`]
pub fn record_error(resource_type: &str, error_type: &str) {
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_type])
        .inc();
}

/// Record the readiness of a `CustomDomain`
pub fn record_domain_ready(name: &str, ready: bool) {
    DOMAIN_READY
        .with_label_values(&[name])
        .set(if ready { 1.0 } else { 0.0 });
}

/// Drop the readiness series of a deleted `CustomDomain`
pub fn forget_domain(name: &str) {
    let _ = DOMAIN_READY.remove_label_values(&[name]);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
