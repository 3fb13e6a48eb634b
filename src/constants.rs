// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the custom domains operator.
//!
//! Values here are defaults; anything an operator may want to vary at runtime
//! is carried by [`crate::config::OperatorConfig`] instead.

// ============================================================================
// API Constants
// ============================================================================

/// Kind name for the `CustomDomain` resource
pub const KIND_CUSTOM_DOMAIN: &str = "CustomDomain";

/// Kind name for dependent secrets (metrics label)
pub const KIND_SECRET: &str = "Secret";

/// Kind name for dependent ingress controllers (metrics label)
pub const KIND_INGRESS_CONTROLLER: &str = "IngressController";

// ============================================================================
// Cluster Layout Defaults
// ============================================================================

/// Namespace where the router reads certificate secrets from
pub const DEFAULT_INGRESS_NAMESPACE: &str = "openshift-ingress";

/// Namespace where `IngressController` and `DNSRecord` objects live
pub const DEFAULT_INGRESS_OPERATOR_NAMESPACE: &str = "openshift-ingress-operator";

/// Name of the cluster-wide `DNS` and `Infrastructure` config objects
pub const DEFAULT_CLUSTER_CONFIG_NAME: &str = "cluster";

/// Ingress controllers the cluster already manages; a `CustomDomain` may not take these names
pub const DEFAULT_RESTRICTED_NAMES: &[&str] = &["default", "apps2", "apps"];

/// DNS-1035 label: lowercase alphanumerics or '-', starts with a letter, ends alphanumeric
pub const DEFAULT_NAME_PATTERN: &str = "^[a-z]([-a-z0-9]*[a-z0-9])?$";

/// Maximum length of a DNS-1035 label
pub const MAX_NAME_LENGTH: usize = 63;

/// Suffix of the wildcard `DNSRecord` the ingress operator publishes per controller
pub const DNS_RECORD_SUFFIX: &str = "-wildcard";

// ============================================================================
// Ingress Controller Defaults
// ============================================================================

/// Platform type reported by the `Infrastructure` object on AWS
pub const PLATFORM_AWS: &str = "AWS";

/// Endpoint publishing strategy used for every dependent ingress controller
pub const STRATEGY_LOAD_BALANCER_SERVICE: &str = "LoadBalancerService";

/// Provider parameters type for AWS load balancers
pub const PROVIDER_AWS: &str = "AWS";

/// Classic ELB idle timeout (30 minutes)
pub const ELB_IDLE_TIMEOUT_SECS: u64 = 1800;

/// Node role label the ingress controller pods are pinned to
pub const INFRA_NODE_LABEL: &str = "node-role.kubernetes.io/infra";

// ============================================================================
// Reconciliation Timing Constants
// ============================================================================

/// Delay before polling again for the downstream `DNSRecord` (1 minute)
pub const DNS_RECORD_REQUEUE_SECS: u64 = 60;

/// Requeue duration for retryable controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after an optimistic-concurrency conflict (5 seconds)
pub const CONFLICT_REQUEUE_DURATION_SECS: u64 = 5;

/// Requeue duration for a healthy, ready `CustomDomain` (10 minutes)
pub const READY_REQUEUE_DURATION_SECS: u64 = 600;

// ============================================================================
// Endpoint Generation
// ============================================================================

/// Length of the random host label prefixed to the ingress domain
pub const ENDPOINT_HOST_LENGTH: usize = 6;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Default port for the metrics and health server
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Tokio worker threads for the controller runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
