// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime configuration for the custom domains operator.
//!
//! [`Args`] is the command line surface (every flag also reads an environment
//! variable where deployments are expected to override it). [`OperatorConfig`]
//! is the validated form handed to the reconciler behind an `Arc`.
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use custom_domains_operator::config::{Args, OperatorConfig};
//!
//! let args = Args::parse();
//! let config = OperatorConfig::try_from(args).unwrap();
//! assert!(config.is_restricted("default"));
//! ```

use crate::constants::{
    DEFAULT_CLUSTER_CONFIG_NAME, DEFAULT_INGRESS_NAMESPACE, DEFAULT_INGRESS_OPERATOR_NAMESPACE,
    DEFAULT_METRICS_PORT, DEFAULT_NAME_PATTERN, DEFAULT_RESTRICTED_NAMES, DNS_RECORD_REQUEUE_SECS,
    ENDPOINT_HOST_LENGTH,
};
use crate::errors::ConfigError;
use clap::Parser;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static DEFAULT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_NAME_PATTERN).expect("default name pattern is valid"));

fn default_restricted_names() -> Vec<String> {
    DEFAULT_RESTRICTED_NAMES
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Command line arguments of the operator binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "custom-domains-operator",
    version,
    about = "Registers custom ingress domains backed by dedicated IngressControllers",
    long_about = None
)]
pub struct Args {
    /// Namespace the router reads certificate secrets from
    #[arg(long, env = "INGRESS_NAMESPACE", default_value = DEFAULT_INGRESS_NAMESPACE)]
    pub ingress_namespace: String,

    /// Namespace holding IngressController and DNSRecord objects
    #[arg(
        long,
        env = "INGRESS_OPERATOR_NAMESPACE",
        default_value = DEFAULT_INGRESS_OPERATOR_NAMESPACE
    )]
    pub ingress_operator_namespace: String,

    /// Name of the cluster-wide DNS and Infrastructure config objects
    #[arg(long, default_value = DEFAULT_CLUSTER_CONFIG_NAME)]
    pub cluster_config_name: String,

    /// Names a CustomDomain may not take (repeatable, or comma separated)
    #[arg(
        long = "restricted-name",
        env = "RESTRICTED_NAMES",
        value_delimiter = ',',
        default_values_t = default_restricted_names()
    )]
    pub restricted_names: Vec<String>,

    /// Pattern every CustomDomain name must match
    #[arg(long, default_value = DEFAULT_NAME_PATTERN)]
    pub name_pattern: String,

    /// Seconds to wait before polling again for the wildcard DNSRecord
    #[arg(long = "dns-record-requeue-secs", default_value_t = DNS_RECORD_REQUEUE_SECS)]
    pub dns_record_requeue_secs: u64,

    /// Length of the random host label of generated endpoints
    #[arg(long, default_value_t = ENDPOINT_HOST_LENGTH)]
    pub endpoint_host_length: usize,

    /// Port of the metrics and health server
    #[arg(long, env = "METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,
}

/// Validated operator configuration.
#[derive(Debug, Clone)]
pub struct OperatorConfig {
    pub ingress_namespace: String,
    pub ingress_operator_namespace: String,
    pub cluster_config_name: String,
    pub restricted_names: Vec<String>,
    pub name_pattern: Regex,
    pub dns_record_requeue: Duration,
    pub endpoint_host_length: usize,
    pub metrics_port: u16,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            ingress_namespace: DEFAULT_INGRESS_NAMESPACE.to_string(),
            ingress_operator_namespace: DEFAULT_INGRESS_OPERATOR_NAMESPACE.to_string(),
            cluster_config_name: DEFAULT_CLUSTER_CONFIG_NAME.to_string(),
            restricted_names: default_restricted_names(),
            name_pattern: DEFAULT_NAME_REGEX.clone(),
            dns_record_requeue: Duration::from_secs(DNS_RECORD_REQUEUE_SECS),
            endpoint_host_length: ENDPOINT_HOST_LENGTH,
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

impl TryFrom<Args> for OperatorConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let name_pattern =
            Regex::new(&args.name_pattern).map_err(|source| ConfigError::InvalidNamePattern {
                pattern: args.name_pattern.clone(),
                source,
            })?;

        if args.endpoint_host_length == 0 {
            return Err(ConfigError::InvalidEndpointHostLength);
        }

        let restricted_names = args
            .restricted_names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        Ok(Self {
            ingress_namespace: args.ingress_namespace,
            ingress_operator_namespace: args.ingress_operator_namespace,
            cluster_config_name: args.cluster_config_name,
            restricted_names,
            name_pattern,
            dns_record_requeue: Duration::from_secs(args.dns_record_requeue_secs),
            endpoint_host_length: args.endpoint_host_length,
            metrics_port: args.metrics_port,
        })
    }
}

impl OperatorConfig {
    /// Whether `name` is reserved for an ingress controller the cluster manages itself.
    #[must_use]
    pub fn is_restricted(&self, name: &str) -> bool {
        self.restricted_names.iter().any(|n| n == name)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
