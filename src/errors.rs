// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the custom domains operator.
//!
//! - [`StoreError`] - failures of the resource store (Kubernetes API or in-memory fake)
//! - [`ReconcileError`] - outcome of a failed reconciliation pass
//! - [`ConfigError`] - invalid operator configuration
//!
//! Reconcile errors are split into terminal errors (the resource must change
//! before another pass can succeed) and retryable ones; see
//! [`ReconcileError::is_terminal`].

use thiserror::Error;

/// Errors returned by a [`crate::store::ResourceStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The object does not exist (HTTP 404)
    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    /// An object with the same identity already exists (HTTP 409, reason `AlreadyExists`)
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: String, name: String },

    /// The write was based on a stale `resourceVersion` (HTTP 409)
    #[error("{kind} '{name}' was modified concurrently, retry with a fresh copy")]
    Conflict { kind: String, name: String },

    /// Any other API failure (transport, authorization, server errors)
    #[error("API request for {kind} '{name}' failed: {reason}")]
    Api {
        kind: String,
        name: String,
        reason: String,
    },

    /// The object could not be converted to or from its wire form
    #[error("failed to serialize {kind}: {reason}")]
    Serialization { kind: String, reason: String },
}

impl StoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Short error category used as a metrics label.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::Conflict { .. } => "conflict",
            Self::Api { .. } => "api",
            Self::Serialization { .. } => "serialization",
        }
    }
}

/// Errors that end a reconciliation pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The `CustomDomain` name is reserved or not a DNS-1035 label
    #[error("invalid CustomDomain name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The spec asks for a different scope than the existing ingress controller
    #[error(
        "IngressController '{name}' has scope {existing}, cannot change it to {desired}; \
         create a new CustomDomain instead"
    )]
    InvalidScope {
        name: String,
        existing: String,
        desired: String,
    },

    /// A dependent object with the expected name exists but lacks the ownership label
    #[error("{kind} '{name}' already exists and is not managed by this operator")]
    NotOwned { kind: String, name: String },

    /// The referenced TLS secret does not exist
    #[error("certificate secret '{namespace}/{name}' not found")]
    SecretNotFound { namespace: String, name: String },

    /// The cluster DNS configuration has no base domain
    #[error("cluster DNS config '{name}' has no spec.baseDomain")]
    MissingBaseDomain { name: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// Returns true if retrying without a change to the resource cannot succeed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. } | Self::InvalidScope { .. } | Self::NotOwned { .. }
        )
    }

    /// Returns true for optimistic-concurrency conflicts, which deserve a quick retry.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_conflict())
    }

    /// Short error category used as a metrics label.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "invalid_name",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::NotOwned { .. } => "not_owned",
            Self::SecretNotFound { .. } => "secret_not_found",
            Self::MissingBaseDomain { .. } => "missing_base_domain",
            Self::Store(e) => e.error_type(),
        }
    }
}

/// Invalid operator configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid name pattern '{pattern}': {source}")]
    InvalidNamePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("endpoint host length must be at least 1")]
    InvalidEndpointHostLength,
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
