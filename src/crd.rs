// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for custom ingress domains.
//!
//! A [`CustomDomain`] asks the operator to expose an additional application
//! ingress domain next to the cluster's default one. The operator answers by
//! creating a dedicated `IngressController` (see [`crate::openshift`]) that
//! serves the domain with the user's TLS certificate.
//!
//! # Example
//!
//! ```rust,no_run
//! use custom_domains_operator::crd::{CertificateReference, CustomDomain, CustomDomainSpec, Scope};
//!
//! let spec = CustomDomainSpec {
//!     domain: "apps.example.com".to_string(),
//!     certificate: CertificateReference {
//!         name: "example-tls".to_string(),
//!         namespace: "my-project".to_string(),
//!     },
//!     scope: Some(Scope::Internal),
//!     namespace_selector: None,
//!     route_selector: None,
//!     load_balancer_type: None,
//! };
//! let domain = CustomDomain::new("example", spec);
//! ```

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Load balancer scope of the dependent ingress controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Scope {
    /// Internet-facing load balancer
    #[default]
    External,
    /// Load balancer reachable only from inside the cluster network
    Internal,
}

impl Scope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::External => "External",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AWS load balancer flavour. Ignored on other platforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LoadBalancerType {
    /// Classic Load Balancer (TCP/SSL or HTTP/HTTPS routing)
    #[default]
    Classic,
    /// Network Load Balancer (transport layer routing)
    #[serde(rename = "NLB")]
    Nlb,
}

impl LoadBalancerType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Nlb => "NLB",
        }
    }
}

/// Reference to the user's TLS secret.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CertificateReference {
    /// Name of the `kubernetes.io/tls` secret
    pub name: String,

    /// Namespace holding the secret
    pub namespace: String,
}

/// `CustomDomain` registers an additional application ingress domain backed by
/// a dedicated ingress controller and a user supplied TLS certificate.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "managed.openshift.io",
    version = "v1alpha1",
    kind = "CustomDomain",
    plural = "customdomains",
    doc = "CustomDomain registers an additional application ingress domain. The operator creates a dedicated IngressController serving the domain with the referenced TLS certificate."
)]
#[kube(status = "CustomDomainStatus")]
#[kube(printcolumn = r#"{"name":"Endpoint","type":"string","jsonPath":".status.endpoint"}"#)]
#[kube(printcolumn = r#"{"name":"Domain","type":"string","jsonPath":".spec.domain"}"#)]
#[kube(printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.state"}"#)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainSpec {
    /// The custom domain routes will be exposed under (e.g. "apps.example.com").
    pub domain: String,

    /// The TLS secret serving the domain.
    pub certificate: CertificateReference,

    /// Whether the ingress is internal or external. Defaults to External.
    ///
    /// Cannot be changed once the ingress controller exists; a new
    /// `CustomDomain` is required to switch scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,

    /// Restricts the namespaces serviced by the ingress controller. No filtering when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,

    /// Restricts the routes serviced by the ingress controller. No filtering when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_selector: Option<LabelSelector>,

    /// AWS load balancer type. Defaults to Classic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_type: Option<LoadBalancerType>,
}

/// Overall state of a `CustomDomain`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CustomDomainState {
    NotReady,
    Ready,
}

/// Condition types recorded on a `CustomDomain`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ConditionType {
    /// The dependent objects are being created
    Creating,
    /// The domain has been handed back to the cluster ingress operator
    Deprecated,
    /// The referenced TLS secret does not exist (yet)
    SecretNotFound,
    /// The resource name is reserved or not a DNS-1035 label
    InvalidName,
    /// The spec asks for a scope different from the existing ingress controller
    InvalidScope,
    /// A dependent object exists but is not owned by this operator
    Failed,
    /// The domain is served and its DNS record is published
    Ready,
}

impl ConditionType {
    /// Every condition type, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Creating,
        Self::Deprecated,
        Self::SecretNotFound,
        Self::InvalidName,
        Self::InvalidScope,
        Self::Failed,
        Self::Ready,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "Creating",
            Self::Deprecated => "Deprecated",
            Self::SecretNotFound => "SecretNotFound",
            Self::InvalidName => "InvalidName",
            Self::InvalidScope => "InvalidScope",
            Self::Failed => "Failed",
            Self::Ready => "Ready",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kubernetes tri-state condition status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// One entry of the condition ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainCondition {
    /// Type of the condition.
    pub r#type: ConditionType,

    /// Status of the condition.
    pub status: ConditionStatus,

    /// Last time the condition was probed (RFC3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<String>,

    /// Last time the condition moved from one status to another (RFC3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// CamelCase reason for the last transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable details about the last transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Observed state of a `CustomDomain`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainStatus {
    /// Condition ledger, oldest first.
    #[serde(default)]
    pub conditions: Vec<CustomDomainCondition>,

    /// Overall state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CustomDomainState>,

    /// Wildcard DNS name published for the ingress controller.
    #[serde(default)]
    pub dns_record: String,

    /// Resolvable address external DNS should point the custom domain at.
    #[serde(default)]
    pub endpoint: String,

    /// Scope of the ingress controller serving this domain.
    #[serde(default)]
    pub scope: String,
}

impl CustomDomain {
    /// `spec.scope`, falling back to External.
    #[must_use]
    pub fn effective_scope(&self) -> Scope {
        self.spec.scope.unwrap_or_default()
    }

    /// `spec.loadBalancerType`, falling back to Classic.
    #[must_use]
    pub fn effective_load_balancer_type(&self) -> LoadBalancerType {
        self.spec.load_balancer_type.unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
