// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed views of the OpenShift APIs the operator reads and writes.
//!
//! Only the fields the operator touches are modelled. Unknown fields are
//! ignored on deserialization, so these types stay compatible with newer
//! cluster versions. Schemas are owned by the cluster, hence
//! `schema = "disabled"` on every type.

use k8s_openapi::api::core::v1::Toleration;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

// ============================================================================
// operator.openshift.io/v1 IngressController
// ============================================================================

/// Desired state of an OpenShift ingress controller (router shard).
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "operator.openshift.io",
    version = "v1",
    kind = "IngressController",
    plural = "ingresscontrollers",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct IngressControllerSpec {
    /// DNS suffix served by this controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Secret (in the ingress namespace) holding the default serving certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_certificate: Option<SecretName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_publishing_strategy: Option<EndpointPublishingStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_placement: Option<NodePlacement>,
}

/// Local reference to a secret by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretName {
    pub name: String,
}

/// How the router is exposed outside the cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointPublishingStrategy {
    /// Strategy type, e.g. `LoadBalancerService`.
    pub r#type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerStrategy>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerStrategy {
    /// `External` or `Internal`.
    pub scope: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_parameters: Option<ProviderLoadBalancerParameters>,
}

/// Cloud-provider specific load balancer settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLoadBalancerParameters {
    pub r#type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsLoadBalancerParameters>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsLoadBalancerParameters {
    /// `Classic` or `NLB`.
    pub r#type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classic_load_balancer: Option<AwsClassicLoadBalancerParameters>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsClassicLoadBalancerParameters {
    /// Go duration string, e.g. `1800s`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_idle_timeout: Option<String>,
}

/// Scheduling constraints for the router pods.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
}

impl IngressController {
    /// Load balancer scope recorded on the controller, if it publishes through one.
    #[must_use]
    pub fn load_balancer_scope(&self) -> Option<&str> {
        self.spec
            .endpoint_publishing_strategy
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .map(|lb| lb.scope.as_str())
    }
}

// ============================================================================
// ingress.operator.openshift.io/v1 DNSRecord
// ============================================================================

/// DNS record the ingress operator publishes for a controller's load balancer.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "ingress.operator.openshift.io",
    version = "v1",
    kind = "DNSRecord",
    plural = "dnsrecords",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct DNSRecordSpec {
    /// Fully qualified record name, e.g. `*.apps.example.com.`
    #[serde(default)]
    pub dns_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

// ============================================================================
// config.openshift.io/v1 DNS and Infrastructure
// ============================================================================

/// Cluster-wide DNS configuration.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "DNS",
    plural = "dnses",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct DNSSpec {
    /// Base domain of the cluster, e.g. `mycluster.example.com`.
    #[serde(default)]
    pub base_domain: String,
}

/// Cluster-wide infrastructure description.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Infrastructure",
    plural = "infrastructures",
    status = "InfrastructureStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureSpec {}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_status: Option<PlatformStatus>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatus {
    /// Platform type, e.g. `AWS`, `GCP`, `None`.
    #[serde(default)]
    pub r#type: String,
}

impl Infrastructure {
    /// Platform type reported by the cluster, if any.
    #[must_use]
    pub fn platform_type(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.platform_status.as_ref())
            .map(|p| p.r#type.as_str())
            .filter(|t| !t.is_empty())
    }
}
