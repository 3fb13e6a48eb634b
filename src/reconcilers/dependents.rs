// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Builders for the objects a `CustomDomain` owns.
//!
//! - the dependent TLS Secret in the ingress namespace, a copy of the user's certificate
//! - the dependent `IngressController` serving the custom domain
//!
//! Builders are pure; the reconciler decides whether to create or update.

use crate::config::OperatorConfig;
use crate::constants::{
    ELB_IDLE_TIMEOUT_SECS, INFRA_NODE_LABEL, PLATFORM_AWS, PROVIDER_AWS,
    STRATEGY_LOAD_BALANCER_SERVICE,
};
use crate::crd::{CustomDomain, LoadBalancerType};
use crate::labels::owned_labels;
use crate::openshift::{
    AwsClassicLoadBalancerParameters, AwsLoadBalancerParameters, EndpointPublishingStrategy,
    IngressController, IngressControllerSpec, LoadBalancerStrategy, NodePlacement,
    ProviderLoadBalancerParameters, SecretName,
};
use k8s_openapi::api::core::v1::{Secret, Toleration};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Copy of the certificate secret `source`, owned by the `CustomDomain` `owner`.
#[must_use]
pub fn desired_secret(owner: &str, config: &OperatorConfig, source: &Secret) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(owner.to_string()),
            namespace: Some(config.ingress_namespace.clone()),
            labels: Some(owned_labels(owner)),
            ..ObjectMeta::default()
        },
        data: source.data.clone(),
        type_: source.type_.clone(),
        ..Secret::default()
    }
}

/// Whether the dependent secret's payload differs from the certificate secret.
///
/// Only `data` is compared: a Secret's `type` is immutable once created, so
/// the dependent keeps the type it was created with.
#[must_use]
pub fn secret_differs(dependent: &Secret, source: &Secret) -> bool {
    dependent.data != source.data
}

/// Domain served by the dependent ingress controller: `<name>.<base domain>`.
#[must_use]
pub fn ingress_domain(name: &str, base_domain: &str) -> String {
    format!("{name}.{base_domain}")
}

fn provider_parameters(lb_type: LoadBalancerType) -> ProviderLoadBalancerParameters {
    let classic_load_balancer = match lb_type {
        LoadBalancerType::Classic => Some(AwsClassicLoadBalancerParameters {
            connection_idle_timeout: Some(format!("{ELB_IDLE_TIMEOUT_SECS}s")),
        }),
        LoadBalancerType::Nlb => None,
    };

    ProviderLoadBalancerParameters {
        r#type: PROVIDER_AWS.to_string(),
        aws: Some(AwsLoadBalancerParameters {
            r#type: lb_type.as_str().to_string(),
            classic_load_balancer,
        }),
    }
}

fn infra_node_placement() -> NodePlacement {
    NodePlacement {
        node_selector: Some(LabelSelector {
            match_labels: Some(BTreeMap::from([(
                INFRA_NODE_LABEL.to_string(),
                String::new(),
            )])),
            ..LabelSelector::default()
        }),
        tolerations: vec![Toleration {
            key: Some(INFRA_NODE_LABEL.to_string()),
            effect: Some("NoSchedule".to_string()),
            operator: Some("Exists".to_string()),
            ..Toleration::default()
        }],
    }
}

/// The ingress controller serving `domain`.
///
/// `platform` is the cluster platform type; AWS load balancer parameters are
/// only emitted when it is `AWS`.
#[must_use]
pub fn desired_ingress_controller(
    domain: &CustomDomain,
    config: &OperatorConfig,
    base_domain: &str,
    platform: Option<&str>,
) -> IngressController {
    let name = domain.name_any();
    let provider_parameters = (platform == Some(PLATFORM_AWS))
        .then(|| provider_parameters(domain.effective_load_balancer_type()));

    let spec = IngressControllerSpec {
        domain: Some(ingress_domain(&name, base_domain)),
        default_certificate: Some(SecretName { name: name.clone() }),
        endpoint_publishing_strategy: Some(EndpointPublishingStrategy {
            r#type: STRATEGY_LOAD_BALANCER_SERVICE.to_string(),
            load_balancer: Some(LoadBalancerStrategy {
                scope: domain.effective_scope().as_str().to_string(),
                provider_parameters,
            }),
        }),
        namespace_selector: domain.spec.namespace_selector.clone(),
        route_selector: domain.spec.route_selector.clone(),
        node_placement: Some(infra_node_placement()),
    };

    let mut ingress = IngressController::new(&name, spec);
    ingress.metadata.namespace = Some(config.ingress_operator_namespace.clone());
    ingress.metadata.labels = Some(owned_labels(&name));
    ingress
}

#[cfg(test)]
#[path = "dependents_tests.rs"]
mod dependents_tests;
