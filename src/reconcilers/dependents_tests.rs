// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dependents.rs`

#[cfg(test)]
mod tests {
    use crate::config::OperatorConfig;
    use crate::crd::{CertificateReference, CustomDomain, CustomDomainSpec, LoadBalancerType, Scope};
    use crate::labels::MANAGED_LABEL;
    use crate::reconcilers::dependents::{
        desired_ingress_controller, desired_secret, ingress_domain, secret_differs,
    };
    use k8s_openapi::api::core::v1::Secret;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    const BASE_DOMAIN: &str = "mycluster.example.com";

    /// Build a `CustomDomain` with the given scope and load balancer type.
    fn domain(scope: Option<Scope>, lb: Option<LoadBalancerType>) -> CustomDomain {
        CustomDomain::new(
            "example",
            CustomDomainSpec {
                domain: "apps.example.com".to_string(),
                certificate: CertificateReference {
                    name: "example-tls".to_string(),
                    namespace: "my-project".to_string(),
                },
                scope,
                namespace_selector: None,
                route_selector: Some(LabelSelector {
                    match_labels: Some(BTreeMap::from([("shard".to_string(), "x".to_string())])),
                    ..LabelSelector::default()
                }),
                load_balancer_type: lb,
            },
        )
    }

    /// Build a TLS secret with one data key.
    fn tls_secret(payload: &str) -> Secret {
        Secret {
            data: Some(BTreeMap::from([(
                "tls.crt".to_string(),
                ByteString(payload.as_bytes().to_vec()),
            )])),
            type_: Some("kubernetes.io/tls".to_string()),
            ..Secret::default()
        }
    }

    #[test]
    fn test_desired_secret_copies_payload_and_owns_it() {
        let config = OperatorConfig::default();
        let source = tls_secret("cert");
        let secret = desired_secret("example", &config, &source);

        assert_eq!(secret.metadata.name.as_deref(), Some("example"));
        assert_eq!(secret.metadata.namespace.as_deref(), Some("openshift-ingress"));
        assert_eq!(
            secret.metadata.labels.as_ref().and_then(|l| l.get(MANAGED_LABEL)),
            Some(&"example".to_string())
        );
        assert!(!secret_differs(&secret, &source));
        assert!(secret_differs(&secret, &tls_secret("rotated")));

        let mut retyped = tls_secret("cert");
        retyped.type_ = Some("Opaque".to_string());
        assert!(!secret_differs(&secret, &retyped));
    }

    #[test]
    fn test_ingress_controller_defaults_on_non_aws() {
        let config = OperatorConfig::default();
        let ic = desired_ingress_controller(&domain(None, None), &config, BASE_DOMAIN, Some("GCP"));

        assert_eq!(ic.metadata.namespace.as_deref(), Some("openshift-ingress-operator"));
        assert_eq!(ic.spec.domain, Some(ingress_domain("example", BASE_DOMAIN)));
        assert_eq!(ic.spec.default_certificate.as_ref().map(|c| c.name.as_str()), Some("example"));
        assert_eq!(ic.load_balancer_scope(), Some("External"));

        let lb = ic
            .spec
            .endpoint_publishing_strategy
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .unwrap();
        assert!(lb.provider_parameters.is_none());
        assert!(ic.spec.route_selector.is_some());
        assert!(ic.spec.namespace_selector.is_none());
    }

    #[test]
    fn test_ingress_controller_aws_classic_has_idle_timeout() {
        let config = OperatorConfig::default();
        let ic = desired_ingress_controller(
            &domain(Some(Scope::Internal), None),
            &config,
            BASE_DOMAIN,
            Some("AWS"),
        );
        assert_eq!(ic.load_balancer_scope(), Some("Internal"));

        let params = ic
            .spec
            .endpoint_publishing_strategy
            .and_then(|s| s.load_balancer)
            .and_then(|lb| lb.provider_parameters)
            .unwrap();
        assert_eq!(params.r#type, "AWS");
        let aws = params.aws.unwrap();
        assert_eq!(aws.r#type, "Classic");
        assert_eq!(
            aws.classic_load_balancer.and_then(|c| c.connection_idle_timeout),
            Some("1800s".to_string())
        );
    }

    #[test]
    fn test_ingress_controller_aws_nlb() {
        let config = OperatorConfig::default();
        let ic = desired_ingress_controller(
            &domain(None, Some(LoadBalancerType::Nlb)),
            &config,
            BASE_DOMAIN,
            Some("AWS"),
        );
        let aws = ic
            .spec
            .endpoint_publishing_strategy
            .and_then(|s| s.load_balancer)
            .and_then(|lb| lb.provider_parameters)
            .and_then(|p| p.aws)
            .unwrap();
        assert_eq!(aws.r#type, "NLB");
        assert!(aws.classic_load_balancer.is_none());
    }

    #[test]
    fn test_ingress_controller_runs_on_infra_nodes() {
        let config = OperatorConfig::default();
        let ic = desired_ingress_controller(&domain(None, None), &config, BASE_DOMAIN, None);
        let placement = ic.spec.node_placement.unwrap();

        let selector = placement.node_selector.and_then(|s| s.match_labels).unwrap();
        assert_eq!(selector.get("node-role.kubernetes.io/infra"), Some(&String::new()));
        assert_eq!(placement.tolerations.len(), 1);
        assert_eq!(placement.tolerations[0].effect.as_deref(), Some("NoSchedule"));
        assert_eq!(placement.tolerations[0].operator.as_deref(), Some("Exists"));
    }
}
