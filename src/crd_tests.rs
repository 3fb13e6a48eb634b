// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `crd.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{
        CertificateReference, ConditionType, CustomDomain, CustomDomainSpec, CustomDomainState,
        CustomDomainStatus, LoadBalancerType, Scope,
    };
    use kube::CustomResourceExt;

    /// Minimal `CustomDomain` used across tests.
    fn sample() -> CustomDomain {
        CustomDomain::new(
            "acme",
            CustomDomainSpec {
                domain: "apps.acme.io".to_string(),
                certificate: CertificateReference {
                    name: "acme-tls".to_string(),
                    namespace: "acme-certs".to_string(),
                },
                scope: None,
                namespace_selector: None,
                route_selector: None,
                load_balancer_type: None,
            },
        )
    }

    #[test]
    fn test_crd_is_cluster_scoped() {
        let crd = CustomDomain::crd();
        assert_eq!(crd.spec.group, "managed.openshift.io");
        assert_eq!(crd.spec.names.kind, "CustomDomain");
        assert_eq!(crd.spec.names.plural, "customdomains");
        assert_eq!(crd.spec.scope, "Cluster");
        assert_eq!(crd.spec.versions[0].name, "v1alpha1");

        let columns: Vec<_> = crd.spec.versions[0]
            .additional_printer_columns
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(columns, vec!["Endpoint", "Domain", "Status"]);
    }

    #[test]
    fn test_spec_defaults() {
        let domain = sample();
        assert_eq!(domain.effective_scope(), Scope::External);
        assert_eq!(domain.effective_load_balancer_type(), LoadBalancerType::Classic);
        assert!(domain.status.is_none());
    }

    #[test]
    fn test_spec_wire_format() {
        let json = serde_json::json!({
            "domain": "apps.acme.io",
            "certificate": {"name": "acme-tls", "namespace": "acme-certs"},
            "scope": "Internal",
            "loadBalancerType": "NLB"
        });
        let spec: CustomDomainSpec = serde_json::from_value(json).unwrap();
        assert_eq!(spec.scope, Some(Scope::Internal));
        assert_eq!(spec.load_balancer_type, Some(LoadBalancerType::Nlb));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::External.to_string(), "External");
        assert_eq!(Scope::Internal.to_string(), "Internal");
    }

    #[test]
    fn test_status_wire_format() {
        let status = CustomDomainStatus {
            state: Some(CustomDomainState::Ready),
            dns_record: "*.acme.mycluster.example.com.".to_string(),
            endpoint: "abcdef.acme.mycluster.example.com".to_string(),
            scope: "External".to_string(),
            ..CustomDomainStatus::default()
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["state"], "Ready");
        assert_eq!(value["dnsRecord"], "*.acme.mycluster.example.com.");
        assert!(value["conditions"].as_array().unwrap().is_empty());

        let back: CustomDomainStatus = serde_json::from_value(value).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn test_condition_types_are_distinct() {
        let names: std::collections::HashSet<_> =
            ConditionType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names.len(), ConditionType::ALL.len());
    }
}
