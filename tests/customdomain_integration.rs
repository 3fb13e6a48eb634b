// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the custom domains operator
//!
//! The store tests need any Kubernetes cluster. The lifecycle test needs an
//! OpenShift cluster with the `CustomDomain` CRD installed and the operator
//! running.
//!
//! Run with: cargo test --test customdomain_integration -- --ignored

mod common;

use common::{cleanup_test_namespace, create_test_namespace, get_kube_client_or_skip, wait_for};
use custom_domains_operator::crd::{
    CertificateReference, CustomDomain, CustomDomainSpec, CustomDomainState,
};
use custom_domains_operator::labels::{owned_labels, MANAGED_LABEL};
use custom_domains_operator::openshift::IngressController;
use custom_domains_operator::store::{KubeStore, ObjectKey, ResourceStore};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::time::Duration;

const STORE_NAMESPACE: &str = "custom-domains-store-test";
const CERT_NAMESPACE: &str = "custom-domains-cert-test";
const DOMAIN_NAME: &str = "integration";

/// Build an opaque secret in `namespace`.
fn test_secret(namespace: &str, name: &str, labels: Option<BTreeMap<String, String>>) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels,
            ..ObjectMeta::default()
        },
        data: Some(BTreeMap::from([(
            "key".to_string(),
            ByteString(b"value".to_vec()),
        )])),
        ..Secret::default()
    }
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn test_kube_store_secret_lifecycle() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    create_test_namespace(&client, STORE_NAMESPACE).await.unwrap();
    let store = KubeStore::new(client.clone());

    let created = store
        .create(&test_secret(STORE_NAMESPACE, "owned", Some(owned_labels("example"))))
        .await
        .unwrap();
    store
        .create(&test_secret(STORE_NAMESPACE, "foreign", None))
        .await
        .unwrap();

    let duplicate = store
        .create(&test_secret(STORE_NAMESPACE, "owned", None))
        .await
        .unwrap_err();
    assert!(matches!(
        duplicate,
        custom_domains_operator::errors::StoreError::AlreadyExists { .. }
    ));

    let mut fresh = created.clone();
    fresh.data = Some(BTreeMap::from([(
        "key".to_string(),
        ByteString(b"rotated".to_vec()),
    )]));
    store.update(&fresh).await.unwrap();

    // `created` still carries the old resourceVersion
    let stale = store.update(&created).await.unwrap_err();
    assert!(stale.is_conflict());

    let owned: Vec<Secret> = store
        .list(Some(STORE_NAMESPACE), Some(MANAGED_LABEL))
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].name_any(), "owned");

    let fetched: Secret = store
        .get(&ObjectKey::namespaced(STORE_NAMESPACE, "owned"))
        .await
        .unwrap();
    store.delete(&fetched, Some(0)).await.unwrap();
    let missing = store
        .get::<Secret>(&ObjectKey::namespaced(STORE_NAMESPACE, "owned"))
        .await
        .unwrap_err();
    assert!(missing.is_not_found());

    cleanup_test_namespace(&client, STORE_NAMESPACE).await.unwrap();
}

#[tokio::test]
#[ignore = "requires an OpenShift cluster with the operator running"]
async fn test_custom_domain_lifecycle() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    create_test_namespace(&client, CERT_NAMESPACE).await.unwrap();
    let store = KubeStore::new(client.clone());

    let mut cert = test_secret(CERT_NAMESPACE, "integration-tls", None);
    cert.type_ = Some("Opaque".to_string());
    store.create(&cert).await.unwrap();

    let domain = CustomDomain::new(
        DOMAIN_NAME,
        CustomDomainSpec {
            domain: "apps.integration.example.com".to_string(),
            certificate: CertificateReference {
                name: "integration-tls".to_string(),
                namespace: CERT_NAMESPACE.to_string(),
            },
            scope: None,
            namespace_selector: None,
            route_selector: None,
            load_balancer_type: None,
        },
    );
    store.create(&domain).await.unwrap();

    let key = ObjectKey::cluster(DOMAIN_NAME);
    let (store_ref, key_ref) = (&store, &key);
    let ready = wait_for(Duration::from_secs(600), || async move {
        store_ref
            .get::<CustomDomain>(key_ref)
            .await
            .is_ok_and(|d| d.status.and_then(|s| s.state) == Some(CustomDomainState::Ready))
    })
    .await;
    assert!(ready, "CustomDomain never became Ready");

    let ready_domain: CustomDomain = store.get(&key).await.unwrap();
    let status = ready_domain.status.clone().unwrap();
    assert!(!status.endpoint.is_empty());
    assert!(status.dns_record.starts_with(&format!("*.{DOMAIN_NAME}.")));

    store.delete(&ready_domain, None).await.unwrap();
    let gone = wait_for(Duration::from_secs(120), || async move {
        store_ref
            .get::<CustomDomain>(key_ref)
            .await
            .is_err_and(|e| e.is_not_found())
    })
    .await;
    assert!(gone, "CustomDomain was not finalized");

    let ingress = store
        .get::<IngressController>(&ObjectKey::namespaced("openshift-ingress-operator", DOMAIN_NAME))
        .await;
    assert!(ingress.is_err_and(|e| e.is_not_found()));

    cleanup_test_namespace(&client, CERT_NAMESPACE).await.unwrap();
}
