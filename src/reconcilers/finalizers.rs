// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management and teardown of dependent objects.
//!
//! A `CustomDomain` carries [`FINALIZER_CUSTOM_DOMAIN`] for as long as it may
//! own dependent objects. When it is deleted, [`FinalizerCleanup::cleanup`]
//! removes the dependent Secret and IngressController, and only a successful
//! cleanup releases the finalizer.
//!
//! # Example
//!
//! ```rust,no_run
//! use custom_domains_operator::config::OperatorConfig;
//! use custom_domains_operator::crd::CustomDomain;
//! use custom_domains_operator::labels::FINALIZER_CUSTOM_DOMAIN;
//! use custom_domains_operator::reconcilers::finalizers::{handle_deletion, FinalizerCleanup};
//! use custom_domains_operator::store::MemoryStore;
//!
//! # async fn example(store: MemoryStore, domain: CustomDomain) {
//! let config = OperatorConfig::default();
//! if domain.metadata.deletion_timestamp.is_some() {
//!     handle_deletion(&store, &config, &domain, FINALIZER_CUSTOM_DOMAIN).await.unwrap();
//! }
//! # }
//! ```
//!
//! [`FINALIZER_CUSTOM_DOMAIN`]: crate::labels::FINALIZER_CUSTOM_DOMAIN

use crate::config::OperatorConfig;
use crate::crd::CustomDomain;
use crate::errors::{ReconcileError, StoreError};
use crate::labels::is_owned;
use crate::metrics;
use crate::openshift::IngressController;
use crate::store::{ObjectKey, ResourceStore, StoreObject};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use tracing::{debug, info};

/// Resources that must clean up after themselves before their finalizer is removed.
#[async_trait]
pub trait FinalizerCleanup: StoreObject {
    /// Remove everything this resource owns.
    ///
    /// # Errors
    ///
    /// Any error keeps the finalizer in place; deletion is retried on the next pass.
    async fn cleanup<S: ResourceStore>(
        &self,
        store: &S,
        config: &OperatorConfig,
    ) -> Result<(), ReconcileError>;
}

/// Whether `finalizer` is present on `resource`.
#[must_use]
pub fn has_finalizer<K: ResourceExt>(resource: &K, finalizer: &str) -> bool {
    resource.finalizers().iter().any(|f| f == finalizer)
}

/// Add `finalizer` if missing and return the stored object.
///
/// Idempotent: when the finalizer is already present no write happens and a
/// clone of `resource` is returned.
///
/// # Errors
///
/// Propagates store errors, notably `Conflict` when `resource` is stale.
pub async fn ensure_finalizer<S, K>(store: &S, resource: &K, finalizer: &str) -> Result<K, StoreError>
where
    S: ResourceStore,
    K: StoreObject,
{
    if has_finalizer(resource, finalizer) {
        return Ok(resource.clone());
    }

    info!(
        kind = %K::kind_name(),
        name = %resource.name_any(),
        finalizer,
        "Adding finalizer"
    );
    let mut updated = resource.clone();
    updated.finalizers_mut().push(finalizer.to_string());
    store.update(&updated).await
}

/// Remove `finalizer` if present.
///
/// # Errors
///
/// Propagates store errors.
pub async fn remove_finalizer<S, K>(store: &S, resource: &K, finalizer: &str) -> Result<(), StoreError>
where
    S: ResourceStore,
    K: StoreObject,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    info!(
        kind = %K::kind_name(),
        name = %resource.name_any(),
        finalizer,
        "Removing finalizer"
    );
    let mut updated = resource.clone();
    updated.finalizers_mut().retain(|f| f != finalizer);
    store.update(&updated).await.map(|_| ())
}

/// Run cleanup for a resource being deleted, then release its finalizer.
///
/// Does nothing when the finalizer is already gone.
///
/// # Errors
///
/// Returns the cleanup error (finalizer kept) or the store error of the
/// finalizer removal.
pub async fn handle_deletion<S, K>(
    store: &S,
    config: &OperatorConfig,
    resource: &K,
    finalizer: &str,
) -> Result<(), ReconcileError>
where
    S: ResourceStore,
    K: FinalizerCleanup,
{
    if !has_finalizer(resource, finalizer) {
        debug!(name = %resource.name_any(), "Finalizer already removed, nothing to clean up");
        return Ok(());
    }

    resource.cleanup(store, config).await?;
    remove_finalizer(store, resource, finalizer).await?;
    Ok(())
}

/// Delete the object at `key` if it exists, carries the ownership label and
/// is not `protected`. Returns whether a delete was issued.
async fn delete_if_owned<S, K>(store: &S, key: &ObjectKey, protected: bool) -> Result<bool, StoreError>
where
    S: ResourceStore,
    K: StoreObject,
{
    let kind = K::kind_name();
    let obj: K = match store.get(key).await {
        Ok(obj) => obj,
        Err(e) if e.is_not_found() => {
            info!(kind = %kind, key = %key, "Not found, skipping");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    if !is_owned(Some(obj.labels())) {
        info!(kind = %kind, key = %key, "Missing ownership label, not deleting");
        return Ok(false);
    }
    if protected {
        info!(kind = %kind, key = %key, "Name is restricted, not deleting");
        return Ok(false);
    }

    match store.delete(&obj, None).await {
        Ok(()) => {
            metrics::record_resource_deleted(&kind);
            info!(kind = %kind, key = %key, "Deleted");
            Ok(true)
        }
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl FinalizerCleanup for CustomDomain {
    async fn cleanup<S: ResourceStore>(
        &self,
        store: &S,
        config: &OperatorConfig,
    ) -> Result<(), ReconcileError> {
        let name = self.name_any();
        info!(name = %name, "Cleaning up dependent objects");

        delete_if_owned::<S, Secret>(
            store,
            &ObjectKey::namespaced(&config.ingress_namespace, &name),
            false,
        )
        .await?;

        delete_if_owned::<S, IngressController>(
            store,
            &ObjectKey::namespaced(&config.ingress_operator_namespace, &name),
            config.is_restricted(&name),
        )
        .await?;

        metrics::forget_domain(&name);
        info!(name = %name, "CustomDomain finalized");
        Ok(())
    }
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
