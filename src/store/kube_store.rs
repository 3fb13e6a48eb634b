// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! [`ResourceStore`] backed by the Kubernetes API server.

use super::{ObjectKey, ResourceStore, StoreObject};
use crate::errors::StoreError;
use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Client, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Store that talks to the cluster through `kube::Api`.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a `kube::Error` for the object `name` of kind `kind` onto a [`StoreError`].
pub(crate) fn map_kube_error(err: kube::Error, kind: &str, name: &str) -> StoreError {
    let kind = kind.to_string();
    let name = name.to_string();
    match err {
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound { kind, name },
        kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
            StoreError::AlreadyExists { kind, name }
        }
        kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict { kind, name },
        kube::Error::SerdeError(e) => StoreError::Serialization {
            kind,
            reason: e.to_string(),
        },
        other => StoreError::Api {
            kind,
            name,
            reason: other.to_string(),
        },
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn get<K: StoreObject>(&self, key: &ObjectKey) -> Result<K, StoreError> {
        let api = K::api(&self.client, key.namespace.as_deref());
        api.get(&key.name)
            .await
            .map_err(|e| map_kube_error(e, &K::kind_name(), &key.to_string()))
    }

    async fn create<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = ObjectKey::of(obj);
        debug!(kind = %K::kind_name(), key = %key, "Creating object");
        let api = K::api(&self.client, key.namespace.as_deref());
        api.create(&PostParams::default(), obj)
            .await
            .map_err(|e| map_kube_error(e, &K::kind_name(), &key.to_string()))
    }

    async fn update<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = ObjectKey::of(obj);
        debug!(kind = %K::kind_name(), key = %key, "Replacing object");
        let api = K::api(&self.client, key.namespace.as_deref());
        api.replace(&key.name, &PostParams::default(), obj)
            .await
            .map_err(|e| map_kube_error(e, &K::kind_name(), &key.to_string()))
    }

    async fn update_status<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = ObjectKey::of(obj);
        let kind = K::kind_name();
        let value = serde_json::to_value(obj).map_err(|e| StoreError::Serialization {
            kind: kind.clone(),
            reason: e.to_string(),
        })?;

        // A merge patch carrying resourceVersion is rejected with 409 when stale,
        // which gives the status path the same concurrency guarantee as replace.
        let patch = json!({
            "metadata": { "resourceVersion": obj.resource_version() },
            "status": value.get("status").cloned().unwrap_or_default(),
        });

        debug!(kind = %kind, key = %key, "Updating status");
        let api = K::api(&self.client, key.namespace.as_deref());
        api.patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_kube_error(e, &kind, &key.to_string()))
    }

    async fn delete<K: StoreObject>(
        &self,
        obj: &K,
        grace_period_seconds: Option<u32>,
    ) -> Result<(), StoreError> {
        let key = ObjectKey::of(obj);
        debug!(kind = %K::kind_name(), key = %key, "Deleting object");
        let api = K::api(&self.client, key.namespace.as_deref());
        let params = DeleteParams {
            grace_period_seconds,
            ..DeleteParams::default()
        };
        api.delete(&key.name, &params)
            .await
            .map(|_| ())
            .map_err(|e| map_kube_error(e, &K::kind_name(), &key.to_string()))
    }

    async fn list<K: StoreObject>(
        &self,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<K>, StoreError> {
        let api = K::api(&self.client, namespace);
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }
        api.list(&params)
            .await
            .map(|list| list.items)
            .map_err(|e| map_kube_error(e, &K::kind_name(), namespace.unwrap_or("*")))
    }
}

#[cfg(test)]
#[path = "kube_store_tests.rs"]
mod kube_store_tests;
