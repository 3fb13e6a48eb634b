// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource store abstraction.
//!
//! The reconciler reaches the cluster only through [`ResourceStore`]. Two
//! implementations are provided:
//!
//! - [`KubeStore`] - backed by `kube::Api`, used by the operator binary
//! - [`MemoryStore`] - in-memory fake with optimistic concurrency, used by tests
//!
//! Objects are addressed by [`ObjectKey`] (optional namespace plus name). The
//! object kind comes from the Rust type via [`StoreObject`].
//!
//! # Example
//!
//! ```rust,no_run
//! use custom_domains_operator::store::{MemoryStore, ObjectKey, ResourceStore};
//! use k8s_openapi::api::core::v1::Secret;
//!
//! # async fn example() {
//! let store = MemoryStore::new();
//! let missing = store
//!     .get::<Secret>(&ObjectKey::namespaced("openshift-ingress", "example"))
//!     .await;
//! assert!(missing.is_err());
//! # }
//! ```

mod kube_store;
mod memory;
pub mod selector;

pub use kube_store::KubeStore;
pub use memory::{MemoryStore, WriteRecord, WriteVerb};

use crate::crd::CustomDomain;
use crate::errors::StoreError;
use crate::openshift::{DNSRecord, IngressController, Infrastructure, DNS};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Identity of a stored object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    /// Key of a cluster-scoped object.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Key of a namespaced object.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Key of an existing object, taken from its metadata.
    pub fn of<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace(),
            name: obj.name_any(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A Kubernetes object type the store can persist.
///
/// Implemented for every type the operator touches; the implementation only
/// decides whether the `Api` handle is namespaced.
pub trait StoreObject:
    Resource<DynamicType = ()> + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Typed API handle for objects of this kind.
    fn api(client: &Client, namespace: Option<&str>) -> Api<Self>;

    /// Kind name, e.g. `Secret`.
    fn kind_name() -> String {
        Self::kind(&()).to_string()
    }
}

macro_rules! namespaced_object {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StoreObject for $ty {
                fn api(client: &Client, namespace: Option<&str>) -> Api<Self> {
                    match namespace {
                        Some(ns) => Api::namespaced(client.clone(), ns),
                        None => Api::all(client.clone()),
                    }
                }
            }
        )*
    };
}

macro_rules! cluster_object {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StoreObject for $ty {
                fn api(client: &Client, _namespace: Option<&str>) -> Api<Self> {
                    Api::all(client.clone())
                }
            }
        )*
    };
}

namespaced_object!(Secret, IngressController, DNSRecord);
cluster_object!(CustomDomain, DNS, Infrastructure);

/// Typed CRUD access to cluster objects.
///
/// Every method maps API failures onto [`StoreError`]; callers branch on the
/// variant (`NotFound`, `AlreadyExists`, `Conflict`) rather than on HTTP codes.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch one object.
    async fn get<K: StoreObject>(&self, key: &ObjectKey) -> Result<K, StoreError>;

    /// Create a new object; `AlreadyExists` if the identity is taken.
    async fn create<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError>;

    /// Replace spec and metadata; `Conflict` if `resourceVersion` is stale.
    async fn update<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError>;

    /// Replace only the status subresource; `Conflict` if `resourceVersion` is stale.
    async fn update_status<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError>;

    /// Delete an object, optionally with a grace period.
    async fn delete<K: StoreObject>(
        &self,
        obj: &K,
        grace_period_seconds: Option<u32>,
    ) -> Result<(), StoreError>;

    /// List objects, optionally restricted to a namespace and a label selector
    /// (`key`, `!key`, `key=value`, `key!=value`, comma separated).
    async fn list<K: StoreObject>(
        &self,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<K>, StoreError>;
}
