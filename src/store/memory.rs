// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ResourceStore`] with API-server-like semantics.
//!
//! Objects are kept in their JSON form keyed by kind and [`ObjectKey`]. Every
//! write bumps a global `resourceVersion`; `update` and `update_status` with a
//! stale version fail with [`StoreError::Conflict`]. Deleting an object that
//! still has finalizers only stamps `deletionTimestamp`, and an update that
//! removes the last finalizer of a deleting object removes it, as the API
//! server does. Changing the `type` of a stored Secret is rejected like the
//! API server's immutable-field validation.
//!
//! Every successful write is appended to a log so tests can assert on the
//! exact side effects of a reconciliation pass.

use super::selector::LabelSelector;
use super::{ObjectKey, ResourceStore, StoreObject};
use crate::errors::StoreError;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Kind of write recorded in the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteVerb {
    Create,
    Update,
    UpdateStatus,
    Delete,
}

/// One successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRecord {
    pub verb: WriteVerb,
    pub kind: String,
    pub key: ObjectKey,
}

#[derive(Default)]
struct Inner {
    objects: BTreeMap<(String, ObjectKey), Value>,
    resource_version: u64,
    writes: Vec<WriteRecord>,
}

impl Inner {
    fn next_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }

    fn record(&mut self, verb: WriteVerb, kind: &str, key: &ObjectKey) {
        self.writes.push(WriteRecord {
            verb,
            kind: kind.to_string(),
            key: key.clone(),
        });
    }
}

/// Thread-safe in-memory object store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn to_value<K: StoreObject>(obj: &K) -> Result<Value, StoreError> {
    serde_json::to_value(obj).map_err(|e| StoreError::Serialization {
        kind: K::kind_name(),
        reason: e.to_string(),
    })
}

fn from_value<K: StoreObject>(value: Value) -> Result<K, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Serialization {
        kind: K::kind_name(),
        reason: e.to_string(),
    })
}

fn stored_version(value: &Value) -> Option<&str> {
    value
        .get("metadata")
        .and_then(|m| m.get("resourceVersion"))
        .and_then(Value::as_str)
}

/// Reject updates that change a Secret's `type`.
fn immutable_check(
    kind: &str,
    stored: &Value,
    incoming: &Value,
    key: &ObjectKey,
) -> Result<(), StoreError> {
    if kind != "Secret" {
        return Ok(());
    }
    match (stored.get("type"), incoming.get("type")) {
        (Some(old), new) if Some(old) != new => Err(StoreError::Api {
            kind: kind.to_string(),
            name: key.to_string(),
            reason: "Secret \"type\" field is immutable".to_string(),
        }),
        _ => Ok(()),
    }
}

fn conflict_check<K: StoreObject>(
    obj: &K,
    stored: &Value,
    key: &ObjectKey,
) -> Result<(), StoreError> {
    match obj.resource_version() {
        Some(rv) if Some(rv.as_str()) != stored_version(stored) => Err(StoreError::Conflict {
            kind: K::kind_name(),
            name: key.to_string(),
        }),
        _ => Ok(()),
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object as-is (status and deletion timestamp included) without
    /// logging a write. Replaces any existing object with the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the object cannot be encoded.
    pub fn insert<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let mut inner = self.lock();
        let mut obj = obj.clone();
        obj.meta_mut().resource_version = Some(inner.next_version());
        let key = ObjectKey::of(&obj);
        inner
            .objects
            .insert((K::kind_name(), key), to_value(&obj)?);
        Ok(obj)
    }

    /// Whether an object of kind `K` exists under `key`.
    #[must_use]
    pub fn contains<K: StoreObject>(&self, key: &ObjectKey) -> bool {
        self.lock()
            .objects
            .contains_key(&(K::kind_name(), key.clone()))
    }

    /// Every write since creation or the last [`MemoryStore::clear_writes`].
    #[must_use]
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get<K: StoreObject>(&self, key: &ObjectKey) -> Result<K, StoreError> {
        let value = self
            .lock()
            .objects
            .get(&(K::kind_name(), key.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: K::kind_name(),
                name: key.to_string(),
            })?;
        from_value(value)
    }

    async fn create<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let key = ObjectKey::of(obj);
        let mut inner = self.lock();
        let id = (kind.clone(), key.clone());
        if inner.objects.contains_key(&id) {
            return Err(StoreError::AlreadyExists {
                kind,
                name: key.to_string(),
            });
        }

        let mut created = obj.clone();
        created.meta_mut().resource_version = Some(inner.next_version());
        created.meta_mut().creation_timestamp = Some(Time(k8s_openapi::jiff::Timestamp::now()));
        inner.objects.insert(id, to_value(&created)?);
        inner.record(WriteVerb::Create, &kind, &key);
        Ok(created)
    }

    async fn update<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let key = ObjectKey::of(obj);
        let mut inner = self.lock();
        let id = (kind.clone(), key.clone());
        let stored = inner
            .objects
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: kind.clone(),
                name: key.to_string(),
            })?;
        conflict_check(obj, &stored, &key)?;

        let mut updated = obj.clone();
        updated.meta_mut().resource_version = Some(inner.next_version());
        let deleting = updated.meta().deletion_timestamp.is_some();
        let finalized = updated.finalizers().is_empty();

        // The main resource path never changes status.
        let mut value = to_value(&updated)?;
        immutable_check(&kind, &stored, &value, &key)?;
        if let Some(map) = value.as_object_mut() {
            match stored.get("status") {
                Some(status) => map.insert("status".to_string(), status.clone()),
                None => map.remove("status"),
            };
        }

        if deleting && finalized {
            inner.objects.remove(&id);
        } else {
            inner.objects.insert(id, value.clone());
        }
        inner.record(WriteVerb::Update, &kind, &key);
        from_value(value)
    }

    async fn update_status<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let key = ObjectKey::of(obj);
        let mut inner = self.lock();
        let id = (kind.clone(), key.clone());
        let mut stored = inner
            .objects
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: kind.clone(),
                name: key.to_string(),
            })?;
        conflict_check(obj, &stored, &key)?;

        let incoming = to_value(obj)?;
        let version = inner.next_version();
        if let Some(map) = stored.as_object_mut() {
            match incoming.get("status") {
                Some(status) => map.insert("status".to_string(), status.clone()),
                None => map.remove("status"),
            };
        }
        if let Some(meta) = stored.get_mut("metadata").and_then(Value::as_object_mut) {
            meta.insert("resourceVersion".to_string(), Value::String(version));
        }

        inner.objects.insert(id, stored.clone());
        inner.record(WriteVerb::UpdateStatus, &kind, &key);
        from_value(stored)
    }

    async fn delete<K: StoreObject>(
        &self,
        obj: &K,
        _grace_period_seconds: Option<u32>,
    ) -> Result<(), StoreError> {
        let kind = K::kind_name();
        let key = ObjectKey::of(obj);
        let mut inner = self.lock();
        let id = (kind.clone(), key.clone());
        let stored = inner
            .objects
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: kind.clone(),
                name: key.to_string(),
            })?;

        let mut current: K = from_value(stored)?;
        if current.finalizers().is_empty() {
            inner.objects.remove(&id);
        } else if current.meta().deletion_timestamp.is_none() {
            current.meta_mut().deletion_timestamp = Some(Time(k8s_openapi::jiff::Timestamp::now()));
            current.meta_mut().resource_version = Some(inner.next_version());
            inner.objects.insert(id, to_value(&current)?);
        }
        inner.record(WriteVerb::Delete, &kind, &key);
        Ok(())
    }

    async fn list<K: StoreObject>(
        &self,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<K>, StoreError> {
        let kind = K::kind_name();
        let selector = LabelSelector::parse(label_selector.unwrap_or_default()).map_err(|reason| {
            StoreError::Api {
                kind: kind.clone(),
                name: namespace.unwrap_or("*").to_string(),
                reason,
            }
        })?;

        let candidates: Vec<Value> = self
            .lock()
            .objects
            .iter()
            .filter(|((k, key), _)| {
                *k == kind && namespace.is_none_or(|ns| key.namespace.as_deref() == Some(ns))
            })
            .map(|(_, v)| v.clone())
            .collect();

        let mut items = Vec::with_capacity(candidates.len());
        for value in candidates {
            let obj: K = from_value(value)?;
            if selector.matches(obj.labels()) {
                items.push(obj);
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
