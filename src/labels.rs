// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label, annotation and finalizer constants shared by the reconcilers.

use std::collections::BTreeMap;

// ============================================================================
// Ownership
// ============================================================================

/// Ownership label carried by every object this operator creates or watches.
///
/// The value is the name of the owning `CustomDomain`, which is what the
/// secret watch maps events back to.
pub const MANAGED_LABEL: &str = "customdomains.managed.openshift.io/managed";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `CustomDomain` resources
pub const FINALIZER_CUSTOM_DOMAIN: &str = "finalizer.customdomain.managed.openshift.io";

// ============================================================================
// Helpers
// ============================================================================

/// Labels stamped on dependent objects owned by the named `CustomDomain`.
#[must_use]
pub fn owned_labels(owner: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(MANAGED_LABEL.to_string(), owner.to_string())])
}

/// Whether the label set carries the ownership label (any value).
#[must_use]
pub fn is_owned(labels: Option<&BTreeMap<String, String>>) -> bool {
    labels.is_some_and(|l| l.contains_key(MANAGED_LABEL))
}
