// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `CustomDomain` resources.
//!
//! # Reconciliation Architecture
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - `CustomDomain` changes and changes to labelled certificate secrets
//! 2. **Reconcile** - walk the [`Step`] list until one stops the pass
//! 3. **Status** - write the accumulated status back once, only when it changed
//!
//! # Modules
//!
//! - [`customdomain`] - the reconciliation engine
//! - [`dependents`] - builders for the Secret and `IngressController` a domain owns
//! - [`conditions`] - condition list bookkeeping
//! - [`finalizers`] - finalizer handling and teardown of dependents
//!
//! # Example: Reconciling a domain
//!
//! ```rust,no_run
//! use custom_domains_operator::config::OperatorConfig;
//! use custom_domains_operator::reconcilers::CustomDomainReconciler;
//! use custom_domains_operator::store::KubeStore;
//! use std::sync::Arc;
//!
//! async fn reconcile(store: KubeStore) -> anyhow::Result<()> {
//!     let reconciler = CustomDomainReconciler::new(Arc::new(store), Arc::new(OperatorConfig::default()));
//!     let outcome = reconciler.reconcile("example").await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod conditions;
pub mod customdomain;
pub mod dependents;
pub mod finalizers;

pub use customdomain::{CustomDomainReconciler, ReconcileOutcome, Step};
