// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Custom Domains Operator
//!
//! A Kubernetes operator for OpenShift clusters that lets administrators
//! publish application routes under their own DNS domain.
//!
//! ## Overview
//!
//! A cluster-scoped `CustomDomain` resource names a TLS certificate secret.
//! For each one the operator:
//!
//! - copies the certificate into the ingress namespace
//! - creates a dedicated `IngressController` serving `<name>.<cluster base domain>`
//! - waits for the ingress operator to publish the wildcard DNS record
//! - reports a stable, randomly named endpoint users can `CNAME` their domain to
//!
//! Deleting the `CustomDomain` removes everything the operator created.
//!
//! ## Modules
//!
//! - [`crd`] - the `CustomDomain` custom resource
//! - [`openshift`] - typed views of the OpenShift APIs the operator uses
//! - [`reconcilers`] - the reconciliation engine
//! - [`store`] - resource store abstraction over the Kubernetes API
//! - [`controller`] - `kube::runtime` wiring, watches and back-off
//! - [`server`] - metrics and probe endpoints
//! - [`config`] - command line and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use custom_domains_operator::crd::{CertificateReference, CustomDomain, CustomDomainSpec};
//!
//! let domain = CustomDomain::new(
//!     "acme",
//!     CustomDomainSpec {
//!         domain: "apps.acme.io".to_string(),
//!         certificate: CertificateReference {
//!             name: "acme-tls".to_string(),
//!             namespace: "acme-certs".to_string(),
//!         },
//!         scope: None,
//!         namespace_selector: None,
//!         route_selector: None,
//!         load_balancer_type: None,
//!     },
//! );
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod labels;
pub mod metrics;
pub mod openshift;
pub mod reconcilers;
pub mod server;
pub mod store;
