// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `CustomDomain` reconciliation logic.
//!
//! A pass walks [`Step::ORDER`] from scratch. Each step either lets the pass
//! continue, ends it (`Done` or a requeue delay) or fails it. Status changes
//! are accumulated on the side and written once when the pass ends, and only
//! if they differ from what was read, so a pass over a converged resource
//! performs no writes at all.
//!
//! ```text
//! Absent -> Deleting -> Unfinalized -> InvalidName -> Creating -> SecretNotFound
//!        -> LabelCertificate -> SyncSecret -> SyncIngressController
//!        -> AwaitingDnsRecord -> Ready
//! ```

use crate::config::OperatorConfig;
use crate::constants::{
    DNS_RECORD_SUFFIX, KIND_CUSTOM_DOMAIN, KIND_INGRESS_CONTROLLER, KIND_SECRET, MAX_NAME_LENGTH,
};
use crate::crd::{ConditionType, CustomDomain, CustomDomainState, CustomDomainStatus};
use crate::errors::{ReconcileError, StoreError};
use crate::labels::{is_owned, FINALIZER_CUSTOM_DOMAIN, MANAGED_LABEL};
use crate::metrics;
use crate::openshift::{DNSRecord, IngressController, Infrastructure, DNS};
use crate::reconcilers::conditions::{set_state, settle_conditions};
use crate::reconcilers::dependents::{
    desired_ingress_controller, desired_secret, ingress_domain, secret_differs,
};
use crate::reconcilers::finalizers::{ensure_finalizer, handle_deletion, has_finalizer};
use crate::store::{ObjectKey, ResourceStore};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of a successful pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing left to do until the resource or a watched secret changes
    Done,
    /// Run again after the given delay
    RequeueAfter(Duration),
}

/// What a step tells the pass to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Requeue(Duration),
    Done,
}

/// The named steps of a pass, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Fetch the resource; stop quietly if it no longer exists
    Absent,
    /// Tear down dependents of a resource being deleted
    Deleting,
    /// Make sure the finalizer is present
    Unfinalized,
    /// Reject reserved or malformed names
    InvalidName,
    /// Report progress on resources that are not Ready yet
    Creating,
    /// Locate the user's certificate secret
    SecretNotFound,
    /// Label the certificate secret so its changes are watched
    LabelCertificate,
    /// Create or refresh the dependent secret
    SyncSecret,
    /// Create or verify the dependent ingress controller
    SyncIngressController,
    /// Wait for the ingress operator to publish the wildcard record
    AwaitingDnsRecord,
    /// Publish endpoint and DNS record, mark Ready
    Ready,
}

impl Step {
    pub const ORDER: [Self; 11] = [
        Self::Absent,
        Self::Deleting,
        Self::Unfinalized,
        Self::InvalidName,
        Self::Creating,
        Self::SecretNotFound,
        Self::LabelCertificate,
        Self::SyncSecret,
        Self::SyncIngressController,
        Self::AwaitingDnsRecord,
        Self::Ready,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "Absent",
            Self::Deleting => "Deleting",
            Self::Unfinalized => "Unfinalized",
            Self::InvalidName => "InvalidName",
            Self::Creating => "Creating",
            Self::SecretNotFound => "SecretNotFound",
            Self::LabelCertificate => "LabelCertificate",
            Self::SyncSecret => "SyncSecret",
            Self::SyncIngressController => "SyncIngressController",
            Self::AwaitingDnsRecord => "AwaitingDnsRecord",
            Self::Ready => "Ready",
        }
    }
}

/// State carried from one step to the next within a pass.
struct Pass {
    name: String,
    domain: Option<CustomDomain>,
    original_status: CustomDomainStatus,
    status: CustomDomainStatus,
    /// Set once the finalizer is in place; from then on every exit flushes the status.
    track_status: bool,
    certificate: Option<Secret>,
    base_domain: String,
    dns_name: String,
}

impl Pass {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            domain: None,
            original_status: CustomDomainStatus::default(),
            status: CustomDomainStatus::default(),
            track_status: false,
            certificate: None,
            base_domain: String::new(),
            dns_name: String::new(),
        }
    }

    fn domain(&self) -> Result<&CustomDomain, ReconcileError> {
        self.domain.as_ref().ok_or_else(|| {
            StoreError::NotFound {
                kind: KIND_CUSTOM_DOMAIN.to_string(),
                name: self.name.clone(),
            }
            .into()
        })
    }
}

/// Check `name` against the configured pattern, length limit and denylist.
///
/// # Errors
///
/// Returns a human-readable reason when the name is rejected.
pub fn validate_name(name: &str, config: &OperatorConfig) -> Result<(), String> {
    if config.is_restricted(name) {
        return Err(format!(
            "name clashes with a restricted ingress controller name ({})",
            config.restricted_names.join(", ")
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "name is {} characters long, the limit is {MAX_NAME_LENGTH}",
            name.len()
        ));
    }
    if !config.name_pattern.is_match(name) {
        return Err(format!(
            "a DNS-1035 label must consist of lower case alphanumeric characters or '-', \
             start with an alphabetic character, and end with an alphanumeric character \
             (regex used for validation is '{}')",
            config.name_pattern.as_str()
        ));
    }
    Ok(())
}

/// Random host label of `len` lowercase ASCII letters.
#[must_use]
pub fn random_host_label(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}

/// Drives one `CustomDomain` toward its desired state.
pub struct CustomDomainReconciler<S> {
    store: Arc<S>,
    config: Arc<OperatorConfig>,
}

impl<S> Clone for CustomDomainReconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: ResourceStore> CustomDomainReconciler<S> {
    pub fn new(store: Arc<S>, config: Arc<OperatorConfig>) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    /// Run one reconciliation pass for the `CustomDomain` called `name`.
    ///
    /// # Errors
    ///
    /// Terminal errors ([`ReconcileError::is_terminal`]) mean the resource must
    /// change first; anything else may be retried. A failed status write is
    /// returned when the pass itself succeeded.
    pub async fn reconcile(&self, name: &str) -> Result<ReconcileOutcome, ReconcileError> {
        let mut pass = Pass::new(name);
        let mut result = Ok(ReconcileOutcome::Done);

        for step in Step::ORDER {
            debug!(name, step = step.as_str(), "Evaluating step");
            match self.run_step(step, &mut pass).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Done) => break,
                Ok(Flow::Requeue(after)) => {
                    result = Ok(ReconcileOutcome::RequeueAfter(after));
                    break;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        let flushed = self.flush_status(&mut pass).await;
        match (result, flushed) {
            (Err(e), Err(flush_err)) => {
                error!(name, error = %flush_err, "Failed to update status after failed pass");
                Err(e)
            }
            (Ok(_), Err(flush_err)) => Err(flush_err),
            (result, Ok(())) => result,
        }
    }

    async fn run_step(&self, step: Step, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        match step {
            Step::Absent => self.fetch(pass).await,
            Step::Deleting => self.finalize(pass).await,
            Step::Unfinalized => self.add_finalizer(pass).await,
            Step::InvalidName => Self::check_name(&self.config, pass),
            Step::Creating => Ok(Self::mark_creating(pass)),
            Step::SecretNotFound => self.locate_certificate(pass).await,
            Step::LabelCertificate => self.label_certificate(pass).await,
            Step::SyncSecret => self.sync_secret(pass).await,
            Step::SyncIngressController => self.sync_ingress_controller(pass).await,
            Step::AwaitingDnsRecord => self.await_dns_record(pass).await,
            Step::Ready => Ok(self.mark_ready(pass)),
        }
    }

    async fn fetch(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        match self
            .store
            .get::<CustomDomain>(&ObjectKey::cluster(&pass.name))
            .await
        {
            Ok(domain) => {
                let status = domain.status.clone().unwrap_or_default();
                pass.original_status = status.clone();
                pass.status = status;
                pass.domain = Some(domain);
                Ok(Flow::Continue)
            }
            Err(e) if e.is_not_found() => {
                debug!(name = %pass.name, "CustomDomain not found, ignoring since object must be deleted");
                Ok(Flow::Done)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn finalize(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        let domain = pass.domain()?;
        if domain.metadata.deletion_timestamp.is_none() {
            return Ok(Flow::Continue);
        }

        if has_finalizer(domain, FINALIZER_CUSTOM_DOMAIN) {
            info!(name = %pass.name, "CustomDomain is being deleted, running finalizer");
            handle_deletion(
                self.store.as_ref(),
                &self.config,
                domain,
                FINALIZER_CUSTOM_DOMAIN,
            )
            .await?;
        }
        Ok(Flow::Done)
    }

    async fn add_finalizer(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        let updated =
            ensure_finalizer(self.store.as_ref(), pass.domain()?, FINALIZER_CUSTOM_DOMAIN).await?;
        pass.domain = Some(updated);
        pass.track_status = true;
        Ok(Flow::Continue)
    }

    fn check_name(config: &OperatorConfig, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        let Err(reason) = validate_name(&pass.name, config) else {
            return Ok(Flow::Continue);
        };

        info!(name = %pass.name, reason = %reason, "Rejecting CustomDomain name");
        set_state(
            &mut pass.status,
            ConditionType::InvalidName,
            CustomDomainState::NotReady,
            &format!("Invalid CR name ({})", pass.name),
        );
        Err(ReconcileError::InvalidName {
            name: pass.name.clone(),
            reason,
        })
    }

    fn mark_creating(pass: &mut Pass) -> Flow {
        if pass.status.state == Some(CustomDomainState::Ready) {
            return Flow::Continue;
        }
        let domain = pass
            .domain
            .as_ref()
            .map(|d| d.spec.domain.clone())
            .unwrap_or_default();
        set_state(
            &mut pass.status,
            ConditionType::Creating,
            CustomDomainState::NotReady,
            &format!("Creating Apps Custom Domain ({domain})"),
        );
        Flow::Continue
    }

    async fn locate_certificate(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        let reference = pass.domain()?.spec.certificate.clone();
        let key = ObjectKey::namespaced(&reference.namespace, &reference.name);

        match self.store.get::<Secret>(&key).await {
            Ok(secret) => {
                pass.certificate = Some(secret);
                Ok(Flow::Continue)
            }
            Err(e) if e.is_not_found() => {
                info!(name = %pass.name, secret = %key, "Certificate secret not found");
                set_state(
                    &mut pass.status,
                    ConditionType::SecretNotFound,
                    CustomDomainState::NotReady,
                    &format!("TLS Secret ({}) Not Found", reference.name),
                );
                Err(ReconcileError::SecretNotFound {
                    namespace: reference.namespace,
                    name: reference.name,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Label the certificate secret so the secret watch maps its events back here.
    ///
    /// An existing label is never overwritten. A certificate shared by several
    /// domains keeps the first domain's name, so rotations reach the others on
    /// their periodic resync only.
    async fn label_certificate(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        let Some(certificate) = pass.certificate.as_ref() else {
            return Ok(Flow::Continue);
        };
        if let Some(owner) = certificate.labels().get(MANAGED_LABEL) {
            if *owner != pass.name {
                warn!(
                    name = %pass.name,
                    secret = %ObjectKey::of(certificate),
                    owner = %owner,
                    "Certificate secret is labelled for another CustomDomain; rotations are picked up on resync"
                );
            }
            return Ok(Flow::Continue);
        }

        info!(
            name = %pass.name,
            secret = %ObjectKey::of(certificate),
            "Adding ownership label to certificate secret"
        );
        let mut labeled = certificate.clone();
        labeled
            .labels_mut()
            .insert(MANAGED_LABEL.to_string(), pass.name.clone());
        let updated = self.store.update(&labeled).await?;
        pass.certificate = Some(updated);
        Ok(Flow::Continue)
    }

    /// Record a `Failed` condition for a dependent object we do not own.
    fn refuse_unowned(pass: &mut Pass, kind: &str, key: &ObjectKey) -> ReconcileError {
        let err = ReconcileError::NotOwned {
            kind: kind.to_string(),
            name: key.to_string(),
        };
        warn!(name = %pass.name, error = %err, "Refusing to adopt existing object");
        set_state(
            &mut pass.status,
            ConditionType::Failed,
            CustomDomainState::NotReady,
            &err.to_string(),
        );
        err
    }

    async fn sync_secret(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        let Some(source) = pass.certificate.clone() else {
            return Ok(Flow::Continue);
        };
        let key = ObjectKey::namespaced(&self.config.ingress_namespace, &pass.name);

        match self.store.get::<Secret>(&key).await {
            Ok(existing) => {
                if !is_owned(existing.metadata.labels.as_ref()) {
                    return Err(Self::refuse_unowned(pass, KIND_SECRET, &key));
                }
                if secret_differs(&existing, &source) {
                    info!(name = %pass.name, secret = %key, "Certificate changed, updating dependent secret");
                    let mut updated = existing;
                    updated.data = source.data.clone();
                    self.store.update(&updated).await?;
                    metrics::record_resource_updated(KIND_SECRET);
                } else {
                    debug!(name = %pass.name, secret = %key, "Dependent secret up to date");
                }
                Ok(Flow::Continue)
            }
            Err(e) if e.is_not_found() => {
                info!(name = %pass.name, secret = %key, "Creating dependent secret");
                self.store
                    .create(&desired_secret(&pass.name, &self.config, &source))
                    .await?;
                metrics::record_resource_created(KIND_SECRET);
                Ok(Flow::Continue)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn base_domain(&self) -> Result<String, ReconcileError> {
        let dns: DNS = self
            .store
            .get(&ObjectKey::cluster(&self.config.cluster_config_name))
            .await?;
        if dns.spec.base_domain.is_empty() {
            return Err(ReconcileError::MissingBaseDomain {
                name: self.config.cluster_config_name.clone(),
            });
        }
        Ok(dns.spec.base_domain)
    }

    async fn platform_type(&self) -> Result<Option<String>, ReconcileError> {
        let key = ObjectKey::cluster(&self.config.cluster_config_name);
        match self.store.get::<Infrastructure>(&key).await {
            Ok(infra) => {
                let platform = infra.platform_type().map(ToString::to_string);
                if platform.is_none() {
                    warn!(infrastructure = %key, "Infrastructure has no platform status, assuming non-AWS");
                }
                Ok(platform)
            }
            Err(e) if e.is_not_found() => {
                warn!(infrastructure = %key, "Infrastructure not found, assuming non-AWS");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn sync_ingress_controller(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        pass.base_domain = self.base_domain().await?;

        let domain = pass.domain()?.clone();
        let desired_scope = domain.effective_scope();
        let key = ObjectKey::namespaced(&self.config.ingress_operator_namespace, &pass.name);

        match self.store.get::<IngressController>(&key).await {
            Ok(existing) => {
                if !is_owned(existing.metadata.labels.as_ref()) {
                    return Err(Self::refuse_unowned(pass, KIND_INGRESS_CONTROLLER, &key));
                }
                match existing.load_balancer_scope() {
                    Some(scope) if scope != desired_scope.as_str() => {
                        info!(
                            name = %pass.name,
                            existing = scope,
                            desired = %desired_scope,
                            "The scope field is immutable; a new CustomDomain is required to change it"
                        );
                        set_state(
                            &mut pass.status,
                            ConditionType::InvalidScope,
                            CustomDomainState::NotReady,
                            &format!(
                                "Invalid update to ingress scope (detected change from {scope} to {desired_scope})"
                            ),
                        );
                        return Err(ReconcileError::InvalidScope {
                            name: pass.name.clone(),
                            existing: scope.to_string(),
                            desired: desired_scope.to_string(),
                        });
                    }
                    Some(scope) => pass.status.scope = scope.to_string(),
                    None => pass.status.scope = desired_scope.to_string(),
                }
                debug!(name = %pass.name, ingress = %key, "IngressController already exists");
                Ok(Flow::Continue)
            }
            Err(e) if e.is_not_found() => {
                let platform = self.platform_type().await?;
                let desired = desired_ingress_controller(
                    &domain,
                    &self.config,
                    &pass.base_domain,
                    platform.as_deref(),
                );
                info!(
                    name = %pass.name,
                    ingress = %key,
                    domain = ?desired.spec.domain,
                    scope = %desired_scope,
                    "Creating IngressController"
                );
                self.store.create(&desired).await?;
                metrics::record_resource_created(KIND_INGRESS_CONTROLLER);
                pass.status.scope = desired_scope.to_string();
                Ok(Flow::Continue)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn await_dns_record(&self, pass: &mut Pass) -> Result<Flow, ReconcileError> {
        let key = ObjectKey::namespaced(
            &self.config.ingress_operator_namespace,
            format!("{}{DNS_RECORD_SUFFIX}", pass.name),
        );
        match self.store.get::<DNSRecord>(&key).await {
            Ok(record) => {
                info!(name = %pass.name, record = %key, dns_name = %record.spec.dns_name, "DNSRecord published");
                pass.dns_name = record.spec.dns_name;
                Ok(Flow::Continue)
            }
            Err(e) if e.is_not_found() => {
                info!(
                    name = %pass.name,
                    record = %key,
                    requeue_secs = self.config.dns_record_requeue.as_secs(),
                    "Waiting for DNSRecord"
                );
                Ok(Flow::Requeue(self.config.dns_record_requeue))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn mark_ready(&self, pass: &mut Pass) -> Flow {
        pass.status.dns_record.clone_from(&pass.dns_name);
        if pass.status.endpoint.is_empty() {
            pass.status.endpoint = format!(
                "{}.{}",
                random_host_label(self.config.endpoint_host_length),
                ingress_domain(&pass.name, &pass.base_domain)
            );
            info!(name = %pass.name, endpoint = %pass.status.endpoint, "Generated endpoint");
        }

        let domain = pass
            .domain
            .as_ref()
            .map(|d| d.spec.domain.clone())
            .unwrap_or_default();
        set_state(
            &mut pass.status,
            ConditionType::Ready,
            CustomDomainState::Ready,
            &format!("Custom Apps Domain ({domain}) Is Ready"),
        );
        Flow::Done
    }

    /// Persist the accumulated status if it changed.
    async fn flush_status(&self, pass: &mut Pass) -> Result<(), ReconcileError> {
        if !pass.track_status {
            return Ok(());
        }
        let Some(domain) = pass.domain.as_mut() else {
            return Ok(());
        };

        settle_conditions(&pass.original_status.conditions, &mut pass.status.conditions);
        metrics::record_domain_ready(
            &pass.name,
            pass.status.state == Some(CustomDomainState::Ready),
        );
        if pass.status == pass.original_status {
            debug!(name = %pass.name, "Status unchanged, skipping update");
            return Ok(());
        }

        domain.status = Some(pass.status.clone());
        let updated = self.store.update_status(&*domain).await?;
        debug!(name = %pass.name, state = ?pass.status.state, "Status updated");
        pass.original_status = pass.status.clone();
        *domain = updated;
        Ok(())
    }
}

#[cfg(test)]
#[path = "customdomain_tests.rs"]
mod customdomain_tests;
