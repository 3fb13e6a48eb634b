// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wiring between `kube::runtime::Controller` and the reconciliation engine.
//!
//! The controller watches `CustomDomain` objects cluster-wide, plus every
//! Secret carrying the ownership label. A labelled secret maps back to the
//! `CustomDomain` named by the label value, so certificate rotation and edits
//! to dependent secrets trigger a pass.

use crate::constants::{
    CONFLICT_REQUEUE_DURATION_SECS, ERROR_REQUEUE_DURATION_SECS, KIND_CUSTOM_DOMAIN,
    READY_REQUEUE_DURATION_SECS,
};
use crate::crd::CustomDomain;
use crate::errors::ReconcileError;
use crate::labels::MANAGED_LABEL;
use crate::metrics;
use crate::reconcilers::{CustomDomainReconciler, ReconcileOutcome};
use crate::store::{KubeStore, ResourceStore};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{watcher, Controller};
use kube::{Api, ResourceExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconcile call.
pub struct Context<S> {
    pub reconciler: CustomDomainReconciler<S>,
}

/// Map a labelled Secret to the `CustomDomain` that owns or consumes it.
#[must_use]
pub fn custom_domain_for_secret(secret: Secret) -> Option<ObjectRef<CustomDomain>> {
    secret
        .labels()
        .get(MANAGED_LABEL)
        .filter(|owner| !owner.is_empty())
        .map(|owner| ObjectRef::new(owner))
}

/// Translate an engine outcome into a controller action.
#[must_use]
pub fn action_for_outcome(outcome: ReconcileOutcome) -> Action {
    match outcome {
        ReconcileOutcome::Done => Action::requeue(Duration::from_secs(READY_REQUEUE_DURATION_SECS)),
        ReconcileOutcome::RequeueAfter(after) => Action::requeue(after),
    }
}

/// Back-off policy for a failed pass.
///
/// Terminal errors wait for the next change to the resource; conflicts retry
/// quickly; everything else retries on the regular error interval.
#[must_use]
pub fn action_for_error(err: &ReconcileError) -> Action {
    if err.is_terminal() {
        Action::await_change()
    } else if err.is_conflict() {
        Action::requeue(Duration::from_secs(CONFLICT_REQUEUE_DURATION_SECS))
    } else {
        Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
    }
}

/// Reconcile wrapper for `CustomDomain`
async fn reconcile_custom_domain<S: ResourceStore + 'static>(
    domain: Arc<CustomDomain>,
    ctx: Arc<Context<S>>,
) -> Result<Action, ReconcileError> {
    let name = domain.name_any();
    debug!(name = %name, "Reconcile wrapper called for CustomDomain");

    let start = Instant::now();
    match ctx.reconciler.reconcile(&name).await {
        Ok(outcome) => {
            match outcome {
                ReconcileOutcome::Done => {
                    metrics::record_reconciliation_success(KIND_CUSTOM_DOMAIN, start.elapsed());
                    info!("Successfully reconciled CustomDomain: {}", name);
                }
                ReconcileOutcome::RequeueAfter(after) => {
                    metrics::record_reconciliation_requeue(KIND_CUSTOM_DOMAIN, "dns_record_pending");
                    debug!(name = %name, after = ?after, "CustomDomain not ready, requeueing");
                }
            }
            Ok(action_for_outcome(outcome))
        }
        Err(e) => {
            metrics::record_reconciliation_error(KIND_CUSTOM_DOMAIN, start.elapsed());
            metrics::record_error(KIND_CUSTOM_DOMAIN, e.error_type());
            if e.is_conflict() {
                metrics::record_reconciliation_requeue(KIND_CUSTOM_DOMAIN, "conflict");
            }
            Err(e)
        }
    }
}

/// Error policy for the `CustomDomain` controller
fn error_policy<S>(domain: Arc<CustomDomain>, err: &ReconcileError, _ctx: Arc<Context<S>>) -> Action {
    if err.is_terminal() {
        warn!(name = %domain.name_any(), "Terminal error, waiting for a change: {}", err);
    } else {
        error!(name = %domain.name_any(), "Failed to reconcile CustomDomain: {}", err);
    }
    action_for_error(err)
}

/// Run the `CustomDomain` controller until the watch streams end.
///
/// `ready` is raised once the controller has been wired up.
///
/// # Errors
///
/// Currently infallible once started; the `Result` keeps the signature in
/// line with the other long-running tasks in `main`.
pub async fn run(reconciler: CustomDomainReconciler<KubeStore>, ready: Arc<AtomicBool>) -> anyhow::Result<()> {
    info!("Starting CustomDomain controller");

    let client = reconciler.store().client().clone();
    let domains = Api::<CustomDomain>::all(client.clone());
    let secrets = Api::<Secret>::all(client);

    let controller = Controller::new(domains, watcher::Config::default())
        .watches(
            secrets,
            watcher::Config::default().labels(MANAGED_LABEL),
            custom_domain_for_secret,
        )
        .shutdown_on_signal();

    ready.store(true, Ordering::Relaxed);

    controller
        .run(
            reconcile_custom_domain,
            error_policy,
            Arc::new(Context { reconciler }),
        )
        .for_each(|result| {
            if let Err(e) = result {
                debug!("Controller event: {:?}", e);
            }
            futures::future::ready(())
        })
        .await;

    ready.store(false, Ordering::Relaxed);
    Ok(())
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
