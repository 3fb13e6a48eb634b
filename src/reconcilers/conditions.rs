// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Condition ledger for `CustomDomain` status.
//!
//! The ledger is an ordered list of [`CustomDomainCondition`] entries, at most
//! one per [`ConditionType`]. Entries are appended the first time a type turns
//! True and are never removed; afterwards they are flipped between True and
//! False. The reason of an entry always equals its type name.
//!
//! # Example
//!
//! ```rust
//! use custom_domains_operator::crd::{ConditionStatus, ConditionType, CustomDomainState, CustomDomainStatus};
//! use custom_domains_operator::reconcilers::conditions::{find_condition, set_state};
//!
//! let mut status = CustomDomainStatus::default();
//! set_state(&mut status, ConditionType::Creating, CustomDomainState::NotReady, "Creating");
//! set_state(&mut status, ConditionType::Ready, CustomDomainState::Ready, "Ready");
//!
//! let creating = find_condition(&status.conditions, ConditionType::Creating).unwrap();
//! assert_eq!(creating.status, ConditionStatus::False);
//! ```

use crate::crd::{
    ConditionStatus, ConditionType, CustomDomainCondition, CustomDomainState, CustomDomainStatus,
};
use chrono::{SecondsFormat, Utc};

/// Decides whether an entry whose status is unchanged should still be rewritten.
///
/// Arguments are `(old_reason, old_message, new_reason, new_message)`.
pub type UpdatePolicy = fn(&str, &str, &str, &str) -> bool;

/// Always rewrite the entry.
#[must_use]
pub fn update_always(_: &str, _: &str, _: &str, _: &str) -> bool {
    true
}

/// Rewrite the entry only when its status changes.
#[must_use]
pub fn update_never(_: &str, _: &str, _: &str, _: &str) -> bool {
    false
}

/// Rewrite the entry when its reason or message changes.
#[must_use]
pub fn update_if_reason_or_message_change(
    old_reason: &str,
    old_message: &str,
    new_reason: &str,
    new_message: &str,
) -> bool {
    old_reason != new_reason || old_message != new_message
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Find the entry of `condition_type`, if any.
#[must_use]
pub fn find_condition(
    conditions: &[CustomDomainCondition],
    condition_type: ConditionType,
) -> Option<&CustomDomainCondition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Upsert an entry using the current time.
pub fn set_condition(
    conditions: &mut Vec<CustomDomainCondition>,
    condition_type: ConditionType,
    status: ConditionStatus,
    message: &str,
    policy: UpdatePolicy,
) {
    set_condition_at(conditions, condition_type, status, message, policy, &now_rfc3339());
}

/// Upsert an entry, stamping `now` on whatever changes.
///
/// - No entry of this type: appended only when `status` is True.
/// - Existing entry: rewritten when its status differs or `policy` says so.
///   A rewrite always refreshes probe time, reason and message, and refreshes
///   the transition time only when the status actually changed.
pub fn set_condition_at(
    conditions: &mut Vec<CustomDomainCondition>,
    condition_type: ConditionType,
    status: ConditionStatus,
    message: &str,
    policy: UpdatePolicy,
    now: &str,
) {
    let reason = condition_type.as_str();

    let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) else {
        if status == ConditionStatus::True {
            conditions.push(CustomDomainCondition {
                r#type: condition_type,
                status,
                last_probe_time: Some(now.to_string()),
                last_transition_time: Some(now.to_string()),
                reason: Some(reason.to_string()),
                message: Some(message.to_string()),
            });
        }
        return;
    };

    let old_reason = existing.reason.as_deref().unwrap_or_default();
    let old_message = existing.message.as_deref().unwrap_or_default();
    if existing.status == status && !policy(old_reason, old_message, reason, message) {
        return;
    }

    if existing.status != status {
        existing.last_transition_time = Some(now.to_string());
    }
    existing.status = status;
    existing.reason = Some(reason.to_string());
    existing.message = Some(message.to_string());
    existing.last_probe_time = Some(now.to_string());
}

/// Make `condition_type` the single active condition and set the overall state.
///
/// Every other entry that is currently True is turned False (keeping its
/// message), then `condition_type` is set True with `message`. All writes use
/// [`update_never`], so repeating the same call is a no-op.
pub fn set_state(
    status: &mut CustomDomainStatus,
    condition_type: ConditionType,
    state: CustomDomainState,
    message: &str,
) {
    let now = now_rfc3339();
    let active: Vec<(ConditionType, String)> = status
        .conditions
        .iter()
        .filter(|c| c.r#type != condition_type && c.status == ConditionStatus::True)
        .map(|c| (c.r#type, c.message.clone().unwrap_or_default()))
        .collect();

    for (other, other_message) in active {
        set_condition_at(
            &mut status.conditions,
            other,
            ConditionStatus::False,
            &other_message,
            update_never,
            &now,
        );
    }

    set_condition_at(
        &mut status.conditions,
        condition_type,
        ConditionStatus::True,
        message,
        update_never,
        &now,
    );
    status.state = Some(state);
}

/// Restore the timestamps of entries whose content ended up unchanged.
///
/// A pass may flip an entry and flip it back (e.g. `Creating` then
/// `SecretNotFound` on every retry). Such an entry is equal in type, status,
/// reason and message to its `original` counterpart and gets the original
/// timestamps back, so an unchanged outcome produces an unchanged status.
pub fn settle_conditions(
    original: &[CustomDomainCondition],
    current: &mut [CustomDomainCondition],
) {
    for condition in current.iter_mut() {
        let Some(before) = find_condition(original, condition.r#type) else {
            continue;
        };
        if before.status == condition.status
            && before.reason == condition.reason
            && before.message == condition.message
        {
            condition
                .last_probe_time
                .clone_from(&before.last_probe_time);
            condition
                .last_transition_time
                .clone_from(&before.last_transition_time);
        }
    }
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod conditions_tests;
