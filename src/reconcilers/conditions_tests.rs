// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `conditions.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{
        ConditionStatus, ConditionType, CustomDomainCondition, CustomDomainState,
        CustomDomainStatus,
    };
    use crate::reconcilers::conditions::{
        find_condition, set_condition_at, set_state, settle_conditions, update_always,
        update_if_reason_or_message_change, update_never,
    };

    const T0: &str = "2025-01-01T00:00:00Z";
    const T1: &str = "2025-01-01T00:01:00Z";

    #[test]
    fn test_false_is_not_appended() {
        let mut conditions = Vec::new();
        set_condition_at(
            &mut conditions,
            ConditionType::Ready,
            ConditionStatus::False,
            "not yet",
            update_always,
            T0,
        );
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_true_is_appended_with_reason_equal_to_type() {
        let mut conditions = Vec::new();
        set_condition_at(
            &mut conditions,
            ConditionType::Creating,
            ConditionStatus::True,
            "Creating",
            update_never,
            T0,
        );
        assert_eq!(
            conditions,
            vec![CustomDomainCondition {
                r#type: ConditionType::Creating,
                status: ConditionStatus::True,
                last_probe_time: Some(T0.to_string()),
                last_transition_time: Some(T0.to_string()),
                reason: Some("Creating".to_string()),
                message: Some("Creating".to_string()),
            }]
        );
    }

    #[test]
    fn test_never_policy_ignores_message_change() {
        let mut conditions = Vec::new();
        set_condition_at(&mut conditions, ConditionType::Ready, ConditionStatus::True, "a", update_never, T0);
        set_condition_at(&mut conditions, ConditionType::Ready, ConditionStatus::True, "b", update_never, T1);

        let ready = find_condition(&conditions, ConditionType::Ready).unwrap();
        assert_eq!(ready.message.as_deref(), Some("a"));
        assert_eq!(ready.last_probe_time.as_deref(), Some(T0));
    }

    #[test]
    fn test_message_policy_refreshes_probe_but_not_transition() {
        let mut conditions = Vec::new();
        set_condition_at(&mut conditions, ConditionType::Ready, ConditionStatus::True, "a", update_never, T0);
        set_condition_at(
            &mut conditions,
            ConditionType::Ready,
            ConditionStatus::True,
            "b",
            update_if_reason_or_message_change,
            T1,
        );

        let ready = find_condition(&conditions, ConditionType::Ready).unwrap();
        assert_eq!(ready.message.as_deref(), Some("b"));
        assert_eq!(ready.last_probe_time.as_deref(), Some(T1));
        assert_eq!(ready.last_transition_time.as_deref(), Some(T0));
    }

    #[test]
    fn test_status_change_refreshes_transition_time() {
        let mut conditions = Vec::new();
        set_condition_at(&mut conditions, ConditionType::Ready, ConditionStatus::True, "a", update_never, T0);
        set_condition_at(&mut conditions, ConditionType::Ready, ConditionStatus::False, "a", update_never, T1);

        let ready = find_condition(&conditions, ConditionType::Ready).unwrap();
        assert_eq!(ready.status, ConditionStatus::False);
        assert_eq!(ready.last_transition_time.as_deref(), Some(T1));
    }

    #[test]
    fn test_set_state_keeps_single_active_condition() {
        let mut status = CustomDomainStatus::default();
        set_state(&mut status, ConditionType::Creating, CustomDomainState::NotReady, "Creating");
        set_state(&mut status, ConditionType::SecretNotFound, CustomDomainState::NotReady, "missing");
        set_state(&mut status, ConditionType::Ready, CustomDomainState::Ready, "Ready");

        let active: Vec<ConditionType> = status
            .conditions
            .iter()
            .filter(|c| c.status == ConditionStatus::True)
            .map(|c| c.r#type)
            .collect();
        assert_eq!(active, vec![ConditionType::Ready]);
        assert_eq!(status.conditions.len(), 3);
        assert_eq!(status.state, Some(CustomDomainState::Ready));

        let missing = find_condition(&status.conditions, ConditionType::SecretNotFound).unwrap();
        assert_eq!(missing.message.as_deref(), Some("missing"));
    }

    #[test]
    fn test_set_state_is_idempotent() {
        let mut status = CustomDomainStatus::default();
        set_state(&mut status, ConditionType::Ready, CustomDomainState::Ready, "Ready");
        let first = status.clone();
        set_state(&mut status, ConditionType::Ready, CustomDomainState::Ready, "Ready");
        assert_eq!(status, first);
    }

    #[test]
    fn test_settle_restores_timestamps_of_unchanged_entries() {
        let original = vec![
            CustomDomainCondition {
                r#type: ConditionType::Creating,
                status: ConditionStatus::False,
                last_probe_time: Some(T0.to_string()),
                last_transition_time: Some(T0.to_string()),
                reason: Some("Creating".to_string()),
                message: Some("Creating".to_string()),
            },
            CustomDomainCondition {
                r#type: ConditionType::SecretNotFound,
                status: ConditionStatus::True,
                last_probe_time: Some(T0.to_string()),
                last_transition_time: Some(T0.to_string()),
                reason: Some("SecretNotFound".to_string()),
                message: Some("missing".to_string()),
            },
        ];

        let mut status = CustomDomainStatus {
            conditions: original.clone(),
            ..CustomDomainStatus::default()
        };
        set_state(&mut status, ConditionType::Creating, CustomDomainState::NotReady, "Creating");
        set_state(&mut status, ConditionType::SecretNotFound, CustomDomainState::NotReady, "missing");
        settle_conditions(&original, &mut status.conditions);

        assert_eq!(status.conditions, original);
    }
}
