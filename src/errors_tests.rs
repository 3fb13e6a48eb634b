// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

#[cfg(test)]
mod tests {
    use crate::errors::{ReconcileError, StoreError};

    fn conflict() -> StoreError {
        StoreError::Conflict {
            kind: "CustomDomain".to_string(),
            name: "example".to_string(),
        }
    }

    #[test]
    fn test_terminal_errors() {
        let invalid_name = ReconcileError::InvalidName {
            name: "apps".to_string(),
            reason: "reserved".to_string(),
        };
        let invalid_scope = ReconcileError::InvalidScope {
            name: "example".to_string(),
            existing: "External".to_string(),
            desired: "Internal".to_string(),
        };
        let not_owned = ReconcileError::NotOwned {
            kind: "Secret".to_string(),
            name: "openshift-ingress/example".to_string(),
        };

        assert!(invalid_name.is_terminal());
        assert!(invalid_scope.is_terminal());
        assert!(not_owned.is_terminal());
    }

    #[test]
    fn test_retryable_errors() {
        let missing = ReconcileError::SecretNotFound {
            namespace: "my-project".to_string(),
            name: "example-tls".to_string(),
        };
        assert!(!missing.is_terminal());
        assert!(!ReconcileError::Store(conflict()).is_terminal());
        assert!(!ReconcileError::MissingBaseDomain {
            name: "cluster".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_conflict_detection() {
        let err: ReconcileError = conflict().into();
        assert!(err.is_conflict());
        assert_eq!(err.error_type(), "conflict");

        let not_found: ReconcileError = StoreError::NotFound {
            kind: "Secret".to_string(),
            name: "x".to_string(),
        }
        .into();
        assert!(!not_found.is_conflict());
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: ReconcileError = conflict().into();
        assert_eq!(err.to_string(), conflict().to_string());
    }

    #[test]
    fn test_scope_message_names_both_scopes() {
        let err = ReconcileError::InvalidScope {
            name: "example".to_string(),
            existing: "External".to_string(),
            desired: "Internal".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("External"));
        assert!(msg.contains("Internal"));
    }
}
