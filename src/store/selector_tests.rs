// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `selector.rs`

#[cfg(test)]
mod tests {
    use crate::store::selector::{LabelSelector, Requirement};
    use std::collections::BTreeMap;

    const MANAGED: &str = "customdomains.managed.openshift.io/managed";

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_all_clause_forms() {
        let sel = LabelSelector::parse("a, !b, c=1, d==2, e!=3").unwrap();
        assert_eq!(
            sel.requirements(),
            &[
                Requirement::Exists("a".to_string()),
                Requirement::DoesNotExist("b".to_string()),
                Requirement::Equals("c".to_string(), "1".to_string()),
                Requirement::Equals("d".to_string(), "2".to_string()),
                Requirement::NotEquals("e".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let sel = LabelSelector::parse("").unwrap();
        assert!(sel.matches(&BTreeMap::new()));
        assert!(sel.matches(&labels(&[("x", "y")])));
    }

    #[test]
    fn test_exists_matches_any_value() {
        let sel = LabelSelector::parse(MANAGED).unwrap();
        assert!(sel.matches(&labels(&[(MANAGED, "example")])));
        assert!(sel.matches(&labels(&[(MANAGED, "")])));
        assert!(!sel.matches(&labels(&[("other", "x")])));
    }

    #[test]
    fn test_not_equals_matches_missing_key() {
        let sel = LabelSelector::parse("tier!=prod").unwrap();
        assert!(sel.matches(&BTreeMap::new()));
        assert!(sel.matches(&labels(&[("tier", "dev")])));
        assert!(!sel.matches(&labels(&[("tier", "prod")])));
    }

    #[test]
    fn test_all_clauses_must_match() {
        let sel = LabelSelector::parse("app=web,!legacy").unwrap();
        assert!(sel.matches(&labels(&[("app", "web")])));
        assert!(!sel.matches(&labels(&[("app", "web"), ("legacy", "true")])));
        assert!(!sel.matches(&labels(&[("app", "db")])));
    }

    #[test]
    fn test_set_based_expressions_are_rejected() {
        assert!(LabelSelector::parse("env in (a,b)").is_err());
        assert!(LabelSelector::parse("=value").is_err());
    }
}
