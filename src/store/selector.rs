// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Equality-based label selector parsing and matching.
//!
//! Supports the subset of the Kubernetes selector grammar the operator uses:
//! `key`, `!key`, `key=value`, `key==value` and `key!=value`, joined by commas.
//! Set-based expressions (`in`, `notin`) are rejected.

use std::collections::BTreeMap;

/// One clause of a label selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    Exists(String),
    DoesNotExist(String),
    Equals(String, String),
    NotEquals(String, String),
}

impl Requirement {
    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Exists(k) => labels.contains_key(k),
            Self::DoesNotExist(k) => !labels.contains_key(k),
            Self::Equals(k, v) => labels.get(k).is_some_and(|l| l == v),
            Self::NotEquals(k, v) => labels.get(k).is_none_or(|l| l != v),
        }
    }
}

/// A parsed label selector. An empty selector matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// Parse a selector string.
    ///
    /// # Errors
    ///
    /// Returns a description of the first malformed clause.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut requirements = Vec::new();
        for raw in input.split(',') {
            let clause = raw.trim();
            if clause.is_empty() {
                continue;
            }
            requirements.push(parse_clause(clause)?);
        }
        Ok(Self { requirements })
    }

    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Whether `labels` satisfies every clause.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

fn parse_clause(clause: &str) -> Result<Requirement, String> {
    if let Some((key, value)) = clause.split_once("!=") {
        return Ok(Requirement::NotEquals(
            valid_key(key, clause)?,
            value.trim().to_string(),
        ));
    }
    if let Some((key, value)) = clause.split_once("==").or_else(|| clause.split_once('=')) {
        return Ok(Requirement::Equals(
            valid_key(key, clause)?,
            value.trim().to_string(),
        ));
    }
    if let Some(key) = clause.strip_prefix('!') {
        return Ok(Requirement::DoesNotExist(valid_key(key, clause)?));
    }
    if clause.contains(' ') || clause.contains('(') {
        return Err(format!("unsupported selector expression '{clause}'"));
    }
    Ok(Requirement::Exists(valid_key(clause, clause)?))
}

fn valid_key(key: &str, clause: &str) -> Result<String, String> {
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(format!("invalid label key in selector clause '{clause}'"));
    }
    Ok(key.to_string())
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
