// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `metrics.rs`

#[cfg(test)]
mod tests {
    use crate::metrics::{
        forget_domain, gather_metrics, record_domain_ready, record_error,
        record_reconciliation_requeue, record_reconciliation_success, record_resource_created,
        DOMAIN_READY, ERRORS_TOTAL, RECONCILIATION_TOTAL, REQUEUE_TOTAL, RESOURCES_CREATED_TOTAL,
    };
    use std::time::Duration;

    #[test]
    fn test_record_reconciliation_success() {
        let resource_type = "MetricsTestSuccess";
        record_reconciliation_success(resource_type, Duration::from_millis(500));

        let counter = RECONCILIATION_TOTAL.with_label_values(&[resource_type, "success"]);
        assert!(counter.get() >= 1.0);
    }

    #[test]
    fn test_record_requeue_counts_reason() {
        let resource_type = "MetricsTestRequeue";
        record_reconciliation_requeue(resource_type, "dns_record_pending");

        assert!(
            REQUEUE_TOTAL
                .with_label_values(&[resource_type, "dns_record_pending"])
                .get()
                >= 1.0
        );
        assert!(
            RECONCILIATION_TOTAL
                .with_label_values(&[resource_type, "requeue"])
                .get()
                >= 1.0
        );
    }

    #[test]
    fn test_record_resource_and_error() {
        record_resource_created("MetricsTestSecret");
        record_error("MetricsTestSecret", "conflict");

        assert!(
            RESOURCES_CREATED_TOTAL
                .with_label_values(&["MetricsTestSecret"])
                .get()
                >= 1.0
        );
        assert!(
            ERRORS_TOTAL
                .with_label_values(&["MetricsTestSecret", "conflict"])
                .get()
                >= 1.0
        );
    }

    #[test]
    fn test_domain_ready_gauge() {
        record_domain_ready("metrics-test-domain", true);
        assert!((DOMAIN_READY.with_label_values(&["metrics-test-domain"]).get() - 1.0).abs() < f64::EPSILON);

        record_domain_ready("metrics-test-domain", false);
        assert!(DOMAIN_READY.with_label_values(&["metrics-test-domain"]).get().abs() < f64::EPSILON);

        forget_domain("metrics-test-domain");
    }

    #[test]
    fn test_gather_metrics_uses_prefix() {
        record_reconciliation_success("MetricsTestGather", Duration::from_millis(1));
        let output = gather_metrics().unwrap();
        assert!(output.contains("customdomains_managed_openshift_io_reconciliations_total"));
    }
}
