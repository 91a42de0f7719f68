//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Media operations (runs, results, durations)
//! - Archive extraction

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Media Operation Metrics
// =============================================================================

/// Media operations total by operation and result.
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaforge_operations_total", "Total media operations run"),
        &["operation", "result"], // result: "success" or an error kind
    )
    .unwrap()
});

/// Media operation duration in seconds.
pub static OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediaforge_operation_duration_seconds",
            "Duration of media operations",
        )
        .buckets(vec![
            0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0, 3600.0,
        ]),
        &["operation"],
    )
    .unwrap()
});

/// Compression status edits sent to notifiers.
pub static STATUS_EDITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediaforge_status_edits_total",
            "Status updates sent during compression",
        ),
        &["result"], // "ok", "failed"
    )
    .unwrap()
});

// =============================================================================
// Archive Metrics
// =============================================================================

/// Archive extractions total by result.
pub static ARCHIVE_EXTRACTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediaforge_archive_extractions_total",
            "Total archive extractions",
        ),
        &["result"], // "success", "failed", "unsupported"
    )
    .unwrap()
});

/// Archive entries written to disk.
pub static ARCHIVE_ENTRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mediaforge_archive_entries_total",
        "Total archive entries extracted",
    )
    .unwrap()
});

/// Records the outcome of a media operation.
pub fn record_operation(operation: &str, result: &str, elapsed_secs: f64) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(elapsed_secs);
}

/// Returns all core metrics for registration with a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Operations
        Box::new(OPERATIONS_TOTAL.clone()),
        Box::new(OPERATION_DURATION.clone()),
        Box::new(STATUS_EDITS.clone()),
        // Archives
        Box::new(ARCHIVE_EXTRACTIONS.clone()),
        Box::new(ARCHIVE_ENTRIES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation_increments_counter() {
        let before = OPERATIONS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        record_operation("test_op", "success", 0.25);
        let after = OPERATIONS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_all_metrics_registers_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        // Histograms and labelled counters only appear once observed.
        OPERATIONS_TOTAL.with_label_values(&["probe", "success"]).inc();
        assert!(!registry.gather().is_empty());
    }
}
