//! Metrics and observability utilities
//!
//! Counters and histograms for analysis runs and report writes, following
//! the `journalscope_*` naming convention. Without an installed recorder the
//! macros are no-ops.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all JournalScope metrics
pub const METRICS_PREFIX: &str = "journalscope";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_analysis_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Total analysis operations by kind and outcome"
    );

    describe_histogram!(
        format!("{}_analysis_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Analysis operation latency in seconds"
    );

    describe_counter!(
        format!("{}_articles_scanned_total", METRICS_PREFIX),
        Unit::Count,
        "Articles streamed from the catalog during analysis"
    );

    describe_counter!(
        format!("{}_reports_total", METRICS_PREFIX),
        Unit::Count,
        "Report store operations by action"
    );

    tracing::info!("Metrics registered");
}

/// Helper to time one analysis operation
pub struct AnalysisTimer {
    start: Instant,
    kind: &'static str,
}

impl AnalysisTimer {
    /// Start tracking an operation of the given kind
    pub fn start(kind: &'static str) -> Self {
        Self {
            start: Instant::now(),
            kind,
        }
    }

    /// Record completion with the outcome label (`ok`, `not_found`, ...)
    pub fn finish(self, outcome: &str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_analysis_runs_total", METRICS_PREFIX),
            "kind" => self.kind,
            "outcome" => outcome.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_analysis_duration_seconds", METRICS_PREFIX),
            "kind" => self.kind
        )
        .record(duration);
    }
}

/// Record articles streamed for one journal
pub fn record_articles_scanned(count: u64) {
    counter!(format!("{}_articles_scanned_total", METRICS_PREFIX)).increment(count);
}

/// Record a report store action (`save`, `delete`, ...)
pub fn record_report(action: &'static str) {
    counter!(
        format!("{}_reports_total", METRICS_PREFIX),
        "action" => action
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_without_recorder() {
        let timer = AnalysisTimer::start("journal");
        timer.finish("ok");
        record_articles_scanned(3);
        record_report("save");
    }
}
