//! Metrics instrumentation
//!
//! Thin wrappers over the `metrics` facade so call sites stay terse and
//! metric names/labels live in one place. Recording is a no-op unless the
//! embedding application installs a recorder.

/// Metric label constants
pub mod labels {
    pub const OUTCOME_OK: &str = "ok";
    pub const OUTCOME_ERROR: &str = "error";
    pub const OUTCOME_TIMEOUT: &str = "timeout";
    pub const OUTCOME_BROKEN_PIPE: &str = "broken_pipe";
}

/// Counters
pub mod counters {
    /// A write call completed with the given outcome.
    pub fn write_completed(outcome: &'static str) {
        metrics::counter!("logwire_writes_total", "outcome" => outcome).increment(1);
    }

    /// A broken pipe triggered a redial attempt.
    pub fn redial_attempted() {
        metrics::counter!("logwire_redials_total").increment(1);
    }

    /// A redial attempt finished with the given outcome.
    pub fn redial_completed(outcome: &'static str) {
        metrics::counter!("logwire_redials_completed_total", "outcome" => outcome).increment(1);
    }
}

/// Histograms
pub mod histograms {
    /// Wall-clock duration of a successful write, in milliseconds.
    pub fn write_duration(millis: u64) {
        metrics::histogram!("logwire_write_duration_ms").record(millis as f64);
    }
}
