//! Per-session latency tracking and metrics aggregation.
//!
//! [`Telemetry`] owns the two session stores and the metrics collector and
//! exposes the event surface the HTTP handlers call: prediction completed,
//! judgment submitted, export. One instance lives in the application state
//! for the process lifetime.

pub mod metrics;
pub mod store;

pub use metrics::{Metrics, MetricsSnapshot, LATENCY_BUCKETS};
pub use store::{Clock, ExpiringStore, SystemClock};

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::SessionConfig;
use crate::error::GatewayError;

/// Telemetry subsystem: session timers, validation durations, metrics.
///
/// A session walks an implicit two-state machine: a completed prediction
/// starts its timer (Timing), a judgment consumes the timer and returns it
/// to Idle. Judgments for Idle sessions are rejected and mutate nothing.
pub struct Telemetry {
    metrics: Metrics,
    /// Session id -> instant the judged prediction completed.
    timers: Mutex<ExpiringStore<Instant>>,
    /// Session id -> last measured validation latency, seconds.
    durations: Mutex<ExpiringStore<f64>>,
    clock: Arc<dyn Clock>,
}

impl Telemetry {
    pub fn new(session: &SessionConfig) -> Self {
        Self::with_clock(session, Arc::new(SystemClock))
    }

    /// Construct with an injected clock; tests drive expiry with a manual
    /// one instead of waiting out the TTL.
    pub fn with_clock(session: &SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::from_secs(session.ttl_seconds);
        Telemetry {
            metrics: Metrics::new(),
            timers: Mutex::new(ExpiringStore::new(ttl, session.capacity, clock.clone())),
            durations: Mutex::new(ExpiringStore::new(ttl, session.capacity, clock.clone())),
            clock,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// A prediction round trip finished: bump the request counter, set the
    /// latency gauge, and (re)start the session timer when the caller has
    /// a session. Callers without one still count toward the aggregates.
    pub fn on_prediction_complete(&self, session: Option<&str>, latency_seconds: f64) {
        self.metrics.record_request();
        self.metrics.record_prediction_latency(latency_seconds);

        if let Some(session_id) = session {
            let mut timers = self.timers.lock().expect("timer store mutex poisoned");
            timers.put(session_id, self.clock.now());
            debug!(session_id, latency_seconds, "started validation timer");
        }
    }

    /// A judgment arrived. Requires a live timer for the session; the
    /// timer is consumed, the elapsed validation latency feeds the
    /// histogram and counters, and the latency is kept for later
    /// "what was my last latency" queries.
    ///
    /// Returns the elapsed seconds, or `MissingSession` when the session
    /// never started timing or its entry expired. Rejected judgments leave
    /// all counters and both stores untouched.
    pub fn on_judgment_submitted(
        &self,
        session: Option<&str>,
        is_correct: bool,
    ) -> Result<f64, GatewayError> {
        let session_id = session.ok_or(GatewayError::MissingSession)?;

        let started_at = {
            let mut timers = self.timers.lock().expect("timer store mutex poisoned");
            let started_at = timers.get(session_id).ok_or(GatewayError::MissingSession)?;
            timers.remove(session_id);
            started_at
        };

        let elapsed = self
            .clock
            .now()
            .saturating_duration_since(started_at)
            .as_secs_f64();
        self.metrics.record_judgment(is_correct, Some(elapsed));

        let mut durations = self.durations.lock().expect("duration store mutex poisoned");
        durations.put(session_id, elapsed);
        debug!(session_id, is_correct, elapsed, "judgment recorded");

        Ok(elapsed)
    }

    /// The calling session's most recent validation latency, if its entry
    /// is still live. Expires independently of the session timer.
    pub fn last_validation_duration(&self, session_id: &str) -> Option<f64> {
        let mut durations = self.durations.lock().expect("duration store mutex poisoned");
        durations.get(session_id)
    }

    /// Prometheus text snapshot of the aggregates, plus a per-session
    /// gauge for the caller's own last validation latency when one is
    /// known. Pure read.
    pub fn export(&self, session: Option<&str>) -> String {
        let mut out = self.metrics.render();
        if let Some(duration) = session.and_then(|id| self.last_validation_duration(id)) {
            out.push_str(
                "# HELP sentiment_gateway_session_validation_duration_seconds \
                 Most recent validation latency for the calling session.\n",
            );
            out.push_str("# TYPE sentiment_gateway_session_validation_duration_seconds gauge\n");
            out.push_str(&format!(
                "sentiment_gateway_session_validation_duration_seconds {}\n",
                duration
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::store::tests::ManualClock;
    use super::*;

    fn telemetry_with_clock(clock: Arc<ManualClock>) -> Telemetry {
        Telemetry::with_clock(&SessionConfig::default(), clock)
    }

    #[test]
    fn judgment_after_prediction_lands_in_first_bucket() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock.clone());

        telemetry.on_prediction_complete(Some("s1"), 0.4);
        clock.advance(Duration::from_millis(50));
        let elapsed = telemetry
            .on_judgment_submitted(Some("s1"), true)
            .expect("timer should be live");
        assert!(elapsed <= 0.1);

        let s = telemetry.metrics().snapshot();
        assert_eq!(s.requests_total, 1);
        assert_eq!(s.last_prediction_latency, 0.4);
        assert_eq!(s.judgments_total, 1);
        assert_eq!(s.judgments_correct_total, 1);
        assert_eq!(s.bucket_counts, [1, 0, 0, 0, 0]);
    }

    #[test]
    fn judgment_without_prior_prediction_is_rejected_and_counts_nothing() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock);

        let result = telemetry.on_judgment_submitted(Some("s2"), false);
        assert!(matches!(result, Err(GatewayError::MissingSession)));

        let s = telemetry.metrics().snapshot();
        assert_eq!(s.judgments_total, 0);
        assert_eq!(s.judgments_incorrect_total, 0);
        assert_eq!(s.observation_count(), 0);
    }

    #[test]
    fn judgment_without_session_token_is_rejected() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock);
        let result = telemetry.on_judgment_submitted(None, true);
        assert!(matches!(result, Err(GatewayError::MissingSession)));
    }

    #[test]
    fn expired_timer_rejects_the_judgment() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock.clone());

        telemetry.on_prediction_complete(Some("s1"), 0.2);
        clock.advance(Duration::from_secs(1801));

        let result = telemetry.on_judgment_submitted(Some("s1"), true);
        assert!(matches!(result, Err(GatewayError::MissingSession)));
        assert_eq!(telemetry.metrics().snapshot().judgments_total, 0);
    }

    #[test]
    fn timer_is_consumed_so_duplicates_cannot_double_count() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock.clone());

        telemetry.on_prediction_complete(Some("s1"), 0.2);
        clock.advance(Duration::from_millis(10));
        telemetry
            .on_judgment_submitted(Some("s1"), true)
            .expect("first judgment accepted");

        let result = telemetry.on_judgment_submitted(Some("s1"), true);
        assert!(matches!(result, Err(GatewayError::MissingSession)));
        assert_eq!(telemetry.metrics().snapshot().judgments_total, 1);
    }

    #[test]
    fn last_validation_duration_answers_the_own_latency_query() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock.clone());

        assert_eq!(telemetry.last_validation_duration("s1"), None);

        telemetry.on_prediction_complete(Some("s1"), 0.2);
        clock.advance(Duration::from_secs(2));
        let elapsed = telemetry.on_judgment_submitted(Some("s1"), true).unwrap();
        assert_eq!(telemetry.last_validation_duration("s1"), Some(elapsed));

        // The stored duration expires on its own clock.
        clock.advance(Duration::from_secs(1800));
        assert_eq!(telemetry.last_validation_duration("s1"), None);
    }

    #[test]
    fn export_appends_the_session_gauge_only_for_known_sessions() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock.clone());

        telemetry.on_prediction_complete(Some("s1"), 0.2);
        clock.advance(Duration::from_millis(500));
        telemetry.on_judgment_submitted(Some("s1"), true).unwrap();

        let text = telemetry.export(Some("s1"));
        assert!(text.contains("sentiment_gateway_session_validation_duration_seconds"));
        let anonymous = telemetry.export(None);
        assert!(!anonymous.contains("sentiment_gateway_session_validation_duration_seconds"));
    }

    #[test]
    fn export_is_idempotent_without_intervening_events() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock.clone());
        telemetry.on_prediction_complete(Some("s1"), 0.2);
        clock.advance(Duration::from_millis(10));
        telemetry.on_judgment_submitted(Some("s1"), false).unwrap();

        assert_eq!(telemetry.export(Some("s1")), telemetry.export(Some("s1")));
    }

    #[test]
    fn new_prediction_overwrites_the_running_timer() {
        let clock = ManualClock::new();
        let telemetry = telemetry_with_clock(clock.clone());

        telemetry.on_prediction_complete(Some("s1"), 0.2);
        clock.advance(Duration::from_secs(4));
        telemetry.on_prediction_complete(Some("s1"), 0.3);
        clock.advance(Duration::from_millis(50));

        // Elapsed is measured from the second prediction.
        let elapsed = telemetry.on_judgment_submitted(Some("s1"), true).unwrap();
        assert!(elapsed < 1.0);
        assert_eq!(telemetry.metrics().snapshot().bucket_counts[0], 1);
    }
}
