//! Metrics aggregation and Prometheus text exposition.
//!
//! One process-wide [`Metrics`] handle lives in the application state and is
//! injected into request handlers; there are no ambient globals. Every
//! recording method is a single critical section, so an export never sees a
//! half-applied judgment.

use std::sync::{Arc, Mutex};

/// Ascending finite bucket boundaries for the validation latency
/// histogram, in seconds. Values beyond the last boundary land in the
/// implicit `+Inf` bucket only.
pub const LATENCY_BUCKETS: [f64; 5] = [0.1, 1.0, 3.0, 5.0, 10.0];

/// A consistent copy of the aggregator state, taken under the lock.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub judgments_total: u64,
    pub judgments_correct_total: u64,
    pub judgments_incorrect_total: u64,
    /// Latency of the most recent prediction round trip, seconds.
    pub last_prediction_latency: f64,
    /// Raw (non-cumulative) per-bucket observation counts.
    pub bucket_counts: [u64; LATENCY_BUCKETS.len()],
    /// Observations beyond the last finite boundary.
    pub overflow_count: u64,
    /// Sum of all observed validation latencies, seconds.
    pub latency_sum: f64,
}

impl MetricsSnapshot {
    /// Grand total of histogram observations (the `+Inf` value).
    pub fn observation_count(&self) -> u64 {
        self.bucket_counts.iter().sum::<u64>() + self.overflow_count
    }
}

/// Process-wide metrics collector.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(Mutex::new(MetricsSnapshot::default())),
        }
    }

    /// Records a completed prediction request.
    pub fn record_request(&self) {
        let mut state = self.lock();
        state.requests_total += 1;
    }

    /// Overwrites the last-prediction-latency gauge; the gauge reflects
    /// only the most recent request.
    pub fn record_prediction_latency(&self, seconds: f64) {
        let mut state = self.lock();
        state.last_prediction_latency = seconds;
    }

    /// Records a judgment and, when a validation latency is known,
    /// classifies it into the histogram.
    ///
    /// Classification is first-match over the ascending boundaries: the
    /// first bucket whose boundary is >= the latency takes the raw count.
    /// A missing latency (unknown or expired session timing) leaves the
    /// histogram untouched so absent data cannot skew the distribution,
    /// while the feedback counters still advance.
    pub fn record_judgment(&self, is_correct: bool, validation_latency: Option<f64>) {
        let mut state = self.lock();
        state.judgments_total += 1;
        if is_correct {
            state.judgments_correct_total += 1;
        } else {
            state.judgments_incorrect_total += 1;
        }

        if let Some(latency) = validation_latency {
            match LATENCY_BUCKETS.iter().position(|bound| latency <= *bound) {
                Some(i) => state.bucket_counts[i] += 1,
                None => state.overflow_count += 1,
            }
            state.latency_sum += latency;
        }
    }

    /// Takes a consistent copy of all state for the exporter and tests.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().clone()
    }

    /// Renders all metrics in Prometheus text format.
    ///
    /// Histogram buckets are emitted cumulatively in ascending boundary
    /// order; the `+Inf` line carries the grand total of observations.
    /// Pure read: two renders with no mutation in between are identical.
    pub fn render(&self) -> String {
        let s = self.snapshot();
        let mut out = String::new();

        counter(
            &mut out,
            "sentiment_gateway_predictions_total",
            "Total prediction requests completed against the model service.",
            s.requests_total,
        );
        counter(
            &mut out,
            "sentiment_gateway_judgments_total",
            "Total accepted user judgments.",
            s.judgments_total,
        );
        counter(
            &mut out,
            "sentiment_gateway_judgments_correct_total",
            "Judgments marking the prediction as correct.",
            s.judgments_correct_total,
        );
        counter(
            &mut out,
            "sentiment_gateway_judgments_incorrect_total",
            "Judgments marking the prediction as incorrect.",
            s.judgments_incorrect_total,
        );

        out.push_str(
            "# HELP sentiment_gateway_last_prediction_latency_seconds \
             Latency of the most recent prediction round trip.\n",
        );
        out.push_str("# TYPE sentiment_gateway_last_prediction_latency_seconds gauge\n");
        out.push_str(&format!(
            "sentiment_gateway_last_prediction_latency_seconds {}\n",
            s.last_prediction_latency
        ));

        out.push_str(
            "# HELP sentiment_gateway_validation_duration_seconds \
             Time between a prediction and the judgment on it.\n",
        );
        out.push_str("# TYPE sentiment_gateway_validation_duration_seconds histogram\n");
        let mut cumulative = 0u64;
        for (i, bound) in LATENCY_BUCKETS.iter().enumerate() {
            cumulative += s.bucket_counts[i];
            out.push_str(&format!(
                "sentiment_gateway_validation_duration_seconds_bucket{{le=\"{}\"}} {}\n",
                bound, cumulative
            ));
        }
        out.push_str(&format!(
            "sentiment_gateway_validation_duration_seconds_bucket{{le=\"+Inf\"}} {}\n",
            s.observation_count()
        ));
        out.push_str(&format!(
            "sentiment_gateway_validation_duration_seconds_sum {}\n",
            s.latency_sum
        ));
        out.push_str(&format!(
            "sentiment_gateway_validation_duration_seconds_count {}\n",
            s.observation_count()
        ));

        out
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MetricsSnapshot> {
        self.inner.lock().expect("metrics mutex poisoned")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics::new()
    }
}

fn counter(out: &mut String, name: &str, help: &str, value: u64) {
    out.push_str(&format!("# HELP {} {}\n", name, help));
    out.push_str(&format!("# TYPE {} counter\n", name));
    out.push_str(&format!("{} {}\n", name, value));
}
