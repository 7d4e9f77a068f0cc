//! Process-wide self metrics.
//!
//! Counters and the duration summary are plain atomics; the per-kind failure
//! counter keys label sets in a `DashMap`. Labels are flattened into sorted
//! key vectors to keep deterministic ordering. Durations are accumulated in
//! microseconds and rendered as seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use streamstats_core::ErrorKind;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(key: &[(String, String)]) -> String {
    if key.is_empty() {
        return String::new();
    }
    let inner = key
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{inner}}}")
}

#[derive(Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} counter");
        let _ = writeln!(out, "{name} {}", self.get());
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        let mut key: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        key.sort();

        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value for a label set (0 when never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        let mut key: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        key.sort();
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} counter");
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| (label_str(r.key()), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (labels, val) in rows {
            let _ = writeln!(out, "{name}{labels} {val}");
        }
    }
}

/// Sum/count summary without quantiles.
#[derive(Default)]
pub struct Summary {
    count: AtomicU64,
    sum_micros: AtomicU64,
}

impl Summary {
    pub fn observe(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> Duration {
        Duration::from_micros(self.sum_micros.load(Ordering::Relaxed))
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} summary");
        let _ = writeln!(out, "{name}_sum {}", self.sum().as_secs_f64());
        let _ = writeln!(out, "{name}_count {}", self.count());
    }
}

/// Metrics about the exporter itself, independent of any single probe.
#[derive(Default)]
pub struct SelfMetrics {
    pub duration: Summary,
    pub errors: Counter,
    pub probe_failures: CounterVec,
}

impl SelfMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a rejected request or a failed probe cycle.
    pub fn record_error(&self, kind: ErrorKind) {
        self.errors.inc();
        self.probe_failures.inc(&[("kind", kind.as_str())]);
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.duration.render(
            "monitoring_exporter_duration_seconds",
            "Duration of collections by the Stream Stats Exporter.",
            &mut out,
        );
        self.errors.render(
            "monitoring_exporter_errors_total",
            "Errors raised by the Stream Stats Exporter.",
            &mut out,
        );
        self.probe_failures.render(
            "monitoring_exporter_probe_failures_total",
            "Errors raised by the Stream Stats Exporter, by kind.",
            &mut out,
        );
        let _ = writeln!(
            out,
            "# HELP stream_stats_exporter_build_info A metric with a constant '1' value labeled by version.\n# TYPE stream_stats_exporter_build_info gauge\nstream_stats_exporter_build_info{{version=\"{}\"}} 1",
            escape_label(env!("CARGO_PKG_VERSION"))
        );
        out
    }
}
