//! Request-scoped probe metrics.
//!
//! A `MetricsSnapshot` owns the `ProbeResult` of exactly one probe cycle. It is
//! registered with a fresh `RequestRegistry`, gathered once, and dropped with
//! the request, so values for one target can never leak into another.

use std::fmt::Write;

use streamstats_core::ProbeResult;

use super::NAMESPACE;

/// One gauge line of the exposition payload.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSample {
    pub name: String,
    pub help: &'static str,
    pub value: f64,
}

impl GaugeSample {
    fn new(suffix: &str, help: &'static str, value: f64) -> Self {
        Self {
            name: format!("{NAMESPACE}_{suffix}"),
            help,
            value,
        }
    }
}

/// Something that yields gauges for a single exposition.
pub trait Collector: Send {
    fn collect(&self) -> Vec<GaugeSample>;
}

pub struct MetricsSnapshot {
    result: ProbeResult,
}

impl MetricsSnapshot {
    pub fn new(result: ProbeResult) -> Self {
        Self { result }
    }

    /// `success` is always present; `bitrate` and `latency` only when the
    /// cycle succeeded. Failure omits them instead of reporting zero.
    pub fn render(&self) -> Vec<GaugeSample> {
        let mut out = Vec::with_capacity(3);
        let success = if self.result.success() { 1.0 } else { 0.0 };
        out.push(GaugeSample::new(
            "success",
            "Was the last measurement for the probe successful.",
            success,
        ));
        if let (Some(bitrate), Some(latency)) = (self.result.bitrate_kbps(), self.result.latency_ms()) {
            out.push(GaugeSample::new("bitrate", "Bitrate of the stream in kbit/s.", bitrate));
            out.push(GaugeSample::new("latency", "Latency of the target in ms.", latency));
        }
        out
    }
}

impl Collector for MetricsSnapshot {
    fn collect(&self) -> Vec<GaugeSample> {
        self.render()
    }
}

/// Registry living for one `/probe` request.
#[derive(Default)]
pub struct RequestRegistry {
    collectors: Vec<Box<dyn Collector>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, collector: Box<dyn Collector>) {
        self.collectors.push(collector);
    }

    /// Render every registered collector. Consumes the registry.
    pub fn gather(self) -> String {
        let mut out = String::new();
        for sample in self.collectors.iter().flat_map(|c| c.collect()) {
            let _ = writeln!(out, "# HELP {} {}", sample.name, sample.help);
            let _ = writeln!(out, "# TYPE {} gauge", sample.name);
            let _ = writeln!(out, "{} {}", sample.name, sample.value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamstats_core::ProbeError;

    fn names(samples: &[GaugeSample]) -> Vec<&str> {
        samples.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn success_exports_all_three() {
        let snap = MetricsSnapshot::new(ProbeResult::succeeded(2500.5, 12.0));
        let samples = snap.render();
        assert_eq!(names(&samples), ["monitoring_success", "monitoring_bitrate", "monitoring_latency"]);
        assert_eq!(samples[0].value, 1.0);
        assert_eq!(samples[1].value, 2500.5);
        assert_eq!(samples[2].value, 12.0);
    }

    #[test]
    fn failure_exports_only_success() {
        let snap = MetricsSnapshot::new(ProbeResult::failed(ProbeError::NoSignal));
        let samples = snap.render();
        assert_eq!(names(&samples), ["monitoring_success"]);
        assert_eq!(samples[0].value, 0.0);
    }

    #[test]
    fn registry_renders_exposition() {
        let mut registry = RequestRegistry::new();
        registry.register(Box::new(MetricsSnapshot::new(ProbeResult::succeeded(800.0, 0.0))));
        let body = registry.gather();
        assert_eq!(
            body,
            "# HELP monitoring_success Was the last measurement for the probe successful.\n\
             # TYPE monitoring_success gauge\n\
             monitoring_success 1\n\
             # HELP monitoring_bitrate Bitrate of the stream in kbit/s.\n\
             # TYPE monitoring_bitrate gauge\n\
             monitoring_bitrate 800\n\
             # HELP monitoring_latency Latency of the target in ms.\n\
             # TYPE monitoring_latency gauge\n\
             monitoring_latency 0\n"
        );
    }
}
