//! Merged outcome of one probe cycle.

use crate::error::ProbeError;

/// All-or-nothing result: either both measurements or one error.
///
/// Fields are private so `success == err.is_none()` always holds; the
/// measured values are only reachable when the cycle succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    bitrate_kbps: f64,
    latency_ms: f64,
    err: Option<ProbeError>,
}

impl ProbeResult {
    pub fn succeeded(bitrate_kbps: f64, latency_ms: f64) -> Self {
        Self {
            bitrate_kbps,
            latency_ms,
            err: None,
        }
    }

    pub fn failed(err: ProbeError) -> Self {
        Self {
            bitrate_kbps: 0.0,
            latency_ms: 0.0,
            err: Some(err),
        }
    }

    pub fn success(&self) -> bool {
        self.err.is_none()
    }

    /// Average demux bitrate in kbit/s, `None` on failure.
    pub fn bitrate_kbps(&self) -> Option<f64> {
        self.success().then_some(self.bitrate_kbps)
    }

    /// Round-trip time in whole milliseconds, `None` on failure.
    pub fn latency_ms(&self) -> Option<f64> {
        self.success().then_some(self.latency_ms)
    }

    pub fn err(&self) -> Option<&ProbeError> {
        self.err.as_ref()
    }
}
