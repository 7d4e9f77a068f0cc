//! Per-request probe parameters.
//!
//! Validation follows the query contract of the `/probe` endpoint: `target`
//! first, then `period`, then `streamingTime`, each failing fast with an
//! `InvalidParameter` carrying a human readable message.

use std::num::NonZeroU32;
use std::time::Duration;

use url::{Host, Url};

use crate::error::{ProbeError, Result};

/// Period used when the query omits it or passes zero.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

/// Largest accepted `period`.
pub const MAX_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Sampling window used when the query omits it or passes zero.
pub const DEFAULT_STREAMING_SECONDS: NonZeroU32 = match NonZeroU32::new(5) {
    Some(v) => v,
    None => unreachable!(),
};

/// Immutable parameters of one probe cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    target: String,
    period: Duration,
    streaming_seconds: NonZeroU32,
}

impl ProbeRequest {
    /// Build a request from already-typed values.
    ///
    /// A zero `period` is replaced by [`DEFAULT_PERIOD`]; longer ones are
    /// clamped to [`MAX_PERIOD`].
    pub fn new(target: impl Into<String>, period: Duration, streaming_seconds: NonZeroU32) -> Result<Self> {
        let target = target.into();
        if target.is_empty() {
            return Err(ProbeError::InvalidParameter(
                "'target' parameter must be specified".into(),
            ));
        }
        let period = if period.is_zero() { DEFAULT_PERIOD } else { period.min(MAX_PERIOD) };
        Ok(Self {
            target,
            period,
            streaming_seconds,
        })
    }

    /// Parse raw query values. Absent and empty values take the defaults.
    pub fn from_query(
        target: Option<&str>,
        period: Option<&str>,
        streaming_time: Option<&str>,
    ) -> Result<Self> {
        let target = target.unwrap_or_default();
        if target.is_empty() {
            return Err(ProbeError::InvalidParameter(
                "'target' parameter must be specified".into(),
            ));
        }

        let period = match period.filter(|p| !p.is_empty()) {
            Some(raw) => parse_period(raw)?,
            None => Duration::ZERO,
        };

        let streaming_seconds = match streaming_time.filter(|s| !s.is_empty()) {
            Some(raw) => parse_streaming_time(raw)?,
            None => None,
        };

        Self::new(
            target,
            period,
            streaming_seconds.unwrap_or(DEFAULT_STREAMING_SECONDS),
        )
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Scrape period hint (never zero).
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn streaming_seconds(&self) -> NonZeroU32 {
        self.streaming_seconds
    }
}

fn parse_period(raw: &str) -> Result<Duration> {
    if raw == "0" {
        return Ok(Duration::ZERO);
    }
    let period = humantime::parse_duration(raw).map_err(|e| {
        ProbeError::InvalidParameter(format!(
            "'period' parameter must be a duration such as 5s, 1m30s or 500ms \
             (fractional values like 1.5h are not accepted): {e}"
        ))
    })?;
    if period > MAX_PERIOD {
        return Err(ProbeError::InvalidParameter(format!(
            "'period' parameter must be at most {}",
            humantime::format_duration(MAX_PERIOD)
        )));
    }
    Ok(period)
}

/// `Ok(None)` means an explicit zero (use the default).
fn parse_streaming_time(raw: &str) -> Result<Option<NonZeroU32>> {
    let secs: u32 = raw.parse().map_err(|e| {
        ProbeError::InvalidParameter(format!(
            "'streamingTime' parameter must be a positive integer: {e}"
        ))
    })?;
    Ok(NonZeroU32::new(secs))
}

/// Derive the bare host name the latency probe should target.
///
/// No network access happens here: a target without a parseable host fails
/// with `InvalidTarget` before anything is resolved.
pub fn latency_host(target: &str) -> Result<String> {
    let url = Url::parse(target)
        .map_err(|e| ProbeError::InvalidTarget(format!("{target}: {e}")))?;
    match url.host() {
        Some(Host::Domain(d)) if !d.is_empty() => Ok(d.to_string()),
        Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
        Some(Host::Ipv6(addr)) => Ok(addr.to_string()),
        _ => Err(ProbeError::InvalidTarget(format!("{target}: missing host"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn host_strips_port_and_path() {
        assert_eq!(latency_host("rtmp://good.example:1935/live").unwrap(), "good.example");
        assert_eq!(latency_host("http://10.0.0.7/stream.m3u8").unwrap(), "10.0.0.7");
        assert_eq!(latency_host("srt://[::1]:9000").unwrap(), "::1");
    }

    #[test]
    fn host_required() {
        let err = latency_host("rtmp:/live").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidTarget);
        let err = latency_host("not a uri").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidTarget);
    }
}
