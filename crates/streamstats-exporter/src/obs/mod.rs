//! Exporter observability: process-wide self metrics and the request-scoped
//! probe snapshot.
//!
//! Both render Prometheus text exposition (format 0.0.4) without pulling in a
//! client library. Self metrics are atomics created once at startup; snapshots
//! are built, rendered and dropped per `/probe` request.

pub mod metrics;
pub mod snapshot;

/// Content type for every exposition payload served by the exporter.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Metric namespace shared with existing dashboards.
pub const NAMESPACE: &str = "monitoring";
