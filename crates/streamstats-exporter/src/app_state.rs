//! Shared application state for the exporter.
//!
//! Holds the process-scoped pieces: validated config, self metrics (created
//! once here, never reinitialized) and the two probe backends. Per-request
//! objects are built from it on demand.

use std::sync::Arc;

use streamstats_core::Result;

use crate::config::ExporterConfig;
use crate::obs::metrics::SelfMetrics;
use crate::probe::{BitrateProbe, FfmpegBitrateProbe, LatencyProbe, ProbeOrchestrator, SystemPingProbe};

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ExporterConfig>,
    metrics: Arc<SelfMetrics>,
    bitrate: Arc<dyn BitrateProbe>,
    latency: Arc<dyn LatencyProbe>,
}

impl AppState {
    /// Build application state with the process backends.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        cfg.validate()?;
        let bitrate = Arc::new(FfmpegBitrateProbe::new(cfg.probe.ffmpeg_command.clone()));
        let latency = Arc::new(SystemPingProbe::new(
            cfg.probe.ping_command.clone(),
            cfg.probe.ping_timeout(),
        ));
        Ok(Self::with_probes(cfg, bitrate, latency))
    }

    /// Build state around caller-provided backends.
    pub fn with_probes(
        cfg: ExporterConfig,
        bitrate: Arc<dyn BitrateProbe>,
        latency: Arc<dyn LatencyProbe>,
    ) -> Self {
        Self {
            cfg: Arc::new(cfg),
            metrics: Arc::new(SelfMetrics::new()),
            bitrate,
            latency,
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.cfg
    }

    pub fn metrics(&self) -> Arc<SelfMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Fresh orchestrator for one probe cycle.
    pub fn orchestrator(&self) -> ProbeOrchestrator {
        ProbeOrchestrator::new(
            Arc::clone(&self.bitrate),
            Arc::clone(&self.latency),
            self.metrics(),
            &self.cfg.probe,
        )
    }
}
