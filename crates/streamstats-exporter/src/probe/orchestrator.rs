//! One probe cycle: bitrate and latency measured concurrently, merged into a
//! single all-or-nothing `ProbeResult`.
//!
//! Each probe runs in its own task and hands its outcome back through its
//! `JoinHandle`; nothing is shared between the two while they run. Both are
//! joined under a common deadline. A task still running at the deadline is
//! aborted (dropping its session kills the child process) and reported as
//! `Timeout`. If the cycle itself is dropped (the scraper disconnected), the
//! probe tasks are aborted with it and the cycle is recorded as a timeout.
//!
//! When both probes fail, the bitrate error is the one surfaced. Both errors
//! are logged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use streamstats_core::{latency_host, ErrorKind, ProbeError, ProbeRequest, ProbeResult, Result, MAX_PERIOD};

use super::sampler::measure_bitrate;
use super::{BitrateProbe, LatencyProbe};
use crate::config::ProbeSection;
use crate::obs::metrics::SelfMetrics;

pub struct ProbeOrchestrator {
    bitrate: Arc<dyn BitrateProbe>,
    latency: Arc<dyn LatencyProbe>,
    metrics: Arc<SelfMetrics>,
    playback_start_timeout: Duration,
    deadline_grace: Duration,
}

impl ProbeOrchestrator {
    pub fn new(
        bitrate: Arc<dyn BitrateProbe>,
        latency: Arc<dyn LatencyProbe>,
        metrics: Arc<SelfMetrics>,
        cfg: &ProbeSection,
    ) -> Self {
        Self {
            bitrate,
            latency,
            metrics,
            playback_start_timeout: cfg.playback_start_timeout(),
            deadline_grace: cfg.deadline_grace(),
        }
    }

    /// Wall-clock budget for one cycle.
    ///
    /// `period` bounds the cycle, but never below what the sampling window
    /// itself needs (window + playback start + grace).
    pub fn deadline(&self, req: &ProbeRequest) -> Duration {
        let window = Duration::from_secs(u64::from(req.streaming_seconds().get()));
        req.period()
            .max(window + self.playback_start_timeout + self.deadline_grace)
    }

    pub async fn run(&self, req: &ProbeRequest) -> ProbeResult {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.deadline(req))
            .unwrap_or_else(|| started + MAX_PERIOD);
        let mut cycle = CycleGuard {
            metrics: &self.metrics,
            target: req.target(),
            started,
            finished: false,
        };

        let bitrate = {
            let probe = Arc::clone(&self.bitrate);
            let target = req.target().to_owned();
            let window = req.streaming_seconds();
            let startup = self.playback_start_timeout;
            ProbeTask::spawn("bitrate", async move {
                measure_bitrate(probe.as_ref(), &target, window, startup).await
            })
        };
        let latency = {
            let probe = Arc::clone(&self.latency);
            let target = req.target().to_owned();
            ProbeTask::spawn("latency", async move {
                let host = latency_host(&target)?;
                probe.round_trip_ms(&host).await
            })
        };

        let (bitrate, latency) = tokio::join!(bitrate.join_by(deadline), latency.join_by(deadline));

        cycle.finished = true;
        let result = merge(req.target(), bitrate, latency);
        let elapsed = started.elapsed();
        self.metrics.duration.observe(elapsed);
        match result.err() {
            Some(err) => {
                self.metrics.record_error(err.kind());
                warn!(
                    stream = %req.target(),
                    kind = err.kind().as_str(),
                    error = %err,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "probe unsuccessful"
                );
            }
            None => info!(
                stream = %req.target(),
                bitrate_kbps = result.bitrate_kbps().unwrap_or_default(),
                latency_ms = result.latency_ms().unwrap_or_default(),
                elapsed_ms = elapsed.as_millis() as u64,
                "probe succeeded"
            ),
        }
        result
    }
}

/// Spawned probe that is aborted when dropped, so it never outlives the
/// cycle that started it.
struct ProbeTask {
    name: &'static str,
    handle: JoinHandle<Result<f64>>,
}

impl ProbeTask {
    fn spawn<F>(name: &'static str, fut: F) -> Self
    where
        F: Future<Output = Result<f64>> + Send + 'static,
    {
        Self {
            name,
            handle: tokio::spawn(fut),
        }
    }

    async fn join_by(mut self, deadline: Instant) -> Result<f64> {
        let name = self.name;
        match timeout_at(deadline, &mut self.handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => Err(ProbeError::ProbeBackendFailure(format!("{name} task failed: {e}"))),
            Err(_) => {
                self.handle.abort();
                // wait for the abort so the task's resources are released before returning
                let _ = (&mut self.handle).await;
                Err(ProbeError::Timeout(format!("{name} probe exceeded the cycle deadline")))
            }
        }
    }
}

impl Drop for ProbeTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Records a cycle dropped before both probes were joined.
struct CycleGuard<'a> {
    metrics: &'a SelfMetrics,
    target: &'a str,
    started: Instant,
    finished: bool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let elapsed = self.started.elapsed();
        self.metrics.duration.observe(elapsed);
        self.metrics.record_error(ErrorKind::Timeout);
        warn!(
            stream = %self.target,
            elapsed_ms = elapsed.as_millis() as u64,
            "probe cycle cancelled before completion"
        );
    }
}

fn merge(target: &str, bitrate: Result<f64>, latency: Result<f64>) -> ProbeResult {
    match (bitrate, latency) {
        (Ok(kbps), Ok(ms)) => ProbeResult::succeeded(kbps, ms),
        (Err(e), Ok(_)) => ProbeResult::failed(e),
        (Ok(_), Err(e)) => ProbeResult::failed(e),
        (Err(bitrate_err), Err(latency_err)) => {
            warn!(
                stream = %target,
                kind = latency_err.kind().as_str(),
                error = %latency_err,
                "latency probe also failed; reporting the bitrate error"
            );
            ProbeResult::failed(bitrate_err)
        }
    }
}
