//! Scripted probe backends shared by the orchestrator and HTTP tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use streamstats_core::{ProbeError, Result};
use streamstats_exporter::probe::{BitrateProbe, LatencyProbe, StreamSession};

/// Stream that starts after `startup` and then yields `kbps` every read.
pub struct FakeStream {
    pub startup: Duration,
    pub kbps: f64,
    pub open_error: Option<ProbeError>,
    pub opens: AtomicUsize,
    pub stops: Arc<AtomicUsize>,
    pub drops: Arc<AtomicUsize>,
}

impl FakeStream {
    pub fn steady(kbps: f64) -> Arc<Self> {
        Arc::new(Self {
            startup: Duration::from_millis(500),
            kbps,
            open_error: None,
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
            drops: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn failing(err: ProbeError) -> Arc<Self> {
        Arc::new(Self {
            startup: Duration::ZERO,
            kbps: 0.0,
            open_error: Some(err),
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
            drops: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Sessions released so far, whether stopped or torn down mid-read.
    pub fn dropped(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

struct FakeSession {
    startup: Duration,
    kbps: f64,
    stops: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StreamSession for FakeSession {
    async fn wait_playing(&mut self) -> Result<()> {
        tokio::time::sleep(self.startup).await;
        Ok(())
    }

    async fn demux_bitrate_kbps(&mut self) -> Result<f64> {
        Ok(self.kbps)
    }

    async fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BitrateProbe for FakeStream {
    async fn open(&self, _target: &str) -> Result<Box<dyn StreamSession>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }
        Ok(Box::new(FakeSession {
            startup: self.startup,
            kbps: self.kbps,
            stops: Arc::clone(&self.stops),
            drops: Arc::clone(&self.drops),
        }))
    }
}

/// Echo probe answering with a fixed outcome after `delay`.
pub struct FakePing {
    pub outcome: Result<f64>,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub last_host: std::sync::Mutex<Option<String>>,
}

impl FakePing {
    pub fn replying(ms: f64) -> Arc<Self> {
        Self::with(Ok(ms), Duration::from_millis(20))
    }

    pub fn failing(err: ProbeError) -> Arc<Self> {
        Self::with(Err(err), Duration::from_millis(20))
    }

    pub fn with(outcome: Result<f64>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            delay,
            calls: AtomicUsize::new(0),
            last_host: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LatencyProbe for FakePing {
    async fn round_trip_ms(&self, host: &str) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_host.lock().unwrap() = Some(host.to_string());
        tokio::time::sleep(self.delay).await;
        self.outcome.clone()
    }
}
