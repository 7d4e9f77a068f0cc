//! Measurement capabilities and the orchestrator that runs them.
//!
//! The orchestrator only sees the two traits below; the concrete backends
//! (`ffmpeg` remux for bitrate, system `ping` for latency) live in their own
//! modules and can be swapped for fakes in tests.

use async_trait::async_trait;

use streamstats_core::Result;

pub mod ffmpeg;
pub mod orchestrator;
pub mod ping;
pub mod sampler;

pub use ffmpeg::FfmpegBitrateProbe;
pub use orchestrator::ProbeOrchestrator;
pub use ping::SystemPingProbe;

/// A live connection to a media stream.
#[async_trait]
pub trait StreamSession: Send {
    /// Resolve once playback has started. Unbounded; callers apply a timeout.
    async fn wait_playing(&mut self) -> Result<()>;

    /// Instantaneous demux bitrate (kbit/s) since the previous call, or since
    /// playback started for the first call.
    async fn demux_bitrate_kbps(&mut self) -> Result<f64>;

    /// Tear the connection down. Must be safe to call at any point.
    async fn stop(&mut self);
}

/// Bitrate capability: opens sessions against a stream address.
#[async_trait]
pub trait BitrateProbe: Send + Sync {
    async fn open(&self, target: &str) -> Result<Box<dyn StreamSession>>;
}

/// Latency capability: one echo round trip to a bare host name.
#[async_trait]
pub trait LatencyProbe: Send + Sync {
    /// Round-trip time in whole milliseconds.
    async fn round_trip_ms(&self, host: &str) -> Result<f64>;
}
