//! Backend-independent bitrate sampling.

use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::{interval, timeout, MissedTickBehavior};

use streamstats_core::{ProbeError, Result};

use super::{BitrateProbe, StreamSession};

/// Running mean over non-zero samples.
#[derive(Debug, Default)]
struct BitrateAverage {
    sum: f64,
    count: u32,
}

impl BitrateAverage {
    fn push(&mut self, kbps: f64) {
        // zero (or garbage) readings are demuxer hiccups, not measurements
        if kbps > 0.0 && kbps.is_finite() {
            self.sum += kbps;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Open a session on `target`, sample it for `window` seconds and return the
/// mean of the non-zero samples. The session is stopped on every path.
pub async fn measure_bitrate(
    probe: &dyn BitrateProbe,
    target: &str,
    window: NonZeroU32,
    startup_timeout: Duration,
) -> Result<f64> {
    let mut session = probe.open(target).await?;
    let outcome = sample(session.as_mut(), window, startup_timeout).await;
    session.stop().await;
    outcome
}

async fn sample(
    session: &mut dyn StreamSession,
    window: NonZeroU32,
    startup_timeout: Duration,
) -> Result<f64> {
    timeout(startup_timeout, session.wait_playing())
        .await
        .map_err(|_| {
            ProbeError::Timeout(format!(
                "playback did not start within {}ms",
                startup_timeout.as_millis()
            ))
        })??;

    // window starts once playback is up
    let mut tick = interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tick.tick().await;

    let mut avg = BitrateAverage::default();
    for _ in 0..window.get() {
        tick.tick().await;
        avg.push(session.demux_bitrate_kbps().await?);
    }

    avg.mean().ok_or(ProbeError::NoSignal)
}
