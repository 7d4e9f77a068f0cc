//! Bitrate backend: remux the stream through an `ffmpeg` child process and
//! count the bytes it delivers.
//!
//! `-c copy` keeps the payload at container level, so the byte rate on stdout
//! tracks the demuxed input rate. `-re` paces file inputs at their native rate.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use streamstats_core::{ProbeError, Result};

use super::{BitrateProbe, StreamSession};

pub struct FfmpegBitrateProbe {
    command: String,
}

impl FfmpegBitrateProbe {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn args(target: &str) -> Vec<&str> {
        vec![
            "-hide_banner",
            "-nostats",
            "-loglevel",
            "error",
            "-re",
            "-i",
            target,
            "-map",
            "0:v?",
            "-map",
            "0:a?",
            "-c",
            "copy",
            "-f",
            "nut",
            "pipe:1",
        ]
    }
}

#[async_trait]
impl BitrateProbe for FfmpegBitrateProbe {
    async fn open(&self, target: &str) -> Result<Box<dyn StreamSession>> {
        let mut cmd = Command::new(&self.command);
        cmd.args(Self::args(target));
        cmd.kill_on_drop(true);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            ProbeError::ProbeBackendFailure(format!("failed to spawn {}: {e}", self.command))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ProbeError::ProbeBackendFailure("ffmpeg stdout was not captured".into())
        })?;

        let received = Arc::new(AtomicU64::new(0));
        let (playing_tx, playing_rx) = watch::channel(false);
        let reader = tokio::spawn(count_bytes(stdout, Arc::clone(&received), playing_tx));
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(log_stderr(stderr, target.to_owned()));
        }

        debug!(stream = %target, pid = ?child.id(), "ffmpeg session started");

        Ok(Box::new(FfmpegSession {
            child,
            reader,
            received,
            playing: playing_rx,
            baseline: None,
        }))
    }
}

async fn count_bytes(stdout: ChildStdout, received: Arc<AtomicU64>, playing: watch::Sender<bool>) {
    let mut reader = BufReader::new(stdout);
    let mut buf = vec![0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                received.fetch_add(n as u64, Ordering::Relaxed);
                playing.send_if_modified(|p| !std::mem::replace(p, true));
            }
        }
    }
}

async fn log_stderr(stderr: ChildStderr, target: String) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(stream = %target, "ffmpeg: {line}");
    }
}

struct FfmpegSession {
    child: Child,
    reader: JoinHandle<()>,
    received: Arc<AtomicU64>,
    playing: watch::Receiver<bool>,
    baseline: Option<(u64, Instant)>,
}

#[async_trait]
impl StreamSession for FfmpegSession {
    async fn wait_playing(&mut self) -> Result<()> {
        self.playing.wait_for(|p| *p).await.map_err(|_| {
            ProbeError::ProbeBackendFailure("ffmpeg exited before playback started".into())
        })?;
        self.baseline = Some((self.received.load(Ordering::Relaxed), Instant::now()));
        Ok(())
    }

    async fn demux_bitrate_kbps(&mut self) -> Result<f64> {
        let now = Instant::now();
        let total = self.received.load(Ordering::Relaxed);
        let (prev_total, prev_at) = self.baseline.unwrap_or((total, now));
        self.baseline = Some((total, now));
        Ok(kbps(total.saturating_sub(prev_total), now.duration_since(prev_at)))
    }

    async fn stop(&mut self) {
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
        self.reader.abort();
    }
}

fn kbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / 1000.0 / secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kbps_from_byte_delta() {
        assert_eq!(kbps(125_000, Duration::from_secs(1)), 1000.0);
        assert_eq!(kbps(250_000, Duration::from_secs(2)), 1000.0);
        assert_eq!(kbps(0, Duration::from_secs(1)), 0.0);
        assert_eq!(kbps(1000, Duration::ZERO), 0.0);
    }

    #[test]
    fn target_passed_as_single_input() {
        let args = FfmpegBitrateProbe::args("rtmp://good.example/live?k=v w");
        let i = args.iter().position(|a| *a == "-i").unwrap();
        assert_eq!(args[i + 1], "rtmp://good.example/live?k=v w");
        assert_eq!(args.last(), Some(&"pipe:1"));
    }

    #[tokio::test]
    async fn missing_binary_is_backend_failure() {
        let probe = FfmpegBitrateProbe::new("/nonexistent/ffmpeg-binary");
        let err = probe.open("rtmp://good.example/live").await.err().unwrap();
        assert_eq!(err.kind(), streamstats_core::ErrorKind::ProbeBackendFailure);
    }
}
