use std::net::Ipv6Addr;
use std::time::Duration;

use serde::Deserialize;
use streamstats_core::{ProbeError, Result};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default)]
    pub web: WebSection,

    #[serde(default)]
    pub probe: ProbeSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        self.web.validate()?;
        self.probe.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSection {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            telemetry_path: default_telemetry_path(),
        }
    }
}

impl WebSection {
    pub fn validate(&self) -> Result<()> {
        self.bind_address()?;
        if !self.telemetry_path.starts_with('/') {
            return Err(ProbeError::Config(
                "web.telemetry_path must start with '/'".into(),
            ));
        }
        if matches!(self.telemetry_path.as_str(), "/" | "/probe" | "/healthz") {
            return Err(ProbeError::Config(format!(
                "web.telemetry_path {} collides with a built-in route",
                self.telemetry_path
            )));
        }
        Ok(())
    }

    /// Listen address as `host:port`, ready for `TcpListener::bind`.
    ///
    /// A bare `:port` binds all interfaces. Hostnames are kept as given and
    /// resolved at bind time.
    pub fn bind_address(&self) -> Result<String> {
        let raw = &self.listen_address;
        let invalid = |why: &str| ProbeError::Config(format!("web.listen_address {raw} {why}"));

        let (host, port) = raw.rsplit_once(':').ok_or_else(|| invalid("must be host:port"))?;
        port.parse::<u16>()
            .map_err(|e| invalid(&format!("has an invalid port: {e}")))?;
        if host.is_empty() {
            return Ok(format!("0.0.0.0:{port}"));
        }
        if let Some(inner) = host.strip_prefix('[') {
            let ip = inner.strip_suffix(']').ok_or_else(|| invalid("has an unterminated IPv6 literal"))?;
            ip.parse::<Ipv6Addr>()
                .map_err(|e| invalid(&format!("has an invalid IPv6 literal: {e}")))?;
        } else if host.contains(':') || host.chars().any(char::is_whitespace) {
            return Err(invalid("has an invalid host"));
        }
        Ok(raw.clone())
    }
}

fn default_listen_address() -> String {
    ":8080".into()
}
fn default_telemetry_path() -> String {
    "/metrics".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    #[serde(default = "default_ffmpeg_command")]
    pub ffmpeg_command: String,

    #[serde(default = "default_ping_command")]
    pub ping_command: String,

    #[serde(default = "default_playback_start_timeout_ms")]
    pub playback_start_timeout_ms: u64,

    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,

    #[serde(default = "default_deadline_grace_ms")]
    pub deadline_grace_ms: u64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            ffmpeg_command: default_ffmpeg_command(),
            ping_command: default_ping_command(),
            playback_start_timeout_ms: default_playback_start_timeout_ms(),
            ping_timeout_ms: default_ping_timeout_ms(),
            deadline_grace_ms: default_deadline_grace_ms(),
        }
    }
}

impl ProbeSection {
    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg_command.trim().is_empty() || self.ping_command.trim().is_empty() {
            return Err(ProbeError::Config(
                "probe.ffmpeg_command and probe.ping_command must not be empty".into(),
            ));
        }
        if !(1000..=120000).contains(&self.playback_start_timeout_ms) {
            return Err(ProbeError::Config(
                "probe.playback_start_timeout_ms must be between 1000 and 120000".into(),
            ));
        }
        if !(100..=60000).contains(&self.ping_timeout_ms) {
            return Err(ProbeError::Config(
                "probe.ping_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if self.deadline_grace_ms > 300000 {
            return Err(ProbeError::Config(
                "probe.deadline_grace_ms must be at most 300000".into(),
            ));
        }
        Ok(())
    }

    pub fn playback_start_timeout(&self) -> Duration {
        Duration::from_millis(self.playback_start_timeout_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn deadline_grace(&self) -> Duration {
        Duration::from_millis(self.deadline_grace_ms)
    }
}

fn default_ffmpeg_command() -> String {
    "ffmpeg".into()
}
fn default_ping_command() -> String {
    "ping".into()
}
fn default_playback_start_timeout_ms() -> u64 {
    10000
}
fn default_ping_timeout_ms() -> u64 {
    2000
}
fn default_deadline_grace_ms() -> u64 {
    10000
}
