//! Latency backend: a single ICMP echo through the system `ping` binary.
//!
//! Running the setuid/capability-enabled system tool avoids needing raw
//! sockets in the exporter process itself.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::lookup_host;
use tokio::process::Command;
use tracing::debug;

use streamstats_core::{ProbeError, Result};

use super::LatencyProbe;

pub struct SystemPingProbe {
    command: String,
    timeout: Duration,
}

impl SystemPingProbe {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

#[async_trait]
impl LatencyProbe for SystemPingProbe {
    async fn round_trip_ms(&self, host: &str) -> Result<f64> {
        let addr = resolve(host).await?;
        let wait_secs = self.timeout.as_secs().max(1);

        let mut cmd = Command::new(&self.command);
        cmd.args(["-n", "-c", "1", "-W"])
            .arg(wait_secs.to_string())
            .arg(addr.to_string());
        cmd.kill_on_drop(true);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = tokio::time::timeout(self.timeout + Duration::from_secs(1), cmd.output())
            .await
            .map_err(|_| {
                ProbeError::Timeout(format!(
                    "no echo reply from {addr} within {}ms",
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                ProbeError::ProbeBackendFailure(format!("failed to run {}: {e}", self.command))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(%host, %addr, status = %output.status, "ping finished");
        parse_rtt_ms(&stdout).ok_or_else(|| {
            ProbeError::ProbeBackendFailure(format!(
                "no echo reply from {addr} ({})",
                output.status
            ))
        })
    }
}

/// Resolve `host`, preferring IPv4.
async fn resolve(host: &str) -> Result<IpAddr> {
    let addrs: Vec<IpAddr> = lookup_host((host, 0))
        .await
        .map_err(|e| ProbeError::ResolutionFailure(format!("{host}: {e}")))?
        .map(|sa| sa.ip())
        .collect();
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| ProbeError::ResolutionFailure(format!("{host}: no addresses")))
}

/// Extract the reply time from ping output, truncated to whole milliseconds.
fn parse_rtt_ms(stdout: &str) -> Option<f64> {
    stdout.lines().find_map(|line| {
        let (_, rest) = line.rsplit_once("time")?;
        let rest = rest.trim_start();
        if rest.starts_with('<') {
            // "time<1ms": sub-millisecond reply
            return Some(0.0);
        }
        let value = rest.strip_prefix('=')?;
        let number: String = value
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        number.parse::<f64>().ok().map(f64::trunc)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iputils_reply() {
        let out = "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.\n\
                   64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=12.8 ms\n\n\
                   --- 1.1.1.1 ping statistics ---\n\
                   1 packets transmitted, 1 received, 0% packet loss, time 0ms\n\
                   rtt min/avg/max/mdev = 12.812/12.812/12.812/0.000 ms\n";
        assert_eq!(parse_rtt_ms(out), Some(12.0));
    }

    #[test]
    fn host_name_containing_time() {
        let out = "64 bytes from timeserver.example (192.0.2.10): icmp_seq=1 ttl=50 time=48.9 ms";
        assert_eq!(parse_rtt_ms(out), Some(48.0));
    }

    #[test]
    fn parses_sub_millisecond_reply() {
        assert_eq!(parse_rtt_ms("64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.043 ms"), Some(0.0));
        assert_eq!(parse_rtt_ms("Reply from 10.0.0.1: bytes=32 time<1ms TTL=128"), Some(0.0));
    }

    #[test]
    fn no_reply_yields_none() {
        let out = "PING 10.255.255.1 (10.255.255.1) 56(84) bytes of data.\n\n\
                   --- 10.255.255.1 ping statistics ---\n\
                   1 packets transmitted, 0 received, 100% packet loss, time 0ms\n";
        // the summary line's "time 0ms" has no '=' and must not count as a reply
        assert_eq!(parse_rtt_ms(out), None);
    }

    #[tokio::test]
    async fn ip_literal_resolves_locally() {
        assert_eq!(resolve("127.0.0.1").await.unwrap(), IpAddr::from([127, 0, 0, 1]));
    }

    #[tokio::test]
    async fn unresolvable_host_is_resolution_failure() {
        let err = resolve("does-not-exist.invalid").await.unwrap_err();
        assert_eq!(err.kind(), streamstats_core::ErrorKind::ResolutionFailure);
    }
}
