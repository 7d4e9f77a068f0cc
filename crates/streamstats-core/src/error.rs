//! Error taxonomy shared by the probe core and the exporter.

use thiserror::Error;

/// Stable error kinds (used as log fields and metric labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Target cannot be parsed as a URI with a host.
    InvalidTarget,
    /// Host name did not resolve to an address.
    ResolutionFailure,
    /// Bitrate sampling produced no usable sample.
    NoSignal,
    /// Measurement backend failed to start, play or answer.
    ProbeBackendFailure,
    /// Deadline exceeded.
    Timeout,
    /// Malformed request query.
    InvalidParameter,
    /// Invalid startup configuration.
    Config,
}

impl ErrorKind {
    /// Label representation used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidTarget => "invalid_target",
            ErrorKind::ResolutionFailure => "resolution_failure",
            ErrorKind::NoSignal => "no_signal",
            ErrorKind::ProbeBackendFailure => "probe_backend_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::Config => "config",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProbeError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    #[error("cannot resolve {0}")]
    ResolutionFailure(String),
    #[error("no signal: stream delivered no data during the sampling window")]
    NoSignal,
    #[error("probe backend failure: {0}")]
    ProbeBackendFailure(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("{0}")]
    InvalidParameter(String),
    #[error("config: {0}")]
    Config(String),
}

impl ProbeError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            ProbeError::ResolutionFailure(_) => ErrorKind::ResolutionFailure,
            ProbeError::NoSignal => ErrorKind::NoSignal,
            ProbeError::ProbeBackendFailure(_) => ErrorKind::ProbeBackendFailure,
            ProbeError::Timeout(_) => ErrorKind::Timeout,
            ProbeError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ProbeError::Config(_) => ErrorKind::Config,
        }
    }
}
