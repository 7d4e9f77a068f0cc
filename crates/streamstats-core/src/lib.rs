//! Stream stats core: probe request/result model and the error taxonomy.
//!
//! This crate defines the contracts shared by the exporter, its probe
//! backends and tests. It carries no transport or runtime dependencies so the
//! validation rules can be exercised without an HTTP stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Malformed query parameters and unparseable targets surface as
//! `ProbeError`/`Result`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod request;
pub mod result;

pub use error::{ErrorKind, ProbeError, Result};
pub use request::{latency_host, ProbeRequest, DEFAULT_PERIOD, DEFAULT_STREAMING_SECONDS, MAX_PERIOD};
pub use result::ProbeResult;
