//! Stream stats exporter library entry.
//!
//! Wires config, self metrics, probe backends, the orchestrator and the HTTP
//! surface together. Consumed by the binary (`main.rs`) and by integration
//! tests, which swap the backends for fakes via `AppState::with_probes`.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod probe;
pub mod router;
pub mod transport;
