//! Top-level facade crate for the stream stats exporter.
//!
//! Re-exports the core model and the exporter library so users can depend on a single crate.

pub mod core {
    pub use streamstats_core::*;
}

pub mod exporter {
    pub use streamstats_exporter::*;
}
