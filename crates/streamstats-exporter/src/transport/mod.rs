//! Request handling for probe cycles.

pub mod probe;
