//! Satchel Infrastructure Library
//!
//! Tracing subscriber setup for binaries and tests embedding satchel.

pub mod telemetry;

pub use telemetry::{init_json_telemetry, init_telemetry, DEFAULT_FILTER};
