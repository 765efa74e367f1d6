//! Shared infrastructure: telemetry initialization.

pub mod telemetry;

pub use telemetry::{init_telemetry, shutdown_telemetry};
