//! Observability bootstrap
//!
//! Conduit only emits `tracing` events; installing a subscriber is left to
//! the application. [`init_tracing`] is the stock setup for binaries and
//! examples that do not bring their own.

pub mod logging;

pub use logging::init_tracing;
