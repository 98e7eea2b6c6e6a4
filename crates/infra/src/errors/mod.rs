//! Infrastructure error mapping

pub mod conversions;

pub use conversions::{transport_error, InfraError};
