//! # Conduit Domain
//!
//! Data types and errors shared by every Conduit crate.
//!
//! This crate contains:
//! - The classified error taxonomy handed to callers
//! - Request descriptors, response envelopes and credentials
//! - Client configuration structures
//!
//! ## Architecture
//! - No dependencies on other Conduit crates
//! - No I/O, no async runtime
//! - Pure data structures and their invariants

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
