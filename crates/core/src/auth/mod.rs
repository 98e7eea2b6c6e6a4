//! Credential attachment and refresh coordination

pub mod coordinator;

pub use coordinator::{AuthCoordinator, AuthPhase};
