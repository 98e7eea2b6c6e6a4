//! Credential store implementations
//!
//! - [`InMemoryCredentialStore`]: process-lifetime sessions and tests
//! - [`KeychainCredentialStore`]: OS keychain (macOS Keychain, Windows
//!   Credential Manager, Linux Secret Service)

pub mod keychain;
pub mod memory;

pub use keychain::KeychainCredentialStore;
pub use memory::InMemoryCredentialStore;
