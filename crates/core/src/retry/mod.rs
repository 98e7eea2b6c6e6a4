//! Retry decision engine
//!
//! - [`RetryPolicy`]: pure decision function (retry or not, and how long to wait)
//! - [`AttemptState`]: immutable per-call attempt bookkeeping

pub mod attempt;
pub mod policy;

pub use attempt::AttemptState;
pub use policy::{RetryDecision, RetryPolicy};
