//! Request, response and credential types

pub mod credential;
pub mod envelope;
pub mod request;

pub use credential::Credential;
pub use envelope::{ApiResponse, PageMeta};
pub use request::{Method, RequestDescriptor};
