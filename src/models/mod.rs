//! Request, option and response models
//!
//! The types the request pipeline passes between the caller, the cache and
//! the transport.

pub mod options;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use options::{CacheMode, CacheOptions, Validator};
pub use request::{Method, Request, ResponseKind};
pub use response::{Completion, Payload};
