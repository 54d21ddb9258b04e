//! Local Cache - a transparent response cache for outbound requests
//!
//! Requests opt in through [`CacheOptions`]. Before dispatch the
//! [`Interceptor`] evaluates the stored entry and arranges for a successful
//! response to be persisted; at dispatch the [`CacheTransport`] replays a
//! fresh entry instead of touching the network. [`CachedClient`] wires both
//! around a real [`Transport`].

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod models;
pub mod storage;
pub mod tasks;
pub mod transport;

pub use cache::{CacheContext, Freshness, KeyPolicy};
pub use client::{CachedClient, Handlers};
pub use config::CacheConfig;
pub use error::{FetchError, StorageError};
pub use interceptor::Interceptor;
pub use models::{CacheMode, CacheOptions, Method, Payload, Request, ResponseKind};
pub use storage::{FileStorage, MemoryStorage, SharedStorage, Storage};
pub use tasks::spawn_sweep_task;
pub use transport::{CacheTransport, Dispatch, HttpTransport, Transport};
