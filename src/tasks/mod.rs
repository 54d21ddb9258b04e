//! Background Tasks Module
//!
//! # Tasks
//! - Expiry Sweep: Purges expired cache entries at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
