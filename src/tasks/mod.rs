//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweeper: drops expired cache entries and idle rate-limit state

mod cleanup;

pub use cleanup::spawn_cleanup_task;
