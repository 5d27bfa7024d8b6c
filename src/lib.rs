//! Ephemeral Chat - short-lived text messages addressed to a username
//!
//! Messages are written through to a durable record store and an expiring
//! cache. Fetch by id reads the cache first; listing a recipient's messages
//! consumes them.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod service;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::MessageService;
pub use tasks::spawn_cleanup_task;
