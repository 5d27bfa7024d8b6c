//! Service Module
//!
//! Message lifecycle: create, fetch by id, and list-and-consume per recipient.

mod lifecycle;

pub use lifecycle::{MessageService, DEFAULT_CACHE_TIMEOUT, DEFAULT_STORE_TIMEOUT};
