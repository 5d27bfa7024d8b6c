//! API Module
//!
//! HTTP handlers and routing for the message REST API.
//!
//! # Endpoints
//! - `GET /` - Service description
//! - `GET /health` - Health check
//! - `POST /chat` - Create a message
//! - `GET /chat/:id` - Fetch a message by id
//! - `GET /chats/:recipient` - List and consume unexpired messages

pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::{ClientIdentity, ClientResolver};
pub use handlers::*;
pub use routes::create_router;
