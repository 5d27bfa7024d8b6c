//! API Routes
//!
//! Configures the Axum router with all message endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_handler, get_handler, health_handler, index_handler, list_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Service description
/// - `GET /health` - Health check with cache statistics
/// - `POST /chat` - Create a message
/// - `GET /chat/:id` - Fetch a message by id
/// - `GET /chats/:recipient` - List and consume a recipient's unexpired messages
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(create_handler))
        .route("/chat/:id", get(get_handler))
        .route("/chats/:recipient", get(list_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
