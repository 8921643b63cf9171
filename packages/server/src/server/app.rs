//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    analyze, copy_result, create_session, delete_session, get_session, health_handler,
};
use crate::server::sessions::SessionRegistry;
use crate::server::static_files::serve_page;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
}

/// Build the Axum application router
///
/// Returns the router and the session registry; `main` needs the registry to
/// run periodic cleanup.
pub fn build_app(server_deps: ServerDeps) -> (Router, Arc<SessionRegistry>) {
    let sessions = Arc::new(SessionRegistry::new(server_deps));

    let app_state = AppState {
        sessions: sessions.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/analyze", post(analyze))
        .route("/api/sessions/:id/copy", post(copy_result))
        .fallback(serve_page)
        .layer(Extension(app_state)) // Add shared state
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    (app, sessions)
}
