//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Register/login/logout under `/api/user` and `/api/teacher`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/profile", get(http::http_get_profile))
        .route("/api/v1/lessons", get(http::http_get_lessons))
        .route("/api/v1/lessons/:id", get(http::http_get_lesson))
        .route("/api/v1/challenges", get(http::http_get_challenges))
        .route("/api/v1/challenges/join", post(http::http_post_join_challenge))
        .route("/api/v1/badges", get(http::http_get_badges))
        .route("/api/v1/leaderboard", get(http::http_get_leaderboard))
        .route("/api/v1/quiz", post(http::http_post_quiz))
        .route("/api/v1/points", post(http::http_post_points))
        // Account boundary, one router per role
        .route("/api/user/register", post(http::http_user_register))
        .route("/api/user/login", post(http::http_user_login))
        .route("/api/user/logout", get(http::http_user_logout))
        .route("/api/teacher/register", post(http::http_teacher_register))
        .route("/api/teacher/login", post(http::http_teacher_login))
        .route("/api/teacher/logout", get(http::http_teacher_logout))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
