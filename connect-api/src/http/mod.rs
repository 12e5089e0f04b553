// Module: http
// HTTP/JSON API for room signaling and admission control

pub mod error;
pub mod health;
pub mod room;
pub mod session;
pub mod signal;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};
use connect_core::service::{AdmissionService, RelayService, RoomService};
use connect_core::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub room_service: Arc<RoomService>,
    pub admission_service: Arc<AdmissionService>,
    pub relay_service: Arc<RelayService>,
}

/// Create the HTTP router with all routes
pub fn create_router(pool: PgPool, config: &Config) -> Router {
    let state = AppState {
        room_service: Arc::new(RoomService::new(pool.clone(), config.rooms.clone())),
        admission_service: Arc::new(AdmissionService::new(pool.clone())),
        relay_service: Arc::new(RelayService::new(pool, config.signals.clone())),
    };

    let router = Router::new()
        // Health check endpoints (for monitoring probes)
        .merge(health::create_health_router())
        // Room lifecycle
        .route("/api/rooms", post(room::create_room))
        .route("/api/rooms/{room_id}", get(room::check_room))
        .route("/api/rooms/{room_id}/settings", post(room::update_settings))
        .route("/api/rooms/{room_id}/end", post(room::end_room))
        // Admission
        .route("/api/rooms/{room_id}/join", post(session::join_room))
        .route("/api/rooms/{room_id}/leave", post(session::leave_room))
        .route("/api/rooms/{room_id}/waiting", post(session::list_waiting))
        .route(
            "/api/rooms/{room_id}/waiting/{participant_id}/approve",
            post(session::approve_participant),
        )
        .route(
            "/api/rooms/{room_id}/waiting/{participant_id}/deny",
            post(session::deny_participant),
        )
        // Signal relay
        .route("/api/rooms/{room_id}/signals", post(signal::post_signal))
        .route(
            "/api/rooms/{room_id}/signals/poll",
            post(signal::poll_signals),
        );

    // Apply layers before state
    let router = router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Apply state to all routes (must be last)
    router.with_state(state)
}
