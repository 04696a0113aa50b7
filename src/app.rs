use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{routes, services::FbiService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: FbiService,
    /// Only used by the health probe; `None` when the store is not Postgres.
    pub db: Option<PgPool>,
}

pub fn router(state: AppState) -> Router {
    // Any origin is echoed back so browsers may send credentials.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .route("/characters", get(routes::characters::list_characters))
        // Children
        .route("/children", post(routes::children::create_child))
        .route("/children/{id}", get(routes::children::get_child))
        .route("/children/by-username/{username}", get(routes::children::get_child_by_username))
        .route("/children/{id}/parents", get(routes::children::list_parents))
        .route("/children/{id}/logs", get(routes::logs::list_logs).post(routes::logs::log_feeling))
        // Parents
        .route("/parents", post(routes::parents::create_parent))
        .route("/parents/{id}", get(routes::parents::get_parent))
        .route("/parents/{id}/children", get(routes::parents::list_children))
        .route("/parents/{parent_id}/children/{child_id}/linked", get(routes::parents::is_linked))
        .route("/links", post(routes::links::link_parent_child))
        // Auth
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/forgot-password", post(routes::auth::forgot_password))
        .route("/auth/reset-password", post(routes::auth::reset_password))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
