pub mod education;
pub mod experience;
pub mod github;
pub mod models;
pub mod profile;
pub mod validation;

// Re-exports
pub use models::*;

use axum::{Json, Router, extract::State, routing::get};

/// Mount prefix for every profile route
pub const PROFILE_PREFIX: &str = "/api/profile";

// Health handler (simple, keep here)
pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let stats = state.store.stats().await;
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        profiles: stats.profiles,
        users: stats.users,
        posts: stats.posts,
    })
}

/// All routes, with state applied
pub fn router(state: AppState) -> Router {
    let profile_routes = Router::new()
        .merge(profile::routes())
        .merge(experience::routes())
        .merge(education::routes())
        .merge(github::routes());

    Router::new()
        .route("/health", get(health_handler))
        .nest(PROFILE_PREFIX, profile_routes)
        .with_state(state)
}
