use crate::api::github::handlers::github_repos_handler;
use crate::api::models::AppState;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route("/github/{username}", get(github_repos_handler))
}
