use crate::api::experience::handlers::{add_experience_handler, remove_experience_handler};
use crate::api::models::AppState;
use axum::{
    Router,
    routing::{delete, put},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/experience", put(add_experience_handler))
        .route("/experience/{exp_id}", delete(remove_experience_handler))
}
