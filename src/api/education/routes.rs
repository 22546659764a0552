use crate::api::education::handlers::{add_education_handler, remove_education_handler};
use crate::api::models::AppState;
use axum::{
    Router,
    routing::{delete, put},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/education", put(add_education_handler))
        .route("/education/{edu_id}", delete(remove_education_handler))
}
