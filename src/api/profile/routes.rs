use crate::api::models::AppState;
use crate::api::profile::handlers::{
    delete_profile_handler, get_own_profile_handler, get_profile_by_user_handler,
    list_profiles_handler, upsert_profile_handler,
};
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_profiles_handler)
                .post(upsert_profile_handler)
                .delete(delete_profile_handler),
        )
        .route("/me", get(get_own_profile_handler))
        .route("/user/{user_id}", get(get_profile_by_user_handler))
}
