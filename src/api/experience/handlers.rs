use crate::api::models::*;
use crate::auth::AuthUser;
use crate::storage::Profile;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

pub async fn add_experience_handler(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<ExperienceRequest>,
) -> Result<Json<Profile>, AppError> {
    // Validate
    let entry = request.validate()?;
    let experience_id = entry.id;

    let profile = state
        .store
        .update_profile(user.id, |profile| profile.add_experience(entry))
        .await?
        .ok_or_else(|| AppError::BadRequest(NO_PROFILE.to_string()))?;

    info!(user_id = %user.id, %experience_id, "Experience added");

    Ok(Json(profile))
}

pub async fn remove_experience_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .store
        .update_profile(user.id, |profile| profile.remove_experience(&exp_id))
        .await?
        .ok_or_else(|| AppError::BadRequest(NO_PROFILE.to_string()))?;

    info!(user_id = %user.id, experience_id = %exp_id, "Experience removed");

    Ok(Json(profile))
}
