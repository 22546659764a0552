use crate::api::models::*;
use crate::auth::AuthUser;
use crate::storage::Profile;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

pub async fn add_education_handler(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<EducationRequest>,
) -> Result<Json<Profile>, AppError> {
    let entry = request.validate()?;
    let education_id = entry.id;

    let profile = state
        .store
        .update_profile(user.id, |profile| profile.add_education(entry))
        .await?
        .ok_or_else(|| AppError::BadRequest(NO_PROFILE.to_string()))?;

    info!(user_id = %user.id, %education_id, "Education added");

    Ok(Json(profile))
}

pub async fn remove_education_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .store
        .update_profile(user.id, |profile| profile.remove_education(&edu_id))
        .await?
        .ok_or_else(|| AppError::BadRequest(NO_PROFILE.to_string()))?;

    info!(user_id = %user.id, education_id = %edu_id, "Education removed");

    Ok(Json(profile))
}
