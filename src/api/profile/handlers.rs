use crate::api::models::*;
use crate::auth::AuthUser;
use crate::avatar::{AvatarError, AvatarSource, resolve_avatar};
use crate::storage::{Profile, UserSummary};
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, warn};
use uuid::Uuid;

/// Profile with the owning user's name and avatar attached
pub type PopulatedProfile = Profile<Option<UserSummary>>;

async fn populate(state: &AppState, profiles: Vec<Profile>) -> Vec<PopulatedProfile> {
    let ids: Vec<Uuid> = profiles.iter().map(|p| p.user).collect();
    let users = state.store.find_users(&ids).await;

    profiles
        .into_iter()
        .zip(users)
        .map(|(profile, user)| profile.populate(user.as_ref().map(UserSummary::from)))
        .collect()
}

pub async fn get_own_profile_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PopulatedProfile>, AppError> {
    let profile = state
        .store
        .find_profile_by_user(user.id)
        .await
        .ok_or_else(|| AppError::BadRequest(NO_PROFILE.to_string()))?;

    let mut populated = populate(&state, vec![profile]).await;
    populated
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal("populate dropped the profile".to_string()))
}

pub async fn upsert_profile_handler(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<ProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    // Validate
    let fields = request.validate()?;

    let account = state
        .store
        .find_user(user.id)
        .await
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    // Avatar
    let source = match (fields.usegithubavatar, fields.githubusername.as_deref()) {
        (true, Some(username)) => AvatarSource::GitHub { username },
        _ => AvatarSource::Gravatar {
            email: &account.email,
        },
    };
    let avatar = resolve_avatar(source, &state.github, &state.gravatar)
        .await
        .map_err(|e| match e {
            AvatarError::GitHub(err) => {
                warn!(user_id = %user.id, error = %err, "GitHub avatar lookup failed");
                AppError::NotFound(NO_GITHUB_PROFILE.to_string())
            }
            AvatarError::Url(err) => AppError::Internal(format!("Avatar URL rejected: {}", err)),
        })?;

    state.store.set_user_avatar(user.id, avatar).await?;

    // Upsert
    let profile = state.store.upsert_profile(user.id, fields).await?;

    info!(
        user_id = %user.id,
        profile_id = %profile.id,
        "Profile saved"
    );

    Ok(Json(profile))
}

pub async fn list_profiles_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopulatedProfile>>, AppError> {
    let profiles = state.store.list_profiles().await;
    Ok(Json(populate(&state, profiles).await))
}

pub async fn get_profile_by_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PopulatedProfile>, AppError> {
    let not_found = || AppError::BadRequest(PROFILE_NOT_FOUND.to_string());

    let user_id = Uuid::parse_str(&user_id).map_err(|_| not_found())?;
    let profile = state
        .store
        .find_profile_by_user(user_id)
        .await
        .ok_or_else(not_found)?;

    let mut populated = populate(&state, vec![profile]).await;
    populated.pop().map(Json).ok_or_else(not_found)
}

pub async fn delete_profile_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let posts = state.store.delete_posts_by_user(user.id).await?;
    let profile = state.store.delete_profile_by_user(user.id).await?;
    let account = state.store.delete_user(user.id).await?;

    info!(
        user_id = %user.id,
        posts,
        profile,
        account,
        "User deleted"
    );

    Ok(Json(MessageResponse::new("User deleted")))
}
