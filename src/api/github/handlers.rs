use crate::api::models::*;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, warn};

pub async fn github_repos_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repos = state.github.latest_repos(&username).await.map_err(|e| {
        warn!(%username, error = %e, "GitHub repo lookup failed");
        AppError::NotFound(NO_GITHUB_PROFILE.to_string())
    })?;

    info!(
        %username,
        count = repos.as_array().map_or(0, Vec::len),
        "Fetched GitHub repos"
    );

    Ok(Json(repos))
}
