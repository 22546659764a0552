use crate::config::GravatarConfig;
use crate::github::{GitHubClient, GitHubError};
use crate::normalize::{UrlError, normalize_url};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),
    #[error("avatar URL could not be normalized: {0}")]
    Url(#[from] UrlError),
}

/// Where the stored avatar comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSource<'a> {
    GitHub { username: &'a str },
    Gravatar { email: &'a str },
}

/// Gravatar image URL for an email address, already normalized to https
pub fn gravatar_url(email: &str, config: &GravatarConfig) -> Result<String, UrlError> {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let raw = format!(
        "//www.gravatar.com/avatar/{}?s={}&r={}&d={}",
        hex::encode(digest),
        config.size,
        config.rating,
        config.default_image
    );
    normalize_url(&raw)
}

/// Resolve and normalize the avatar URL for the given source
pub async fn resolve_avatar(
    source: AvatarSource<'_>,
    github: &GitHubClient,
    gravatar: &GravatarConfig,
) -> Result<String, AvatarError> {
    match source {
        AvatarSource::GitHub { username } => {
            let avatar = github.avatar_url(username).await?;
            Ok(normalize_url(&avatar)?)
        }
        AvatarSource::Gravatar { email } => Ok(gravatar_url(email, gravatar)?),
    }
}
