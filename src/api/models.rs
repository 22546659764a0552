use crate::api::validation::{FieldError, Validator, optional_text};
use crate::auth::AuthKeys;
use crate::config::GravatarConfig;
use crate::github::GitHubClient;
use crate::storage::{DocumentStore, Education, Experience, ProfileFields, Social, StoreError};
use axum::{
    Json,
    extract::{FromRef, FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

pub const NO_PROFILE: &str = "There is no profile for this user";
pub const PROFILE_NOT_FOUND: &str = "Profile not found";
pub const NO_GITHUB_PROFILE: &str = "No Github profile found";
const FROM_MSG: &str = "From date is required and needs to be from the past";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub github: Arc<GitHubClient>,
    pub auth: Arc<AuthKeys>,
    pub gravatar: Arc<GravatarConfig>,
}

impl FromRef<AppState> for Arc<AuthKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// `skills` arrives either as a list or as one comma-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    pub fn into_list(self) -> Vec<String> {
        let raw = match self {
            SkillsInput::List(items) => items,
            SkillsInput::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Request to create or update the caller's profile
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<SkillsInput>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub usegithubavatar: Option<bool>,
}

/// Request to add an experience entry
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// Request to add an education entry
#[derive(Debug, Default, Deserialize)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    #[serde(alias = "feildofstudy")]
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

impl ProfileRequest {
    /// Validate the request and build the stored fields
    pub fn validate(self) -> Result<ProfileFields, Vec<FieldError>> {
        let mut v = Validator::new();

        let status = v.required("status", self.status.as_deref(), "Status is required");
        let skills = self.skills.map(SkillsInput::into_list).unwrap_or_default();
        if skills.is_empty() {
            v.push(FieldError::body("skills", None, "Skills is required"));
        }

        let usegithubavatar = self.usegithubavatar.unwrap_or_default();
        let githubusername = optional_text(self.githubusername);
        if usegithubavatar && githubusername.is_none() {
            v.push(FieldError::body(
                "githubusername",
                None,
                "GitHub username is required to use the GitHub avatar",
            ));
        }

        // an explicitly blank website is kept as blank
        let website = match self.website.as_deref().map(str::trim) {
            Some("") => Some(String::new()),
            other => v.optional_url("website", other),
        };

        let social = Social {
            youtube: v.optional_url("youtube", self.youtube.as_deref()),
            twitter: v.optional_url("twitter", self.twitter.as_deref()),
            instagram: v.optional_url("instagram", self.instagram.as_deref()),
            linkedin: v.optional_url("linkedin", self.linkedin.as_deref()),
            facebook: v.optional_url("facebook", self.facebook.as_deref()),
        };

        v.finish()?;

        Ok(ProfileFields {
            company: optional_text(self.company),
            website,
            location: optional_text(self.location),
            bio: optional_text(self.bio),
            skills,
            status: status.unwrap_or_default(),
            githubusername,
            usegithubavatar,
            social,
        })
    }
}

/// Check `from`/`to`: `from` is required and must precede `to` when given
fn date_range(
    v: &mut Validator,
    from: Option<&str>,
    to: Option<&str>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let from_date = match from.map(str::trim).filter(|f| !f.is_empty()) {
        Some(_) => v.optional_date("from", from, FROM_MSG),
        None => {
            v.push(FieldError::body("from", from, FROM_MSG));
            None
        }
    };
    let to_date = v.optional_date("to", to, "To date is not a valid date");

    if let (Some(f), Some(t)) = (from_date, to_date) {
        if f >= t {
            v.push(FieldError::body("from", from, FROM_MSG));
        }
    }
    (from_date, to_date)
}

impl ExperienceRequest {
    /// Validate the request and build a new entry
    pub fn validate(self) -> Result<Experience, Vec<FieldError>> {
        let mut v = Validator::new();
        let title = v.required("title", self.title.as_deref(), "Title is required");
        let company = v.required("company", self.company.as_deref(), "Company is required");
        let (from, to) = date_range(&mut v, self.from.as_deref(), self.to.as_deref());

        let (Some(title), Some(company), Some(from)) = (title, company, from) else {
            return Err(v.into_errors());
        };
        v.finish()?;

        Ok(Experience {
            id: Uuid::new_v4(),
            title,
            company,
            location: optional_text(self.location),
            from,
            to,
            current: self.current.unwrap_or_default(),
            description: optional_text(self.description),
        })
    }
}

impl EducationRequest {
    /// Validate the request and build a new entry
    pub fn validate(self) -> Result<Education, Vec<FieldError>> {
        let mut v = Validator::new();
        let school = v.required("school", self.school.as_deref(), "School is required");
        let degree = v.required("degree", self.degree.as_deref(), "Degree is required");
        let fieldofstudy = v.required(
            "fieldofstudy",
            self.fieldofstudy.as_deref(),
            "Field of study is required",
        );
        let (from, to) = date_range(&mut v, self.from.as_deref(), self.to.as_deref());

        let (Some(school), Some(degree), Some(fieldofstudy), Some(from)) =
            (school, degree, fieldofstudy, from)
        else {
            return Err(v.into_errors());
        };
        v.finish()?;

        Ok(Education {
            id: Uuid::new_v4(),
            school,
            degree,
            fieldofstudy,
            from,
            to,
            current: self.current.unwrap_or_default(),
            description: optional_text(self.description),
        })
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub profiles: usize,
    pub users: usize,
    pub posts: usize,
}

/// Plain message body used for client errors and confirmations
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

/// JSON body extractor whose rejection is an [`AppError`], so malformed
/// bodies get the same 400 `errors` shape as failed field checks
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError::body(
            "body",
            None,
            rejection.body_text(),
        )])
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response(),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(MessageResponse::new(msg))).into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(MessageResponse::new(msg))).into_response()
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageResponse::new("Server Error")),
                )
                    .into_response()
            }
        }
    }
}
