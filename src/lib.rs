//! Profile service: profile documents with experience, education, social
//! links and avatar resolution, served over a JSON REST API.

pub mod api;
pub mod auth;
pub mod avatar;
pub mod config;
pub mod github;
pub mod normalize;
pub mod storage;

pub use api::{AppState, router};
pub use config::AppConfig;
