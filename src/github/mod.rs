pub mod auth;
pub mod client;
pub mod types;

pub use auth::{authenticate, sign_app_jwt, AppClaims, AuthMethod, Credentials, DEFAULT_APP_ID};
pub use client::{CheckRunApi, GitHubClient, DEFAULT_API_URL};
pub use types::{
    CheckRun, CheckRunOutput, CheckStatus, CreateCheckRun, RepoSlug, UpdateCheckRun,
    MAX_ANNOTATIONS_PER_REQUEST,
};
