//! Error types for the authorization flow, the token exchange and track search.
//!
//! Every failure of an authorization attempt is terminal for that attempt: it is
//! returned to the caller and never retried internally. The top-level [`Error`]
//! groups the detail enums so the CLI can match on the failure kind.

use std::{io, path::PathBuf};

use thiserror::Error as ThisError;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by the public API.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Client credentials could not be loaded.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    /// The consent step did not yield an authorization code.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    /// The redirect carried a `state` that differs from the one issued.
    #[error("Authorization state mismatch: expected `{expected}`, received `{received}`.")]
    StateMismatch { expected: String, received: String },
    /// The code (or refresh token) could not be exchanged for a token set.
    #[error(transparent)]
    TokenExchange(#[from] TokenExchangeError),
    /// Track search failed.
    #[error(transparent)]
    Search(#[from] SearchError),
    /// Local configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The token cache could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Failures while reading the client credential source.
#[derive(Debug, ThisError)]
pub enum CredentialsError {
    #[error("Cannot read credentials from {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot read credentials: {0}")]
    Io(#[from] io::Error),
    #[error("Credential source is empty.")]
    Empty,
    #[error("Credential source is missing the {0}.")]
    MissingField(&'static str),
}

/// Failures of the consent step.
#[derive(Debug, ThisError)]
pub enum AuthorizationError {
    /// The provider redirected with an `error` parameter, e.g. `access_denied`.
    #[error("Authorization was denied by the provider: {reason}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    Denied {
        reason: String,
        description: Option<String>,
    },
    #[error("Redirect does not contain an authorization code.")]
    MissingCode,
    /// A single-valued redirect parameter appeared more than once.
    #[error("Redirect repeats the `{0}` parameter.")]
    DuplicateParameter(&'static str),
    #[error("Captured redirect is not a valid URL: {source}")]
    InvalidRedirect {
        #[source]
        source: url::ParseError,
    },
    /// The injected redirect capture could not produce a redirect URL.
    #[error("Cannot capture the authorization redirect: {source}")]
    Capture {
        #[source]
        source: BoxError,
    },
}
impl AuthorizationError {
    /// Wraps a failure of a redirect capture implementation.
    pub fn capture(src: impl Into<BoxError>) -> Self {
        Self::Capture { source: src.into() }
    }
}

/// Failures of the token endpoint exchange.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
    #[error("Network error while calling the token endpoint: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Token endpoint responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Token endpoint returned malformed JSON at `{}`: {}", .0.path(), .0.inner())]
    Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error("Token endpoint response is missing `{0}`.")]
    MissingField(&'static str),
    #[error("Token endpoint returned a non-positive expires_in ({0}).")]
    InvalidExpiresIn(i64),
    #[error("No refresh token is held for this session.")]
    MissingRefreshToken,
}

/// Failures of the search call.
#[derive(Debug, ThisError)]
pub enum SearchError {
    #[error("No access token is held. Please run tracksformer auth.")]
    Unauthenticated,
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Search endpoint responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Search endpoint kept throttling after {attempts} attempts.")]
    RetriesExhausted { attempts: u32 },
}

/// Configuration and setup failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{name} is not a valid socket address: {value}")]
    InvalidAddress { name: &'static str, value: String },
    #[error("HTTP client could not be constructed: {0}")]
    HttpClientBuild(#[source] reqwest::Error),
}

/// Failures of the on-disk token cache.
#[derive(Debug, ThisError)]
pub enum CacheError {
    #[error("Token cache I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Token cache is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}
