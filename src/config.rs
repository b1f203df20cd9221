//! Configuration management for tracksformer.
//!
//! Values are read from environment variables, which may be seeded from a
//! `.env` file in the local data directory. Every endpoint has a default that
//! points at the public Spotify services, so only the secret file has to be
//! provided by the user.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "https://localhost:8082";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8082";

/// Returns the application directory inside the platform data directory.
///
/// - Linux: `~/.local/share/tracksformer`
/// - macOS: `~/Library/Application Support/tracksformer`
/// - Windows: `%LOCALAPPDATA%/tracksformer`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tracksformer");
    path
}

/// Loads environment variables from the `.env` file in the data directory.
///
/// Creates the data directory if it doesn't exist. A missing `.env` file is not
/// an error since every setting can also come from the environment or its
/// default.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn url_var(name: &'static str, default: &str) -> Result<Url, ConfigError> {
    Url::parse(&var_or(name, default)).map_err(|source| ConfigError::InvalidUrl { name, source })
}

/// Spotify OAuth authorization endpoint (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> Result<Url, ConfigError> {
    url_var("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Spotify OAuth token endpoint (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> Result<Url, ConfigError> {
    url_var("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> Result<Url, ConfigError> {
    url_var("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Redirect URI registered for the application (`SPOTIFY_API_REDIRECT_URI`).
///
/// Must match the redirect URI configured in the Spotify dashboard exactly.
pub fn spotify_redirect_uri() -> Result<Url, ConfigError> {
    url_var("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Space-separated scopes to request (`SPOTIFY_API_AUTH_SCOPE`).
///
/// Track search needs no scope, so this is empty unless configured.
pub fn spotify_scope() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_SCOPE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Path of the two-line secret file holding client id and client secret
/// (`SPOTIFY_SECRET_FILE`, default `<data dir>/secret`).
pub fn spotify_secret_file() -> PathBuf {
    env::var_os("SPOTIFY_SECRET_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join("secret"))
}

/// Bind address of the local callback listener (`SERVER_ADDRESS`).
pub fn server_addr() -> Result<SocketAddr, ConfigError> {
    let value = var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
    SocketAddr::from_str(&value).map_err(|_| ConfigError::InvalidAddress {
        name: "SERVER_ADDRESS",
        value,
    })
}
