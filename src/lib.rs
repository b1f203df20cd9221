//! tracksformer library
//!
//! Client for the Spotify Web API built around an OAuth 2.0 authorization code
//! login: loading client credentials, sending the user to the consent page,
//! verifying the redirect and exchanging the code for tokens. The resulting
//! token feeds a track search.
//!
//! # Modules
//!
//! - `api` - HTTP endpoint of the local callback listener
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy of the authorization flow and search
//! - `management` - Token cache
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Authorization flow and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use tracksformer::{
//!     config,
//!     spotify::{auth::{Authorizer, Endpoints}, credentials, redirect::ManualPaste},
//! };
//!
//! #[tokio::main]
//! async fn main() -> tracksformer::Result<()> {
//!     let creds = credentials::load_credentials_from_path(&config::spotify_secret_file())?;
//!     let mut authorizer = Authorizer::new(Endpoints::from_config()?)?;
//!     let token = authorizer
//!         .authorize(&creds, &config::spotify_redirect_uri()?, &ManualPaste)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints an informational message with a blue bullet point.
///
/// Used for general information and status updates, such as the consent URL
/// or the prompt for the redirect.
///
/// # Example
///
/// ```
/// info!("Paste the URL you were redirected to:");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication successful!");
/// success!("Found {} tracks.", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the program with exit code 1 right after printing, so it is only
/// used by the CLI layer for failures the user has to fix before retrying.
/// Library code returns errors instead.
///
/// # Example
///
/// ```
/// error!("Authentication failed. Err: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser. Please navigate to the following URL manually:\n{}", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
