//! # Spotify Integration Module
//!
//! Client side of the Spotify Accounts service and the one Web API call
//! tracksformer makes.
//!
//! ## Architecture
//!
//! ```text
//! CLI (auth, search)
//!          ↓
//! Spotify Integration Layer
//!     ├── Credentials (two-line secret file)
//!     ├── Authorization (OAuth 2.0 authorization code grant)
//!     ├── Redirect capture (manual paste or local callback listener)
//!     └── Search (track lookup)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Authentication Strategy
//!
//! The authorization code grant with a confidential client:
//!
//! 1. **State Generation**: 32 random bytes, URL-safe base64, one per attempt
//! 2. **Authorization Request**: User is sent to the consent page with
//!    `client_id`, `response_type=code`, `redirect_uri` and `state`
//! 3. **Redirect Capture**: A [`redirect::RedirectCapture`] hands back the URL
//!    the provider redirected to
//! 4. **Verification**: A returned `state` must match the one issued; an
//!    `error` parameter is reported as a denial
//! 5. **Token Exchange**: The code is posted to the token endpoint with HTTP
//!    Basic client authentication
//!
//! Failures are terminal for the attempt. Nothing is retried inside the flow.
//!
//! ## Error Types
//!
//! - **[`crate::error::Error`]** - authorization flow failures
//! - **[`crate::error::SearchError`]** - search failures
//!
//! ## Usage Patterns
//!
//! ```rust
//! let creds = credentials::load_credentials_from_path(&config::spotify_secret_file())?;
//! let mut authorizer = auth::Authorizer::new(auth::Endpoints::from_config()?)?;
//! authorizer
//!     .authorize(&creds, &config::spotify_redirect_uri()?, &redirect::ManualPaste)
//!     .await?;
//!
//! let tracks = search::Searcher::from_config()?
//!     .track_search(&authorizer, "Fleetwood Mac", "Dreams", &Default::default())
//!     .await?;
//! ```

pub mod auth;
pub mod credentials;
pub mod redirect;
pub mod search;
