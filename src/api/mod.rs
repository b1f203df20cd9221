//! # API Module
//!
//! HTTP endpoints of the temporary local server that receives the OAuth
//! redirect when tracksformer runs with `--listen`.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the provider's redirect and forwards its raw query
//!   string to the waiting [`CallbackListener`](crate::spotify::redirect::CallbackListener).
//!   The handler does not interpret `code` or `state`; validation happens in
//!   the authorizer so both capture modes share one code path.
//! - [`health`] - Reports that the listener is up, with the crate name and
//!   version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use tracksformer::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback).layer(Extension(sender)))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
