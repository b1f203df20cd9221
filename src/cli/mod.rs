//! # CLI Module
//!
//! User-facing command implementations. Each command loads what it needs from
//! the configuration, delegates to [`crate::spotify`] and reports the outcome
//! with the colored output macros. Unrecoverable failures end the process via
//! [`error!`](crate::error!).
//!
//! ## Commands
//!
//! - [`auth`] - Runs the authorization code flow and caches the token set
//! - [`search`] - Looks up tracks by artist and title using the cached token,
//!   refreshing it first when it is about to expire
//!
//! ## Usage Patterns
//!
//! ```bash
//! tracksformer auth                                   # paste the redirect URL
//! tracksformer auth --listen                          # local callback listener
//! tracksformer search --artist "Fleetwood Mac" --title Dreams --limit 5
//! ```

mod auth;
mod search;

pub use auth::auth;
pub use search::search;
