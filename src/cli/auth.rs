use url::Url;

use crate::{
    config, error,
    error::Error,
    management::TokenManager,
    spotify::{
        auth::{Authorizer, Endpoints},
        credentials,
        redirect::{CallbackListener, ManualPaste},
    },
    success,
    types::Credentials,
    warning,
};

/// Runs the authorization code flow and caches the resulting token set.
///
/// With `listen` the redirect is received by a local server on
/// `SERVER_ADDRESS`; otherwise the user pastes it into the terminal.
/// `open_browser` only affects the listener, the paste flow always tries it.
pub async fn auth(listen: bool, open_browser: bool) {
    let credentials = load_credentials();
    let mut authorizer = new_authorizer();
    let redirect_uri = match config::spotify_redirect_uri() {
        Ok(uri) => uri,
        Err(e) => error!("Invalid redirect URI. Err: {}", e),
    };

    let result = if listen {
        let addr = match config::server_addr() {
            Ok(addr) => addr,
            Err(e) => error!("Failed to parse server address: {}", e),
        };
        if !listener_can_receive(&redirect_uri) {
            warning!(
                "The local listener only speaks plain HTTP, but the redirect URI is {}. Set SPOTIFY_API_REDIRECT_URI to e.g. http://{}/callback.",
                redirect_uri,
                addr
            );
        }
        let mut capture = CallbackListener::new(addr, redirect_uri.clone());
        if !open_browser {
            capture = capture.without_browser();
        }
        authorizer
            .authorize(&credentials, &redirect_uri, &capture)
            .await
    } else {
        authorizer
            .authorize(&credentials, &redirect_uri, &ManualPaste)
            .await
    };

    match result {
        Ok(token) => {
            if let Err(e) = TokenManager::new().persist(&token).await {
                error!("Failed to save token to cache: {}", e);
            }
            success!("Authentication successful!");
        }
        Err(e @ Error::StateMismatch { .. }) => {
            error!(
                "The redirect does not belong to this login attempt. Run tracksformer auth again.\n Error: {}",
                e
            );
        }
        Err(e) => error!("Authentication failed. Err: {}", e),
    }
}

pub(crate) fn load_credentials() -> Credentials {
    let path = config::spotify_secret_file();
    match credentials::load_credentials_from_path(&path) {
        Ok(c) => c,
        Err(e) => error!(
            "Cannot load client credentials. Put the client id and client secret on two lines in {}\n Error: {}",
            path.display(),
            e
        ),
    }
}

pub(crate) fn new_authorizer() -> Authorizer {
    let endpoints = match Endpoints::from_config() {
        Ok(endpoints) => endpoints,
        Err(e) => error!("Invalid endpoint configuration. Err: {}", e),
    };

    let authorizer = match Authorizer::new(endpoints) {
        Ok(authorizer) => authorizer,
        Err(e) => error!("Cannot set up HTTP client. Err: {}", e),
    };

    match config::spotify_scope() {
        Some(scope) => authorizer.with_scope(scope),
        None => authorizer,
    }
}

// The callback server has no TLS, so only plain HTTP redirects reach it.
fn listener_can_receive(redirect_uri: &Url) -> bool {
    redirect_uri.scheme() == "http"
}
