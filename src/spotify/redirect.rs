//! Ways of obtaining the redirect URL after the user has been sent to the
//! consent page.
//!
//! The [`Authorizer`](crate::spotify::auth::Authorizer) never talks to a browser
//! or a terminal itself; it is handed a [`RedirectCapture`] instead.

use std::{future::Future, io, net::SocketAddr, time::Duration};

use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
};
use url::Url;

use crate::{error::AuthorizationError, info, server, warning};

/// Presents the consent URL to the user and returns the URL the provider
/// redirected to, query string included.
pub trait RedirectCapture {
    fn capture(
        &self,
        authorize_url: &Url,
    ) -> impl Future<Output = Result<String, AuthorizationError>>;
}

/// Opens the consent page and asks the user to paste the redirect URL.
#[derive(Debug, Clone, Default)]
pub struct ManualPaste;

impl RedirectCapture for ManualPaste {
    async fn capture(&self, authorize_url: &Url) -> Result<String, AuthorizationError> {
        open_browser(authorize_url);
        info!("Paste the URL you were redirected to:");

        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .map_err(AuthorizationError::capture)?
        .map_err(AuthorizationError::capture)?;

        let line = line.trim();
        if line.is_empty() {
            return Err(AuthorizationError::capture("no redirect URL was entered"));
        }
        Ok(line.to_string())
    }
}

/// Serves the redirect URI locally and waits for the provider to call it.
///
/// Only useful when the registered redirect URI points at this machine over
/// plain HTTP, e.g. `http://127.0.0.1:8082/callback`.
#[derive(Debug, Clone)]
pub struct CallbackListener {
    addr: SocketAddr,
    redirect_uri: Url,
    timeout: Duration,
    open_browser: bool,
}

impl CallbackListener {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(addr: SocketAddr, redirect_uri: Url) -> Self {
        Self {
            addr,
            redirect_uri,
            timeout: Self::DEFAULT_TIMEOUT,
            open_browser: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only prints the consent URL instead of launching a browser.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    /// Rebuilds the full redirect URL from the query the listener received.
    fn redirect_url(&self, query: &str) -> String {
        let mut url = self.redirect_uri.clone();
        url.set_query((!query.is_empty()).then_some(query));
        url.to_string()
    }
}

impl RedirectCapture for CallbackListener {
    async fn capture(&self, authorize_url: &Url) -> Result<String, AuthorizationError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(AuthorizationError::capture)?;
        let (query_tx, mut query_rx) = mpsc::channel::<String>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let path = self.redirect_uri.path().to_string();
        let handle = tokio::spawn(async move {
            server::serve_callback(listener, &path, query_tx, shutdown_rx).await
        });
        tracing::debug!(addr = %self.addr, "callback listener started");

        if self.open_browser {
            open_browser(authorize_url);
        } else {
            info!("Open the following URL to authorize:\n{}", authorize_url);
        }
        info!("Waiting for the authorization redirect...");

        let received = tokio::time::timeout(self.timeout, query_rx.recv()).await;

        let _ = shutdown_tx.send(());
        match handle.await {
            Ok(Err(e)) => tracing::warn!(error = %e, "callback listener stopped with an error"),
            Err(e) => tracing::warn!(error = %e, "callback listener task failed"),
            Ok(Ok(())) => {}
        }

        match received {
            Ok(Some(query)) => Ok(self.redirect_url(&query)),
            Ok(None) => Err(AuthorizationError::capture(
                "callback listener stopped before a redirect arrived",
            )),
            Err(_) => Err(AuthorizationError::capture(format!(
                "no redirect arrived within {} seconds",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn open_browser(url: &Url) {
    if webbrowser::open(url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        );
    } else {
        info!("Opened the authorization page in your browser:\n{}", url);
    }
}
