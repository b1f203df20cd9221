use axum::{Extension, Router, routing::get};
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
};

use crate::api;

pub const HEALTH_PATH: &str = "/health";

/// Serves the OAuth redirect on `path`, plus [`HEALTH_PATH`], until
/// `shutdown` fires.
///
/// Each callback's raw query string is forwarded through `queries`.
pub async fn serve_callback(
    listener: TcpListener,
    path: &str,
    queries: mpsc::Sender<String>,
    shutdown: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let mut app = Router::new().route(path, get(api::callback).layer(Extension(queries)));
    if path != HEALTH_PATH {
        app = app.route(HEALTH_PATH, get(api::health));
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await
}
