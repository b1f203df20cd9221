use axum::{Extension, extract::RawQuery, response::Html};
use tokio::sync::mpsc;
use url::form_urlencoded;

use crate::warning;

pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(queries): Extension<mpsc::Sender<String>>,
) -> Html<&'static str> {
    let query = query.unwrap_or_default();
    let denied = form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == "error");

    // only the first redirect is handed to the authorizer
    if queries.try_send(query).is_err() {
        warning!("Ignoring additional authorization callback.");
        return Html("<h4>This login attempt is already finished.</h4>");
    }

    if denied {
        Html("<h4>Authorization was denied.</h4><p>Close browser window.</p>")
    } else {
        Html("<h2>Authorization received.</h2><p>Close browser window.</p>")
    }
}
