use std::time::Duration;

use reqwest::{Client, StatusCode, header::AUTHORIZATION, header::RETRY_AFTER};
use tokio::time::sleep;
use url::Url;

use crate::{
    config,
    error::{ConfigError, SearchError},
    spotify::auth::Authorizer,
    types::{SearchResponse, Track},
};

const MAX_ATTEMPTS: u32 = 3;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional narrowing of a track search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Maximum number of results (the API accepts 1-50).
    pub limit: Option<u8>,
    /// ISO 3166-1 alpha-2 market code.
    pub market: Option<String>,
}

/// Client for the Web API search endpoint.
#[derive(Debug, Clone)]
pub struct Searcher {
    api_url: Url,
    client: Client,
    retry_delay: Option<Duration>,
}

impl Searcher {
    pub fn new(api_url: Url) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(ConfigError::HttpClientBuild)?;

        Ok(Self {
            api_url,
            client,
            retry_delay: None,
        })
    }

    pub fn from_config() -> Result<Self, ConfigError> {
        Self::new(config::spotify_apiurl()?)
    }

    /// Overrides the per-request timeout of the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClientBuild)?;
        Ok(self)
    }

    /// Overrides the pause between retries of throttled or failed requests.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Searches the catalogue for tracks by `artist` titled `title`.
    ///
    /// Uses the authorizer's current token for the `Authorization` header.
    ///
    /// # Retry Logic
    ///
    /// 502 Bad Gateway responses are retried after a 10-second pause and 429
    /// Too Many Requests after the server's `Retry-After`, up to three attempts
    /// in total. Other errors are returned immediately.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Unauthenticated`] if the authorizer holds no token
    /// - [`SearchError::Status`] for a non-success response
    /// - [`SearchError::Http`] for network or decoding failures
    /// - [`SearchError::RetriesExhausted`] if every attempt was throttled
    pub async fn track_search(
        &self,
        authorizer: &Authorizer,
        artist: &str,
        title: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Track>, SearchError> {
        let auth_header = authorizer
            .authorization_header()
            .ok_or(SearchError::Unauthenticated)?;
        let url = self.search_url(artist, title, filters);

        for attempt in 1..=MAX_ATTEMPTS {
            let response = self
                .client
                .get(url.clone())
                .header(AUTHORIZATION, &auth_header)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let res = response.json::<SearchResponse>().await?;
                tracing::debug!(found = res.tracks.items.len(), "track search finished");
                return Ok(res.tracks.items);
            }

            let delay = match status {
                StatusCode::BAD_GATEWAY => BAD_GATEWAY_DELAY,
                StatusCode::TOO_MANY_REQUESTS => response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_AFTER),
                _ => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(SearchError::Status {
                        status: status.as_u16(),
                        message,
                    });
                }
            };

            tracing::warn!(status = status.as_u16(), attempt, "search request will be retried");
            if attempt < MAX_ATTEMPTS {
                sleep(self.retry_delay.unwrap_or(delay)).await;
            }
        }

        Err(SearchError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn search_url(&self, artist: &str, title: &str, filters: &SearchFilters) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("search");
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &format!("artist:{artist} track:{title}"));
            pairs.append_pair("type", "track");
            if let Some(limit) = filters.limit {
                pairs.append_pair("limit", &limit.clamp(1, 50).to_string());
            }
            if let Some(market) = &filters.market {
                pairs.append_pair("market", market);
            }
        }
        url
    }
}
