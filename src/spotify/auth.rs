use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, header::AUTHORIZATION};
use serde::Deserialize;
use url::Url;

use crate::{
    config,
    error::{AuthorizationError, ConfigError, Error, Result, TokenExchangeError},
    spotify::redirect::RedirectCapture,
    types::{
        AuthPhase, AuthorizationCode, AuthorizationRequest, AuthorizationState, Credentials,
        TokenSet,
    },
    utils,
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Authorization and token endpoints of the provider's accounts service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub authorize: Url,
    pub token: Url,
}

impl Endpoints {
    pub fn new(authorize: Url, token: Url) -> Self {
        Self { authorize, token }
    }

    /// Reads both endpoints from the configuration.
    pub fn from_config() -> Result<Self, ConfigError> {
        Ok(Self {
            authorize: config::spotify_apiauth_url()?,
            token: config::spotify_apitoken_url()?,
        })
    }
}

/// Drives the OAuth 2.0 authorization code flow and holds the resulting tokens.
///
/// One `Authorizer` is constructed per session. It walks through
/// [`AuthPhase::Unauthenticated`] → [`AuthPhase::AwaitingRedirect`] →
/// [`AuthPhase::CodeReceived`] → [`AuthPhase::Authorized`]. Any failure on the
/// way returns it to `Unauthenticated` with an explicit error; the caller
/// decides whether to start over.
///
/// Every step is callable on its own, which is how the CLI and the tests use
/// it. [`Authorizer::authorize`] chains them for the common case.
///
/// The token slot is written only by a successful exchange or refresh, so a
/// partially parsed response is never observable.
#[derive(Debug)]
pub struct Authorizer {
    endpoints: Endpoints,
    scope: Option<String>,
    client: Client,
    phase: AuthPhase,
    token: Option<TokenSet>,
}

impl Authorizer {
    pub fn new(endpoints: Endpoints) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(ConfigError::HttpClientBuild)?;

        Ok(Self {
            endpoints,
            scope: None,
            client,
            phase: AuthPhase::Unauthenticated,
            token: None,
        })
    }

    /// Requests the given space-separated scopes in the consent URL.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Restores a token set obtained in an earlier session.
    pub fn with_token(mut self, token: TokenSet) -> Self {
        self.token = Some(token);
        self.phase = AuthPhase::Authorized;
        self
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn token(&self) -> Option<&TokenSet> {
        self.token.as_ref()
    }

    /// `Authorization` header value for Web API calls, once authorized.
    pub fn authorization_header(&self) -> Option<String> {
        match self.phase {
            AuthPhase::Authorized => self.token.as_ref().map(TokenSet::authorization_header),
            _ => None,
        }
    }

    /// Starts an authorization attempt.
    ///
    /// Generates a fresh state and builds the consent URL carrying `client_id`,
    /// `response_type=code`, `redirect_uri`, `state` and, when configured,
    /// `scope`. Presenting the URL to the user and capturing the redirect is up
    /// to the caller.
    ///
    /// Any token held from a previous attempt is dropped.
    pub fn begin_authorization(
        &mut self,
        credentials: &Credentials,
        redirect_uri: &Url,
    ) -> AuthorizationRequest {
        let state = utils::generate_state();

        let mut url = self.endpoints.authorize.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client_id", &credentials.client_id);
            pairs.append_pair("response_type", "code");
            pairs.append_pair("redirect_uri", redirect_uri.as_str());
            pairs.append_pair("state", state.as_str());
            if let Some(scope) = &self.scope {
                pairs.append_pair("scope", scope);
            }
        }

        self.token = None;
        self.phase = AuthPhase::AwaitingRedirect;
        tracing::debug!(authorize_url = %self.endpoints.authorize, "authorization attempt started");

        AuthorizationRequest { url, state }
    }

    /// Validates a captured redirect and extracts the authorization code.
    ///
    /// # Errors
    ///
    /// - [`Error::StateMismatch`] if the redirect carries a `state` other than
    ///   `expected_state`; this check runs before anything else is trusted
    /// - [`AuthorizationError::Denied`] if the provider reported an `error`
    /// - [`AuthorizationError::MissingCode`] if there is no `code`
    /// - [`AuthorizationError::InvalidRedirect`] if the capture is not a URL
    pub fn complete_authorization(
        &mut self,
        redirect_capture: &str,
        expected_state: &AuthorizationState,
    ) -> Result<AuthorizationCode> {
        match parse_redirect(redirect_capture, expected_state) {
            Ok(code) => {
                self.phase = AuthPhase::CodeReceived;
                Ok(code)
            }
            Err(e) => {
                tracing::warn!(error = %e, "authorization redirect rejected");
                self.reset();
                Err(e)
            }
        }
    }

    /// Exchanges an authorization code for a token set.
    ///
    /// Posts `grant_type=authorization_code`, the code and the redirect URI to
    /// the token endpoint, authenticating with HTTP Basic built from the client
    /// credentials. The response fields are kept exactly as received.
    pub async fn exchange_token(
        &mut self,
        code: AuthorizationCode,
        credentials: &Credentials,
        redirect_uri: &Url,
    ) -> Result<TokenSet> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ];

        match self.request_token(&form, credentials).await {
            Ok(token) => {
                self.token = Some(token.clone());
                self.phase = AuthPhase::Authorized;
                Ok(token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token exchange failed");
                self.reset();
                Err(e.into())
            }
        }
    }

    /// Runs the whole flow: begin, capture the redirect, complete, exchange.
    pub async fn authorize<C: RedirectCapture>(
        &mut self,
        credentials: &Credentials,
        redirect_uri: &Url,
        capture: &C,
    ) -> Result<TokenSet> {
        let request = self.begin_authorization(credentials, redirect_uri);

        let captured = match capture.capture(&request.url).await {
            Ok(captured) => captured,
            Err(e) => {
                self.reset();
                return Err(e.into());
            }
        };

        let code = self.complete_authorization(&captured, &request.state)?;
        self.exchange_token(code, credentials, redirect_uri).await
    }

    /// Replaces the held token set using its refresh token.
    ///
    /// The provider may omit `refresh_token` from a refresh response, in which
    /// case the current one stays valid and is carried into the new set. On
    /// failure the held token set is left untouched.
    pub async fn refresh(&mut self, credentials: &Credentials) -> Result<TokenSet> {
        let refresh_token = self
            .token
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or(TokenExchangeError::MissingRefreshToken)?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];

        let mut token = self.request_token(&form, credentials).await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token);
        }

        self.token = Some(token.clone());
        self.phase = AuthPhase::Authorized;
        Ok(token)
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        credentials: &Credentials,
    ) -> Result<TokenSet, TokenExchangeError> {
        let response = self
            .client
            .post(self.endpoints.token.clone())
            .header(
                AUTHORIZATION,
                utils::basic_auth_header(&credentials.client_id, &credentials.client_secret),
            )
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), "token endpoint responded");

        if !status.is_success() {
            return Err(TokenExchangeError::Status {
                status: status.as_u16(),
                message: provider_error_message(&body),
            });
        }

        parse_token_response(&body, Utc::now().timestamp().max(0) as u64)
    }

    fn reset(&mut self) {
        self.token = None;
        self.phase = AuthPhase::Unauthenticated;
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    error: String,
    error_description: Option<String>,
}

/// Extracts the query of a captured redirect and checks it against the state
/// issued for the attempt.
///
/// A present `state` must occur exactly once and equal `expected_state`.
/// `code` and `error` must appear at most once.
pub fn parse_redirect(
    redirect_capture: &str,
    expected_state: &AuthorizationState,
) -> Result<AuthorizationCode> {
    let url = Url::parse(redirect_capture.trim())
        .map_err(|source| AuthorizationError::InvalidRedirect { source })?;
    let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    let states: Vec<&str> = query_values(&params, "state").collect();
    let foreign = states.iter().find(|s| **s != expected_state.as_str());
    if let Some(received) = foreign.or(states.get(1)) {
        return Err(Error::StateMismatch {
            expected: expected_state.to_string(),
            received: received.to_string(),
        });
    }

    if let Some(reason) = single_value(&params, "error")? {
        return Err(AuthorizationError::Denied {
            reason: reason.to_string(),
            description: single_value(&params, "error_description")?.map(str::to_string),
        }
        .into());
    }

    match single_value(&params, "code")? {
        Some(code) if !code.is_empty() => Ok(AuthorizationCode::new(code)),
        _ => Err(AuthorizationError::MissingCode.into()),
    }
}

fn query_values<'a>(
    params: &'a [(String, String)],
    name: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    params
        .iter()
        .filter(move |(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn single_value<'a>(
    params: &'a [(String, String)],
    name: &'static str,
) -> Result<Option<&'a str>, AuthorizationError> {
    let mut values = query_values(params, name);
    let first = values.next();
    match values.next() {
        Some(_) => Err(AuthorizationError::DuplicateParameter(name)),
        None => Ok(first),
    }
}

/// Builds a [`TokenSet`] from a successful token endpoint body.
pub fn parse_token_response(body: &str, obtained_at: u64) -> Result<TokenSet, TokenExchangeError> {
    let de = &mut serde_json::Deserializer::from_str(body);
    let raw: TokenResponse = serde_path_to_error::deserialize(de)?;

    let access_token = raw
        .access_token
        .ok_or(TokenExchangeError::MissingField("access_token"))?;
    let token_type = raw
        .token_type
        .ok_or(TokenExchangeError::MissingField("token_type"))?;
    let expires_in = raw
        .expires_in
        .ok_or(TokenExchangeError::MissingField("expires_in"))?;
    if expires_in <= 0 {
        return Err(TokenExchangeError::InvalidExpiresIn(expires_in));
    }

    Ok(TokenSet {
        access_token,
        token_type,
        expires_in: expires_in as u64,
        refresh_token: raw.refresh_token,
        scope: raw.scope,
        obtained_at,
    })
}

fn provider_error_message(body: &str) -> String {
    match serde_json::from_str::<ProviderError>(body) {
        Ok(ProviderError {
            error,
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(ProviderError { error, .. }) => error,
        Err(_) => body.chars().take(200).collect(),
    }
}
