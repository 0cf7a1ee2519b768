//! HTTP transport.
//!
//! [`HttpGateway`] implements [`Gateway`] over reqwest. Every request carries
//! the current access token (read from the injected [`CredentialStore`] at
//! send time, so a cleared store takes effect immediately) and the response is
//! classified with [`ApiError::from_response`].

use std::{sync::Arc, time::Duration};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{
    ACCESS_TOKEN, ApiError, CharacterSheet, CreateGameResponse, CredentialStore, EventsResponse,
    Gateway, NewFloorResponse, PlayerInfoResponse, PlayerInputRequest, PlayerInputResponse,
    SessionId, SessionsResponse,
};

/// Connection settings for [`HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. An expired request is reported as no response.
    pub timeout: Duration,
}

impl ClientConfig {
    /// API root used when none is configured.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api";
    /// Request timeout used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: Self::DEFAULT_BASE_URL.to_owned(), timeout: Self::DEFAULT_TIMEOUT }
    }
}

/// reqwest-backed [`Gateway`].
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Build a gateway for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built (for
    /// example, no TLS backend is available).
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Network(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    /// API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.get(ACCESS_TOKEN) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = match self.authorize(request).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(path, error = %err, "request got no response");
                return Err(ApiError::no_response());
            },
        };

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|err| {
                tracing::warn!(path, error = %err, "undecodable response body");
                ApiError::Decode(err.to_string())
            });
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        tracing::debug!(path, status = status.as_u16(), class = ?err.class(), "request failed");
        Err(err)
    }
}

impl Gateway for HttpGateway {
    async fn create_game(&self, sheet: &CharacterSheet) -> Result<CreateGameResponse, ApiError> {
        let path = "session/create-game";
        self.execute(path, self.client.post(self.url(path)).json(sheet)).await
    }

    async fn fetch_history(&self, session: SessionId) -> Result<EventsResponse, ApiError> {
        let path = format!("session/{session}/get-events");
        self.execute(&path, self.client.get(self.url(&path))).await
    }

    async fn advance_floor(&self, session: SessionId) -> Result<NewFloorResponse, ApiError> {
        let path = format!("session/{session}/new-floor");
        self.execute(&path, self.client.post(self.url(&path))).await
    }

    async fn submit_action(
        &self,
        session: SessionId,
        input: &PlayerInputRequest,
    ) -> Result<PlayerInputResponse, ApiError> {
        let path = format!("session/{session}/player-input");
        self.execute(&path, self.client.post(self.url(&path)).json(input)).await
    }

    async fn player_info(&self, session: SessionId) -> Result<PlayerInfoResponse, ApiError> {
        let path = format!("session/{session}/player-info");
        self.execute(&path, self.client.get(self.url(&path))).await
    }

    async fn list_sessions(&self) -> Result<SessionsResponse, ApiError> {
        let path = "get-sessions";
        self.execute(path, self.client.get(self.url(path))).await
    }
}
