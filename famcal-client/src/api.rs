//! HTTP plumbing shared by every endpoint.

use std::time::Duration;

use famcal_core::config::FamcalConfig;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::envelope::{Envelope, decode_data};
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// Longest slice of a non-JSON error body echoed back to the user.
const MAX_ERROR_BODY: usize = 200;

/// Client for the family calendar REST API.
///
/// Built unauthenticated; attach a session with `with_session` before
/// calling anything but login/register.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Network {
                url: base_url.to_string(),
                source,
            })?;

        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &FamcalConfig) -> ApiResult<Self> {
        Self::new(config.api_base(), Duration::from_secs(config.timeout_secs))
    }

    /// Authenticate every following request with the session's token.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = Some(session.token.clone());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request builder for `path`; `auth` attaches the bearer token.
    pub(crate) fn request(&self, method: Method, path: &str, auth: bool) -> ApiResult<RequestBuilder> {
        let builder = self.http.request(method, self.url(path).as_str());
        if !auth {
            return Ok(builder);
        }

        let token = self.token.as_deref().ok_or(ApiError::NotLoggedIn)?;
        Ok(builder.bearer_auth(token))
    }

    /// Send and decode the envelope's `data` as `T`.
    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let data = self.execute(builder).await?;
        decode_data(data)
    }

    /// Send and discard any payload (deletes).
    pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.execute(builder).await.map(|_| ())
    }

    async fn execute(&self, builder: RequestBuilder) -> ApiResult<Option<Value>> {
        let request = builder.build().map_err(|source| ApiError::Network {
            url: self.base_url.clone(),
            source,
        })?;
        let method = request.method().clone();
        let url = request.url().to_string();

        tracing::debug!(%method, %url, "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, %url, "request rejected as unauthorized");
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.map_err(|source| ApiError::Network {
            url: url.clone(),
            source,
        })?;

        tracing::debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "response");

        if body.trim().is_empty() {
            return if status.is_success() {
                Ok(None)
            } else {
                Err(ApiError::Server {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("request failed").to_string(),
                })
            };
        }

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(ApiError::Decode(e.to_string())),
            Err(_) => {
                return Err(ApiError::Server {
                    status: status.as_u16(),
                    message: body.chars().take(MAX_ERROR_BODY).collect(),
                });
            }
        };

        envelope.into_result(status.as_u16()).inspect_err(|e| {
            tracing::warn!(%method, %url, error = %e, "request failed");
        })
    }
}
