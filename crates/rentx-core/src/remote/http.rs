//! HTTP implementation of the remote gateway.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{Car, Checkpoint, PullResponse, RentalRequest, TableChanges, User};
use crate::util::{compact_text, is_http_url, normalize_text_option};

use super::{GatewayError, GatewayResult, RemoteGateway};

#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    client: Client,
    access_token: Option<String>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Build a gateway for `base_url`; every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            client: Client::builder().timeout(timeout).build()?,
            access_token: None,
        })
    }

    /// Attach the bearer token issued by the auth collaborator
    #[must_use]
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = normalize_text_option(access_token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /rentals`; a foreground action outside the sync protocol
    pub async fn create_rental(&self, rental: &RentalRequest) -> GatewayResult<()> {
        let request = self.request(Method::POST, "/rentals").json(rental);
        self.send_empty(request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> GatewayResult<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}

impl RemoteGateway for HttpGateway {
    async fn pull(&self, checkpoint: Checkpoint) -> GatewayResult<PullResponse> {
        let request = self
            .request(Method::GET, "/cars/sync/pull")
            .query(&[("lastPulledVersion", checkpoint.version())]);
        self.send_json(request).await
    }

    async fn push(&self, users: &TableChanges<User>) -> GatewayResult<()> {
        let request = self.request(Method::POST, "/users/sync").json(users);
        self.send_empty(request).await
    }

    async fn fetch_detail(&self, car_id: &str) -> GatewayResult<Car> {
        let path = format!("/cars/{}", urlencoding::encode(car_id));
        self.send_json(self.request(Method::GET, &path)).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

async fn status_error(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    GatewayError::Status {
        status: status.as_u16(),
        message: parse_api_error(status, &body),
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return compact_text(&message);
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed
    }
}

fn normalize_base_url(raw: String) -> GatewayResult<String> {
    let url = normalize_text_option(Some(raw)).ok_or_else(|| {
        GatewayError::InvalidConfiguration("base URL must not be empty".to_string())
    })?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(GatewayError::InvalidConfiguration(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}
