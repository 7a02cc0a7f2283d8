use std::time::Duration;

use async_trait::async_trait;
use eoex_core::ShellConfig;
use reqwest::StatusCode;
use tracing::debug;

use crate::payload::Credentials;
use crate::payload::LoginResponse;

const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The backend answered with a non-success status. Carries the response
    /// body, or a generic message when the body was empty.
    #[error("{0}")]
    Rejected(String),

    #[error("could not reach the auth service: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected response from the auth service: {0}")]
    InvalidResponse(String),
}

impl LoginError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, LoginError::Rejected(_))
    }
}

#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LoginError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LoginError::Transport)?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn from_config(config: &ShellConfig) -> Result<Self, LoginError> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError> {
        let url = format!("{}{LOGIN_PATH}", self.base_url);
        debug!(%url, email = %credentials.email, "sending login request");
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(credentials)
            .send()
            .await
            .map_err(LoginError::Transport)?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await.map_err(LoginError::Transport)?;
            return serde_json::from_str::<LoginResponse>(&body)
                .map_err(|err| LoginError::InvalidResponse(err.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        debug!(%status, "login rejected");
        Err(LoginError::Rejected(rejection_message(status, body)))
    }
}

fn rejection_message(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        format!("Request failed ({})", status.as_u16())
    } else {
        body
    }
}
