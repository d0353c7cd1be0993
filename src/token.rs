use crate::{
    config::Config,
    error::{AppError, Result},
    types::{AccessCredential, TokenRequest, TokenResponse},
};
use chrono::Utc;
use reqwest::header;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Owns the single provider credential for this process.
///
/// The lock is held across the client-credentials exchange, so concurrent
/// callers that find the credential stale wait for one refresh and then share
/// its result instead of racing to replace it.
#[derive(Debug)]
pub struct TokenManager {
    http_client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
    safety_margin: chrono::Duration,
    credential: Mutex<Option<AccessCredential>>,
}

impl TokenManager {
    pub fn new(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            token_url: config.token_url(),
            client_id: config.api_key.clone(),
            client_secret: config.api_secret.clone(),
            timeout: config.request_timeout,
            safety_margin: chrono::Duration::from_std(config.token_safety_margin)
                .unwrap_or_else(|_| chrono::Duration::minutes(5)),
            credential: Mutex::new(None),
        }
    }

    /// Returns the cached bearer token, exchanging client credentials first if
    /// there is none or it is inside the safety margin of its expiry.
    pub async fn get_token(&self) -> Result<String> {
        let mut credential = self.credential.lock().await;

        if let Some(current) = credential.as_ref() {
            if current.is_valid_at(Utc::now(), self.safety_margin) {
                return Ok(current.token.clone());
            }
            debug!("Cached provider token is within the safety margin, refreshing");
        }

        // Nothing stale survives a failed exchange.
        *credential = None;

        let fresh = self.exchange_client_credentials().await?;
        let token = fresh.token.clone();
        *credential = Some(fresh);
        Ok(token)
    }

    /// Drops the cached credential so the next `get_token` performs an exchange.
    pub async fn invalidate(&self) {
        let mut credential = self.credential.lock().await;
        if credential.take().is_some() {
            info!("Provider token invalidated");
        }
    }

    /// Drops the cached credential only if it is still `rejected`. A credential
    /// another caller refreshed in the meantime is kept.
    pub async fn invalidate_if(&self, rejected: &str) {
        let mut credential = self.credential.lock().await;
        match credential.as_ref() {
            Some(current) if current.token == rejected => {
                *credential = None;
                info!("Provider token invalidated");
            }
            Some(_) => debug!("Rejected token already replaced, keeping the current one"),
            None => {}
        }
    }

    async fn exchange_client_credentials(&self) -> Result<AccessCredential> {
        debug!("Exchanging client credentials at: {}", self.token_url);

        let request = TokenRequest::client_credentials(&self.client_id, &self.client_secret);

        let response = self
            .http_client
            .post(&self.token_url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Token exchange request failed: {}", e);
                AppError::Authentication(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Token exchange failed with status {}: {}", status, error_text);
            return Err(AppError::Authentication(format!("{status}: {error_text}")));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        let token_response: TokenResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse token response: {}", e);
            AppError::Authentication(format!("Failed to parse token response: {}", e))
        })?;

        let credential = AccessCredential::issued_at(Utc::now(), token_response).map_err(|e| {
            error!("Unusable token response: {}", e);
            e
        })?;

        info!(
            "Provider access token refreshed, expires at {}",
            credential.expires_at
        );
        debug!(
            "Using access token: {}...",
            credential.token.chars().take(8).collect::<String>()
        );

        Ok(credential)
    }
}
