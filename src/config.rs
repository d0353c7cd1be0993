use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.amadeus.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub token_safety_margin: Duration,
    pub carrier_directory_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = required_var("AMADEUS_API_KEY")?;
        let api_secret = required_var("AMADEUS_API_SECRET")?;

        let api_base_url =
            std::env::var("AMADEUS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        url::Url::parse(&api_base_url).context("Invalid AMADEUS_API_BASE")?;

        Ok(Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            api_key,
            api_secret,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),

            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid REQUEST_TIMEOUT_SECS")?,
            ),

            token_safety_margin: Duration::from_secs(
                std::env::var("TOKEN_SAFETY_MARGIN_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .context("Invalid TOKEN_SAFETY_MARGIN_SECS")?,
            ),

            carrier_directory_path: std::env::var("CARRIER_DIRECTORY_PATH")
                .ok()
                .map(PathBuf::from),
        })
    }

    /// Config pointing at an arbitrary provider, with the defaults `from_env` would use.
    pub fn for_provider(api_base_url: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            port: 4000,
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
            token_safety_margin: Duration::from_secs(300),
            carrier_directory_path: None,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/v1/security/oauth2/token", self.api_base_url)
    }

    pub fn server_address(&self) -> SocketAddr {
        ([0, 0, 0, 0], self.port).into()
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .with_context(|| {
            format!("{name} must be set (AMADEUS_API_KEY and AMADEUS_API_SECRET are required)")
        })
}
