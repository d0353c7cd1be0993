use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        ActivitySearchResult, CheapestDatesResult, FlightSearchResult, HotelSearchResult,
        InspirationResult, LocationSearchResult,
    },
    normalize,
    params::{
        ActivitySearchParams, CheapestDatesParams, FlightSearchParams, HotelSearchParams,
        InspirationParams, LocationSearchParams,
    },
    token::TokenManager,
};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A 401 is retried once with a fresh credential; the second one is surfaced.
const MAX_REAUTH_RETRIES: usize = 1;

pub const FLIGHT_OFFERS: &str = "/v2/shopping/flight-offers";
pub const FLIGHT_DESTINATIONS: &str = "/v1/shopping/flight-destinations";
pub const FLIGHT_DATES: &str = "/v1/shopping/flight-dates";
pub const HOTEL_OFFERS: &str = "/v2/shopping/hotel-offers";
pub const ACTIVITIES: &str = "/v1/shopping/activities";
pub const LOCATIONS: &str = "/v1/reference-data/locations";

#[derive(Debug)]
pub struct ProviderClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    tokens: TokenManager,
}

impl ProviderClient {
    pub fn new(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            tokens: TokenManager::new(config, http_client.clone()),
            http_client,
            base_url: config.api_base_url.clone(),
            timeout: config.request_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Authenticated GET returning the parsed JSON body.
    pub async fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(
            "GET {}?{}",
            url,
            serde_urlencoded::to_string(params).unwrap_or_default()
        );

        let mut reauth_attempts = 0;
        loop {
            let token = self.tokens.get_token().await?;

            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .query(params)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| {
                    error!("Provider request to {} failed: {}", endpoint, e);
                    AppError::transport(&e)
                })?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && reauth_attempts < MAX_REAUTH_RETRIES {
                warn!("Provider rejected token for {}, re-authenticating", endpoint);
                self.tokens.invalidate_if(&token).await;
                reauth_attempts += 1;
                continue;
            }

            let body = response.text().await.map_err(|e| {
                error!("Failed to read provider response from {}: {}", endpoint, e);
                AppError::transport(&e)
            })?;

            if !status.is_success() {
                error!("Provider error {} from {}: {}", status, endpoint, body);
                return Err(AppError::upstream(status.as_u16(), body));
            }

            info!("Provider {} responded {}", endpoint, status);
            return serde_json::from_str(&body).map_err(|e| {
                error!("Provider returned invalid JSON from {}: {}", endpoint, e);
                AppError::upstream(status.as_u16(), format!("Invalid JSON body: {e}"))
            });
        }
    }

    pub async fn search_flights(&self, params: &FlightSearchParams) -> Result<FlightSearchResult> {
        let response = self.request(FLIGHT_OFFERS, &params.query()).await?;
        Ok(normalize::flights(&response))
    }

    pub async fn flight_inspiration(&self, params: &InspirationParams) -> Result<InspirationResult> {
        let response = self.request(FLIGHT_DESTINATIONS, &params.query()).await?;
        Ok(normalize::inspiration(&response))
    }

    pub async fn cheapest_dates(&self, params: &CheapestDatesParams) -> Result<CheapestDatesResult> {
        let response = self.request(FLIGHT_DATES, &params.query()).await?;
        Ok(normalize::cheapest_dates(&response))
    }

    pub async fn search_hotels(&self, params: &HotelSearchParams) -> Result<HotelSearchResult> {
        let response = self.request(HOTEL_OFFERS, &params.query()).await?;
        Ok(normalize::hotels(&response))
    }

    pub async fn search_activities(
        &self,
        params: &ActivitySearchParams,
    ) -> Result<ActivitySearchResult> {
        let response = self.request(ACTIVITIES, &params.query()).await?;
        Ok(normalize::activities(&response))
    }

    pub async fn search_locations(
        &self,
        params: &LocationSearchParams,
    ) -> Result<LocationSearchResult> {
        let response = self.request(LOCATIONS, &params.query()).await?;
        Ok(normalize::locations(&response))
    }

    /// First airport IATA code matching `keyword`; lookup failures read as "not found".
    pub async fn airport_code(&self, keyword: &str) -> Option<String> {
        let params = LocationSearchParams {
            keyword: keyword.to_string(),
        };
        match self.search_locations(&params).await {
            Ok(locations) => normalize::first_airport_code(&locations),
            Err(e) => {
                warn!("Airport lookup for '{}' failed: {}", keyword, e);
                None
            }
        }
    }
}
