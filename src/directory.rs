use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

const BUILTIN_CARRIERS: &str = include_str!("../data/carriers.json");

pub const GENERIC_BOOKING_SEARCH: &str = "https://www.google.com/search?q=flight+booking";

/// Carrier-code → display name and airline name → booking homepage tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarrierDirectory {
    #[serde(default)]
    airlines: HashMap<String, String>,
    #[serde(default)]
    booking_urls: HashMap<String, String>,
}

impl CarrierDirectory {
    pub fn builtin() -> Result<Self> {
        serde_json::from_str(BUILTIN_CARRIERS).context("Built-in carrier directory is invalid")
    }

    /// Built-in tables, with entries from `override_path` layered on top.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut directory = Self::builtin()?;

        if let Some(path) = override_path {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read carrier directory {}", path.display()))?;
            let overrides: CarrierDirectory = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid carrier directory {}", path.display()))?;
            directory.airlines.extend(overrides.airlines);
            directory.booking_urls.extend(overrides.booking_urls);
            info!("Loaded carrier overrides from {}", path.display());
        }

        info!(
            "Carrier directory ready: {} airlines, {} booking sites",
            directory.airlines.len(),
            directory.booking_urls.len()
        );
        Ok(directory)
    }

    /// Display name for a carrier code; unknown codes come back unchanged.
    pub fn airline_name(&self, code: &str) -> String {
        self.airlines
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn booking_link(&self, airline_name: &str, flight_code: &str) -> String {
        if airline_name.is_empty() || flight_code.is_empty() {
            return GENERIC_BOOKING_SEARCH.to_string();
        }

        if let Some(url) = self.booking_urls.get(airline_name) {
            return url.clone();
        }

        let query: String = url::form_urlencoded::byte_serialize(
            format!("{airline_name} {flight_code} booking").as_bytes(),
        )
        .collect();
        format!("https://www.google.com/search?q={query}")
    }
}
