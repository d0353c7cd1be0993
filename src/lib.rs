pub mod client;
pub mod config;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod models;
pub mod normalize;
pub mod params;
pub mod routes;
pub mod token;
pub mod types;

use crate::{client::ProviderClient, config::Config, directory::CarrierDirectory};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<ProviderClient>,
    pub carriers: Arc<CarrierDirectory>,
}

impl AppState {
    pub fn new(config: Config, http_client: reqwest::Client, carriers: CarrierDirectory) -> Self {
        let provider = ProviderClient::new(&config, http_client);
        Self {
            config: Arc::new(config),
            provider: Arc::new(provider),
            carriers: Arc::new(carriers),
        }
    }
}
