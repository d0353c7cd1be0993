use amadeus_proxy::{config::Config, directory::CarrierDirectory, routes, AppState};
use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amadeus_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing provider credentials abort startup here.
    let config = Config::from_env()?;
    info!(
        "Starting travel data gateway against {}",
        config.api_base_url
    );

    let carriers = CarrierDirectory::load(config.carrier_directory_path.as_deref())?;

    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(concat!("amadeus-proxy/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let addr = config.server_address();
    let app_state = AppState::new(config, http_client, carriers);
    let app = routes::router(app_state);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
