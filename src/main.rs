//! Rotogate - Entry Point
//!
//! Starts gateways for the configured site, optionally fires a test
//! request through the fleet, and tears everything down on Ctrl+C.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rotogate::{GatewaySession, RotatorConfig};

#[tokio::main]
async fn main() -> rotogate::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rotogate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RotatorConfig::from_env()?;
    info!(
        "Starting gateways for site '{}' in {} regions",
        config.site,
        config.regions.len()
    );

    let session = GatewaySession::connect(config).await?;
    for endpoint in session.endpoints() {
        info!("Endpoint: {}", endpoint);
    }

    if let Ok(test_url) = std::env::var("ROTOGATE_TEST_URL") {
        let request = reqwest::Request::new(reqwest::Method::GET, url::Url::parse(&test_url)?);
        match session.send(request).await {
            Ok(response) => info!("Test request to {} returned {}", test_url, response.status()),
            Err(e) => error!("Test request failed: {}", e),
        }
    }

    info!("Press Ctrl+C to shut down gateways");
    tokio::signal::ctrl_c().await?;

    let results = session.close().await?;
    let total: usize = results.iter().map(|r| r.deleted.len()).sum();
    info!("Shut down {} gateways", total);
    Ok(())
}
