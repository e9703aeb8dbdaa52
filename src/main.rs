use aave_concierge::{
    blockchain::AlloyChainClient,
    config::{AddressBook, Settings},
    create_app, AppState,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Aave Concierge");

    let networks = AddressBook::load(
        Path::new(&settings.chain.mainnet_address_book),
        Path::new(&settings.chain.testnet_address_book),
        &settings.chain.alchemy_api_key,
    )?;
    info!(networks = ?networks.names(), "Address book ready");

    if networks.get(&settings.chain.default_network).is_none() {
        error!(network = %settings.chain.default_network, "Default network is not in the address book");
    }

    let client = Arc::new(AlloyChainClient::new(
        &networks,
        settings.execution.executor_private_key.as_deref(),
    )?);
    info!(mode = %settings.execution.mode, "Chain client initialized");

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port).parse()?;
    let state = AppState::new(settings, networks, client.clone(), client);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server running on {}", addr);
    info!("Liveness:        GET  /");
    info!("Account:         GET  /health/:network/:user, /balance/:network/:user");
    info!("Prices:          GET  /prices/:network");
    info!("Lending:         POST /supply, /borrow, /repay, /build/transaction");
    info!("Simulation:      POST /simulate");
    info!("Transactions:    POST /execute/transaction, GET /gas/estimate/:network/:token/:amount");
    info!("Agent manifest:  GET  /mcp-manifest");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down Aave Concierge");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Received shutdown signal");
}

fn init_logging(level: &str, format: &str) {
    let log_level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("aave_concierge={},tower_http=info", log_level).into())
    };

    match format {
        "json" => tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        "pretty" => tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
        _ => tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }

    info!("Logging initialized with level: {}, format: {}", level, format);
}
