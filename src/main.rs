use std::sync::Arc;

use token_bridge::{ AppError, Config, Result };
use token_bridge::users::{ InMemoryUserDirectory, UserDirectory };
use tower_http::{ cors::CorsLayer, trace::TraceLayer };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "token_bridge=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;

    tracing::info!(
        "Starting token-bridge with chains {:?}, home chain {}",
        config.configured_chains(),
        config.home_chain
    );

    let encryptor = Arc::new(token_bridge::crypto::Encryptor::new(&config.encryption_key)?);

    let registry = Arc::new(token_bridge::rpc::ChainRegistry::from_config(&config)?);
    tracing::info!("Chain registry initialized");

    let users: Arc<dyn UserDirectory> = match &config.users_file {
        Some(path) => Arc::new(InMemoryUserDirectory::from_file(path)?),
        None => {
            tracing::warn!("USERS_FILE not set; every wallet request will be unauthorized");
            Arc::new(InMemoryUserDirectory::default())
        }
    };

    let mediator = Arc::new(token_bridge::services::Mediator::new(registry.clone()));
    let wallet_service = Arc::new(
        token_bridge::services::WalletService::new(
            registry,
            mediator,
            encryptor,
            config.home_chain
        )
    );

    let app_state = token_bridge::api::AppState::new(wallet_service, users);

    let app = token_bridge::api
        ::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
