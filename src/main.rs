use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use wallet_api::config::Config;
use wallet_api::database;
use wallet_api::ledger::{LedgerService, WalletLedger};
use wallet_api::repository::PgWalletRepository;
use wallet_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_api=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting wallet API server...");

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Configuration loaded");

    // Initialize database pool
    let db_pool = database::new_pool(&config.database_url).await?;
    info!("Database connection pool created");

    sqlx::migrate!("./migrations").run(db_pool.as_ref()).await?;
    info!("Database migrations applied");

    // Wire the store and the use-case layer; everything downstream sees
    // trait objects only.
    let repository = Arc::new(PgWalletRepository::new(db_pool.clone()));
    let ledger: Arc<dyn WalletLedger> = Arc::new(LedgerService::new(repository));

    let app_state = AppState {
        ledger,
        config: config.clone(),
    };

    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    // Graceful shutdown
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutting down gracefully...");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
