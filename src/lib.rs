// Library root - exports for the binary and for tests

pub mod config;
pub mod database;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod repository;

pub use config::Config;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use ledger::WalletLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn WalletLedger>,
    pub config: Arc<Config>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/wallets", post(handlers::create_wallet))
        .route("/api/v1/wallets", get(handlers::list_wallets))
        .route("/api/v1/wallets/:wallet_id", get(handlers::get_wallet))
        .route("/api/v1/wallets/:wallet_id", patch(handlers::update_wallet))
        .route("/api/v1/wallets/:wallet_id", delete(handlers::delete_wallet))
        .route("/api/v1/wallets/uid/:wallet_uid", get(handlers::get_wallet_by_uid))
        .route("/api/v1/wallet", post(handlers::change_amount))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
