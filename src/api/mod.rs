use std::sync::Arc;

use axum::{ routing::{ get, post }, Router };

pub mod auth;
pub mod balance;
pub mod wallet;

use crate::services::WalletService;
use crate::users::UserDirectory;

#[derive(Clone)]
pub struct AppState {
    pub wallet_service: Arc<WalletService>,
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    pub fn new(wallet_service: Arc<WalletService>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            wallet_service,
            users,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/wallet/bridge", post(wallet::bridge))
        .route("/wallet/transfer-token", post(wallet::transfer_token))
        .route("/wallet/swap-token", post(wallet::swap_token))
        .route("/wallet/swap-quote", get(wallet::swap_quote))
        .route("/wallet/invest", post(wallet::invest))
        .route("/wallet/get-positions", get(balance::get_positions))
        .route("/wallet/balance", get(balance::get_balance))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
