use axum::{ extract::{ Query, State }, Json };
use serde::{ Deserialize, Serialize };

use crate::enums::{ Asset, ChainId };
use crate::error::Result;
use crate::services::SwapQuote;

use super::auth::CurrentUser;
use super::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub amount: String,
    pub source_chain: String,
    pub target_chain: String,
}

#[derive(Deserialize)]
pub struct TransferTokenRequest {
    pub to: String,
    pub token: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct TokenAmountRequest {
    pub token: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub token: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct TxResponse {
    pub success: bool,
    pub hash: String,
}

impl TxResponse {
    fn ok(hash: String) -> Json<Self> {
        Json(Self { success: true, hash })
    }
}

pub async fn bridge(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<BridgeRequest>
) -> Result<Json<TxResponse>> {
    let source: ChainId = request.source_chain.parse()?;
    let target: ChainId = request.target_chain.parse()?;

    let hash = state.wallet_service.bridge_token(&user, &request.amount, source, target).await?;

    Ok(TxResponse::ok(hash))
}

pub async fn transfer_token(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<TransferTokenRequest>
) -> Result<Json<TxResponse>> {
    let asset: Asset = request.token.parse()?;

    let hash = state.wallet_service.transfer_token(&user, &request.to, asset, &request.amount).await?;

    Ok(TxResponse::ok(hash))
}

pub async fn swap_token(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<TokenAmountRequest>
) -> Result<Json<TxResponse>> {
    let asset: Asset = request.token.parse()?;

    let hash = state.wallet_service.swap_token(&user, asset, &request.amount).await?;

    Ok(TxResponse::ok(hash))
}

pub async fn invest(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<TokenAmountRequest>
) -> Result<Json<TxResponse>> {
    let asset: Asset = request.token.parse()?;

    let hash = state.wallet_service.invest(&user, asset, &request.amount).await?;

    Ok(TxResponse::ok(hash))
}

pub async fn swap_quote(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<QuoteQuery>
) -> Result<Json<SwapQuote>> {
    let asset: Asset = query.token.parse()?;

    let quote = state.wallet_service.quote_swap(asset, &query.amount).await?;

    Ok(Json(quote))
}
