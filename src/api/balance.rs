use axum::{ extract::{ Query, State }, Json };
use serde::{ Deserialize, Serialize };

use crate::enums::{ Asset, ChainId };
use crate::error::Result;
use crate::services::Positions;

use super::auth::CurrentUser;
use super::AppState;

#[derive(Deserialize)]
pub struct BalanceQuery {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub token: Asset,
    pub chain: ChainId,
    pub balance: String,
}

pub async fn get_balance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BalanceQuery>
) -> Result<Json<BalanceResponse>> {
    let asset = match query.token {
        Some(token) => token.parse()?,
        None => Asset::Clpd,
    };

    let balance = state.wallet_service.get_token_balance(&user, asset).await?;

    Ok(
        Json(BalanceResponse {
            token: asset,
            chain: state.wallet_service.home_chain(),
            balance,
        })
    )
}

pub async fn get_positions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser
) -> Result<Json<Positions>> {
    let positions = state.wallet_service.get_positions(&user).await?;

    Ok(Json(positions))
}
