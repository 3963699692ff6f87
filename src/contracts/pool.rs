use std::sync::Arc;

use ethers::abi::Token;
use ethers::signers::LocalWallet;
use ethers::types::{ Address, U256 };

use super::abi::POOL_ABI;
use super::{ read_uint, read_uints };
use crate::error::{ AppError, Result };
use crate::operations::Operation;
use crate::rpc::ChainClient;

/// CLPD/USDC liquidity pool. Reserve 0 is CLPD, reserve 1 is USDC.
#[derive(Clone)]
pub struct LiquidityPool {
    address: Address,
    client: Arc<ChainClient>,
}

impl LiquidityPool {
    pub fn new(address: Address, client: Arc<ChainClient>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn reserves(&self) -> Result<(U256, U256)> {
        let reserves = read_uints(&self.client, self.address, &POOL_ABI, "getReserves", vec![]).await?;
        match reserves.as_slice() {
            [clpd, usdc] => Ok((*clpd, *usdc)),
            _ => Err(AppError::Chain(format!("getReserves returned {} values", reserves.len()))),
        }
    }

    pub async fn total_supply(&self) -> Result<U256> {
        read_uint(&self.client, self.address, &POOL_ABI, "totalSupply", vec![]).await
    }

    /// Liquidity shares held by `account`.
    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        read_uint(&self.client, self.address, &POOL_ABI, "balanceOf", vec![Token::Address(account)]).await
    }

    pub fn add_liquidity(&self, amount: U256, signer: LocalWallet, is_primary_token: bool) -> Operation {
        Operation::AddLiquidity {
            pool: self.address,
            amount,
            signer,
            is_primary_token,
        }
    }
}
