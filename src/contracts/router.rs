use std::sync::Arc;

use ethers::abi::Token;
use ethers::signers::LocalWallet;
use ethers::types::{ Address, U256 };

use super::abi::ROUTER_ABI;
use super::read_uint;
use crate::error::Result;
use crate::operations::Operation;
use crate::rpc::ChainClient;

#[derive(Clone)]
pub struct SwapRouter {
    address: Address,
    client: Arc<ChainClient>,
}

impl SwapRouter {
    pub fn new(address: Address, client: Arc<ChainClient>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn get_amount_out(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address
    ) -> Result<U256> {
        read_uint(
            &self.client,
            self.address,
            &ROUTER_ABI,
            "getAmountOut",
            vec![Token::Uint(amount_in), Token::Address(token_in), Token::Address(token_out)]
        ).await
    }

    /// Price of one CLPD in USDC base units (6 decimals).
    pub async fn price_of_clpd_in_usdc(&self) -> Result<U256> {
        read_uint(&self.client, self.address, &ROUTER_ABI, "getPriceOfCLPDInUSDC", vec![]).await
    }

    /// Price of one USDC in CLPD base units (18 decimals).
    pub async fn price_of_usdc_in_clpd(&self) -> Result<U256> {
        read_uint(&self.client, self.address, &ROUTER_ABI, "getPriceOfUSDCInCLPD", vec![]).await
    }

    pub fn swap(
        &self,
        token_in: Address,
        token_out: Address,
        amount: U256,
        signer: LocalWallet
    ) -> Operation {
        Operation::Swap {
            router: self.address,
            token_in,
            token_out,
            amount,
            signer,
        }
    }
}
