use std::sync::Arc;

use ethers::abi::Token;
use ethers::signers::LocalWallet;
use ethers::types::{ Address, U256 };

use super::abi::ERC20_ABI;
use super::read_uint;
use crate::error::Result;
use crate::operations::Operation;
use crate::rpc::ChainClient;

#[derive(Clone)]
pub struct Erc20Token {
    address: Address,
    client: Arc<ChainClient>,
}

impl Erc20Token {
    pub fn new(address: Address, client: Arc<ChainClient>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> &Arc<ChainClient> {
        &self.client
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        read_uint(&self.client, self.address, &ERC20_ABI, "balanceOf", vec![Token::Address(account)]).await
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        read_uint(
            &self.client,
            self.address,
            &ERC20_ABI,
            "allowance",
            vec![Token::Address(owner), Token::Address(spender)]
        ).await
    }

    pub async fn total_supply(&self) -> Result<U256> {
        read_uint(&self.client, self.address, &ERC20_ABI, "totalSupply", vec![]).await
    }

    pub async fn decimals(&self) -> Result<u32> {
        let decimals = read_uint(&self.client, self.address, &ERC20_ABI, "decimals", vec![]).await?;
        Ok(decimals.low_u32())
    }

    pub fn approve(&self, spender: Address, amount: U256, signer: LocalWallet) -> Operation {
        Operation::ApproveSpend {
            token: self.address,
            spender,
            amount,
            signer,
        }
    }

    pub fn transfer(&self, to: Address, amount: U256, signer: LocalWallet) -> Operation {
        Operation::Transfer {
            token: self.address,
            to,
            amount,
            signer,
        }
    }
}
