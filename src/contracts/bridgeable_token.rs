use std::sync::Arc;

use ethers::signers::LocalWallet;
use ethers::types::{ Address, U256 };

use super::abi::BRIDGEABLE_TOKEN_ABI;
use super::read_uint;
use super::Erc20Token;
use crate::enums::ChainId;
use crate::error::Result;
use crate::operations::Operation;
use crate::rpc::ChainClient;

/// The fiat-backed token: ERC-20 plus agent-gated mint and invariant checks.
#[derive(Clone)]
pub struct BridgeableToken {
    erc20: Erc20Token,
}

impl BridgeableToken {
    pub fn new(address: Address, client: Arc<ChainClient>) -> Self {
        Self { erc20: Erc20Token::new(address, client) }
    }

    pub fn address(&self) -> Address {
        self.erc20.address()
    }

    pub fn as_erc20(&self) -> &Erc20Token {
        &self.erc20
    }

    pub async fn total_supply(&self) -> Result<U256> {
        read_uint(self.erc20.client(), self.address(), &BRIDGEABLE_TOKEN_ABI, "totalSupply", vec![]).await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        self.erc20.balance_of(account).await
    }

    pub fn bridge_burn(&self, amount: U256, target: ChainId, signer: LocalWallet) -> Operation {
        Operation::BridgeBurn {
            token: self.address(),
            amount,
            target_chain_id: target.evm_chain_id(),
            signer,
        }
    }

    pub fn verify_invariant(
        &self,
        total_supply_all_chains: U256,
        reference_bank_balance: U256,
        agent: LocalWallet
    ) -> Operation {
        Operation::VerifyInvariant {
            token: self.address(),
            total_supply_all_chains,
            reference_bank_balance,
            agent,
        }
    }

    pub fn mint(
        &self,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
        agent: LocalWallet
    ) -> Result<Operation> {
        Operation::mint(self.address(), recipients, amounts, agent)
    }

    pub fn burn(&self, amount: U256, user: Address, signer: LocalWallet) -> Operation {
        Operation::Burn {
            token: self.address(),
            amount,
            user,
            signer,
        }
    }
}
