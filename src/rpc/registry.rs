use std::collections::HashMap;
use std::sync::Arc;

use ethers::signers::LocalWallet;

use crate::chains::evm::{ wallet::signer_for_chain, EvmProvider };
use crate::config::{ Config, ContractAddresses };
use crate::contracts::{ BridgeableToken, Erc20Token, LiquidityPool, SwapRouter };
use crate::enums::ChainId;
use crate::error::{ AppError, Result };
use crate::providers::ChainTransport;
use crate::rpc::{ ChainClient, ClientSettings };

/// Typed handles for every contract deployed on one chain.
#[derive(Clone)]
pub struct ChainContracts {
    pub token: BridgeableToken,
    pub usdc: Option<Erc20Token>,
    pub pool: Option<LiquidityPool>,
    pub router: Option<SwapRouter>,
}

impl ChainContracts {
    pub fn new(addresses: &ContractAddresses, client: &Arc<ChainClient>) -> Self {
        Self {
            token: BridgeableToken::new(addresses.token, client.clone()),
            usdc: addresses.usdc.map(|address| Erc20Token::new(address, client.clone())),
            pool: addresses.pool.map(|address| LiquidityPool::new(address, client.clone())),
            router: addresses.router.map(|address| SwapRouter::new(address, client.clone())),
        }
    }
}

/// Everything needed to talk to one chain.
pub struct ChainEntry {
    pub chain: ChainId,
    pub client: Arc<ChainClient>,
    pub contracts: ChainContracts,
}

impl ChainEntry {
    pub fn new(
        chain: ChainId,
        transport: Arc<dyn ChainTransport>,
        treasury: LocalWallet,
        addresses: &ContractAddresses,
        settings: ClientSettings
    ) -> Self {
        let client = Arc::new(ChainClient::new(chain, transport, treasury, settings));
        let contracts = ChainContracts::new(addresses, &client);

        Self { chain, client, contracts }
    }

    /// Agent key allowed to mint and verify on this chain.
    pub fn treasury(&self) -> &LocalWallet {
        self.client.treasury()
    }

    pub fn usdc(&self) -> Result<&Erc20Token> {
        self.contracts.usdc.as_ref().ok_or_else(|| self.missing("USDC token"))
    }

    pub fn pool(&self) -> Result<&LiquidityPool> {
        self.contracts.pool.as_ref().ok_or_else(|| self.missing("liquidity pool"))
    }

    pub fn router(&self) -> Result<&SwapRouter> {
        self.contracts.router.as_ref().ok_or_else(|| self.missing("swap router"))
    }

    fn missing(&self, contract: &str) -> AppError {
        AppError::ChainNotConfigured(format!("{} has no {}", self.chain, contract))
    }
}

/// Chain id → client, contracts and treasury signer. Built once at startup
/// and read-only afterwards.
#[derive(Default)]
pub struct ChainRegistry {
    entries: HashMap<ChainId, Arc<ChainEntry>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();

        for chain_config in config.chain_configs.values() {
            let chain = chain_config.chain;
            let transport = EvmProvider::new(&chain_config.rpc_url, chain.evm_chain_id())?;
            let treasury = signer_for_chain(&chain_config.treasury_private_key, chain).map_err(|_| {
                AppError::Config(format!("Invalid treasury private key for {}", chain))
            })?;

            registry.insert(
                ChainEntry::new(
                    chain,
                    Arc::new(transport),
                    treasury,
                    &chain_config.addresses,
                    config.client.clone()
                )
            );
            tracing::info!("Registered {} ({})", chain.display_name(), chain.evm_chain_id());
        }

        if registry.entries.is_empty() {
            return Err(AppError::Config("No chains configured".to_string()));
        }

        Ok(registry)
    }

    pub fn insert(&mut self, entry: ChainEntry) {
        self.entries.insert(entry.chain, Arc::new(entry));
    }

    pub fn get(&self, chain: ChainId) -> Result<Arc<ChainEntry>> {
        self.entries
            .get(&chain)
            .cloned()
            .ok_or_else(|| AppError::ChainNotConfigured(chain.to_string()))
    }

    pub fn chains(&self) -> Vec<ChainId> {
        self.entries.keys().copied().collect()
    }
}
