use std::collections::HashMap;
use std::env;
use std::time::Duration;

use ethers::types::{ Address, U256 };
use ethers::utils::parse_ether;

use crate::chains::evm::deployments::deployment;
use crate::enums::ChainId;
use crate::rpc::client::{
    ClientSettings,
    DEFAULT_CONFIRMATION_TIMEOUT_SECS,
    DEFAULT_GAS_LIMIT,
    DEFAULT_GAS_TOP_UP_ETHER,
    DEFAULT_HISTORY_CAPACITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub token: Address,
    pub usdc: Option<Address>,
    pub pool: Option<Address>,
    pub router: Option<Address>,
}

/// Per-chain configuration resolved from environment variables.
#[derive(Clone)]
pub struct ChainConfig {
    pub chain: ChainId,
    pub rpc_url: String,
    pub addresses: ContractAddresses,
    pub treasury_private_key: String,
}

#[derive(Clone)]
pub struct Config {
    pub chain_configs: HashMap<ChainId, ChainConfig>,
    /// Chain used for transfers, swaps and pool investments.
    pub home_chain: ChainId,
    pub encryption_key: Vec<u8>,
    pub client: ClientSettings,
    pub server_host: String,
    pub server_port: u16,
    pub users_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let encryption_key_hex = env::var("ENCRYPTION_KEY")?;
        let encryption_key = hex::decode(&encryption_key_hex)
            .map_err(|_| "ENCRYPTION_KEY must be a valid hex string")?;

        if encryption_key.len() != 32 {
            return Err("ENCRYPTION_KEY must be 32 bytes (64 hex characters)".into());
        }

        let treasury_private_key = env::var("TREASURY_PRIVATE_KEY")
            .map_err(|_| "TREASURY_PRIVATE_KEY must be set")?;

        // Only configure chains that have an RPC URL set
        let mut chain_configs = HashMap::new();
        for &chain in ChainId::all() {
            let prefix = chain.env_prefix();
            let Ok(rpc_url) = env::var(format!("{}_RPC_URL", prefix)) else {
                continue;
            };
            if rpc_url.trim().is_empty() {
                continue;
            }

            let addresses = Self::resolve_addresses(chain)?;
            let treasury_private_key = env::var(format!("{}_TREASURY_PRIVATE_KEY", prefix))
                .unwrap_or_else(|_| treasury_private_key.clone());

            chain_configs.insert(chain, ChainConfig {
                chain,
                rpc_url: rpc_url.trim().to_string(),
                addresses,
                treasury_private_key,
            });
        }

        if chain_configs.is_empty() {
            return Err("No chain RPC URLs configured. Set at least one *_RPC_URL env var.".into());
        }

        let home_chain: ChainId = env::var("HOME_CHAIN")
            .unwrap_or_else(|_| ChainId::Base.as_str().to_string())
            .parse()?;
        if !chain_configs.contains_key(&home_chain) {
            return Err(format!("HOME_CHAIN {} has no RPC URL configured", home_chain).into());
        }

        let gas_limit: u64 = env::var("GAS_LIMIT")
            .unwrap_or_else(|_| DEFAULT_GAS_LIMIT.to_string())
            .parse()?;
        let gas_top_up = parse_ether(
            env::var("GAS_TOP_UP_ETHER").unwrap_or_else(|_| DEFAULT_GAS_TOP_UP_ETHER.to_string())
        ).map_err(|e| format!("GAS_TOP_UP_ETHER is not a valid amount: {}", e))?;
        let confirmation_timeout_secs: u64 = env::var("CONFIRMATION_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_CONFIRMATION_TIMEOUT_SECS.to_string())
            .parse()?;
        let history_capacity: usize = env::var("HISTORY_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_HISTORY_CAPACITY.to_string())
            .parse()?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let users_file = env::var("USERS_FILE").ok();

        Ok(Config {
            chain_configs,
            home_chain,
            encryption_key,
            client: ClientSettings {
                gas_limit: U256::from(gas_limit),
                gas_top_up,
                confirmation_timeout: Duration::from_secs(confirmation_timeout_secs),
                history_capacity,
            },
            server_host,
            server_port,
            users_file,
        })
    }

    /// Built-in deployment addresses, each overridable by `{CHAIN}_{CONTRACT}_ADDRESS`.
    fn resolve_addresses(chain: ChainId) -> Result<ContractAddresses, Box<dyn std::error::Error>> {
        let defaults = deployment(chain);
        let prefix = chain.env_prefix();

        let lookup = |name: &str, default: Option<&str>| -> Result<
            Option<Address>,
            Box<dyn std::error::Error>
        > {
            let key = format!("{}_{}_ADDRESS", prefix, name);
            match env::var(&key).ok().or_else(|| default.map(str::to_string)) {
                Some(value) =>
                    value
                        .trim()
                        .parse::<Address>()
                        .map(Some)
                        .map_err(|_| format!("{} is not a valid address", key).into()),
                None => Ok(None),
            }
        };

        let token = lookup("TOKEN", Some(defaults.token))?.ok_or_else(|| {
            format!("{}_TOKEN_ADDRESS must be set", prefix)
        })?;

        Ok(ContractAddresses {
            token,
            usdc: lookup("USDC", defaults.usdc)?,
            pool: lookup("POOL", defaults.pool)?,
            router: lookup("ROUTER", defaults.router)?,
        })
    }

    /// Get list of configured chains.
    pub fn configured_chains(&self) -> Vec<ChainId> {
        self.chain_configs.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_addresses_uses_deployment_table() {
        let addresses = Config::resolve_addresses(ChainId::TaikoHekla).unwrap();
        assert_eq!(
            addresses.token,
            "0x53c04d5FC9F8d5c4f3C45B4da6617868ECEaF636".parse::<Address>().unwrap()
        );
        assert!(addresses.pool.is_none());

        let base = Config::resolve_addresses(ChainId::Base).unwrap();
        assert!(base.usdc.is_some() && base.pool.is_some() && base.router.is_some());
    }
}
