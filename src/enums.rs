use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── ChainId ─────────────────────────────────────────────────────────

/// Ledgers the token is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "base-sepolia", alias = "baseSepolia")]
    BaseSepolia,
    #[serde(rename = "taiko-hekla-testnet", alias = "taikoHekla")]
    TaikoHekla,
}

impl ChainId {
    /// Canonical identifier used in requests and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::Base => "base",
            ChainId::BaseSepolia => "base-sepolia",
            ChainId::TaikoHekla => "taiko-hekla-testnet",
        }
    }

    /// Prefix for `{PREFIX}_RPC_URL` style environment variables.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ChainId::Base => "BASE",
            ChainId::BaseSepolia => "BASE_SEPOLIA",
            ChainId::TaikoHekla => "TAIKO_HEKLA",
        }
    }

    /// EVM chain id, also the `targetChainId` argument of `bridgeBurn`.
    pub fn evm_chain_id(&self) -> u64 {
        match self {
            ChainId::Base => 8453,
            ChainId::BaseSepolia => 84532,
            ChainId::TaikoHekla => 167009,
        }
    }

    pub fn native_symbol(&self) -> &'static str {
        "ETH"
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChainId::Base => "Base",
            ChainId::BaseSepolia => "Base Sepolia",
            ChainId::TaikoHekla => "Taiko Hekla",
        }
    }

    pub fn all() -> &'static [ChainId] {
        &[ChainId::Base, ChainId::BaseSepolia, ChainId::TaikoHekla]
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" => Ok(ChainId::Base),
            "base-sepolia" | "basesepolia" | "base_sepolia" => Ok(ChainId::BaseSepolia),
            "taiko-hekla-testnet" | "taikohekla" | "taiko-hekla" | "taiko_hekla" => {
                Ok(ChainId::TaikoHekla)
            }
            _ => Err(AppError::UnsupportedChain(s.to_string())),
        }
    }
}

// ─── Asset ───────────────────────────────────────────────────────────

/// Tokens the wallet facade operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// The fiat-backed bridgeable token.
    Clpd,
    Usdc,
}

impl Asset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Clpd => "CLPD",
            Asset::Usdc => "USDC",
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Asset::Clpd => 18,
            Asset::Usdc => 6,
        }
    }

    /// The other side of the CLPD/USDC pool.
    pub fn counterpart(&self) -> Asset {
        match self {
            Asset::Clpd => Asset::Usdc,
            Asset::Usdc => Asset::Clpd,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CLPD" => Ok(Asset::Clpd),
            "USDC" => Ok(Asset::Usdc),
            _ => Err(AppError::InvalidInput(format!(
                "Unsupported token: {}. Supported: CLPD, USDC",
                s
            ))),
        }
    }
}

// ─── OperationKind ───────────────────────────────────────────────────

/// Discriminant of an on-chain operation (no payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    ApproveSpend,
    Transfer,
    Swap,
    AddLiquidity,
    BridgeBurn,
    VerifyInvariant,
    Mint,
    Burn,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ApproveSpend => "approve_spend",
            OperationKind::Transfer => "transfer",
            OperationKind::Swap => "swap",
            OperationKind::AddLiquidity => "add_liquidity",
            OperationKind::BridgeBurn => "bridge_burn",
            OperationKind::VerifyInvariant => "verify_invariant",
            OperationKind::Mint => "mint",
            OperationKind::Burn => "burn",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
