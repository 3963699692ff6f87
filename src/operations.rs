use ethers::abi::Token;
use ethers::signers::{ LocalWallet, Signer };
use ethers::types::{ Address, Log, TransactionReceipt, H256, U256 };
use serde::Serialize;

use crate::contracts::abi::{ BRIDGEABLE_TOKEN_ABI, ERC20_ABI, POOL_ABI, ROUTER_ABI };
use crate::enums::OperationKind;
use crate::error::{ AppError, Result };
use crate::providers::{ ContractCall, TxOptions };
use crate::rpc::ChainClient;

/// Why an operation did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The contract rejected the call (receipt status 0 or revert on estimation).
    Reverted,
    /// Still short of native gas after the one funded retry.
    InsufficientGas,
    Dropped,
    Timeout,
    Rpc,
}

/// Outcome of one submitted operation.
#[derive(Debug, Clone, Default)]
pub struct TransactionResult {
    pub success: bool,
    pub hash: Option<H256>,
    pub receipt: Option<TransactionReceipt>,
    pub logs: Vec<Log>,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
}

impl TransactionResult {
    pub fn confirmed(receipt: TransactionReceipt) -> Self {
        Self {
            success: true,
            hash: Some(receipt.transaction_hash),
            logs: receipt.logs.clone(),
            receipt: Some(receipt),
            error: None,
            failure: None,
        }
    }

    pub fn failed(failure: FailureKind, hash: Option<H256>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            hash,
            receipt: None,
            logs: Vec::new(),
            error: Some(error.into()),
            failure: Some(failure),
        }
    }

    /// `0x`-prefixed hash, or an empty string when nothing was broadcast.
    pub fn hash_hex(&self) -> String {
        self.hash.map(|h| format!("{:?}", h)).unwrap_or_default()
    }

    pub fn error_message(&self) -> String {
        self.error.clone().unwrap_or_else(|| "unknown error".to_string())
    }
}

/// One contract call with its signer. Operations carry no knowledge of the
/// workflow they take part in.
#[derive(Debug, Clone)]
pub enum Operation {
    ApproveSpend {
        token: Address,
        spender: Address,
        amount: U256,
        signer: LocalWallet,
    },
    Transfer {
        token: Address,
        to: Address,
        amount: U256,
        signer: LocalWallet,
    },
    Swap {
        router: Address,
        token_in: Address,
        token_out: Address,
        amount: U256,
        signer: LocalWallet,
    },
    AddLiquidity {
        pool: Address,
        amount: U256,
        signer: LocalWallet,
        is_primary_token: bool,
    },
    BridgeBurn {
        token: Address,
        amount: U256,
        target_chain_id: u64,
        signer: LocalWallet,
    },
    VerifyInvariant {
        token: Address,
        total_supply_all_chains: U256,
        reference_bank_balance: U256,
        agent: LocalWallet,
    },
    Mint {
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
        agent: LocalWallet,
    },
    Burn {
        token: Address,
        amount: U256,
        user: Address,
        signer: LocalWallet,
    },
}

impl Operation {
    /// Build a mint, rejecting mismatched or empty recipient lists.
    pub fn mint(
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
        agent: LocalWallet
    ) -> Result<Self> {
        validate_mint(&recipients, &amounts)?;
        Ok(Operation::Mint { token, recipients, amounts, agent })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::ApproveSpend { .. } => OperationKind::ApproveSpend,
            Operation::Transfer { .. } => OperationKind::Transfer,
            Operation::Swap { .. } => OperationKind::Swap,
            Operation::AddLiquidity { .. } => OperationKind::AddLiquidity,
            Operation::BridgeBurn { .. } => OperationKind::BridgeBurn,
            Operation::VerifyInvariant { .. } => OperationKind::VerifyInvariant,
            Operation::Mint { .. } => OperationKind::Mint,
            Operation::Burn { .. } => OperationKind::Burn,
        }
    }

    pub fn signer(&self) -> &LocalWallet {
        match self {
            | Operation::ApproveSpend { signer, .. }
            | Operation::Transfer { signer, .. }
            | Operation::Swap { signer, .. }
            | Operation::AddLiquidity { signer, .. }
            | Operation::BridgeBurn { signer, .. }
            | Operation::Burn { signer, .. } => signer,
            Operation::VerifyInvariant { agent, .. } | Operation::Mint { agent, .. } => agent,
        }
    }

    /// Contract the operation is sent to.
    pub fn target(&self) -> Address {
        match self {
            | Operation::ApproveSpend { token, .. }
            | Operation::Transfer { token, .. }
            | Operation::BridgeBurn { token, .. }
            | Operation::VerifyInvariant { token, .. }
            | Operation::Mint { token, .. }
            | Operation::Burn { token, .. } => *token,
            Operation::Swap { router, .. } => *router,
            Operation::AddLiquidity { pool, .. } => *pool,
        }
    }

    /// Encode the operation as a contract call.
    pub fn call(&self) -> Result<ContractCall> {
        let target = self.target();
        match self {
            Operation::ApproveSpend { spender, amount, .. } =>
                ContractCall::new(
                    target,
                    &ERC20_ABI,
                    "approve",
                    vec![Token::Address(*spender), Token::Uint(*amount)]
                ),
            Operation::Transfer { to, amount, .. } =>
                ContractCall::new(
                    target,
                    &ERC20_ABI,
                    "transfer",
                    vec![Token::Address(*to), Token::Uint(*amount)]
                ),
            Operation::Swap { token_in, token_out, amount, .. } =>
                ContractCall::new(
                    target,
                    &ROUTER_ABI,
                    "swap",
                    vec![Token::Address(*token_in), Token::Address(*token_out), Token::Uint(*amount)]
                ),
            Operation::AddLiquidity { amount, is_primary_token, .. } => {
                let method = if *is_primary_token {
                    "investCLPDwithoutUSDC"
                } else {
                    "investUSDCwithoutCLPD"
                };
                ContractCall::new(target, &POOL_ABI, method, vec![Token::Uint(*amount)])
            }
            Operation::BridgeBurn { amount, target_chain_id, .. } =>
                ContractCall::new(
                    target,
                    &BRIDGEABLE_TOKEN_ABI,
                    "bridgeBurn",
                    vec![Token::Uint(*amount), Token::Uint(U256::from(*target_chain_id))]
                ),
            Operation::VerifyInvariant { total_supply_all_chains, reference_bank_balance, .. } =>
                ContractCall::new(
                    target,
                    &BRIDGEABLE_TOKEN_ABI,
                    "verifyValueAPI",
                    vec![Token::Uint(*total_supply_all_chains), Token::Uint(*reference_bank_balance)]
                ),
            Operation::Mint { recipients, amounts, .. } => {
                validate_mint(recipients, amounts)?;
                ContractCall::new(
                    target,
                    &BRIDGEABLE_TOKEN_ABI,
                    "mintTokens",
                    vec![
                        Token::Array(recipients.iter().copied().map(Token::Address).collect()),
                        Token::Array(amounts.iter().copied().map(Token::Uint).collect())
                    ]
                )
            }
            Operation::Burn { amount, user, .. } =>
                ContractCall::new(
                    target,
                    &BRIDGEABLE_TOKEN_ABI,
                    "burnTokens",
                    vec![Token::Uint(*amount), Token::Address(*user)]
                ),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Operation::ApproveSpend { token, spender, amount, .. } =>
                format!("Approve {} of token {:?} for {:?}", amount, token, spender),
            Operation::Transfer { token, to, amount, .. } =>
                format!("Transfer {} of token {:?} to {:?}", amount, token, to),
            Operation::Swap { token_in, token_out, amount, .. } =>
                format!("Swap {} from {:?} to {:?}", amount, token_in, token_out),
            Operation::AddLiquidity { amount, is_primary_token, .. } =>
                format!(
                    "Add {} {} to liquidity pool",
                    amount,
                    if *is_primary_token { "CLPD" } else { "USDC" }
                ),
            Operation::BridgeBurn { amount, target_chain_id, signer, .. } =>
                format!(
                    "Bridge-burn {} from {:?} towards chain {}",
                    amount,
                    signer.address(),
                    target_chain_id
                ),
            Operation::VerifyInvariant { total_supply_all_chains, reference_bank_balance, .. } =>
                format!(
                    "Verify invariant with totalSupply={} and bankBalance={}",
                    total_supply_all_chains,
                    reference_bank_balance
                ),
            Operation::Mint { recipients, amounts, .. } => {
                let credits: Vec<String> = recipients
                    .iter()
                    .zip(amounts)
                    .map(|(recipient, amount)| format!("{:?}={}", recipient, amount))
                    .collect();
                format!("Mint tokens for users: {}", credits.join(", "))
            }
            Operation::Burn { amount, user, .. } =>
                format!("Burn {} tokens from user: {:?}", amount, user),
        }
    }

    pub async fn execute(&self, client: &ChainClient) -> Result<TransactionResult> {
        let call = self.call()?;
        client.submit(&call, self.signer(), &TxOptions::default()).await
    }
}

fn validate_mint(recipients: &[Address], amounts: &[U256]) -> Result<()> {
    if recipients.is_empty() {
        return Err(AppError::InvalidInput("Mint requires at least one recipient".to_string()));
    }
    if recipients.len() != amounts.len() {
        return Err(
            AppError::InvalidInput(
                format!(
                    "Mint recipients ({}) and amounts ({}) differ in length",
                    recipients.len(),
                    amounts.len()
                )
            )
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::wallet;

    #[test]
    fn test_add_liquidity_picks_method_by_side() {
        let signer = wallet(1);
        let pool = Address::repeat_byte(0x33);

        let primary = Operation::AddLiquidity {
            pool,
            amount: U256::from(10),
            signer: signer.clone(),
            is_primary_token: true,
        };
        assert_eq!(primary.call().unwrap().method(), "investCLPDwithoutUSDC");

        let quote = Operation::AddLiquidity {
            pool,
            amount: U256::from(10),
            signer,
            is_primary_token: false,
        };
        assert_eq!(quote.call().unwrap().method(), "investUSDCwithoutCLPD");
        assert_eq!(quote.kind(), OperationKind::AddLiquidity);
    }

    #[test]
    fn test_bridge_burn_encodes_target_chain_id() {
        let op = Operation::BridgeBurn {
            token: Address::repeat_byte(0x44),
            amount: U256::from(100),
            target_chain_id: 167009,
            signer: wallet(2),
        };
        let call = op.call().unwrap();
        assert_eq!(call.method(), "bridgeBurn");
        assert_eq!(call.args[1], Token::Uint(U256::from(167009u64)));
        assert_eq!(call.to, Address::repeat_byte(0x44));
    }

    #[test]
    fn test_mint_rejects_mismatched_lists() {
        let token = Address::repeat_byte(0x55);
        let err = Operation::mint(
            token,
            vec![Address::repeat_byte(1), Address::repeat_byte(2)],
            vec![U256::from(1)],
            wallet(3)
        );
        assert!(matches!(err, Err(AppError::InvalidInput(_))));
        assert!(Operation::mint(token, vec![], vec![], wallet(3)).is_err());

        let op = Operation::mint(
            token,
            vec![Address::repeat_byte(1)],
            vec![U256::from(7)],
            wallet(3)
        ).unwrap();
        assert!(op.describe().starts_with("Mint tokens for users:"));
        assert_eq!(op.signer().address(), wallet(3).address());
    }

    #[test]
    fn test_burn_encodes_amount_then_user() {
        let user = Address::repeat_byte(0x66);
        let op = Operation::Burn {
            token: Address::repeat_byte(0x44),
            amount: U256::from(25),
            user,
            signer: wallet(4),
        };

        let call = op.call().unwrap();
        assert_eq!(call.method(), "burnTokens");
        assert_eq!(call.args, vec![Token::Uint(U256::from(25)), Token::Address(user)]);
        assert_eq!(op.kind(), OperationKind::Burn);
        assert!(op.describe().starts_with("Burn 25 tokens from user:"));
    }

    #[test]
    fn test_failed_result_has_empty_hash() {
        let result = TransactionResult::failed(FailureKind::Timeout, None, "slow");
        assert!(!result.success);
        assert_eq!(result.hash_hex(), "");
        assert_eq!(result.error_message(), "slow");
    }
}
