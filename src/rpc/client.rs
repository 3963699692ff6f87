use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{ DateTime, Utc };
use ethers::abi::Token;
use ethers::signers::{ LocalWallet, Signer };
use ethers::types::{ Address, TransactionReceipt, U256, U64 };
use ethers::utils::parse_ether;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::enums::{ ChainId, OperationKind };
use crate::error::{ AppError, Result };
use crate::operations::{ FailureKind, Operation, TransactionResult };
use crate::providers::{ ChainTransport, ContractCall, SendError, TxOptions };

pub const DEFAULT_GAS_LIMIT: u64 = 15_000_000;
pub const DEFAULT_GAS_TOP_UP_ETHER: &str = "0.00005";
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub gas_limit: U256,
    /// Native amount sent from the treasury to a signer that ran out of gas.
    pub gas_top_up: U256,
    pub confirmation_timeout: Duration,
    pub history_capacity: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            gas_limit: U256::from(DEFAULT_GAS_LIMIT),
            gas_top_up: parse_ether(DEFAULT_GAS_TOP_UP_ETHER).unwrap_or_default(),
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub kind: OperationKind,
    pub description: String,
    pub tx_hash: String,
    pub recorded_at: DateTime<Utc>,
}

/// One chain's JSON-RPC endpoint plus the treasury key used to keep
/// signers funded.
pub struct ChainClient {
    chain: ChainId,
    transport: Arc<dyn ChainTransport>,
    treasury: LocalWallet,
    settings: ClientSettings,
    history: RwLock<VecDeque<HistoryEntry>>,
}

impl ChainClient {
    pub fn new(
        chain: ChainId,
        transport: Arc<dyn ChainTransport>,
        treasury: LocalWallet,
        settings: ClientSettings
    ) -> Self {
        Self {
            chain,
            transport,
            treasury,
            settings,
            history: RwLock::new(VecDeque::new()),
        }
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    pub fn treasury(&self) -> &LocalWallet {
        &self.treasury
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub async fn get_gas_price(&self) -> Result<U256> {
        self.transport.gas_price().await
    }

    pub async fn native_balance(&self, address: Address) -> Result<U256> {
        self.transport.native_balance(address).await
    }

    pub async fn call(&self, call: &ContractCall) -> Result<Vec<Token>> {
        self.transport.call(call).await
    }

    /// Sign and send `call`, waiting for it to be mined.
    ///
    /// A signer without native gas is topped up from the treasury and the
    /// call is resubmitted exactly once. Only a failed top-up is returned as
    /// an error; every other failure comes back as `success: false`.
    pub async fn submit(
        &self,
        call: &ContractCall,
        signer: &LocalWallet,
        options: &TxOptions
    ) -> Result<TransactionResult> {
        let gas_price = match self.get_gas_price().await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!("[{}] gas price unavailable for {}: {}", self.chain, call.method(), e);
                return Ok(TransactionResult::failed(FailureKind::Rpc, None, e.to_string()));
            }
        };
        let options = self.resolve_options(options, gas_price);

        match self.send_bounded(call, signer, &options).await {
            Some(Err(SendError::InsufficientFunds(reason))) => {
                tracing::warn!(
                    "[{}] {:?} lacks gas for {}: {}. Funding from treasury",
                    self.chain,
                    signer.address(),
                    call.method(),
                    reason
                );
                self.fund_signer(signer.address()).await?;

                let retried = self.send_bounded(call, signer, &options).await;
                Ok(self.into_result(call, retried))
            }
            outcome => Ok(self.into_result(call, outcome)),
        }
    }

    /// Run an operation and record it in the history when it succeeds.
    pub async fn execute(&self, operation: &Operation) -> Result<TransactionResult> {
        let result = operation.execute(self).await?;

        if result.success {
            tracing::info!(
                "[{}] {} confirmed in {}",
                self.chain,
                operation.describe(),
                result.hash_hex()
            );
            self.record(operation, &result).await;
        } else {
            tracing::warn!(
                "[{}] {} failed ({:?}): {}",
                self.chain,
                operation.describe(),
                result.failure,
                result.error_message()
            );
        }

        Ok(result)
    }

    /// Descriptions of successful operations, oldest first.
    pub async fn history(&self) -> Vec<String> {
        self.history
            .read().await
            .iter()
            .map(|entry| entry.description.clone())
            .collect()
    }

    pub async fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.read().await.iter().cloned().collect()
    }

    async fn record(&self, operation: &Operation, result: &TransactionResult) {
        let capacity = self.settings.history_capacity.max(1);
        let mut history = self.history.write().await;

        history.push_back(HistoryEntry {
            kind: operation.kind(),
            description: operation.describe(),
            tx_hash: result.hash_hex(),
            recorded_at: Utc::now(),
        });
        while history.len() > capacity {
            history.pop_front();
        }
    }

    fn resolve_options(&self, options: &TxOptions, gas_price: U256) -> TxOptions {
        TxOptions {
            gas_limit: Some(options.gas_limit.unwrap_or(self.settings.gas_limit)),
            max_fee_per_gas: Some(options.max_fee_per_gas.unwrap_or(gas_price)),
            max_priority_fee_per_gas: Some(options.max_priority_fee_per_gas.unwrap_or(gas_price)),
            value: options.value,
        }
    }

    /// `None` when the confirmation wait timed out.
    async fn send_bounded(
        &self,
        call: &ContractCall,
        signer: &LocalWallet,
        options: &TxOptions
    ) -> Option<std::result::Result<TransactionReceipt, SendError>> {
        tokio::time
            ::timeout(self.settings.confirmation_timeout, self.transport.send(call, signer, options)).await
            .ok()
    }

    async fn fund_signer(&self, address: Address) -> Result<()> {
        let top_up = self.settings.gas_top_up;
        let available = self.native_balance(self.treasury.address()).await.map_err(|e| {
            AppError::GasFunding(format!("treasury balance unavailable on {}: {}", self.chain, e))
        })?;
        if available < top_up {
            tracing::error!(
                "[{}] Treasury {:?} holds {} wei, cannot top up {:?}",
                self.chain,
                self.treasury.address(),
                available,
                address
            );
            return Err(
                AppError::GasFunding(
                    format!("treasury holds {} wei on {}, top-up needs {}", available, self.chain, top_up)
                )
            );
        }

        let sent = tokio::time::timeout(
            self.settings.confirmation_timeout,
            self.transport.send_native(&self.treasury, address, top_up)
        ).await;

        match sent {
            Ok(Ok(receipt)) if receipt_succeeded(&receipt) => {
                tracing::info!(
                    "[{}] Treasury topped up {:?} with {} wei in {:?}",
                    self.chain,
                    address,
                    top_up,
                    receipt.transaction_hash
                );
                Ok(())
            }
            Ok(Ok(receipt)) =>
                Err(
                    AppError::GasFunding(
                        format!("top-up {:?} reverted on {}", receipt.transaction_hash, self.chain)
                    )
                ),
            Ok(Err(e)) => {
                tracing::error!("[{}] Treasury could not fund {:?}: {}", self.chain, address, e);
                Err(AppError::GasFunding(format!("treasury transfer failed on {}: {}", self.chain, e)))
            }
            Err(_) =>
                Err(
                    AppError::GasFunding(
                        format!(
                            "treasury transfer on {} not confirmed within {}s",
                            self.chain,
                            self.settings.confirmation_timeout.as_secs()
                        )
                    )
                ),
        }
    }

    fn into_result(
        &self,
        call: &ContractCall,
        outcome: Option<std::result::Result<TransactionReceipt, SendError>>
    ) -> TransactionResult {
        match outcome {
            Some(Ok(receipt)) if receipt_succeeded(&receipt) => TransactionResult::confirmed(receipt),
            Some(Ok(receipt)) =>
                TransactionResult::failed(
                    FailureKind::Reverted,
                    Some(receipt.transaction_hash),
                    format!("{} reverted", call.method())
                ),
            Some(Err(SendError::InsufficientFunds(reason))) =>
                TransactionResult::failed(FailureKind::InsufficientGas, None, reason),
            Some(Err(SendError::Reverted { hash, reason })) =>
                TransactionResult::failed(FailureKind::Reverted, hash, reason),
            Some(Err(SendError::Dropped(hash))) =>
                TransactionResult::failed(
                    FailureKind::Dropped,
                    Some(hash),
                    format!("{} dropped before confirmation", call.method())
                ),
            Some(Err(SendError::Rpc(reason))) =>
                TransactionResult::failed(FailureKind::Rpc, None, reason),
            None =>
                TransactionResult::failed(
                    FailureKind::Timeout,
                    None,
                    AppError::Timeout(self.settings.confirmation_timeout.as_secs()).to_string()
                ),
        }
    }
}

fn receipt_succeeded(receipt: &TransactionReceipt) -> bool {
    receipt.status.map_or(true, |status| status == U64::from(1))
}
