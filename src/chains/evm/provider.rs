use async_trait::async_trait;
use ethers::{
    abi::Token,
    prelude::*,
    providers::{ Http, Provider },
    types::{ transaction::eip2718::TypedTransaction, Eip1559TransactionRequest, U256 },
};
use std::sync::Arc;

use crate::error::{ AppError, Result };
use crate::providers::{ ChainTransport, ContractCall, SendError, TxOptions };

/// JSON-RPC transport over an ethers HTTP provider.
#[derive(Clone)]
pub struct EvmProvider {
    provider: Arc<Provider<Http>>,
    chain_id: u64,
}

impl EvmProvider {
    pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self> {
        let provider = Provider::<Http>
            ::try_from(rpc_url)
            .map_err(|e| AppError::Rpc(format!("Failed to create provider: {}", e)))?;

        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
        })
    }

    async fn send_signed(
        &self,
        signer: &LocalWallet,
        tx: Eip1559TransactionRequest
    ) -> std::result::Result<TransactionReceipt, SendError> {
        let client = SignerMiddleware::new(
            self.provider.clone(),
            signer.clone().with_chain_id(self.chain_id)
        );

        let pending_tx = client
            .send_transaction(tx, None).await
            .map_err(|e| SendError::from_message(e.to_string()))?;
        let tx_hash = pending_tx.tx_hash();

        tracing::debug!("Broadcast {:?} on chain {}", tx_hash, self.chain_id);

        match pending_tx.await {
            Ok(Some(receipt)) if receipt.status == Some(U64::zero()) =>
                Err(SendError::Reverted {
                    hash: Some(tx_hash),
                    reason: "transaction mined with status 0".to_string(),
                }),
            Ok(Some(receipt)) => Ok(receipt),
            Ok(None) => Err(SendError::Dropped(tx_hash)),
            Err(e) => Err(SendError::from_message(e.to_string())),
        }
    }
}

#[async_trait]
impl ChainTransport for EvmProvider {
    async fn gas_price(&self) -> Result<U256> {
        self.provider
            .get_gas_price().await
            .map_err(|e| AppError::Rpc(format!("Failed to get gas price: {}", e)))
    }

    async fn native_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address, None).await
            .map_err(|e| AppError::Rpc(format!("Failed to get balance: {}", e)))
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<Token>> {
        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .to(call.to)
            .data(call.calldata()?)
            .into();

        let output = self.provider
            .call(&tx, None).await
            .map_err(|e| AppError::Chain(format!("{} call failed: {}", call.method(), e)))?;

        call.decode_output(&output)
    }

    async fn send(
        &self,
        call: &ContractCall,
        signer: &LocalWallet,
        options: &TxOptions
    ) -> std::result::Result<TransactionReceipt, SendError> {
        let data = call.calldata().map_err(|e| SendError::Rpc(e.to_string()))?;

        let mut tx = Eip1559TransactionRequest::new().to(call.to).data(data);
        if let Some(limit) = options.gas_limit {
            tx = tx.gas(limit);
        }
        if let Some(max_fee) = options.max_fee_per_gas {
            tx = tx.max_fee_per_gas(max_fee);
        }
        if let Some(priority_fee) = options.max_priority_fee_per_gas {
            tx = tx.max_priority_fee_per_gas(priority_fee);
        }
        if let Some(value) = options.value {
            tx = tx.value(value);
        }

        self.send_signed(signer, tx).await
    }

    async fn send_native(
        &self,
        from: &LocalWallet,
        to: Address,
        value: U256
    ) -> std::result::Result<TransactionReceipt, SendError> {
        let tx = Eip1559TransactionRequest::new().to(to).value(value);
        self.send_signed(from, tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_rpc_url() {
        assert!(matches!(EvmProvider::new("not a url", 8453), Err(AppError::Rpc(_))));
        assert!(EvmProvider::new("http://localhost:8545", 8453).is_ok());
    }
}
