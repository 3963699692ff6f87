use async_trait::async_trait;
use ethers::abi::{ Abi, Function, Token };
use ethers::signers::LocalWallet;
use ethers::types::{ Address, Bytes, TransactionReceipt, H256, U256 };
use thiserror::Error;

use crate::error::{ AppError, Result };

/// A single contract method invocation: target, ABI entry and arguments.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub to: Address,
    pub function: Function,
    pub args: Vec<Token>,
}

impl ContractCall {
    pub fn new(to: Address, abi: &Abi, method: &str, args: Vec<Token>) -> Result<Self> {
        let function = abi
            .function(method)
            .map_err(|e| AppError::Chain(format!("Unknown contract method {}: {}", method, e)))?
            .clone();

        if function.inputs.len() != args.len() {
            return Err(
                AppError::Chain(
                    format!(
                        "{} expects {} arguments, got {}",
                        method,
                        function.inputs.len(),
                        args.len()
                    )
                )
            );
        }

        Ok(Self { to, function, args })
    }

    pub fn method(&self) -> &str {
        &self.function.name
    }

    pub fn calldata(&self) -> Result<Bytes> {
        self.function
            .encode_input(&self.args)
            .map(Bytes::from)
            .map_err(|e| AppError::Chain(format!("Failed to encode {}: {}", self.method(), e)))
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>> {
        self.function
            .decode_output(data)
            .map_err(|e| AppError::Chain(format!("Failed to decode {}: {}", self.method(), e)))
    }
}

/// Per-call overrides. Unset fields fall back to the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct TxOptions {
    pub gas_limit: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub value: Option<U256>,
}

/// Why a submitted transaction did not produce a successful receipt.
#[derive(Error, Debug, Clone)]
pub enum SendError {
    #[error("insufficient funds for gas: {0}")] InsufficientFunds(String),

    #[error("execution reverted: {reason}")] Reverted {
        hash: Option<H256>,
        reason: String,
    },

    #[error("transaction {0:?} dropped from mempool")] Dropped(H256),

    #[error("{0}")] Rpc(String),
}

impl SendError {
    /// Classify a node/provider error message.
    pub fn from_message(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("insufficient funds") {
            SendError::InsufficientFunds(message)
        } else if lower.contains("revert") {
            SendError::Reverted { hash: None, reason: message }
        } else {
            SendError::Rpc(message)
        }
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, SendError::InsufficientFunds(_))
    }
}

/// Raw access to one chain. `send` and `send_native` resolve once the
/// transaction is mined.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    async fn gas_price(&self) -> Result<U256>;

    async fn native_balance(&self, address: Address) -> Result<U256>;

    /// Read-only `eth_call`, decoded with the call's ABI entry.
    async fn call(&self, call: &ContractCall) -> Result<Vec<Token>>;

    async fn send(
        &self,
        call: &ContractCall,
        signer: &LocalWallet,
        options: &TxOptions
    ) -> std::result::Result<TransactionReceipt, SendError>;

    async fn send_native(
        &self,
        from: &LocalWallet,
        to: Address,
        value: U256
    ) -> std::result::Result<TransactionReceipt, SendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::abi::ERC20_ABI;

    #[test]
    fn test_classify_node_errors() {
        let err = SendError::from_message(
            "insufficient funds for gas * price + value: have 0 want 1000".to_string()
        );
        assert!(err.is_insufficient_funds());

        let err = SendError::from_message("execution reverted: not agent".to_string());
        assert!(matches!(err, SendError::Reverted { .. }));

        let err = SendError::from_message("connection refused".to_string());
        assert!(matches!(err, SendError::Rpc(_)));
    }

    #[test]
    fn test_contract_call_checks_arity() {
        let token = Address::repeat_byte(0x11);
        let call = ContractCall::new(
            token,
            &ERC20_ABI,
            "transfer",
            vec![Token::Address(Address::repeat_byte(0x22)), Token::Uint(U256::from(5))]
        ).unwrap();
        assert_eq!(call.method(), "transfer");
        // 4-byte selector + two 32-byte words
        assert_eq!(call.calldata().unwrap().len(), 68);

        assert!(ContractCall::new(token, &ERC20_ABI, "transfer", vec![]).is_err());
        assert!(ContractCall::new(token, &ERC20_ABI, "mintTokens", vec![]).is_err());
    }
}
