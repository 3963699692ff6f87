use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Encryption error: {0}")] Encryption(String),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Chain error: {0}")] Chain(String),

    #[error("RPC error: {0}")] Rpc(String),

    #[error("Unsupported chain: {0}")] UnsupportedChain(String),

    #[error("Chain not configured: {0}")] ChainNotConfigured(String),

    #[error("Insufficient {symbol} balance: available {available}")] InsufficientBalance {
        symbol: String,
        available: String,
    },

    #[error("Gas funding failed: {0}")] GasFunding(String),

    #[error("Approval failed: {0}")] ApprovalFailed(String),

    #[error("Transaction failed: {0}")] TransactionFailed(String),

    #[error("Invariant violation: {0}")] InvariantViolation(String),

    #[error("Bridge failed at {step}: {reason}")] BridgeFailed {
        step: String,
        reason: String,
    },

    #[error("Timed out after {0}s waiting for confirmation")] Timeout(u64),

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Encryption(_) => "ENCRYPTION_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Chain(_) => "CHAIN_ERROR",
            AppError::Rpc(_) => "RPC_ERROR",
            AppError::UnsupportedChain(_) => "UNSUPPORTED_CHAIN",
            AppError::ChainNotConfigured(_) => "CHAIN_NOT_CONFIGURED",
            AppError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            AppError::GasFunding(_) => "GAS_FUNDING_FAILED",
            AppError::ApprovalFailed(_) => "APPROVAL_FAILED",
            AppError::TransactionFailed(_) => "TRANSACTION_FAILED",
            AppError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            AppError::BridgeFailed { .. } => "BRIDGE_FAILED",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::InvalidAddress => "INVALID_ADDRESS",
            AppError::InvalidPrivateKey => "INVALID_PRIVATE_KEY",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let field = match self {
            AppError::InvalidAddress => Some("address".to_string()),
            AppError::InsufficientBalance { .. } => Some("amount".to_string()),
            AppError::UnsupportedChain(_) => Some("chain".to_string()),
            _ => None,
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Unauthorized => axum::http::StatusCode::UNAUTHORIZED,
            | AppError::InvalidInput(_)
            | AppError::InvalidAddress
            | AppError::UnsupportedChain(_)
            | AppError::InsufficientBalance { .. } => {
                axum::http::StatusCode::BAD_REQUEST
            }
            AppError::Timeout(_) => axum::http::StatusCode::GATEWAY_TIMEOUT,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_insufficient_balance_maps_to_bad_request() {
        let err = AppError::InsufficientBalance {
            symbol: "CLPD".to_string(),
            available: "10".to_string(),
        };
        assert_eq!(err.to_string(), "Insufficient CLPD balance: available 10");

        let response = err.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bridge_failure_is_internal_error() {
        let err = AppError::BridgeFailed {
            step: "Verified1".to_string(),
            reason: "verify failed after burn".to_string(),
        };
        assert_eq!(err.code(), "BRIDGE_FAILED");
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = AppError::Timeout(120);
        assert_eq!(err.code(), "TIMEOUT");
        assert_eq!(err.into_response().status(), axum::http::StatusCode::GATEWAY_TIMEOUT);
    }
}
