//! RPC error types.

use meridian_types::Network;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("no result in response")]
    NoResult,

    #[error("request timed out")]
    Timeout,

    #[error("transaction relay refused: {0}")]
    RelayRefused(String),

    #[error("no receipt within the deadline")]
    ReceiptTimeout,

    #[error("node is not serving network {0:?}")]
    UnknownNetwork(Network),

    #[error("node busy")]
    Busy,
}

impl RpcError {
    /// Whether a retry at the transport level could plausibly succeed.
    /// Financial endpoints are never retried by callers regardless.
    pub fn is_transient(&self) -> bool {
        match self {
            RpcError::Busy | RpcError::Timeout => true,
            RpcError::Http(e) => e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_and_busy_are_transient() {
        assert!(RpcError::Timeout.is_transient());
        assert!(RpcError::Busy.is_transient());
    }

    #[test]
    fn protocol_errors_are_not_transient() {
        assert!(!RpcError::NoResult.is_transient());
        assert!(!RpcError::Rpc {
            code: -32600,
            message: "invalid request".into(),
        }
        .is_transient());
        assert!(!RpcError::RelayRefused("verification failed".into()).is_transient());
        assert!(!RpcError::ReceiptTimeout.is_transient());
    }
}
