use alloy_primitives::TxHash;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error("No injected wallet provider")]
    ProviderMissing,

    #[error("No wallet account connected")]
    NotConnected,

    #[error("User rejected the request: {0}")]
    UserRejected(String),

    #[error("Contract read failed: {0}")]
    Read(String),

    #[error("Transaction failed: {0}")]
    Write(String),

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Already subscribed to NewWave")]
    AlreadySubscribed,

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for PortalError {
    fn from(e: serde_json::Error) -> Self {
        PortalError::Serialization(e.to_string())
    }
}
