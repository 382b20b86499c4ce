use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Execution context closed: {0}")]
    ContextClosed(String),

    #[error("SDK error: {0}")]
    Sdk(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
