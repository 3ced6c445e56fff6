use coord_types::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// RPC-layer failure, kept distinct from [`ClassifiedError`] so
/// `coord-chain-rpc` does not need to depend on stage-level retry
/// policy; call sites convert via [`RpcError::into_classified`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider rate limit: {0}")]
    RateLimited(String),
    #[error("malformed rpc response: {0}")]
    Malformed(String),
}

impl RpcError {
    pub fn into_classified(self) -> ClassifiedError {
        match self {
            RpcError::Transport(m) => ClassifiedError::new(ErrorKind::Network, m),
            RpcError::RateLimited(m) => ClassifiedError::new(ErrorKind::Network, m),
            RpcError::Malformed(m) => ClassifiedError::new(ErrorKind::Unknown, m),
        }
    }
}
