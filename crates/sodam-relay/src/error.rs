//! Error types for sodam-relay.

use thiserror::Error;

/// Why a transfer finished without a complete response.
///
/// The engine does not distinguish failure classes beyond these two; DNS,
/// connection, TLS and mid-body read errors all surface as [`Transport`].
///
/// [`Transport`]: TransferError::Transport
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

impl TransferError {
    pub fn is_too_large(&self) -> bool {
        matches!(self, TransferError::ResponseTooLarge { .. })
    }
}
