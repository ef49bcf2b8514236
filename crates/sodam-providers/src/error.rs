//! Error types for sodam-providers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The transfer delivered no bytes; the upstream never answered with a
    /// body. Callers bail out before parsing.
    #[error("empty payload")]
    EmptyPayload,

    #[error("payload is not valid UTF-8")]
    Utf8,

    /// The upstream answered with its own error document.
    #[error("upstream API error (code {code})")]
    Api { code: String },

    #[error("malformed XML payload: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}
