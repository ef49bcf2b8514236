//! Upstream API collaborators: request builders and payload parsers for the
//! two government dictionary services and the Papago translation service.
//!
//! These are the bodies of the relay callbacks. They treat the payload as
//! untrusted input: empty or malformed documents come back as errors, never
//! panics.

mod error;
pub mod krdict;
pub mod papago;

pub use error::ProviderError;
