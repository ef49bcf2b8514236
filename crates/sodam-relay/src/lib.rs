//! Pull-based HTTP request multiplexer.
//!
//! Command handlers build a [`TransferRequest`], attach a completion
//! callback, and call [`Relay::submit`], which returns immediately. The host
//! event loop calls [`Relay::drain`] once per idle tick; drain pumps every
//! in-flight transfer without blocking and invokes the callback of each one
//! that finished, outside the engine lock. If drain is never called, no
//! request ever completes; backpressure is cooperative and follows the
//! caller's loop cadence.
//!
//! The engine is transport-agnostic: production traffic goes through the
//! [`ReqwestTransport`] (enabled by the default `reqwest` feature), tests
//! use scripted mock transports.

mod data;
mod error;
mod queue;
mod relay;
mod sink;
mod transport;

pub use data::{Method, RelayOptions, Reply, ReplyCallback, SubmissionId, TransferRequest};
pub use error::TransferError;
pub use relay::Relay;
pub use sink::ResponseBuffer;
pub use transport::{BoxStream, Transport};

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
