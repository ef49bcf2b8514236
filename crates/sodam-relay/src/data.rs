//! Immutable request/reply types exchanged with the engine.

use std::time::Duration;

use bytes::Bytes;

use crate::error::TransferError;

/// Identifier assigned to each submitted transfer, monotonically increasing
/// per engine instance. Doubles as the queue key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(pub(crate) u64);

impl SubmissionId {
    pub fn value(self) -> u64 { self.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Form-encoded POST, the common case for the upstream APIs.
    #[default]
    Post,
    Get,
}

/// One outbound request, fully configured by the caller.
///
/// Ownership moves into the engine on submit; the engine never inspects the
/// form fields or headers beyond handing them to the transport.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub url:     String,
    pub method:  Method,
    /// `application/x-www-form-urlencoded` body (or query string for GET).
    pub form:    Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl TransferRequest {
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url:     url.into(),
            method:  Method::Post,
            form:    Vec::new(),
            headers: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            ..Self::post(url)
        }
    }

    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The final outcome delivered to a transfer's callback, exactly once.
///
/// On transport failure or sink overflow `error` is set and `body` holds
/// whatever was accumulated before the failure; downstream parsers already
/// validate their input, so partial payloads are safe to hand over.
#[derive(Debug)]
pub struct Reply {
    pub body:  Bytes,
    pub error: Option<TransferError>,
}

impl Reply {
    pub fn is_success(&self) -> bool { self.error.is_none() }

    /// Body as UTF-8, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> { std::str::from_utf8(&self.body).ok() }
}

/// Completion callback. `FnOnce` encodes the at-most-once contract in the
/// type system; captured state replaces an opaque user-data pointer.
pub type ReplyCallback = Box<dyn FnOnce(Reply) + Send + 'static>;

#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Upper bound on a single response body. Exceeding it aborts the
    /// transfer; the callback still fires with the partial body and a
    /// [`TransferError::ResponseTooLarge`] marker.
    pub max_response_bytes: usize,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}
