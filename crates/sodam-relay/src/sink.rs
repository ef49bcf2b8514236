//! Response sink: accumulates streamed body chunks into one contiguous
//! buffer as the transport delivers them in arbitrary-sized pieces.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Appending past the configured cap; the engine aborts the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("response buffer cap exceeded")]
pub struct SinkOverflow;

/// Growable accumulator for one transfer's response body.
///
/// Invariant: the length only grows during a transfer's lifetime, never
/// shrinks. The cap bounds runaway responses in place of unrecoverable
/// allocation failure; a rejected append leaves the buffer untouched.
#[derive(Debug)]
pub struct ResponseBuffer {
    bytes: BytesMut,
    cap:   usize,
}

impl ResponseBuffer {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            bytes: BytesMut::new(),
            cap,
        }
    }

    pub fn append(&mut self, chunk: &[u8]) -> Result<(), SinkOverflow> {
        if self.bytes.len() + chunk.len() > self.cap {
            return Err(SinkOverflow);
        }

        self.bytes.extend_from_slice(chunk);

        Ok(())
    }

    pub fn len(&self) -> usize { self.bytes.len() }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    pub fn into_bytes(self) -> Bytes { self.bytes.freeze() }
}
