//! Asynchronous HTTP transport abstraction.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::data::TransferRequest;

/// A boxed stream of response body chunks.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// The minimal interface the engine needs from an HTTP client.
///
/// Implementations own redirect following, TLS and timeout enforcement; the
/// engine only consumes the chunk stream. Production traffic goes through
/// [`ReqwestTransport`]; tests use scripted mocks.
pub trait Transport: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue the request and return the response body as a chunk stream.
    ///
    /// # Errors
    ///
    /// Fails on anything that prevents a body stream from being opened:
    /// DNS resolution, connection refusal, TLS handshake.
    fn execute(
        &self,
        request: TransferRequest,
    ) -> impl Future<
        Output = Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error>,
    > + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::data::Method;

    /// Production transport backed by a shared `reqwest::Client`.
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder().build()?;
            Ok(Self { client })
        }
    }

    impl Transport for ReqwestTransport {
        type Error = reqwest::Error;

        async fn execute(
            &self,
            request: TransferRequest,
        ) -> Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error> {
            let mut builder = match request.method {
                Method::Post => self.client.post(&request.url).form(&request.form),
                Method::Get => self.client.get(&request.url).query(&request.form),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.timeout(request.timeout).send().await?;

            Ok(Box::pin(response.bytes_stream()))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;
