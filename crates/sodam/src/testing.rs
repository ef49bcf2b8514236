//! Shared test doubles: a scripted transport and a capturing responder.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::stream;
use sodam_relay::{BoxStream, Transport, TransferRequest};
use thiserror::Error;

use crate::bot::Bot;
use crate::config::Config;
use crate::gateway::Responder;

#[derive(Debug, Error)]
#[error("scripted transport failure")]
pub struct MockError;

pub enum Script {
    /// Deliver these chunks, then end the body.
    Chunks(Vec<&'static [u8]>),
    /// Fail before the body stream opens.
    Fail,
    /// Open a body stream that never yields.
    Stall,
}

/// Pops one script per `execute` call. Requests past the script list get an
/// empty body.
pub struct MockTransport {
    scripts:  Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<TransferRequest>>,
}

impl MockTransport {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts:  Mutex::new(scripts.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    async fn execute(
        &self,
        request: TransferRequest,
    ) -> Result<BoxStream<'static, Result<Bytes, MockError>>, MockError> {
        self.requests.lock().unwrap().push(request);

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Chunks(Vec::new()));

        match script {
            Script::Chunks(chunks) => Ok(Box::pin(stream::iter(
                chunks
                    .into_iter()
                    .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                    .collect::<Vec<_>>(),
            ))),
            Script::Fail => Err(MockError),
            Script::Stall => Ok(Box::pin(stream::pending())),
        }
    }
}

/// Records every reply a handler produced.
#[derive(Default)]
pub struct CapturingResponder {
    replies: Mutex<Vec<(String, String)>>,
}

impl CapturingResponder {
    pub fn take(&self) -> Vec<(String, String)> {
        std::mem::take(&mut self.replies.lock().unwrap())
    }
}

impl Responder for CapturingResponder {
    fn reply(&self, title: &str, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}

pub fn test_bot(
    config: Config,
    scripts: Vec<Script>,
) -> (Bot<MockTransport>, Arc<CapturingResponder>) {
    let responder = Arc::new(CapturingResponder::default());
    let bot = Bot::new(config, MockTransport::new(scripts), responder.clone());

    (bot, responder)
}
