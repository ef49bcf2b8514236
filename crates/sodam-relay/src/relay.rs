//! The request-queue engine: accepts concurrent submissions and drives all
//! in-flight transfers from a single non-blocking pump.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::future::{AbortHandle, Abortable};
use futures_util::stream::FuturesUnordered;
use futures_util::task::noop_waker_ref;
use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::data::{RelayOptions, Reply, ReplyCallback, SubmissionId, TransferRequest};
use crate::error::TransferError;
use crate::queue::PendingQueue;
use crate::sink::ResponseBuffer;
use crate::transport::Transport;

type Flight = Pin<Box<dyn Future<Output = Option<(SubmissionId, Reply)>> + Send>>;

struct Entry {
    abort:    AbortHandle,
    callback: ReplyCallback,
}

struct Inner {
    /// The multiplexing handle: one poll loop advances every transfer.
    flights: FuturesUnordered<Flight>,
    queue:   PendingQueue<Entry>,
    next_id: u64,
}

/// The single authority over concurrent upstream HTTP I/O.
///
/// One instance per bot, passed explicitly to whoever needs to submit.
/// `submit` may be called from any thread; `drain` and `remove_oldest` are
/// meant for the host event loop. Every live transfer has exactly one queue
/// entry and vice versa; the mutex guards both the flight set and the queue,
/// and is never held across a callback invocation, so callbacks are free to
/// submit follow-up requests.
pub struct Relay<C: Transport> {
    transport: Arc<C>,
    options:   RelayOptions,
    inner:     Mutex<Inner>,
}

impl<C: Transport> Relay<C> {
    pub fn new(transport: C, options: RelayOptions) -> Self {
        Self {
            transport: Arc::new(transport),
            options,
            inner: Mutex::new(Inner {
                flights: FuturesUnordered::new(),
                queue:   PendingQueue::new(),
                next_id: 0,
            }),
        }
    }

    /// Registers a transfer and returns immediately.
    ///
    /// The transfer makes no progress until [`drain`](Self::drain) is called;
    /// `callback` fires exactly once, on completion or failure, unless the
    /// entry is force-removed first.
    pub fn submit(&self, request: TransferRequest, callback: ReplyCallback) -> SubmissionId {
        let mut inner = self.lock();

        let id = SubmissionId(inner.next_id);
        inner.next_id += 1;

        let (abort, registration) = AbortHandle::new_pair();
        let transfer = run_transfer(
            Arc::clone(&self.transport),
            request,
            self.options.max_response_bytes,
            id,
        );
        let flight = Abortable::new(transfer, registration);

        inner.flights.push(Box::pin(async move { flight.await.ok() }));
        inner.queue.insert(id, Entry { abort, callback });

        debug!(id = id.value(), pending = inner.queue.len(), "transfer submitted");

        id
    }

    /// Pumps all in-flight transfers and delivers completed ones.
    ///
    /// Non-blocking: polls the flight set until no transfer can make further
    /// progress this call, then returns. Socket readiness between ticks wakes
    /// the flight set's internal per-task wakers through the runtime reactor,
    /// so the next drain re-polls exactly the transfers that moved. Callbacks
    /// run after the lock is released, in completion order.
    pub fn drain(&self) {
        let completed = {
            let mut inner = self.lock();
            let mut completed = Vec::new();
            let mut cx = Context::from_waker(noop_waker_ref());

            loop {
                match Pin::new(&mut inner.flights).poll_next(&mut cx) {
                    Poll::Ready(Some(Some((id, reply)))) => {
                        // a force-removed transfer has no queue entry left;
                        // its completion is discarded without a callback
                        if let Some(entry) = inner.queue.remove(id) {
                            completed.push((id, entry.callback, reply));
                        }
                    }
                    // reaped an aborted flight
                    Poll::Ready(Some(None)) => {}
                    Poll::Ready(None) | Poll::Pending => break,
                }
            }

            completed
        };

        for (id, callback, reply) in completed {
            match &reply.error {
                None => debug!(id = id.value(), bytes = reply.body.len(), "transfer completed"),
                Some(error) => {
                    warn!(id = id.value(), bytes = reply.body.len(), %error, "transfer failed")
                }
            }

            callback(reply);
        }
    }

    /// Force-removes the oldest pending transfer without invoking its
    /// callback. Returns the evicted id, or `None` when nothing is pending.
    pub fn remove_oldest(&self) -> Option<SubmissionId> {
        let mut inner = self.lock();

        let (id, entry) = inner.queue.remove_head()?;
        entry.abort.abort();

        debug!(id = id.value(), "transfer force-removed");

        Some(id)
    }

    /// Tears down every outstanding transfer, oldest first. No callback
    /// fires for transfers that were still in flight.
    pub fn shutdown(&self) {
        let mut evicted = 0usize;

        while self.remove_oldest().is_some() {
            evicted += 1;
        }

        if evicted > 0 {
            debug!(evicted, "relay shut down with transfers still in flight");
        }
    }

    pub fn is_empty(&self) -> bool { self.lock().queue.is_empty() }

    pub fn len(&self) -> usize { self.lock().queue.len() }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drives one transfer to its reply: open the body stream, feed every chunk
/// through the response sink, and convert failures into the explicit error
/// marker. Runs entirely inside the flight set; only polled during drain.
async fn run_transfer<C: Transport>(
    transport: Arc<C>,
    request: TransferRequest,
    max_response_bytes: usize,
    id: SubmissionId,
) -> (SubmissionId, Reply) {
    let mut buffer = ResponseBuffer::with_cap(max_response_bytes);

    let mut stream = match transport.execute(request).await {
        Ok(stream) => stream,
        Err(error) => {
            return (id, Reply {
                body:  Bytes::new(),
                error: Some(TransferError::Transport(Box::new(error))),
            });
        }
    };

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                if buffer.append(&chunk).is_err() {
                    return (id, Reply {
                        body:  buffer.into_bytes(),
                        error: Some(TransferError::ResponseTooLarge {
                            limit: max_response_bytes,
                        }),
                    });
                }
            }
            Err(error) => {
                return (id, Reply {
                    body:  buffer.into_bytes(),
                    error: Some(TransferError::Transport(Box::new(error))),
                });
            }
        }
    }

    (id, Reply {
        body:  buffer.into_bytes(),
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::stream;
    use thiserror::Error;

    use super::*;
    use crate::transport::BoxStream;

    #[derive(Debug, Error)]
    #[error("scripted transport failure")]
    struct MockError;

    enum Script {
        /// Deliver these chunks, then end the body.
        Chunks(Vec<&'static [u8]>),
        /// Fail before the body stream opens.
        Fail,
        /// Open a body stream that never yields.
        Stall,
    }

    /// Pops one script per `execute` call, in submission-poll order.
    struct MockTransport {
        scripts: Mutex<VecDeque<Script>>,
    }

    impl MockTransport {
        fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into_iter().collect()),
            }
        }
    }

    impl Transport for MockTransport {
        type Error = MockError;

        async fn execute(
            &self,
            _request: TransferRequest,
        ) -> Result<BoxStream<'static, Result<Bytes, MockError>>, MockError> {
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

    fn relay(scripts: impl IntoIterator<Item = Script>) -> Relay<MockTransport> {
        Relay::new(MockTransport::new(scripts), RelayOptions::default())
    }

    fn request() -> TransferRequest {
        TransferRequest::post("http://upstream.invalid/search").form("q", "word")
    }

    #[test]
    fn chunked_body_is_delivered_concatenated_after_one_drain() {
        let engine = relay([Script::Chunks(vec![b"{\"ok\":", b"true}"])]);
        let received = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&received);
        engine.submit(
            request(),
            Box::new(move |reply| {
                assert!(reply.is_success());
                *slot.lock().unwrap() = Some(reply.text().unwrap().to_string());
            }),
        );

        engine.drain();

        assert_eq!(received.lock().unwrap().as_deref(), Some("{\"ok\":true}"));
        assert!(engine.is_empty());
    }

    #[test]
    fn callback_fires_at_most_once() {
        let engine = relay([Script::Chunks(vec![b"done"])]);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        engine.submit(
            request(),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        engine.drain();
        engine.drain();
        engine.drain();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn forced_eviction_follows_submission_order() {
        let engine = relay([Script::Stall, Script::Stall, Script::Stall]);

        let ids: Vec<_> = (0..3)
            .map(|_| engine.submit(request(), Box::new(|_| {})))
            .collect();

        let evicted: Vec<_> = std::iter::from_fn(|| engine.remove_oldest()).collect();

        assert_eq!(evicted, ids);
        assert!(engine.is_empty());
    }

    #[test]
    fn shutdown_before_completion_fires_no_callback() {
        let engine = relay([Script::Stall, Script::Stall, Script::Stall]);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&calls);
            engine.submit(
                request(),
                Box::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        engine.shutdown();

        assert!(engine.is_empty());

        // reap the aborted flights; still no callback may fire
        engine.drain();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(engine.is_empty());
    }

    #[test]
    fn transport_failure_surfaces_the_error_marker() {
        let engine = relay([Script::Fail]);
        let observed = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&observed);
        engine.submit(
            request(),
            Box::new(move |reply| {
                assert!(reply.body.is_empty());
                *slot.lock().unwrap() = reply.error;
            }),
        );

        engine.drain();

        assert!(matches!(
            *observed.lock().unwrap(),
            Some(TransferError::Transport(_))
        ));
    }

    #[test]
    fn oversized_response_aborts_with_partial_body() {
        let engine = Relay::new(
            MockTransport::new([Script::Chunks(vec![b"abcd", b"efgh"])]),
            RelayOptions {
                max_response_bytes: 6,
            },
        );
        let observed = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&observed);
        engine.submit(
            request(),
            Box::new(move |reply| {
                *slot.lock().unwrap() = Some((reply.body.clone(), reply.error));
            }),
        );

        engine.drain();

        let guard = observed.lock().unwrap();
        let (body, error) = guard.as_ref().unwrap();
        assert_eq!(&body[..], b"abcd");
        assert!(error.as_ref().unwrap().is_too_large());
        assert!(engine.is_empty());
    }

    #[test]
    fn callback_without_captured_state_still_receives_the_reply() {
        let engine = relay([Script::Chunks(vec![b"payload"])]);

        engine.submit(
            request(),
            Box::new(|reply| {
                assert_eq!(reply.text(), Some("payload"));
            }),
        );

        engine.drain();

        assert!(engine.is_empty());
    }

    #[test]
    fn concurrent_submissions_all_become_live_entries() {
        const PER_THREAD: usize = 100;

        let engine = Arc::new(relay(Vec::new()));
        let ids = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let ids = Arc::clone(&ids);

                std::thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        let id = engine.submit(request(), Box::new(|_| {}));
                        ids.lock().unwrap().push(id);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.len(), 2 * PER_THREAD);

        let mut ids = Arc::try_unwrap(ids).unwrap().into_inner().unwrap();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 2 * PER_THREAD);
    }

    #[test]
    fn callback_may_submit_a_follow_up_request() {
        let engine = Arc::new(relay([
            Script::Chunks(vec![b"first"]),
            Script::Chunks(vec![b"second"]),
        ]));
        let second = Arc::new(Mutex::new(None));

        let chained = Arc::clone(&engine);
        let slot = Arc::clone(&second);
        engine.submit(
            request(),
            Box::new(move |reply| {
                assert_eq!(reply.text(), Some("first"));

                let slot = Arc::clone(&slot);
                chained.submit(
                    request(),
                    Box::new(move |reply| {
                        *slot.lock().unwrap() = Some(reply.text().unwrap().to_string());
                    }),
                );
            }),
        );

        engine.drain();
        engine.drain();

        assert_eq!(second.lock().unwrap().as_deref(), Some("second"));
        assert!(engine.is_empty());
    }
}
