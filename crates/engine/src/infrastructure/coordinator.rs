//! Request coordinator for the chat completion service.
//!
//! Guarantees that at most one call to the service is in flight at a time
//! while any number of callers may submit concurrently:
//!
//! - **Single-flight**: identical message lists submitted within the
//!   coalescing window share one queued call and one result.
//! - **FIFO**: distinct requests are sent strictly in submission order by a
//!   single drain task.
//!
//! The queue, the `draining` flag and the fingerprint cache sit behind one
//! mutex that is never held across an await. The flag is set under the same
//! lock that enqueues and cleared under the same lock that observes the queue
//! empty, so two drain tasks can never run at once and no request is stranded.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;

use crate::infrastructure::cache::CoalescingCache;
use crate::infrastructure::ports::{ChatMessage, ClockPort, LlmError, LlmPort, LlmRequest};

type SharedResponse = Shared<BoxFuture<'static, Result<String, LlmError>>>;

/// Configuration for request coalescing
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Identical requests younger than this reuse the pending result
    pub coalesce_window: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            coalesce_window: Duration::from_millis(1000),
        }
    }
}

/// Serializes and deduplicates calls to an [`LlmPort`].
///
/// Cheap to clone; clones share the same queue and cache.
#[derive(Clone)]
pub struct RequestCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    transport: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
    state: Mutex<CoordinatorState>,
}

struct CoordinatorState {
    queue: VecDeque<QueuedRequest>,
    draining: bool,
    cache: CoalescingCache<String, SharedResponse>,
}

struct QueuedRequest {
    fingerprint: String,
    request: LlmRequest,
    responder: oneshot::Sender<Result<String, LlmError>>,
}

impl RequestCoordinator {
    pub fn new(
        transport: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        config: CoordinatorConfig,
    ) -> Self {
        let window = chrono::Duration::from_std(config.coalesce_window)
            .unwrap_or_else(|_| chrono::Duration::milliseconds(1000));
        Self {
            inner: Arc::new(CoordinatorInner {
                transport,
                clock,
                state: Mutex::new(CoordinatorState {
                    queue: VecDeque::new(),
                    draining: false,
                    cache: CoalescingCache::new(window),
                }),
            }),
        }
    }

    /// Whether the underlying transport can authenticate.
    pub fn check_configured(&self) -> Result<(), LlmError> {
        self.inner.transport.check_configured()
    }

    /// Submit a request and wait for its text.
    ///
    /// Must be called from within a tokio runtime; the first submission after
    /// an idle period spawns the drain task.
    pub async fn submit(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, LlmError> {
        self.inner.transport.check_configured()?;
        let fingerprint = fingerprint(&messages)?;

        let response = {
            let mut state = self.inner.lock_state();
            let now = self.inner.clock.now();

            let swept = state.cache.sweep(now);
            if swept > 0 {
                tracing::debug!(swept, "Purged expired request fingerprints");
            }

            match state.cache.get_live(&fingerprint, now) {
                Some(shared) => {
                    tracing::debug!(
                        fingerprint = %short(&fingerprint),
                        "Coalesced duplicate LLM request"
                    );
                    shared
                }
                None => {
                    let (responder, receiver) = oneshot::channel();
                    let shared: SharedResponse = receiver
                        .map(|received| {
                            received.unwrap_or_else(|_| {
                                Err(LlmError::network("request dropped before completion"))
                            })
                        })
                        .boxed()
                        .shared();

                    state.queue.push_back(QueuedRequest {
                        fingerprint: fingerprint.clone(),
                        request: LlmRequest::new(messages)
                            .with_temperature(temperature)
                            .with_max_tokens(max_tokens),
                        responder,
                    });
                    state.cache.insert(fingerprint.clone(), shared.clone(), now);

                    tracing::debug!(
                        fingerprint = %short(&fingerprint),
                        queue_depth = state.queue.len(),
                        "Queued LLM request"
                    );

                    if !state.draining {
                        state.draining = true;
                        tokio::spawn(Self::drain(Arc::clone(&self.inner)));
                    }
                    shared
                }
            }
        };

        response.await
    }

    /// Number of requests waiting to be sent (excluding the one in flight).
    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().queue.len()
    }

    /// Number of fingerprints currently retained.
    pub fn cached_len(&self) -> usize {
        self.inner.lock_state().cache.len()
    }

    async fn drain(inner: Arc<CoordinatorInner>) {
        loop {
            let next = {
                let mut state = inner.lock_state();
                match state.queue.pop_front() {
                    Some(next) => next,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            let result = inner
                .transport
                .generate(next.request)
                .await
                .map(|response| response.content);

            if let Err(e) = &result {
                tracing::warn!(
                    error = %e,
                    fingerprint = %short(&next.fingerprint),
                    "LLM request failed"
                );
            }

            // Every caller may have gone away; the result is still cached.
            let _ = next.responder.send(result);
        }
    }
}

impl CoordinatorInner {
    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Deterministic fingerprint of a message list: SHA-256 of its JSON form.
pub fn fingerprint(messages: &[ChatMessage]) -> Result<String, LlmError> {
    let serialized = serde_json::to_string(messages)
        .map_err(|e| LlmError::content(format!("unserializable messages: {}", e)))?;
    Ok(hex::encode(Sha256::digest(serialized.as_bytes())))
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}
