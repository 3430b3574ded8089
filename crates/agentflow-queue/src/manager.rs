//! Thread Queue Manager (C7) — per-thread FIFO, `processing` flag, and
//! subscriber fan-out. Lazily creates per-thread state on first `enqueue`
//! or `subscribe`, mirroring the teacher gateway's `DashMap`-backed
//! `active_operations`/`ws_clients` maps for per-key concurrent state.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, trace};

use agentflow_core::ThreadId;

use crate::event::QueueEvent;
use crate::types::{EnqueueOutcome, QueuedMessage};

struct ThreadQueue {
    fifo: VecDeque<QueuedMessage>,
    processing: bool,
}

/// Per-thread state: the FIFO + `processing` flag share one async mutex
/// (held only for the flag transition — FIFO pushes/pops are themselves
/// cheap and happen under the same short-lived lock per spec.md §5), and
/// the subscriber list is a separate std mutex since registering and
/// broadcasting never need to await while holding it.
struct ThreadState {
    queue: AsyncMutex<ThreadQueue>,
    subscribers: StdMutex<Vec<mpsc::UnboundedSender<QueueEvent>>>,
}

impl ThreadState {
    fn new() -> Self {
        Self {
            queue: AsyncMutex::new(ThreadQueue {
                fifo: VecDeque::new(),
                processing: false,
            }),
            subscribers: StdMutex::new(Vec::new()),
        }
    }
}

/// Process-wide manager — one long-lived instance created at startup and
/// shared via dependency injection (spec.md §9's "Process-wide manager"
/// note). Exactly one dispatch loop is active per thread at any time (P1).
#[derive(Default)]
pub struct QueueManager {
    threads: DashMap<ThreadId, Arc<ThreadState>>,
}

impl QueueManager {
    pub fn new() -> Self {
        Self {
            threads: DashMap::new(),
        }
    }

    fn get_or_create(&self, thread_id: &ThreadId) -> Arc<ThreadState> {
        self.threads
            .entry(thread_id.clone())
            .or_insert_with(|| Arc::new(ThreadState::new()))
            .clone()
    }

    /// Push `message` into the thread's FIFO, then atomically read and flip
    /// the `processing` flag. `Processing` is the signal for the caller to
    /// spawn the dispatch loop; `Queued` means a loop is already running
    /// and will pick this message up on its next drain.
    pub async fn enqueue(&self, thread_id: &ThreadId, message: QueuedMessage) -> EnqueueOutcome {
        let state = self.get_or_create(thread_id);
        let mut queue = state.queue.lock().await;
        queue.fifo.push_back(message);

        if queue.processing {
            trace!(thread_id = %thread_id, "enqueue: loop already running, message queued");
            EnqueueOutcome::Queued
        } else {
            queue.processing = true;
            debug!(thread_id = %thread_id, "enqueue: starting dispatch loop");
            EnqueueOutcome::Processing
        }
    }

    /// Non-blocking drain of whatever is currently in the FIFO.
    pub async fn drain_and_merge(&self, thread_id: &ThreadId) -> Vec<QueuedMessage> {
        let state = self.get_or_create(thread_id);
        let mut queue = state.queue.lock().await;
        queue.fifo.drain(..).collect()
    }

    /// If the FIFO is non-empty, signal the caller to loop again (`true`).
    /// Otherwise clear `processing` and signal the loop is done (`false`).
    pub async fn mark_done(&self, thread_id: &ThreadId) -> bool {
        let state = self.get_or_create(thread_id);
        let mut queue = state.queue.lock().await;
        if queue.fifo.is_empty() {
            queue.processing = false;
            false
        } else {
            true
        }
    }

    /// Deliver `event` to every live subscriber for this thread. Dead
    /// receivers (subscriber task already exited) are dropped silently —
    /// they deregister themselves via `subscribe`'s returned stream, this
    /// is just best-effort cleanup of the send error.
    pub fn broadcast(&self, thread_id: &ThreadId, event: QueueEvent) {
        let Some(state) = self.threads.get(thread_id) else {
            return;
        };
        let mut subscribers = state.subscribers.lock().expect("subscriber list poisoned");
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Register a new subscriber and return its event stream. The stream
    /// ends when a `stream_end` event is observed (P7) or the sender side
    /// is dropped.
    pub fn subscribe(&self, thread_id: &ThreadId) -> UnboundedReceiverStream<QueueEvent> {
        let state = self.get_or_create(thread_id);
        let (tx, rx) = mpsc::unbounded_channel();
        state
            .subscribers
            .lock()
            .expect("subscriber list poisoned")
            .push(tx);
        UnboundedReceiverStream::new(rx)
    }

    /// Remove the thread's state entry entirely. Optional — safe to never
    /// call; reclamation is best-effort and not required for correctness.
    pub fn cleanup(&self, thread_id: &ThreadId) {
        if let Some(state) = self.threads.get(thread_id) {
            let idle = {
                let queue = match state.queue.try_lock() {
                    Ok(q) => q,
                    Err(_) => return,
                };
                let subscribers = state.subscribers.lock().expect("subscriber list poisoned");
                !queue.processing && queue.fifo.is_empty() && subscribers.is_empty()
            };
            if idle {
                drop(state);
                self.threads.remove(thread_id);
            }
        }
    }
}
