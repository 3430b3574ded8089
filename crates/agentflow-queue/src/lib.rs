pub mod event;
pub mod manager;
pub mod types;

pub use event::QueueEvent;
pub use manager::QueueManager;
pub use types::{EnqueueOutcome, QueuedMessage};

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_core::{MessageId, ThreadId};
    use futures_util::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;

    fn msg(content: &str) -> QueuedMessage {
        QueuedMessage {
            message_id: MessageId::new(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn first_enqueue_returns_processing_subsequent_return_queued() {
        let manager = QueueManager::new();
        let thread_id = ThreadId::new();

        let first = manager.enqueue(&thread_id, msg("A")).await;
        let second = manager.enqueue(&thread_id, msg("B")).await;
        let third = manager.enqueue(&thread_id, msg("C")).await;

        assert_eq!(first, EnqueueOutcome::Processing);
        assert_eq!(second, EnqueueOutcome::Queued);
        assert_eq!(third, EnqueueOutcome::Queued);
    }

    #[tokio::test]
    async fn drain_and_merge_returns_messages_in_enqueue_order() {
        let manager = QueueManager::new();
        let thread_id = ThreadId::new();
        manager.enqueue(&thread_id, msg("A")).await;
        manager.enqueue(&thread_id, msg("B")).await;
        manager.enqueue(&thread_id, msg("C")).await;

        let drained = manager.drain_and_merge(&thread_id).await;
        let contents: Vec<&str> = drained.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn mark_done_signals_loop_again_when_fifo_nonempty() {
        let manager = QueueManager::new();
        let thread_id = ThreadId::new();
        manager.enqueue(&thread_id, msg("A")).await;
        manager.drain_and_merge(&thread_id).await;

        // A message arrives strictly between drain and mark_done.
        manager.enqueue(&thread_id, msg("B")).await;
        assert!(manager.mark_done(&thread_id).await, "should signal loop again");

        // Drain empty, no new arrivals: mark_done clears processing.
        manager.drain_and_merge(&thread_id).await;
        assert!(!manager.mark_done(&thread_id).await);
    }

    #[tokio::test]
    async fn two_subscribers_receive_identical_event_sequences() {
        let manager = Arc::new(QueueManager::new());
        let thread_id = ThreadId::new();

        let mut sub_a = manager.subscribe(&thread_id);
        let mut sub_b = manager.subscribe(&thread_id);

        manager.broadcast(&thread_id, QueueEvent::Chunk { content: "hi".into() });
        manager.broadcast(&thread_id, QueueEvent::StreamEnd);

        let a1 = sub_a.next().await.unwrap();
        let b1 = sub_b.next().await.unwrap();
        assert!(matches!(a1, QueueEvent::Chunk { .. }));
        assert!(matches!(b1, QueueEvent::Chunk { .. }));

        let a2 = sub_a.next().await.unwrap();
        let b2 = sub_b.next().await.unwrap();
        assert!(a2.is_stream_end());
        assert!(b2.is_stream_end());
    }

    #[tokio::test]
    async fn subscriber_stream_yields_nothing_after_stream_end() {
        let manager = QueueManager::new();
        let thread_id = ThreadId::new();
        let mut sub = manager.subscribe(&thread_id);

        manager.broadcast(&thread_id, QueueEvent::StreamEnd);
        let first = sub.next().await.unwrap();
        assert!(first.is_stream_end());

        // No further events are delivered; confirm nothing arrives promptly.
        let timeout = tokio::time::timeout(Duration::from_millis(50), sub.next()).await;
        assert!(timeout.is_err(), "expected no further events after stream_end");
    }
}
