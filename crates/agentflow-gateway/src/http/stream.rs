//! GET /threads/{id}/stream — spec.md §6's SSE event grammar.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};

use agentflow_core::ThreadId;

use crate::app::AppState;
use crate::auth::check_auth;
use crate::error::ApiError;

pub async fn stream_thread(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(thread_id): Path<ThreadId>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    if !check_auth(&state, &headers) {
        return Err(ApiError::unauthorized());
    }

    // Validate the thread exists before subscribing — a subscription to a
    // nonexistent thread would simply hang waiting for events that never come.
    state.store.get_thread(&thread_id).await?;

    let events = state.queue.subscribe(&thread_id);
    let sse_stream = async_stream::stream! {
        futures_util::pin_mut!(events);
        while let Some(event) = events.next().await {
            let is_end = event.is_stream_end();
            let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            yield Ok(Event::default().data(payload));
            if is_end {
                break;
            }
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}
