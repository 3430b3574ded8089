//! Context assembly for the `memory_loader` node: fixed platform prompt +
//! trimmed history (+ summary of anything dropped) + the freshly processed
//! user turn. Grounded on the teacher's `pipeline::compact` module, which
//! summarizes old turns with a cheap model before discarding them.

use agentflow_store::{ChatMessage, ChatModel, ChatRequest, ChatRole};
use tracing::warn;

pub const PLATFORM_SYSTEM_PROMPT: &str =
    "You are a helpful assistant responding on behalf of this tenant. \
     Be concise, accurate, and never fabricate information you don't have.";

/// Rough token-unit estimate: four characters per token, the same order of
/// magnitude heuristic most tokenizers land near for English text. Good
/// enough for a trim budget; exact tokenization is the model provider's
/// concern.
pub fn approx_tokens(text: &str) -> usize {
    (text.chars().count() / 4).max(1)
}

fn turn_tokens(turn: &ChatMessage) -> usize {
    approx_tokens(&turn.content)
}

/// Trim `history` to `budget` token-units, keeping the most recent turns
/// (`strategy=last`), and never splitting a turn (`allow_partial=false`).
/// The kept tail always starts on a user turn — if trimming would otherwise
/// start on an assistant/tool turn, that turn is dropped too.
///
/// Returns `(kept_tail, dropped_prefix)`.
pub fn trim_to_budget(history: &[ChatMessage], budget: usize) -> (Vec<ChatMessage>, Vec<ChatMessage>) {
    let mut kept: Vec<ChatMessage> = Vec::new();
    let mut total = 0usize;

    for turn in history.iter().rev() {
        let cost = turn_tokens(turn);
        if !kept.is_empty() && total + cost > budget {
            break;
        }
        total += cost;
        kept.push(turn.clone());
    }
    kept.reverse();

    while matches!(kept.first(), Some(t) if t.role != ChatRole::User) {
        kept.remove(0);
    }

    let dropped_count = history.len() - kept.len();
    let dropped = history[..dropped_count].to_vec();

    (kept, dropped)
}

/// Summarize `dropped` turns via `summarizer` (a cheap model, per spec.md).
/// Logged and swallowed on failure — the caller falls back to the trimmed
/// tail without a summary, per spec.md §7(d).
pub async fn summarize_dropped(
    summarizer: &dyn ChatModel,
    summary_model: &str,
    dropped: &[ChatMessage],
) -> Option<String> {
    if dropped.is_empty() {
        return None;
    }

    let transcript: String = dropped
        .iter()
        .map(|t| format!("{:?}: {}", t.role, t.content))
        .collect::<Vec<_>>()
        .join("\n");

    let request = ChatRequest {
        model: summary_model.to_string(),
        messages: vec![
            ChatMessage::new(
                ChatRole::System,
                "Summarize the following conversation turns in 2-3 sentences, \
                 preserving any facts or decisions a later reply might need.",
            ),
            ChatMessage::new(ChatRole::User, transcript),
        ],
        tools: Vec::new(),
    };

    match summarizer.invoke(request).await {
        Ok(response) => Some(response.content),
        Err(err) => {
            warn!(error = %err, "summarization of dropped history failed, continuing without it");
            None
        }
    }
}

/// Assemble the fresh message list `memory_loader` hands to the LLM:
/// platform system prompt, optional summary system message, trimmed tail,
/// then the processed user input as a new turn.
pub fn assemble_messages(
    trimmed_tail: Vec<ChatMessage>,
    summary: Option<String>,
    processed_input: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(trimmed_tail.len() + 2);
    messages.push(ChatMessage::new(ChatRole::System, PLATFORM_SYSTEM_PROMPT));

    if let Some(summary) = summary {
        messages.push(ChatMessage::new(
            ChatRole::System,
            format!("Summary of earlier conversation: {summary}"),
        ));
    }

    messages.extend(trimmed_tail);
    messages.push(ChatMessage::new(ChatRole::User, processed_input.to_string()));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: ChatRole, content: &str) -> ChatMessage {
        ChatMessage::new(role, content)
    }

    #[test]
    fn trim_keeps_most_recent_turns_within_budget() {
        let history = vec![
            turn(ChatRole::User, &"a".repeat(400)),
            turn(ChatRole::Assistant, &"b".repeat(400)),
            turn(ChatRole::User, &"c".repeat(40)),
            turn(ChatRole::Assistant, &"d".repeat(40)),
        ];
        let (kept, dropped) = trim_to_budget(&history, 30);
        assert!(kept.len() < history.len());
        assert_eq!(kept.len() + dropped.len(), history.len());
    }

    #[test]
    fn trimmed_tail_always_starts_on_a_user_turn() {
        let history = vec![
            turn(ChatRole::User, "hi"),
            turn(ChatRole::Assistant, "hello"),
            turn(ChatRole::Assistant, "orphaned continuation"),
            turn(ChatRole::User, "next question"),
        ];
        let (kept, _dropped) = trim_to_budget(&history, 2);
        assert!(kept.first().map(|t| t.role) != Some(ChatRole::Assistant));
    }

    #[test]
    fn nothing_dropped_when_everything_fits() {
        let history = vec![turn(ChatRole::User, "hi"), turn(ChatRole::Assistant, "hello")];
        let (kept, dropped) = trim_to_budget(&history, 4000);
        assert_eq!(kept.len(), 2);
        assert!(dropped.is_empty());
    }

    #[test]
    fn assembled_messages_start_with_platform_prompt_and_end_with_user_input() {
        let messages = assemble_messages(vec![], None, "hello there");
        assert_eq!(messages.first().unwrap().role, ChatRole::System);
        assert_eq!(messages.last().unwrap().content, "hello there");
        assert_eq!(messages.last().unwrap().role, ChatRole::User);
    }
}
