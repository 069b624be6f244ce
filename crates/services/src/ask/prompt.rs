use crate::conversations::{Turn, TurnRole};
use inference_providers::ChatMessage;

/// The user turn actually sent to the model: the query, the retrieved
/// sources and citation instructions.
pub fn compose_user_turn(query: &str, context: &str) -> String {
    format!(
        "User Query: {query}\n---\nSources Context (may be empty):\n{context}\n\n\
         Instructions: Use the context when present. Cite as [n] inline. \
         At the end, list full Sources with URLs."
    )
}

/// System prompt, prior turns oldest first, then the composed user turn
pub fn compose_messages(
    system_prompt: &str,
    history: &[Turn],
    query: &str,
    context: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history.iter().map(|turn| match turn.role {
        TurnRole::User => ChatMessage::user(turn.content.clone()),
        TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
    }));
    messages.push(ChatMessage::user(compose_user_turn(query, context)));
    messages
}
