mod conv;
mod msg;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::AppState;

pub use conv::{
    ConversationPreview, Participant, get_or_create_conversation, is_participant,
    list_conversations, pair_key,
};
pub use msg::{get_messages, mark_as_read, send_message, unread_count};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(conv::inbox))
        .route("/with/{user_id}", post(conv::open))
        .route("/read", post(msg::read))
        .route("/unread", get(msg::unread))
        .route("/ws", get(ws::inbox_ws))
        .route("/{id}/messages", get(msg::list).post(msg::send))
        .route("/{id}/ws", get(ws::conversation_ws))
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

/// Fanned out on the broadcast channel after every successful send. The
/// per-conversation socket forwards the full message; the inbox socket only
/// forwards the conversation id as a refetch hint.
#[derive(Debug, Clone, Serialize)]
pub struct MessageEvent {
    pub conversation_id: String,
    pub message: Message,
}
