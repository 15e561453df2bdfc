use axum::{
    debug_handler,
    extract::{Path, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, session};

use super::{MessageEvent, conv, msg};

#[derive(Deserialize)]
struct SendFrame {
    content: String,
}

/// Live feed for one open conversation: broadcast events are filtered down
/// to this conversation id and delivered as full message payloads. Inbound
/// frames are treated as sends.
#[debug_handler(state = AppState)]
pub(crate) async fn conversation_ws(
    Path(conversation_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<MessageEvent>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let user_id = session::require_user(&session).await?;
    let conversation_id = conversation_id.to_string();

    if !conv::is_participant(&db_pool, &conversation_id, user_id).await? {
        return Err(ApiError::Forbidden("conversation"));
    }

    Ok(ws
        .on_upgrade(async move |stream| {
            let mut rx = tx.subscribe();
            let (mut sender, mut receiver) = stream.split();

            let feed_id = conversation_id.clone();
            let feed_task = tokio::spawn(async move {
                while let Ok(event) = rx.recv().await {
                    if event.conversation_id != feed_id {
                        continue;
                    }
                    let Ok(payload) = serde_json::to_string(&event.message) else {
                        continue;
                    };
                    if sender.send(payload.into()).await.is_err() {
                        break;
                    }
                }
            });

            while let Some(Ok(frame)) = receiver.next().await {
                let Ok(SendFrame { content }) = serde_json::from_slice(&frame.into_data()) else {
                    continue;
                };
                match msg::send_message(&db_pool, user_id, &conversation_id, &content).await {
                    Ok(message) => {
                        let _ = tx.send(MessageEvent {
                            conversation_id: conversation_id.clone(),
                            message,
                        });
                    }
                    Err(err) => tracing::debug!(error = %err, "ws send rejected"),
                }
            }

            feed_task.abort();
        })
        .into_response())
}

/// Inbox feed: unfiltered over all message inserts, but only the
/// conversation id is forwarded; the client re-fetches its list on every
/// ping (coarse invalidation).
#[debug_handler(state = AppState)]
pub(crate) async fn inbox_ws(
    State(tx): State<broadcast::Sender<MessageEvent>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    session::require_user(&session).await?;

    Ok(ws
        .on_upgrade(async move |stream| {
            let mut rx = tx.subscribe();
            let (mut sender, mut receiver) = stream.split();

            let feed_task = tokio::spawn(async move {
                while let Ok(event) = rx.recv().await {
                    let ping = json!({ "conversation_id": event.conversation_id }).to_string();
                    if sender.send(ping.into()).await.is_err() {
                        break;
                    }
                }
            });

            // hold the socket open until the client goes away
            while let Some(Ok(_)) = receiver.next().await {}

            feed_task.abort();
        })
        .into_response())
}
