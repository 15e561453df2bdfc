use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, db, session};

use super::{Message, MessageEvent, conv};

/// Inserts the message and floats the conversation to the top of the inbox
/// ordering; both writes commit together.
pub async fn send_message(
    pool: &SqlitePool,
    sender: Uuid,
    conversation_id: &str,
    content: &str,
) -> ApiResult<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("message is empty".into()));
    }
    if !conv::is_participant(pool, conversation_id, sender).await? {
        return Err(ApiError::Forbidden("conversation"));
    }

    let message = Message {
        id: Uuid::now_v7().to_string(),
        conversation_id: conversation_id.to_owned(),
        sender_id: sender.to_string(),
        content: content.to_owned(),
        read: false,
        created_at: db::now(),
    };

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO messages (id,conversation_id,sender_id,content,read,created_at) \
         VALUES (?,?,?,?,?,?)",
    )
    .bind(&message.id)
    .bind(&message.conversation_id)
    .bind(&message.sender_id)
    .bind(&message.content)
    .bind(message.read)
    .bind(&message.created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET updated_at=? WHERE id=?")
        .bind(&message.created_at)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(message)
}

pub async fn get_messages(
    pool: &SqlitePool,
    user_id: Uuid,
    conversation_id: &str,
) -> ApiResult<Vec<Message>> {
    if !conv::is_participant(pool, conversation_id, user_id).await? {
        return Err(ApiError::Forbidden("conversation"));
    }

    Ok(sqlx::query_as::<_, Message>(
        "SELECT id,conversation_id,sender_id,content,read,created_at FROM messages \
         WHERE conversation_id=? ORDER BY created_at ASC, id ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?)
}

/// Idempotent bulk read-marking; an empty id list is a no-op. The update
/// only touches messages in conversations the caller participates in, so
/// an outsider cannot clear someone else's unread state.
pub async fn mark_as_read(
    pool: &SqlitePool,
    user_id: Uuid,
    message_ids: &[String],
) -> ApiResult<()> {
    if message_ids.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE messages SET read=1 WHERE id IN (");
    let mut sep = qb.separated(", ");
    for id in message_ids {
        sep.push_bind(id);
    }
    qb.push(") AND conversation_id IN (SELECT conversation_id FROM conversation_participants WHERE user_id=");
    qb.push_bind(user_id.to_string());
    qb.push(")");
    qb.build().execute(pool).await?;
    Ok(())
}

/// Unread messages in the user's conversations that the user did not send.
pub async fn unread_count(pool: &SqlitePool, user_id: Uuid) -> ApiResult<i64> {
    let id = user_id.to_string();
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM messages m \
         JOIN conversation_participants p ON p.conversation_id = m.conversation_id \
         WHERE p.user_id=? AND m.read=0 AND m.sender_id<>?",
    )
    .bind(&id)
    .bind(&id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    Path(conversation_id): Path<Uuid>,
    session: Session,
) -> ApiResult<Json<Vec<Message>>> {
    let me = session::require_user(&session).await?;
    Ok(Json(
        get_messages(&db_pool, me, &conversation_id.to_string()).await?,
    ))
}

#[derive(Deserialize)]
pub(crate) struct SendInput {
    content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<MessageEvent>>,
    Path(conversation_id): Path<Uuid>,
    session: Session,
    Json(SendInput { content }): Json<SendInput>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let me = session::require_user(&session).await?;
    let message = send_message(&db_pool, me, &conversation_id.to_string(), &content).await?;

    let _ = tx.send(MessageEvent {
        conversation_id: message.conversation_id.clone(),
        message: message.clone(),
    });

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Deserialize)]
pub(crate) struct ReadInput {
    message_ids: Vec<String>,
}

#[debug_handler]
pub(crate) async fn read(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(ReadInput { message_ids }): Json<ReadInput>,
) -> ApiResult<StatusCode> {
    let me = session::require_user(&session).await?;
    mark_as_read(&db_pool, me, &message_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub(crate) struct UnreadResponse {
    unread: i64,
}

#[debug_handler]
pub(crate) async fn unread(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> ApiResult<Json<UnreadResponse>> {
    let me = session::require_user(&session).await?;
    Ok(Json(UnreadResponse {
        unread: unread_count(&db_pool, me).await?,
    }))
}
