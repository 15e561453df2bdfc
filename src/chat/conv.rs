use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    ApiError, ApiResult, db,
    error::is_unique_violation,
    profiles::{self, Profile},
    session,
};

use super::Message;

/// Shown when the other side has no usable profile name.
const DISPLAY_NAME_FALLBACK: &str = "İstifadəçi";

#[derive(Debug, Serialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversationPreview {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub other: Participant,
    pub last_message: Option<Message>,
}

/// Canonical unordered key for a two-party conversation. The UNIQUE index
/// on this key is what guarantees at most one conversation per user pair,
/// whichever side opens it.
pub fn pair_key(a: Uuid, b: Uuid) -> String {
    let (a, b) = (a.to_string(), b.to_string());
    if a <= b { format!("{a}:{b}") } else { format!("{b}:{a}") }
}

pub async fn get_or_create_conversation(
    pool: &SqlitePool,
    me: Uuid,
    other: Uuid,
) -> ApiResult<String> {
    if me == other {
        return Err(ApiError::BadRequest(
            "cannot start a conversation with yourself".into(),
        ));
    }
    if profiles::get_profile(pool, &other.to_string())
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("user"));
    }

    let key = pair_key(me, other);
    if let Some((id,)) =
        sqlx::query_as::<_, (String,)>("SELECT id FROM conversations WHERE pair_key=?")
            .bind(&key)
            .fetch_optional(pool)
            .await?
    {
        return Ok(id);
    }

    let id = Uuid::now_v7().to_string();
    let now = db::now();
    let mut tx = pool.begin().await?;

    let inserted =
        sqlx::query("INSERT INTO conversations (id,pair_key,created_at,updated_at) VALUES (?,?,?,?)")
            .bind(&id)
            .bind(&key)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await;

    match inserted {
        Ok(_) => {}
        Err(err) if is_unique_violation(&err) => {
            // lost the race to the unique index; take the winner's row
            drop(tx);
            let (id,) =
                sqlx::query_as::<_, (String,)>("SELECT id FROM conversations WHERE pair_key=?")
                    .bind(&key)
                    .fetch_one(pool)
                    .await?;
            return Ok(id);
        }
        Err(err) => return Err(err.into()),
    }

    for user in [me, other] {
        sqlx::query("INSERT INTO conversation_participants (conversation_id,user_id) VALUES (?,?)")
            .bind(&id)
            .bind(user.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::debug!(conversation = %id, "conversation created");
    Ok(id)
}

pub async fn is_participant(
    pool: &SqlitePool,
    conversation_id: &str,
    user_id: Uuid,
) -> ApiResult<bool> {
    Ok(sqlx::query_as::<_, (i64,)>(
        "SELECT 1 FROM conversation_participants WHERE conversation_id=? AND user_id=?",
    )
    .bind(conversation_id)
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?
    .is_some())
}

/// The user's inbox, most recent activity first. Each entry resolves the
/// other side's profile and the latest message one lookup at a time;
/// per-user conversation counts are expected to stay small.
pub async fn list_conversations(pool: &SqlitePool, me: Uuid) -> ApiResult<Vec<ConversationPreview>> {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT c.id,c.created_at,c.updated_at FROM conversations c \
         JOIN conversation_participants p ON p.conversation_id = c.id \
         WHERE p.user_id=? ORDER BY c.updated_at DESC, c.id DESC",
    )
    .bind(me.to_string())
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for (id, created_at, updated_at) in rows {
        let Some((other_id,)) = sqlx::query_as::<_, (String,)>(
            "SELECT user_id FROM conversation_participants WHERE conversation_id=? AND user_id<>?",
        )
        .bind(&id)
        .bind(me.to_string())
        .fetch_optional(pool)
        .await?
        else {
            continue;
        };

        let other = match profiles::get_profile(pool, &other_id).await? {
            Some(profile) => Participant {
                id: other_id,
                name: display_name(&profile),
                avatar_url: profile.avatar_url,
            },
            None => Participant {
                id: other_id,
                name: DISPLAY_NAME_FALLBACK.to_owned(),
                avatar_url: None,
            },
        };

        let last_message = sqlx::query_as::<_, Message>(
            "SELECT id,conversation_id,sender_id,content,read,created_at FROM messages \
             WHERE conversation_id=? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(&id)
        .fetch_optional(pool)
        .await?;

        out.push(ConversationPreview {
            id,
            created_at,
            updated_at,
            other,
            last_message,
        });
    }

    Ok(out)
}

fn display_name(profile: &Profile) -> String {
    let name = format!(
        "{} {}",
        profile.name.as_deref().unwrap_or(""),
        profile.surname.as_deref().unwrap_or("")
    );
    let name = name.trim();
    if name.is_empty() {
        DISPLAY_NAME_FALLBACK.to_owned()
    } else {
        name.to_owned()
    }
}

#[debug_handler]
pub(crate) async fn inbox(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> ApiResult<Json<Vec<ConversationPreview>>> {
    let me = session::require_user(&session).await?;
    Ok(Json(list_conversations(&db_pool, me).await?))
}

#[derive(Serialize)]
pub(crate) struct OpenResponse {
    conversation_id: String,
}

#[debug_handler]
pub(crate) async fn open(
    State(db_pool): State<SqlitePool>,
    Path(other): Path<Uuid>,
    session: Session,
) -> ApiResult<Json<OpenResponse>> {
    let me = session::require_user(&session).await?;
    let conversation_id = get_or_create_conversation(&db_pool, me, other).await?;
    Ok(Json(OpenResponse { conversation_id }))
}
