use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, db, error::is_unique_violation, profiles, session};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", post(follow).delete(unfollow))
        .route("/{id}/stats", get(stats))
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct FollowerStats {
    pub follower_count: i64,
    pub following_count: i64,
    pub is_following: bool,
}

pub async fn follow_user(pool: &SqlitePool, follower: Uuid, following: Uuid) -> ApiResult<()> {
    if follower == following {
        return Err(ApiError::BadRequest("cannot follow yourself".into()));
    }
    if profiles::get_profile(pool, &following.to_string())
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("user"));
    }

    let inserted =
        sqlx::query("INSERT INTO followers (follower_id,following_id,created_at) VALUES (?,?,?)")
            .bind(follower.to_string())
            .bind(following.to_string())
            .bind(db::now())
            .execute(pool)
            .await;

    match inserted {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Err(ApiError::AlreadyFollowing),
        Err(err) => Err(err.into()),
    }
}

/// Removing an absent edge is a no-op, so unfollow is idempotent.
pub async fn unfollow_user(pool: &SqlitePool, follower: Uuid, following: Uuid) -> ApiResult<()> {
    sqlx::query("DELETE FROM followers WHERE follower_id=? AND following_id=?")
        .bind(follower.to_string())
        .bind(following.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Three independent lookups combined without atomicity; counts may be
/// momentarily inconsistent under concurrent edits, which is fine for a
/// social-count display.
pub async fn follower_stats(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    user_id: Uuid,
) -> ApiResult<FollowerStats> {
    let id = user_id.to_string();

    let (follower_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM followers WHERE following_id=?")
            .bind(&id)
            .fetch_one(pool)
            .await?;

    let (following_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM followers WHERE follower_id=?")
            .bind(&id)
            .fetch_one(pool)
            .await?;

    let is_following = match viewer {
        Some(viewer) if viewer != user_id => {
            sqlx::query_as::<_, (i64,)>(
                "SELECT COUNT(*) FROM followers WHERE follower_id=? AND following_id=?",
            )
            .bind(viewer.to_string())
            .bind(&id)
            .fetch_one(pool)
            .await?
            .0 > 0
        }
        _ => false,
    };

    Ok(FollowerStats {
        follower_count,
        following_count,
        is_following,
    })
}

#[debug_handler]
pub(crate) async fn follow(
    State(db_pool): State<SqlitePool>,
    Path(user_id): Path<Uuid>,
    session: Session,
) -> ApiResult<StatusCode> {
    let follower = session::require_user(&session).await?;
    follow_user(&db_pool, follower, user_id).await?;
    Ok(StatusCode::CREATED)
}

#[debug_handler]
pub(crate) async fn unfollow(
    State(db_pool): State<SqlitePool>,
    Path(user_id): Path<Uuid>,
    session: Session,
) -> ApiResult<StatusCode> {
    let follower = session::require_user(&session).await?;
    unfollow_user(&db_pool, follower, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
pub(crate) async fn stats(
    State(db_pool): State<SqlitePool>,
    Path(user_id): Path<Uuid>,
    session: Session,
) -> ApiResult<Json<FollowerStats>> {
    let viewer = session::current_user(&session).await?;
    Ok(Json(follower_stats(&db_pool, viewer, user_id).await?))
}
