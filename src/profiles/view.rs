use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, session};

use super::{Profile, get_profile};

#[debug_handler]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> ApiResult<Json<Profile>> {
    let user_id = session::require_user(&session).await?;

    get_profile(&db_pool, &user_id.to_string())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}

#[debug_handler]
pub(crate) async fn by_id(
    State(db_pool): State<SqlitePool>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Profile>> {
    get_profile(&db_pool, &user_id.to_string())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}
