use axum::{
    Json, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, session};

use super::{
    Worker, WorkerInput, add_worker, delete_worker, get_user_worker, get_worker, list_workers,
    update_worker, user_workers,
};

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    user_id: Option<Uuid>,
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    Query(ListQuery { user_id }): Query<ListQuery>,
) -> ApiResult<Json<Vec<Worker>>> {
    let workers = match user_id {
        Some(user_id) => user_workers(&db_pool, user_id).await?,
        None => list_workers(&db_pool).await?,
    };
    Ok(Json(workers))
}

#[debug_handler]
pub(crate) async fn mine(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> ApiResult<Json<Option<Worker>>> {
    let user_id = session::require_user(&session).await?;
    Ok(Json(get_user_worker(&db_pool, user_id).await?))
}

#[debug_handler]
pub(crate) async fn get_one(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Worker>> {
    get_worker(&db_pool, &id.to_string())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("worker listing"))
}

#[debug_handler]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(input): Json<WorkerInput>,
) -> ApiResult<(StatusCode, Json<Worker>)> {
    let user_id = session::require_user(&session).await?;
    let worker = add_worker(&db_pool, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(worker)))
}

#[debug_handler]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(input): Json<WorkerInput>,
) -> ApiResult<Json<Worker>> {
    let user_id = session::require_user(&session).await?;
    Ok(Json(
        update_worker(&db_pool, user_id, &id.to_string(), input).await?,
    ))
}

#[debug_handler]
pub(crate) async fn remove(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    session: Session,
) -> ApiResult<StatusCode> {
    let user_id = session::require_user(&session).await?;
    delete_worker(&db_pool, user_id, &id.to_string()).await?;
    Ok(StatusCode::NO_CONTENT)
}
