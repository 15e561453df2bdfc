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

use super::{Job, JobInput, add_job, delete_job, get_job, list_jobs, update_job, user_jobs};

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    user_id: Option<Uuid>,
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    Query(ListQuery { user_id }): Query<ListQuery>,
) -> ApiResult<Json<Vec<Job>>> {
    let jobs = match user_id {
        Some(user_id) => user_jobs(&db_pool, user_id).await?,
        None => list_jobs(&db_pool).await?,
    };
    Ok(Json(jobs))
}

#[debug_handler]
pub(crate) async fn get_one(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    get_job(&db_pool, &id.to_string())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("job"))
}

#[debug_handler]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(input): Json<JobInput>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    let user_id = session::require_user(&session).await?;
    let job = add_job(&db_pool, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[debug_handler]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(input): Json<JobInput>,
) -> ApiResult<Json<Job>> {
    let user_id = session::require_user(&session).await?;
    Ok(Json(
        update_job(&db_pool, user_id, &id.to_string(), input).await?,
    ))
}

#[debug_handler]
pub(crate) async fn remove(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    session: Session,
) -> ApiResult<StatusCode> {
    let user_id = session::require_user(&session).await?;
    delete_job(&db_pool, user_id, &id.to_string()).await?;
    Ok(StatusCode::NO_CONTENT)
}
