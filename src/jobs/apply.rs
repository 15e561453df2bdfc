use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, db, error::is_unique_violation, session};

use super::get_job;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobApplicant {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    Applied,
    Withdrawn,
}

pub async fn get_applicants(pool: &SqlitePool, job_id: &str) -> ApiResult<Vec<JobApplicant>> {
    Ok(sqlx::query_as::<_, JobApplicant>(
        "SELECT id,job_id,user_id,created_at FROM job_applicants WHERE job_id=? \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?)
}

/// One user action toggles application state: the insert hitting the
/// (job, user) unique index means "already applied", so the row is removed
/// instead. Both steps run in one transaction.
pub async fn toggle_application(
    pool: &SqlitePool,
    user_id: Uuid,
    job_id: &str,
) -> ApiResult<ApplicationState> {
    if get_job(pool, job_id).await?.is_none() {
        return Err(ApiError::NotFound("job"));
    }

    let mut tx = pool.begin().await?;

    let insert =
        sqlx::query("INSERT INTO job_applicants (id,job_id,user_id,created_at) VALUES (?,?,?,?)")
            .bind(Uuid::now_v7().to_string())
            .bind(job_id)
            .bind(user_id.to_string())
            .bind(db::now())
            .execute(&mut *tx)
            .await;

    let state = match insert {
        Ok(_) => ApplicationState::Applied,
        Err(err) if is_unique_violation(&err) => {
            sqlx::query("DELETE FROM job_applicants WHERE job_id=? AND user_id=?")
                .bind(job_id)
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await?;
            ApplicationState::Withdrawn
        }
        Err(err) => return Err(err.into()),
    };

    tx.commit().await?;
    Ok(state)
}

#[debug_handler]
pub(crate) async fn applicants(
    State(db_pool): State<SqlitePool>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<Vec<JobApplicant>>> {
    Ok(Json(get_applicants(&db_pool, &job_id.to_string()).await?))
}

#[debug_handler]
pub(crate) async fn apply(
    State(db_pool): State<SqlitePool>,
    Path(job_id): Path<Uuid>,
    session: Session,
) -> ApiResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let job_id = job_id.to_string();

    let state = toggle_application(&db_pool, user_id, &job_id).await?;
    let applicant_count = get_applicants(&db_pool, &job_id).await?.len();

    Ok(Json(json!({
        "status": state,
        "applicant_count": applicant_count,
    })))
}
