mod crud;

use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, types::Json as SqlJson};
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, db};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list).post(crud::create))
        .route("/mine", get(crud::mine))
        .route(
            "/{id}",
            get(crud::get_one).put(crud::update).delete(crud::remove),
        )
}

/// A worker listing. Skills keep their submitted order; they are stored as
/// a JSON array in a TEXT column.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Worker {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub surname: String,
    pub profession: String,
    pub skills: SqlJson<Vec<String>>,
    pub location: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkerInput {
    pub name: String,
    pub surname: String,
    pub profession: String,
    pub skills: Vec<String>,
    pub location: String,
}

pub async fn list_workers(pool: &SqlitePool) -> ApiResult<Vec<Worker>> {
    Ok(
        sqlx::query_as::<_, Worker>("SELECT * FROM workers ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn user_workers(pool: &SqlitePool, user_id: Uuid) -> ApiResult<Vec<Worker>> {
    Ok(sqlx::query_as::<_, Worker>(
        "SELECT * FROM workers WHERE user_id=? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?)
}

pub async fn get_worker(pool: &SqlitePool, id: &str) -> ApiResult<Option<Worker>> {
    Ok(sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// The current user's own listing, if they have posted one.
pub async fn get_user_worker(pool: &SqlitePool, user_id: Uuid) -> ApiResult<Option<Worker>> {
    Ok(
        sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE user_id=? LIMIT 1")
            .bind(user_id.to_string())
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn add_worker(pool: &SqlitePool, user_id: Uuid, input: WorkerInput) -> ApiResult<Worker> {
    let worker = Worker {
        id: Uuid::now_v7().to_string(),
        user_id: user_id.to_string(),
        name: input.name,
        surname: input.surname,
        profession: input.profession,
        skills: SqlJson(input.skills),
        location: input.location,
        created_at: db::now(),
    };

    sqlx::query(
        "INSERT INTO workers (id,user_id,name,surname,profession,skills,location,created_at) \
         VALUES (?,?,?,?,?,?,?,?)",
    )
    .bind(&worker.id)
    .bind(&worker.user_id)
    .bind(&worker.name)
    .bind(&worker.surname)
    .bind(&worker.profession)
    .bind(&worker.skills)
    .bind(&worker.location)
    .bind(&worker.created_at)
    .execute(pool)
    .await?;

    Ok(worker)
}

pub async fn update_worker(
    pool: &SqlitePool,
    user_id: Uuid,
    id: &str,
    input: WorkerInput,
) -> ApiResult<Worker> {
    require_owner(pool, user_id, id).await?;

    sqlx::query("UPDATE workers SET name=?,surname=?,profession=?,skills=?,location=? WHERE id=?")
        .bind(&input.name)
        .bind(&input.surname)
        .bind(&input.profession)
        .bind(SqlJson(&input.skills))
        .bind(&input.location)
        .bind(id)
        .execute(pool)
        .await?;

    get_worker(pool, id)
        .await?
        .ok_or(ApiError::NotFound("worker listing"))
}

pub async fn delete_worker(pool: &SqlitePool, user_id: Uuid, id: &str) -> ApiResult<()> {
    require_owner(pool, user_id, id).await?;

    sqlx::query("DELETE FROM workers WHERE id=?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn require_owner(pool: &SqlitePool, user_id: Uuid, id: &str) -> ApiResult<()> {
    let Some((owner,)) = sqlx::query_as::<_, (String,)>("SELECT user_id FROM workers WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Err(ApiError::NotFound("worker listing"));
    };

    if owner != user_id.to_string() {
        return Err(ApiError::Forbidden("worker listing"));
    }
    Ok(())
}
