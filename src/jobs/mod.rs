mod apply;
mod crud;

use axum::{
    Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, db};

pub use apply::{ApplicationState, JobApplicant, get_applicants, toggle_application};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list).post(crud::create))
        .route(
            "/{id}",
            get(crud::get_one).put(crud::update).delete(crud::remove),
        )
        .route("/{id}/applicants", get(apply::applicants))
        .route("/{id}/apply", post(apply::apply))
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Job {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub requirements: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    pub work_mode: Option<String>,
    pub contact_info: Option<String>,
    pub application_form: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    pub location: String,
    pub requirements: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    pub work_mode: Option<String>,
    pub contact_info: Option<String>,
    pub application_form: Option<String>,
}

pub async fn list_jobs(pool: &SqlitePool) -> ApiResult<Vec<Job>> {
    Ok(
        sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn user_jobs(pool: &SqlitePool, user_id: Uuid) -> ApiResult<Vec<Job>> {
    Ok(sqlx::query_as::<_, Job>(
        "SELECT * FROM jobs WHERE user_id=? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?)
}

pub async fn get_job(pool: &SqlitePool, id: &str) -> ApiResult<Option<Job>> {
    Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn add_job(pool: &SqlitePool, user_id: Uuid, input: JobInput) -> ApiResult<Job> {
    let job = Job {
        id: Uuid::now_v7().to_string(),
        user_id: user_id.to_string(),
        title: input.title,
        company: input.company,
        location: input.location,
        requirements: input.requirements,
        experience_level: input.experience_level,
        salary_range: input.salary_range,
        work_mode: input.work_mode,
        contact_info: input.contact_info,
        application_form: input.application_form,
        created_at: db::now(),
    };

    sqlx::query(
        "INSERT INTO jobs (id,user_id,title,company,location,requirements,experience_level,\
         salary_range,work_mode,contact_info,application_form,created_at) \
         VALUES (?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(&job.id)
    .bind(&job.user_id)
    .bind(&job.title)
    .bind(&job.company)
    .bind(&job.location)
    .bind(&job.requirements)
    .bind(&job.experience_level)
    .bind(&job.salary_range)
    .bind(&job.work_mode)
    .bind(&job.contact_info)
    .bind(&job.application_form)
    .bind(&job.created_at)
    .execute(pool)
    .await?;

    Ok(job)
}

/// The owning user id never changes; only the owner may edit.
pub async fn update_job(
    pool: &SqlitePool,
    user_id: Uuid,
    id: &str,
    input: JobInput,
) -> ApiResult<Job> {
    require_owner(pool, user_id, id).await?;

    sqlx::query(
        "UPDATE jobs SET title=?,company=?,location=?,requirements=?,experience_level=?,\
         salary_range=?,work_mode=?,contact_info=?,application_form=? WHERE id=?",
    )
    .bind(&input.title)
    .bind(&input.company)
    .bind(&input.location)
    .bind(&input.requirements)
    .bind(&input.experience_level)
    .bind(&input.salary_range)
    .bind(&input.work_mode)
    .bind(&input.contact_info)
    .bind(&input.application_form)
    .bind(id)
    .execute(pool)
    .await?;

    get_job(pool, id).await?.ok_or(ApiError::NotFound("job"))
}

pub async fn delete_job(pool: &SqlitePool, user_id: Uuid, id: &str) -> ApiResult<()> {
    require_owner(pool, user_id, id).await?;

    sqlx::query("DELETE FROM jobs WHERE id=?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn require_owner(pool: &SqlitePool, user_id: Uuid, id: &str) -> ApiResult<()> {
    let Some((owner,)) = sqlx::query_as::<_, (String,)>("SELECT user_id FROM jobs WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Err(ApiError::NotFound("job"));
    };

    if owner != user_id.to_string() {
        return Err(ApiError::Forbidden("job"));
    }
    Ok(())
}
