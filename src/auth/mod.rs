mod login;
mod logout;
mod signup;

use axum::{
    Json, Router, debug_handler,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, db, error::is_unique_violation, session};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup::signup))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/me", get(me))
}

#[derive(Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

#[debug_handler]
async fn me(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> ApiResult<Json<SessionUser>> {
    let user_id = session::require_user(&session).await?;

    let Some((email,)) = sqlx::query_as::<_, (String,)>("SELECT email FROM users WHERE id=?")
        .bind(user_id.to_string())
        .fetch_optional(&db_pool)
        .await?
    else {
        // session points at a user that no longer exists
        session.clear().await;
        return Err(ApiError::Unauthenticated);
    };

    Ok(Json(SessionUser {
        id: user_id.to_string(),
        email,
    }))
}

pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub username: Option<String>,
}

/// Creates the account and its profile row in one transaction; signing up
/// is the only place a profile is ever created.
pub async fn create_user(pool: &SqlitePool, new: NewUser) -> ApiResult<Uuid> {
    let id = Uuid::now_v7();
    let hash = bcrypt::hash(&new.password, bcrypt::DEFAULT_COST)?;

    let mut tx = pool.begin().await?;

    if let Err(err) =
        sqlx::query("INSERT INTO users (id,email,password_hash,created_at) VALUES (?,?,?,?)")
            .bind(id.to_string())
            .bind(&new.email)
            .bind(&hash)
            .bind(db::now())
            .execute(&mut *tx)
            .await
    {
        return Err(if is_unique_violation(&err) {
            ApiError::EmailTaken
        } else {
            err.into()
        });
    }

    if let Err(err) = sqlx::query("INSERT INTO profiles (id,name,surname,username) VALUES (?,?,?,?)")
        .bind(id.to_string())
        .bind(&new.name)
        .bind(&new.surname)
        .bind(&new.username)
        .execute(&mut *tx)
        .await
    {
        return Err(if is_unique_violation(&err) {
            ApiError::UsernameTaken
        } else {
            err.into()
        });
    }

    tx.commit().await?;
    Ok(id)
}

pub async fn verify_login(pool: &SqlitePool, email: &str, password: &str) -> ApiResult<Uuid> {
    let Some((id, hash)) =
        sqlx::query_as::<_, (String, String)>("SELECT id,password_hash FROM users WHERE email=?")
            .bind(email)
            .fetch_optional(pool)
            .await?
    else {
        return Err(ApiError::InvalidCredentials);
    };

    if !bcrypt::verify(password, &hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    Uuid::parse_str(&id).map_err(|e| anyhow::Error::from(e).into())
}
