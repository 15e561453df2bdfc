use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{ApiError, ApiResult, session::USER_ID};

use super::{NewUser, SessionUser, create_user};

#[derive(Deserialize)]
pub(crate) struct SignupInput {
    email: String,
    password: String,
    name: String,
    surname: String,
    username: Option<String>,
}

#[debug_handler]
pub(crate) async fn signup(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(input): Json<SignupInput>,
) -> ApiResult<Json<SessionUser>> {
    if !input.email.contains('@') {
        return Err(ApiError::BadRequest("invalid email address".into()));
    }
    if input.password.len() < 6 {
        return Err(ApiError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }

    let user_id = create_user(
        &db_pool,
        NewUser {
            email: input.email.clone(),
            password: input.password,
            name: input.name,
            surname: input.surname,
            username: input.username,
        },
    )
    .await?;

    session.insert(USER_ID, user_id.to_string()).await?;
    tracing::info!(user = %user_id, "new signup");

    Ok(Json(SessionUser {
        id: user_id.to_string(),
        email: input.email,
    }))
}
