use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{ApiResult, session::USER_ID};

use super::{SessionUser, verify_login};

#[derive(Deserialize)]
pub(crate) struct LoginInput {
    email: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(LoginInput { email, password }): Json<LoginInput>,
) -> ApiResult<Json<SessionUser>> {
    let user_id = verify_login(&db_pool, &email, &password).await?;

    // fresh session on every login
    session.clear().await;
    session.insert(USER_ID, user_id.to_string()).await?;

    Ok(Json(SessionUser {
        id: user_id.to_string(),
        email,
    }))
}
