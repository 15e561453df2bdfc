use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult};

pub const USER_ID: &str = "user_id";

pub async fn current_user(session: &Session) -> ApiResult<Option<Uuid>> {
    Ok(match session.get::<String>(USER_ID).await? {
        Some(id) => Uuid::parse_str(&id).ok(),
        None => None,
    })
}

pub async fn require_user(session: &Session) -> ApiResult<Uuid> {
    current_user(session).await?.ok_or(ApiError::Unauthenticated)
}
