mod avatar;
mod edit;
mod view;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{ApiResult, AppState};

pub use avatar::save_avatar;
pub use edit::{UpdateProfile, update_profile};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(view::me).put(edit::update))
        .route(
            "/me/avatar",
            // the default body limit sits below the avatar cap; leave
            // headroom for the multipart framing
            post(avatar::upload).layer(DefaultBodyLimit::max(avatar::MAX_AVATAR_BYTES + 64 * 1024)),
        )
        .route("/{id}", get(view::by_id))
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub profession: Option<String>,
    pub about: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> ApiResult<Option<Profile>> {
    Ok(sqlx::query_as::<_, Profile>(
        "SELECT id,name,surname,username,profession,about,phone,avatar_url \
         FROM profiles WHERE id=?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}
