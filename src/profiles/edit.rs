use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, session};

use super::{Profile, get_profile};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub profession: Option<String>,
    pub about: Option<String>,
    pub phone: Option<String>,
}

/// Partial update: absent fields keep their stored value. A username is
/// only accepted if no other user already holds it.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    input: UpdateProfile,
) -> ApiResult<Profile> {
    let id = user_id.to_string();
    let Some(mut profile) = get_profile(pool, &id).await? else {
        return Err(ApiError::NotFound("profile"));
    };

    if let Some(username) = &input.username {
        let taken =
            sqlx::query_as::<_, (String,)>("SELECT id FROM profiles WHERE username=? AND id<>?")
                .bind(username)
                .bind(&id)
                .fetch_optional(pool)
                .await?
                .is_some();
        if taken {
            return Err(ApiError::UsernameTaken);
        }
    }

    if let Some(v) = input.name {
        profile.name = Some(v);
    }
    if let Some(v) = input.surname {
        profile.surname = Some(v);
    }
    if let Some(v) = input.username {
        profile.username = Some(v);
    }
    if let Some(v) = input.profession {
        profile.profession = Some(v);
    }
    if let Some(v) = input.about {
        profile.about = Some(v);
    }
    if let Some(v) = input.phone {
        profile.phone = Some(v);
    }

    sqlx::query(
        "UPDATE profiles SET name=?,surname=?,username=?,profession=?,about=?,phone=? WHERE id=?",
    )
    .bind(&profile.name)
    .bind(&profile.surname)
    .bind(&profile.username)
    .bind(&profile.profession)
    .bind(&profile.about)
    .bind(&profile.phone)
    .bind(&id)
    .execute(pool)
    .await?;

    Ok(profile)
}

#[debug_handler]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(input): Json<UpdateProfile>,
) -> ApiResult<Json<Profile>> {
    let user_id = session::require_user(&session).await?;
    Ok(Json(update_profile(&db_pool, user_id, input).await?))
}
