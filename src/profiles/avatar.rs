use std::path::Path;

use axum::{Json, debug_handler, extract::Multipart, extract::State};
use rand::distr::{Alphanumeric, SampleString};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{ApiError, ApiResult, session};

pub(crate) const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Serialize)]
pub(crate) struct AvatarResponse {
    pub url: String,
}

/// Sniffs the image type from magic bytes; the client-supplied file name
/// and content type are not trusted.
fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("webp"),
        _ => None,
    }
}

/// Validates the bytes, writes them under `dir` with a randomized file name
/// and points the profile's `avatar_url` at the served path.
pub async fn save_avatar(
    pool: &SqlitePool,
    user_id: Uuid,
    dir: &Path,
    data: &[u8],
) -> ApiResult<String> {
    if data.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::BadRequest("image is larger than 5MB".into()));
    }
    let Some(ext) = sniff_image(data) else {
        return Err(ApiError::BadRequest("unsupported image format".into()));
    };

    let file_name = format!(
        "{user_id}-{}.{ext}",
        Alphanumeric.sample_string(&mut rand::rng(), 12)
    );
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(anyhow::Error::from)?;
    tokio::fs::write(dir.join(&file_name), data)
        .await
        .map_err(anyhow::Error::from)?;

    let url = format!("/avatars/{file_name}");
    sqlx::query("UPDATE profiles SET avatar_url=? WHERE id=?")
        .bind(&url)
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(url)
}

#[debug_handler]
pub(crate) async fn upload(
    State(db_pool): State<SqlitePool>,
    session: Session,
    mut multipart: Multipart,
) -> ApiResult<Json<AvatarResponse>> {
    let user_id = session::require_user(&session).await?;

    let Some(field) = multipart.next_field().await.map_err(anyhow::Error::from)? else {
        return Err(ApiError::BadRequest("no file in upload".into()));
    };
    let data = field.bytes().await.map_err(anyhow::Error::from)?;

    let dir = dotenv::var("AVATAR_DIR").unwrap_or_else(|_| "uploads/avatars".to_owned());
    let url = save_avatar(&db_pool, user_id, Path::new(&dir), &data).await?;

    Ok(Json(AvatarResponse { url }))
}
