pub mod auth;
pub mod chat;
pub mod db;
pub mod error;
pub mod followers;
pub mod jobs;
pub mod profiles;
pub mod search;
pub mod session;
pub mod workers;

use axum::extract::FromRef;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

pub use error::{ApiError, ApiResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub tx: broadcast::Sender<chat::MessageEvent>,
}
