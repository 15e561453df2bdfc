use axum::{Router, routing::get};
use jobhub::{AppState, db, search};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobhub=debug")),
        )
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(7)));

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(dotenv::var("DATABASE_URL")?.as_str())
        .await?;
    db::init(&db_pool).await?;

    let avatar_dir = dotenv::var("AVATAR_DIR").unwrap_or_else(|_| "uploads/avatars".to_owned());
    std::fs::create_dir_all(&avatar_dir)?;

    let app_state = AppState {
        db_pool,
        tx: broadcast::channel(256).0,
    };

    let app = Router::new()
        .nest("/auth", jobhub::auth::router())
        .nest("/jobs", jobhub::jobs::router())
        .nest("/workers", jobhub::workers::router())
        .nest("/p", jobhub::profiles::router())
        .nest("/followers", jobhub::followers::router())
        .nest("/chat", jobhub::chat::router())
        .route("/search", get(search::search))
        .nest_service("/avatars", ServeDir::new(&avatar_dir))
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let addr = dotenv::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
