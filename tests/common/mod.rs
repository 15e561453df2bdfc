use jobhub::{
    auth::{self, NewUser},
    db,
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use uuid::Uuid;

pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("options")
        .with_regexp();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory sqlite");
    db::init(&pool).await.expect("schema");
    pool
}

pub async fn signup(pool: &SqlitePool, email: &str, name: &str, surname: &str) -> Uuid {
    auth::create_user(
        pool,
        NewUser {
            email: email.to_owned(),
            password: "sekret123".to_owned(),
            name: name.to_owned(),
            surname: surname.to_owned(),
            username: None,
        },
    )
    .await
    .expect("signup")
}
