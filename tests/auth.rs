mod common;

use jobhub::{
    ApiError,
    auth::{self, NewUser},
    profiles,
};

fn new_user(email: &str, username: Option<&str>) -> NewUser {
    NewUser {
        email: email.to_owned(),
        password: "sekret123".to_owned(),
        name: "Aysel".to_owned(),
        surname: "Əliyeva".to_owned(),
        username: username.map(str::to_owned),
    }
}

#[tokio::test]
async fn signup_creates_the_profile_implicitly() {
    let pool = common::test_pool().await;
    let id = auth::create_user(&pool, new_user("a@example.com", Some("aysel")))
        .await
        .unwrap();

    let profile = profiles::get_profile(&pool, &id.to_string())
        .await
        .unwrap()
        .expect("profile row created at signup");
    assert_eq!(profile.name.as_deref(), Some("Aysel"));
    assert_eq!(profile.username.as_deref(), Some("aysel"));
    assert_eq!(profile.avatar_url, None);
}

#[tokio::test]
async fn duplicate_email_and_username_are_rejected() {
    let pool = common::test_pool().await;
    auth::create_user(&pool, new_user("a@example.com", Some("aysel")))
        .await
        .unwrap();

    let err = auth::create_user(&pool, new_user("a@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::EmailTaken));

    let err = auth::create_user(&pool, new_user("b@example.com", Some("aysel")))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UsernameTaken));

    // a failed signup leaves nothing behind
    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}

#[tokio::test]
async fn login_checks_the_password() {
    let pool = common::test_pool().await;
    let id = auth::create_user(&pool, new_user("a@example.com", None))
        .await
        .unwrap();

    let logged_in = auth::verify_login(&pool, "a@example.com", "sekret123")
        .await
        .unwrap();
    assert_eq!(logged_in, id);

    let err = auth::verify_login(&pool, "a@example.com", "yanlış")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));

    let err = auth::verify_login(&pool, "nobody@example.com", "sekret123")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
}
