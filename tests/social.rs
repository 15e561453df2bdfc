mod common;

use jobhub::{
    ApiError, followers,
    jobs::{self, ApplicationState, JobInput},
};
use sqlx::SqlitePool;
use uuid::Uuid;

async fn post_job(pool: &SqlitePool, owner: Uuid) -> String {
    jobs::add_job(
        pool,
        owner,
        JobInput {
            title: "Proqramçı".to_owned(),
            company: "Acme MMC".to_owned(),
            location: "Bakı".to_owned(),
            requirements: None,
            experience_level: None,
            salary_range: None,
            work_mode: None,
            contact_info: None,
            application_form: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn double_follow_is_distinguishable_and_leaves_one_edge() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;

    followers::follow_user(&pool, a, b).await.unwrap();
    let err = followers::follow_user(&pool, a, b).await.unwrap_err();
    assert!(matches!(err, ApiError::AlreadyFollowing));

    let (edges,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM followers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(edges, 1);
}

#[tokio::test]
async fn follow_stats_reflect_the_viewer() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;
    let c = common::signup(&pool, "c@example.com", "Cavid", "Məmmədov").await;

    followers::follow_user(&pool, a, b).await.unwrap();
    followers::follow_user(&pool, c, b).await.unwrap();
    followers::follow_user(&pool, b, a).await.unwrap();

    let stats = followers::follower_stats(&pool, Some(a), b).await.unwrap();
    assert_eq!(stats.follower_count, 2);
    assert_eq!(stats.following_count, 1);
    assert!(stats.is_following);

    // a user never "follows" themselves in their own stats
    let own = followers::follower_stats(&pool, Some(b), b).await.unwrap();
    assert!(!own.is_following);

    let anonymous = followers::follower_stats(&pool, None, b).await.unwrap();
    assert!(!anonymous.is_following);
}

#[tokio::test]
async fn unfollow_is_idempotent_and_self_follow_is_rejected() {
    let pool = common::test_pool().await;
    let a = common::signup(&pool, "a@example.com", "Aysel", "Əliyeva").await;
    let b = common::signup(&pool, "b@example.com", "Babək", "Quliyev").await;

    let err = followers::follow_user(&pool, a, a).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    followers::follow_user(&pool, a, b).await.unwrap();
    followers::unfollow_user(&pool, a, b).await.unwrap();
    followers::unfollow_user(&pool, a, b).await.unwrap();

    let stats = followers::follower_stats(&pool, Some(a), b).await.unwrap();
    assert_eq!(stats.follower_count, 0);
    assert!(!stats.is_following);
}

#[tokio::test]
async fn applying_twice_toggles_back_to_not_applied() {
    let pool = common::test_pool().await;
    let owner = common::signup(&pool, "owner@example.com", "Orxan", "Bağırov").await;
    let applicant = common::signup(&pool, "app@example.com", "Aysel", "Əliyeva").await;
    let job_id = post_job(&pool, owner).await;

    let first = jobs::toggle_application(&pool, applicant, &job_id)
        .await
        .unwrap();
    assert_eq!(first, ApplicationState::Applied);
    assert_eq!(jobs::get_applicants(&pool, &job_id).await.unwrap().len(), 1);

    let second = jobs::toggle_application(&pool, applicant, &job_id)
        .await
        .unwrap();
    assert_eq!(second, ApplicationState::Withdrawn);
    assert_eq!(jobs::get_applicants(&pool, &job_id).await.unwrap().len(), 0);

    // a third click applies again, still exactly one row
    jobs::toggle_application(&pool, applicant, &job_id)
        .await
        .unwrap();
    let rows = jobs::get_applicants(&pool, &job_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, applicant.to_string());
}

#[tokio::test]
async fn applying_to_a_missing_job_fails() {
    let pool = common::test_pool().await;
    let applicant = common::signup(&pool, "app@example.com", "Aysel", "Əliyeva").await;

    let err = jobs::toggle_application(&pool, applicant, &Uuid::now_v7().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
