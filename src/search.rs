use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::ApiResult;

/// One ranked-by-category result list; the tag tells the client where to
/// route on selection.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchResult {
    Profile {
        id: String,
        title: String,
        subtitle: String,
        avatar_url: Option<String>,
    },
    Job {
        id: String,
        title: String,
        subtitle: String,
    },
    Worker {
        id: String,
        title: String,
        subtitle: String,
    },
}

const PER_CATEGORY_LIMIT: i64 = 5;

/// Fan-out over profiles, jobs and workers: three independent
/// case-insensitive substring searches, capped per category, concatenated in
/// category order. No relevance ranking beyond that.
///
/// SQLite's LIKE only folds ASCII, so matching goes through the REGEXP
/// operator with `(?i)`, which case-folds the full alphabet.
pub async fn search_all(pool: &SqlitePool, query: &str) -> ApiResult<Vec<SearchResult>> {
    let query = query.trim();
    if query.chars().count() < 2 {
        return Ok(Vec::new());
    }
    let pattern = format!("(?i){}", regex::escape(query));

    let mut results = Vec::new();

    let profiles: Vec<(String, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>)> =
        sqlx::query_as(
            "SELECT id,name,surname,username,profession,avatar_url FROM profiles \
             WHERE name REGEXP ? OR surname REGEXP ? OR username REGEXP ? LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(PER_CATEGORY_LIMIT)
        .fetch_all(pool)
        .await?;

    for (id, name, surname, username, profession, avatar_url) in profiles {
        let title = format!(
            "{} {}",
            name.as_deref().unwrap_or(""),
            surname.as_deref().unwrap_or("")
        )
        .trim()
        .to_owned();
        let subtitle = match username {
            Some(username) => format!("@{username}"),
            None => profession.unwrap_or_default(),
        };
        results.push(SearchResult::Profile {
            id,
            title,
            subtitle,
            avatar_url,
        });
    }

    let jobs: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT id,title,company,location FROM jobs \
         WHERE title REGEXP ? OR company REGEXP ? OR location REGEXP ? LIMIT ?",
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(PER_CATEGORY_LIMIT)
    .fetch_all(pool)
    .await?;

    for (id, title, company, location) in jobs {
        results.push(SearchResult::Job {
            id,
            title,
            subtitle: format!("{company} · {location}"),
        });
    }

    let workers: Vec<(String, String, String, String, String)> = sqlx::query_as(
        "SELECT id,name,surname,profession,location FROM workers \
         WHERE name REGEXP ? OR surname REGEXP ? OR profession REGEXP ? LIMIT ?",
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(PER_CATEGORY_LIMIT)
    .fetch_all(pool)
    .await?;

    for (id, name, surname, profession, location) in workers {
        results.push(SearchResult::Worker {
            id,
            title: format!("{name} {surname}"),
            subtitle: format!("{profession} · {location}"),
        });
    }

    Ok(results)
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[debug_handler]
pub async fn search(
    State(db_pool): State<SqlitePool>,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    Ok(Json(search_all(&db_pool, &q).await?))
}
