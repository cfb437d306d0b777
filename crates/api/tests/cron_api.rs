//! Scheduled saved-search check.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use common::{body_json, post_json, seed_dealer, seed_listing, seed_profile, TEST_CRON_SECRET};
use nihontowatch_core::types::UserId;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn post_cron(app: axum::Router, header: &str, value: &str) -> axum::response::Response {
    let request = Request::post("/api/v1/cron/saved-searches/run")
        .header(header, value)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_or_wrong_secret_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/cron/saved-searches/run", json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = post_cron(app, "x-cron-secret", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unconfigured_secret_rejects_everything(pool: PgPool) {
    let mut config = common::test_config();
    config.cron_secret = None;
    let app = common::build_test_app_with(pool, config);
    let response = post_cron(app, "x-cron-secret", TEST_CRON_SECRET).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

async fn insert_search(pool: &PgPool, user_id: UserId, criteria: serde_json::Value, age: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO saved_searches (user_id, name, criteria, created_at) \
         VALUES ($1, 'Alert', $2, NOW() - $3::interval) RETURNING id",
    )
    .bind(user_id)
    .bind(criteria)
    .bind(age)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn backdate_listing(pool: &PgPool, listing_id: i64, age: &str) {
    sqlx::query("UPDATE listings SET first_seen_at = NOW() - $2::interval WHERE id = $1")
        .bind(listing_id)
        .bind(age)
        .execute(pool)
        .await
        .unwrap();
}

async fn checkpoint(pool: &PgPool, search_id: i64) -> (Option<DateTime<Utc>>, i32) {
    sqlx::query_as("SELECT last_checked_at, last_match_count FROM saved_searches WHERE id = $1")
        .bind(search_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_records_new_matches(pool: PgPool) {
    let (user_id, _) = seed_profile(&pool, "user").await;
    let dealer = seed_dealer(&pool, "Tokka").await;
    let old = seed_listing(&pool, dealer, "Old Hozon katana", "katana", Some(900_000.0), Some("Hozon")).await;
    backdate_listing(&pool, old, "2 days").await;
    seed_listing(&pool, dealer, "Hozon katana", "katana", Some(900_000.0), Some("Hozon")).await;
    seed_listing(&pool, dealer, "Juyo katana", "katana", Some(6_000_000.0), Some("Juyo")).await;

    let search_id = insert_search(&pool, user_id, json!({ "certifications": ["Hozon"] }), "1 day").await;

    let app = common::build_test_app(pool.clone());
    let response = post_cron(app, "authorization", &format!("Bearer {TEST_CRON_SECRET}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["checked"], 1);
    assert_eq!(json["data"]["with_matches"], 1);
    assert_eq!(json["data"]["failed"], 0);
    // The listing that predates the search is not new to it.
    assert_eq!(json["data"]["results"][0]["new_matches"], 1);

    let (checked_at, count) = checkpoint(&pool, search_id).await;
    assert!(checked_at.is_some());
    assert_eq!(count, 1);

    // Nothing new since the last check.
    let app = common::build_test_app(pool);
    let json = body_json(post_cron(app, "x-cron-secret", TEST_CRON_SECRET).await).await;
    assert_eq!(json["data"]["results"][0]["new_matches"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_search_keeps_its_checkpoint(pool: PgPool) {
    let (user_id, _) = seed_profile(&pool, "user").await;
    let dealer = seed_dealer(&pool, "Aoi Art").await;
    seed_listing(&pool, dealer, "Masamune katana", "katana", Some(900_000.0), None).await;
    seed_listing(&pool, dealer, "Hozon katana", "katana", Some(900_000.0), Some("Hozon")).await;

    let by_name = insert_search(&pool, user_id, json!({ "query": "masamune" }), "3 days").await;
    let by_cert = insert_search(&pool, user_id, json!({ "certifications": ["Hozon"] }), "3 days").await;
    sqlx::query("UPDATE saved_searches SET last_checked_at = NOW() - INTERVAL '1 day' WHERE id = $1")
        .bind(by_name)
        .execute(&pool)
        .await
        .unwrap();
    let (before, _) = checkpoint(&pool, by_name).await;

    // Artisan resolution for the name query now errors.
    sqlx::query("ALTER TABLE artisan_index RENAME TO artisan_index_offline")
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone());
    let json = body_json(post_cron(app, "x-cron-secret", TEST_CRON_SECRET).await).await;
    assert_eq!(json["data"]["checked"], 1);
    assert_eq!(json["data"]["failed"], 1);
    assert_eq!(json["data"]["results"][0]["saved_search_id"], by_cert);
    assert_eq!(checkpoint(&pool, by_name).await.0, before);

    sqlx::query("ALTER TABLE artisan_index_offline RENAME TO artisan_index")
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone());
    let json = body_json(post_cron(app, "x-cron-secret", TEST_CRON_SECRET).await).await;
    assert_eq!(json["data"]["failed"], 0);
    let results = json["data"]["results"].as_array().unwrap();
    let retried = results.iter().find(|r| r["saved_search_id"] == by_name).unwrap();
    // The window from the old checkpoint is covered again.
    assert_eq!(retried["new_matches"], 1);
    assert_ne!(checkpoint(&pool, by_name).await.0, before);
}
