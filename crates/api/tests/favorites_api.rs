//! Favorites.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json, post_json_auth, seed_dealer, seed_listing, seed_profile};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_is_idempotent_and_listed(pool: PgPool) {
    let (_, token) = seed_profile(&pool, "user").await;
    let dealer = seed_dealer(&pool, "Kusanagi").await;
    let listing = seed_listing(&pool, dealer, "Tanto", "tanto", Some(600_000.0), None).await;

    for _ in 0..2 {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, "/api/v1/favorites", &token, json!({ "listing_id": listing })).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/favorites", &token).await).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], listing);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn favorite_unknown_listing_is_404(pool: PgPool) {
    let (_, token) = seed_profile(&pool, "user").await;
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/favorites", &token, json!({ "listing_id": 424242 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn remove_then_remove_again(pool: PgPool) {
    let (_, token) = seed_profile(&pool, "user").await;
    let dealer = seed_dealer(&pool, "Seiyudo").await;
    let listing = seed_listing(&pool, dealer, "Tsuba", "tsuba", Some(150_000.0), None).await;

    let app = common::build_test_app(pool.clone());
    post_json_auth(app, "/api/v1/favorites", &token, json!({ "listing_id": listing })).await;

    let uri = format!("/api/v1/favorites/{listing}");
    let app = common::build_test_app(pool.clone());
    assert_eq!(delete_auth(app, &uri, &token).await.status(), StatusCode::NO_CONTENT);
    let app = common::build_test_app(pool);
    assert_eq!(delete_auth(app, &uri, &token).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_favorite_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/favorites", json!({ "listing_id": 1 })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
