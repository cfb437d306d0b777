#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use nihontowatch_api::auth::jwt::{sign_token, JwtConfig};
use nihontowatch_api::clients::geo::GeoClient;
use nihontowatch_api::clients::llm::LlmClient;
use nihontowatch_api::config::{LlmConfig, ServerConfig};
use nihontowatch_api::routes;
use nihontowatch_api::state::AppState;
use nihontowatch_core::currency::ExchangeRates;
use nihontowatch_core::types::{DbId, UserId};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_CRON_SECRET: &str = "test-cron-secret";

/// A `ServerConfig` with safe defaults: no LLM endpoint (drafts fall back
/// to the template) and an unroutable geo endpoint.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        cron_secret: Some(TEST_CRON_SECRET.to_string()),
        profile_fetch_timeout: Duration::from_secs(3),
        saved_search_min_price_jpy: 100_000.0,
        exchange_rates: ExchangeRates::default(),
        geo_api_url: "http://127.0.0.1:9/batch".to_string(),
        llm: LlmConfig::default(),
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let geo = GeoClient::new(config.geo_api_url.clone())
        .unwrap()
        .with_spacing(Duration::ZERO);
    let llm = LlmClient::new(config.llm.clone()).unwrap();

    let state = AppState {
        pool,
        config: Arc::new(config),
        geo: Arc::new(geo),
        llm: Arc::new(llm),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:3000".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::PATCH, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::delete(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a profile with `role` and return its id plus a signed session.
pub async fn seed_profile(pool: &PgPool, role: &str) -> (UserId, String) {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, email, role) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(format!("{id}@test.example"))
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
    let token = token_for(id);
    (id, token)
}

pub fn token_for(user_id: UserId) -> String {
    let config = JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
    };
    sign_token(user_id, 3600, &config).unwrap()
}

pub async fn seed_dealer(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO dealers (name, domain) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(format!("{}.example", name.to_lowercase().replace(' ', "-")))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Insert an available JPY-priced listing first seen now.
pub async fn seed_listing(
    pool: &PgPool,
    dealer_id: DbId,
    title: &str,
    item_type: &str,
    price_jpy: Option<f64>,
    cert_type: Option<&str>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO listings \
            (url, title, item_type, price_value, price_currency, price_jpy, cert_type, status, dealer_id) \
         VALUES ($1, $2, $3, $4, 'JPY', $4, $5, 'available', $6) \
         RETURNING id",
    )
    .bind(format!("https://dealer.example/{}", Uuid::new_v4()))
    .bind(title)
    .bind(item_type)
    .bind(price_jpy)
    .bind(cert_type)
    .bind(dealer_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
