#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use ym_api::auth::jwt::{Claims, JwtConfig};
use ym_api::config::{ServerConfig, DEFAULT_EMAIL_DOMAIN};
use ym_api::router::build_app_router;
use ym_api::state::AppState;
use ym_api::wizard::WizardRegistry;
use ym_db::models::user::ClaimUser;
use ym_db::repositories::UserRepo;
use ym_db::stores::{PgOnboardingStore, PgReferenceSource};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        wizard_idle_timeout_secs: 1800,
        allowed_email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            audience: None,
        },
    }
}

/// Build the full application router on top of the given pool.
///
/// Clone the returned router to send several requests through the same
/// wizard registry.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let wizards = Arc::new(WizardRegistry::new(
        Arc::new(PgOnboardingStore::new(pool.clone())),
        Arc::new(PgReferenceSource::new(pool.clone())),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        wizards,
    };

    build_app_router(state, &config)
}

/// App over a pool that never connects. Only for requests the access gate
/// answers before touching the database.
pub fn build_offline_app() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy("postgres://localhost/ym_offline")
        .expect("lazy pool");
    build_test_app(pool)
}

// ---------------------------------------------------------------------------
// Tokens and members
// ---------------------------------------------------------------------------

/// Sign a session token the way the identity provider would.
pub fn token_for(auth_id: Uuid, email: &str) -> String {
    sign(auth_id, email, 3600)
}

pub fn expired_token_for(auth_id: Uuid, email: &str) -> String {
    sign(auth_id, email, -3600)
}

fn sign(auth_id: Uuid, email: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: auth_id,
        email: email.to_string(),
        given_name: Some("Amina".to_string()),
        family_name: Some("Yusuf".to_string()),
        exp: now + ttl_secs,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}

/// A member row plus a valid token for it.
pub struct TestMember {
    pub id: i64,
    pub auth_id: Uuid,
    pub token: String,
}

pub async fn claimed_member(pool: &PgPool, email: &str) -> TestMember {
    let auth_id = Uuid::new_v4();
    let user = UserRepo::claim(
        pool,
        &ClaimUser {
            auth_id,
            email: email.to_string(),
            first_name: Some("Amina".to_string()),
            last_name: Some("Yusuf".to_string()),
        },
    )
    .await
    .unwrap();
    TestMember {
        id: user.id,
        auth_id,
        token: token_for(auth_id, email),
    }
}

pub async fn onboarded_member(pool: &PgPool, email: &str) -> TestMember {
    let member = claimed_member(pool, email).await;
    UserRepo::mark_onboarding_complete(pool, member.id)
        .await
        .unwrap()
        .expect("member exists");
    member
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::PATCH)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .expect("location header")
        .to_str()
        .unwrap()
}
