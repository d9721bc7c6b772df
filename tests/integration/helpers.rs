//! Shared test infrastructure for CyberShare integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use cybershare_auth::JwtEncoder;
use cybershare_cache::CacheManager;
use cybershare_core::config::{AppConfig, MailDriver};
use cybershare_database::DatabasePool;
use cybershare_entity::user::UserRole;

/// Password accepted by the default validator.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test application wrapper around the full router.
pub struct TestApp {
    /// The Axum router under test.
    pub router: Router,
    /// Pool shared with the router.
    pub db_pool: PgPool,
    /// Configuration the router was built with.
    pub config: AppConfig,
    /// Upload directory, removed when the app is dropped.
    pub uploads: tempfile::TempDir,
}

/// Defaults pointing at a database that is never reached.
pub fn offline_config() -> AppConfig {
    test_config("postgres://localhost:1/cybershare_offline")
}

fn test_config(database_url: impl Into<String>) -> AppConfig {
    let mut config = AppConfig::with_database_url(database_url);
    config.mail.driver = MailDriver::Log;
    config
}

/// A registered account and its tokens.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Router on a lazily connected pool. Only routes that never touch the
    /// database may be exercised.
    pub fn offline() -> Self {
        let mut config = offline_config();
        config.server.rate_limit.enabled = false;
        Self::offline_with(config)
    }

    /// Like [`TestApp::offline`] with caller-supplied configuration.
    pub fn offline_with(config: AppConfig) -> Self {
        let database = DatabasePool::connect_lazy(&config.database)
            .expect("Failed to build lazy pool");
        Self::build(config, database.into_pool())
    }

    /// Router on the database named by `DATABASE_URL`, with migrations
    /// applied. Returns `None` when the variable is unset.
    pub async fn with_database() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let mut config = test_config(url);
        config.server.rate_limit.enabled = false;

        let database = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        cybershare_database::migration::run_migrations(database.pool())
            .await
            .expect("Failed to run migrations");

        Some(Self::build(config, database.into_pool()))
    }

    fn build(mut config: AppConfig, db_pool: PgPool) -> Self {
        let uploads = tempfile::tempdir().expect("Failed to create upload dir");
        config.storage.upload_dir = uploads.path().to_string_lossy().into_owned();
        let cache = Arc::new(CacheManager::in_memory());
        let state = cybershare_api::build_state(config.clone(), db_pool.clone(), cache)
            .expect("Failed to build application state");
        let router = cybershare_api::build_app(state);

        Self {
            router,
            db_pool,
            config,
            uploads,
        }
    }

    /// Sign a valid access token without touching the database.
    pub fn mint_token(&self, user_id: Uuid, role: UserRole, username: &str) -> String {
        JwtEncoder::new(&self.config.auth)
            .generate_token_pair(user_id, Uuid::new_v4(), role, username)
            .expect("Failed to sign token")
            .access_token
    }

    /// Register a fresh account with a unique username and email.
    pub async fn register_user(&self, prefix: &str) -> TestUser {
        let suffix = &Uuid::new_v4().simple().to_string()[..10];
        let username = format!("{prefix}{suffix}");
        let email = format!("{username}@test.cybershare.dev");

        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": TEST_PASSWORD,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Registration failed: {:?}",
            response.body
        );

        TestUser {
            id: response.body["userId"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .expect("No userId in register response"),
            username,
            email,
            access_token: response.str_field("accessToken"),
            refresh_token: response.str_field("refreshToken"),
        }
    }

    /// Promote an account to admin and return a token carrying the new role.
    pub async fn make_admin(&self, user: &TestUser) -> String {
        sqlx::query("UPDATE users SET role = 'admin'::user_role WHERE id = $1")
            .bind(user.id)
            .execute(&self.db_pool)
            .await
            .expect("Failed to promote user");
        self.mint_token(user.id, UserRole::Admin, &user.username)
    }

    /// Make an HTTP request to the test app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let req = Self::build_request(method, path, body, token, &[]);
        self.send(req).await
    }

    /// Make a request arriving from socket address `peer` with extra headers.
    pub async fn request_from(
        &self,
        peer: SocketAddr,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = Self::build_request(method, path, body, None, headers);
        req.extensions_mut().insert(ConnectInfo(peer));
        self.send(req).await
    }

    /// POST a single-file multipart form under the field name `file`.
    pub async fn upload(
        &self,
        path: &str,
        token: Option<&str>,
        content_type: &str,
        file_name: &str,
        data: &[u8],
    ) -> TestResponse {
        const BOUNDARY: &str = "cybershare-test-boundary";
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let req = req.body(Body::from(body)).expect("Failed to build request");
        self.send(req).await
    }

    /// GET a path and return the raw response body.
    pub async fn get_bytes(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let req = Self::build_request("GET", path, None, None, &[]);
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        (status, bytes.to_vec())
    }

    /// Send a raw request, for bodies that are not JSON.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    fn build_request(
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Request<Body> {
        let mut req = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        if body.is_some() {
            req = req.header("Content-Type", "application/json");
        }
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let body = body
            .map(|b| Body::from(serde_json::to_vec(&b).expect("Failed to serialize body")))
            .unwrap_or_else(Body::empty);
        req.body(body).expect("Failed to build request")
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// A string field of the body, panicking with the body when absent.
    pub fn str_field(&self, name: &str) -> String {
        self.body
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("No {name} in {:?}", self.body))
            .to_string()
    }
}

/// Skip the calling test when no database is configured.
macro_rules! require_db {
    () => {
        match helpers::TestApp::with_database().await {
            Some(app) => app,
            None => {
                eprintln!("DATABASE_URL not set, skipping");
                return;
            }
        }
    };
}
