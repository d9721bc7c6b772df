//! Router-level tests that never reach the database.

mod helpers;

use std::net::SocketAddr;

use http::StatusCode;
use uuid::Uuid;

use cybershare_entity::user::UserRole;

#[tokio::test]
async fn test_health_reports_up() {
    let app = helpers::TestApp::offline();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "UP");
    assert!(response.body.get("timestamp").is_some());
}

#[tokio::test]
async fn test_info_names_application() {
    let app = helpers::TestApp::offline();

    let response = app.request("GET", "/api/info", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "CyberShare");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = helpers::TestApp::offline();

    let response = app.request("GET", "/api/nothing-here", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = helpers::TestApp::offline();

    for (method, path) in [
        ("GET", "/api/posts/feed"),
        ("GET", "/api/posts/my-posts"),
        ("GET", "/api/notifications"),
        ("GET", "/api/users/me"),
        ("POST", "/api/auth/logout"),
        ("GET", "/api/admin/statistics"),
    ] {
        let response = app.request(method, path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(response.body["error"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = helpers::TestApp::offline();

    let response = app
        .request("GET", "/api/users/me", None, Some("not.a.jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbid_regular_users() {
    let app = helpers::TestApp::offline();
    let token = app.mint_token(Uuid::new_v4(), UserRole::User, "reader");

    let response = app
        .request("GET", "/api/admin/statistics", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_category_create_requires_admin() {
    let app = helpers::TestApp::offline();
    let token = app.mint_token(Uuid::new_v4(), UserRole::Author, "writer");

    let response = app
        .request(
            "POST",
            "/api/categories",
            Some(serde_json::json!({ "name": "Security" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let app = helpers::TestApp::offline();

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": "not-an-email",
                "password": helpers::TEST_PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(response.body["details"]["fields"]["email"].is_array());
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = helpers::TestApp::offline();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": 42 })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let mut config = helpers::offline_config();
    config.server.rate_limit.enabled = true;
    config.server.rate_limit.burst = 2;
    config.server.rate_limit.refill_per_second = 0.0;
    let app = helpers::TestApp::offline_with(config);

    let empty_login = serde_json::json!({ "email": "", "password": "" });
    for _ in 0..2 {
        let response = app
            .request("POST", "/api/auth/login", Some(empty_login.clone()), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let response = app
        .request("POST", "/api/auth/login", Some(empty_login), None)
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // Public reads are not limited
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_the_bucket() {
    let mut config = helpers::offline_config();
    config.server.rate_limit.enabled = true;
    config.server.rate_limit.burst = 2;
    config.server.rate_limit.refill_per_second = 0.0;
    let app = helpers::TestApp::offline_with(config);
    let peer: SocketAddr = "198.51.100.20:40000".parse().unwrap();

    let empty_login = serde_json::json!({ "email": "", "password": "" });
    let mut statuses = Vec::new();
    for i in 0..6 {
        let hop = format!("10.0.0.{i}");
        let response = app
            .request_from(
                peer,
                "POST",
                "/api/auth/login",
                Some(empty_login.clone()),
                &[("x-forwarded-for", hop.as_str())],
            )
            .await;
        statuses.push(response.status);
    }

    assert_eq!(&statuses[..2], &[StatusCode::BAD_REQUEST, StatusCode::BAD_REQUEST]);
    assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_trusted_proxy_limits_each_forwarded_client() {
    let mut config = helpers::offline_config();
    config.server.rate_limit.enabled = true;
    config.server.rate_limit.burst = 1;
    config.server.rate_limit.refill_per_second = 0.0;
    config.server.trusted_proxies = vec!["10.1.0.1".parse().unwrap()];
    let app = helpers::TestApp::offline_with(config);
    let proxy: SocketAddr = "10.1.0.1:443".parse().unwrap();

    let empty_login = serde_json::json!({ "email": "", "password": "" });
    let login_as = |client: &'static str| {
        let body = empty_login.clone();
        let app = &app;
        async move {
            app.request_from(
                proxy,
                "POST",
                "/api/auth/login",
                Some(body),
                &[("x-forwarded-for", client)],
            )
            .await
            .status
        }
    };

    assert_eq!(login_as("203.0.113.1").await, StatusCode::BAD_REQUEST);
    assert_eq!(login_as("203.0.113.2").await, StatusCode::BAD_REQUEST);
    assert_eq!(login_as("203.0.113.1").await, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_uploads_require_token() {
    let app = helpers::TestApp::offline();

    for path in ["/api/posts/upload-image", "/api/users/me/avatar"] {
        let response = app
            .upload(path, None, "image/png", "a.png", b"png-bytes")
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn test_uploads_reject_non_images_and_empty_files() {
    let app = helpers::TestApp::offline();
    let token = app.mint_token(Uuid::new_v4(), UserRole::User, "writer");

    for path in ["/api/posts/upload-image", "/api/users/me/avatar"] {
        let response = app
            .upload(path, Some(&token), "text/plain", "notes.txt", b"hello")
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.body["error"], "VALIDATION_ERROR");

        let response = app
            .upload(path, Some(&token), "image/png", "empty.png", b"")
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn test_post_image_upload_is_served_back() {
    let app = helpers::TestApp::offline();
    let token = app.mint_token(Uuid::new_v4(), UserRole::User, "writer");

    let response = app
        .upload(
            "/api/posts/upload-image",
            Some(&token),
            "image/png",
            "diagram.png",
            b"\x89PNG fake",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let file_name = response.str_field("fileName");
    let file_url = response.str_field("fileUrl");
    assert_eq!(
        file_url,
        format!(
            "{}/uploads/posts/{file_name}",
            app.config.storage.public_base_url
        )
    );
    assert!(app.uploads.path().join("posts").join(&file_name).exists());

    let (status, bytes) = app.get_bytes(&format!("/uploads/posts/{file_name}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"\x89PNG fake");
}

#[tokio::test]
async fn test_oversized_image_is_refused() {
    let mut config = helpers::offline_config();
    config.server.rate_limit.enabled = false;
    config.storage.max_image_bytes = 1024;
    let app = helpers::TestApp::offline_with(config);
    let token = app.mint_token(Uuid::new_v4(), UserRole::User, "writer");

    let response = app
        .upload(
            "/api/posts/upload-image",
            Some(&token),
            "image/png",
            "big.png",
            &vec![0u8; 2048],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
