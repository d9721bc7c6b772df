//! Integration tests for the account and token lifecycle.
//!
//! These run against the database named by `DATABASE_URL` and are skipped
//! when it is unset.

#[macro_use]
mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_register_issues_tokens() {
    let app = require_db!();
    let user = app.register_user("reg").await;

    let response = app
        .request("GET", "/api/users/me", None, Some(&user.access_token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], user.username.as_str());
    assert_eq!(response.body["role"], "USER");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = require_db!();
    let user = app.register_user("dup").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": user.email,
                "password": helpers::TEST_PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_derives_username_from_email() {
    let app = require_db!();
    let local = format!("derived{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": format!("{local}@test.cybershare.dev"),
                "password": helpers::TEST_PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.str_field("username").starts_with(&local));
}

#[tokio::test]
async fn test_login_success_and_wrong_password() {
    let app = require_db!();
    let user = app.register_user("login").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": user.email.to_uppercase(),
                "password": helpers::TEST_PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("accessToken").is_some());

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": user.email,
                "password": "definitely-wrong",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    let app = require_db!();
    let user = app.register_user("refresh").await;
    let body = serde_json::json!({ "refreshToken": user.refresh_token });

    let first = app
        .request("POST", "/api/auth/refresh", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_ne!(first.str_field("refreshToken"), user.refresh_token);

    let replay = app
        .request("POST", "/api/auth/refresh", Some(body), None)
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_tokens() {
    let app = require_db!();
    let user = app.register_user("logout").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&user.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/users/me", None, Some(&user.access_token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refreshToken": user.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password() {
    let app = require_db!();
    let user = app.register_user("chpw").await;

    let response = app
        .request(
            "POST",
            "/api/password/change",
            Some(serde_json::json!({
                "currentPassword": "not-the-password",
                "newPassword": "another-long-passphrase",
            })),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/password/change",
            Some(serde_json::json!({
                "currentPassword": helpers::TEST_PASSWORD,
                "newPassword": "another-long-passphrase",
            })),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": user.email,
                "password": "another-long-passphrase",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let app = require_db!();

    let response = app
        .request(
            "POST",
            "/api/password/forgot",
            Some(serde_json::json!({ "email": "nobody-here@test.cybershare.dev" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            "/api/password/reset/validate?token=bogus",
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], false);
}

#[tokio::test]
async fn test_banned_user_cannot_login() {
    let app = require_db!();
    let admin = app.register_user("admin").await;
    let admin_token = app.make_admin(&admin).await;
    let user = app.register_user("banme").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/status", user.id),
            Some(serde_json::json!({ "status": "BANNED" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": user.email,
                "password": helpers::TEST_PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_avatar_upload_updates_profile() {
    let app = require_db!();
    let user = app.register_user("avatar").await;

    let response = app
        .upload(
            "/api/users/me/avatar",
            Some(&user.access_token),
            "image/jpeg",
            "me.jpg",
            b"jpeg-bytes",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["message"], "Avatar uploaded successfully");
    let avatar_url = response.str_field("avatarUrl");
    assert!(avatar_url.starts_with("/uploads/avatars/"));

    let me = app
        .request("GET", "/api/users/me", None, Some(&user.access_token))
        .await;
    assert_eq!(me.body["avatarUrl"], avatar_url.as_str());

    let (status, bytes) = app.get_bytes(&avatar_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"jpeg-bytes");
}

#[tokio::test]
async fn test_role_change_saves_and_notifies() {
    let app = require_db!();
    let admin = app.register_user("admin").await;
    let admin_token = app.make_admin(&admin).await;
    let user = app.register_user("promo").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", user.id),
            Some(serde_json::json!({ "role": "AUTHOR" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["role"], "AUTHOR");

    let response = app
        .request("GET", "/api/notifications", None, Some(&user.access_token))
        .await;
    assert_eq!(response.body["items"][0]["type"], "ROLE_CHANGE");
}
