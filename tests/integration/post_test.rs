//! Integration tests for posts, comments and moderation.

#[macro_use]
mod helpers;

use http::StatusCode;
use serde_json::json;

async fn create_post(app: &helpers::TestApp, token: &str, title: &str, status: &str) -> serde_json::Value {
    // Unique tag names keep concurrent tests off each other's rows
    let tag = format!("ssh{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    let response = app
        .request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": title,
                "content": "Hardening SSH servers, one config line at a time.",
                "tags": [tag, format!("{tag}-hardening")],
                "status": status,
            })),
            Some(token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body
}

#[tokio::test]
async fn test_create_post_generates_unique_slugs() {
    let app = require_db!();
    let author = app.register_user("slug").await;
    let title = format!("SSH Hardening {}", uuid::Uuid::new_v4().simple());

    let first = create_post(&app, &author.access_token, &title, "PUBLISHED").await;
    let second = create_post(&app, &author.access_token, &title, "PUBLISHED").await;

    let first_slug = first["slug"].as_str().expect("slug");
    let second_slug = second["slug"].as_str().expect("slug");
    assert!(first_slug.starts_with("ssh-hardening-"));
    assert_ne!(first_slug, second_slug);
    assert_eq!(first["tags"].as_array().map(Vec::len), Some(2));
    assert!(first["publishedAt"].is_string());
}

#[tokio::test]
async fn test_drafts_are_private_to_their_author() {
    let app = require_db!();
    let author = app.register_user("draft").await;
    let stranger = app.register_user("peek").await;
    let post = create_post(&app, &author.access_token, "Unfinished thoughts", "DRAFT").await;
    let path = format!("/api/posts/{}", post["id"].as_str().expect("id"));

    let response = app.request("GET", &path, None, Some(&author.access_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &path, None, Some(&stranger.access_token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", &path, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_author_can_edit_or_delete() {
    let app = require_db!();
    let author = app.register_user("owner").await;
    let other = app.register_user("other").await;
    let post = create_post(&app, &author.access_token, "Owned post", "PUBLISHED").await;
    let path = format!("/api/posts/{}", post["id"].as_str().expect("id"));

    let response = app
        .request("PATCH", &path, Some(json!({ "title": "Hijacked" })), Some(&other.access_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("PATCH", &path, Some(json!({ "title": "Renamed" })), Some(&author.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Renamed");

    let response = app.request("DELETE", &path, None, Some(&other.access_token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("DELETE", &path, None, Some(&author.access_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &path, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggles_and_notifies_author() {
    let app = require_db!();
    let author = app.register_user("liked").await;
    let fan = app.register_user("fan").await;
    let post = create_post(&app, &author.access_token, "Worth a like", "PUBLISHED").await;
    let like_path = format!("/api/posts/{}/like", post["id"].as_str().expect("id"));

    let response = app.request("POST", &like_path, None, Some(&fan.access_token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["liked"], true);
    assert_eq!(response.body["likesCount"], 1);

    let response = app
        .request("GET", "/api/notifications/unread-count", None, Some(&author.access_token))
        .await;
    assert_eq!(response.body["count"], 1);

    let response = app.request("POST", &like_path, None, Some(&fan.access_token)).await;
    assert_eq!(response.body["liked"], false);
    assert_eq!(response.body["likesCount"], 0);
}

#[tokio::test]
async fn test_comment_tree_nests_replies() {
    let app = require_db!();
    let author = app.register_user("thread").await;
    let reader = app.register_user("reply").await;
    let post = create_post(&app, &author.access_token, "Discuss", "PUBLISHED").await;
    let post_id = post["id"].as_str().expect("id");
    let slug = post["slug"].as_str().expect("slug");
    let comments_path = format!("/api/posts/{post_id}/comments");

    let root = app
        .request("POST", &comments_path, Some(json!({ "content": "First!" })), Some(&reader.access_token))
        .await;
    assert_eq!(root.status, StatusCode::CREATED);

    let reply = app
        .request(
            "POST",
            &comments_path,
            Some(json!({ "content": "Thanks", "parentId": root.body["id"] })),
            Some(&author.access_token),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let tree = app
        .request("GET", &format!("/api/posts/{slug}/comments"), None, None)
        .await;
    assert_eq!(tree.status, StatusCode::OK);
    let roots = tree.body.as_array().expect("array");
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"][0]["content"], "Thanks");

    let delete = app
        .request(
            "DELETE",
            &format!("/api/comments/{}", root.body["id"].as_str().expect("id")),
            None,
            Some(&reader.access_token),
        )
        .await;
    assert_eq!(delete.status, StatusCode::OK);
    assert_eq!(delete.body["affected"], 2);
}

#[tokio::test]
async fn test_pending_post_approval_flow() {
    let app = require_db!();
    let author = app.register_user("pending").await;
    let admin = app.register_user("mod").await;
    let admin_token = app.make_admin(&admin).await;
    let post = create_post(&app, &author.access_token, "Needs review", "PENDING_REVIEW").await;
    let post_id = post["id"].as_str().expect("id");

    let response = app
        .request("PUT", &format!("/api/admin/posts/{post_id}/approve"), None, Some(&admin_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &format!("/api/posts/{post_id}"), None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "PUBLISHED");

    let response = app
        .request("GET", "/api/notifications", None, Some(&author.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalItems"], 1);
}

#[tokio::test]
async fn test_blank_search_returns_empty_page() {
    let app = require_db!();

    let response = app.request("GET", "/api/posts/search?q=%20", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalItems"], 0);
    assert_eq!(response.body["items"].as_array().map(Vec::len), Some(0));
}
