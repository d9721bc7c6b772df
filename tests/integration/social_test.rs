//! Integration tests for the follow graph and notifications.

#[macro_use]
mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_follow_unfollow_round() {
    let app = require_db!();
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let follow_path = format!("/api/follows/{}", bob.username);

    let response = app.request("POST", &follow_path, None, Some(&alice.access_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("{follow_path}/check"), None, Some(&alice.access_token))
        .await;
    assert_eq!(response.body["isFollowing"], true);

    let response = app
        .request("GET", &format!("/api/users/{}/follow-stats", bob.username), None, None)
        .await;
    assert_eq!(response.body["followers"], 1);
    assert_eq!(response.body["following"], 0);

    let response = app
        .request("GET", &format!("/api/users/{}/followers", bob.username), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"][0]["username"], alice.username.as_str());

    let response = app.request("DELETE", &follow_path, None, Some(&alice.access_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("{follow_path}/check"), None, Some(&alice.access_token))
        .await;
    assert_eq!(response.body["isFollowing"], false);
}

#[tokio::test]
async fn test_cannot_follow_self() {
    let app = require_db!();
    let solo = app.register_user("solo").await;

    let response = app
        .request(
            "POST",
            &format!("/api/follows/{}", solo.username),
            None,
            Some(&solo.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_follow_unknown_user_is_not_found() {
    let app = require_db!();
    let user = app.register_user("lost").await;

    let response = app
        .request("POST", "/api/follows/no-such-user-here", None, Some(&user.access_token))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_notification_read_flow() {
    let app = require_db!();
    let fan = app.register_user("fan").await;
    let star = app.register_user("star").await;

    app.request(
        "POST",
        &format!("/api/follows/{}", star.username),
        None,
        Some(&fan.access_token),
    )
    .await;

    let response = app
        .request("GET", "/api/notifications/unread-count", None, Some(&star.access_token))
        .await;
    assert_eq!(response.body["count"], 1);

    let response = app
        .request("GET", "/api/notifications", None, Some(&star.access_token))
        .await;
    let notification = &response.body["items"][0];
    assert_eq!(notification["type"], "FOLLOW");
    assert_eq!(notification["isRead"], false);

    let id = notification["id"].as_str().expect("id");
    let response = app
        .request(
            "POST",
            &format!("/api/notifications/{id}/read"),
            None,
            Some(&star.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Someone else's notification is invisible to the fan
    let response = app
        .request(
            "POST",
            &format!("/api/notifications/{id}/read"),
            None,
            Some(&fan.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("GET", "/api/notifications/unread-count", None, Some(&star.access_token))
        .await;
    assert_eq!(response.body["count"], 0);
}

#[tokio::test]
async fn test_feed_shows_followed_authors() {
    let app = require_db!();
    let reader = app.register_user("reader").await;
    let writer = app.register_user("writer").await;

    app.request(
        "POST",
        &format!("/api/follows/{}", writer.username),
        None,
        Some(&reader.access_token),
    )
    .await;

    let response = app
        .request(
            "POST",
            "/api/posts",
            Some(serde_json::json!({
                "title": "Fresh from the writer",
                "content": "Body",
                "status": "PUBLISHED",
            })),
            Some(&writer.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .request("GET", "/api/posts/feed", None, Some(&reader.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalItems"], 1);
    assert_eq!(response.body["items"][0]["author"]["username"], writer.username.as_str());
}
