//! Typed HTTP client for the CyberShare API.

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use cybershare_core::types::ApiErrorResponse;

use crate::error::{ClientError, ClientResult};
use crate::models::{
    Account, Affected, AuthPayload, Comment, Count, FollowCheck, FollowStats, InteractionStatus,
    NewPost, Notification, PageResponse, Post, PostChanges, Profile, ProfileChanges,
    RegisterRequest, SessionUser, SessionUserPatch, Views,
};
use crate::session::{Session, SessionStore};

/// Client bound to one server, holding the current session.
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: RwLock<Option<Session>>,
    store: Option<SessionStore>,
}

impl ApiClient {
    /// A signed-out client for `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            session: RwLock::new(None),
            store: None,
        })
    }

    /// Persist sessions in `store` and resume the one already saved there.
    pub async fn with_session_store(mut self, store: SessionStore) -> Self {
        let restored = store.load().await;
        if let Some(session) = &restored {
            debug!(user = %session.user.username, "Restored session");
        }
        self.session = RwLock::new(restored);
        self.store = Some(store);
        self
    }

    /// Whether a session is present.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<SessionUser> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    // ── Auth ─────────────────────────────────────────────────────

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthPayload> {
        let req = self.request(Method::POST, &["api", "auth", "register"])?.json(request);
        let auth: AuthPayload = self.send(req).await?;
        self.store_session(Session::from(&auth)).await?;
        Ok(auth)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthPayload> {
        let req = self
            .request(Method::POST, &["api", "auth", "login"])?
            .json(&json!({ "email": email, "password": password }));
        let auth: AuthPayload = self.send(req).await?;
        self.store_session(Session::from(&auth)).await?;
        Ok(auth)
    }

    /// Exchange the stored refresh token for a new pair.
    pub async fn refresh(&self) -> ClientResult<AuthPayload> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(ClientError::NotAuthenticated)?;

        let req = self
            .request(Method::POST, &["api", "auth", "refresh"])?
            .json(&json!({ "refreshToken": refresh_token }));
        match self.send::<AuthPayload>(req).await {
            Ok(auth) => {
                let mut session = Session::from(&auth);
                if let Some(previous) = self.current_user().await {
                    session.user = SessionUser {
                        avatar_url: previous.avatar_url,
                        bio: previous.bio,
                        ..session.user
                    };
                }
                self.store_session(session).await?;
                Ok(auth)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.clear_session().await?;
                }
                Err(e)
            }
        }
    }

    /// Sign out on the server, then drop the local session regardless.
    pub async fn logout(&self) -> ClientResult<()> {
        if self.is_authenticated().await {
            let req = self.request(Method::POST, &["api", "auth", "logout"])?;
            if let Err(e) = self.send::<IgnoredAny>(req).await {
                warn!(error = %e, "Server-side logout failed");
            }
        }
        self.clear_session().await
    }

    pub async fn me(&self) -> ClientResult<Profile> {
        self.require_session().await?;
        let req = self.request(Method::GET, &["api", "users", "me"])?;
        self.send(req).await
    }

    /// Re-read the profile and merge it into the stored session user.
    pub async fn sync_profile(&self) -> ClientResult<Profile> {
        let profile = self.me().await?;
        self.merge_into_session(SessionUserPatch::from(&profile))
            .await?;
        Ok(profile)
    }

    /// Edit the caller's profile and keep the session user in step.
    pub async fn update_me(&self, changes: &ProfileChanges) -> ClientResult<Account> {
        self.require_session().await?;
        let req = self
            .request(Method::PATCH, &["api", "users", "me"])?
            .json(changes);
        let account: Account = self.send(req).await?;
        self.merge_into_session(SessionUserPatch::from(&account))
            .await?;
        Ok(account)
    }

    // ── Posts ────────────────────────────────────────────────────

    pub async fn posts(&self, page: u64, size: u64) -> ClientResult<PageResponse<Post>> {
        let req = self.request_with_query(
            Method::GET,
            &["api", "posts"],
            &[("page", page.to_string()), ("size", size.to_string())],
        )?;
        self.send(req).await
    }

    pub async fn post_by_slug(&self, slug: &str) -> ClientResult<Post> {
        let req = self.request(Method::GET, &["api", "posts", "slug", slug])?;
        self.send(req).await
    }

    pub async fn post_by_id(&self, id: Uuid) -> ClientResult<Post> {
        let id = id.to_string();
        let req = self.request(Method::GET, &["api", "posts", &id])?;
        self.send(req).await
    }

    pub async fn create_post(&self, post: &NewPost) -> ClientResult<Post> {
        self.require_session().await?;
        let req = self.request(Method::POST, &["api", "posts"])?.json(post);
        self.send(req).await
    }

    /// Edit one of the caller's posts.
    pub async fn update_post(&self, id: Uuid, changes: &PostChanges) -> ClientResult<Post> {
        self.require_session().await?;
        let id = id.to_string();
        let req = self
            .request(Method::PATCH, &["api", "posts", &id])?
            .json(changes);
        self.send(req).await
    }

    pub async fn delete_post(&self, id: Uuid) -> ClientResult<()> {
        self.require_session().await?;
        let id = id.to_string();
        let req = self.request(Method::DELETE, &["api", "posts", &id])?;
        self.send::<IgnoredAny>(req).await.map(|_| ())
    }

    /// The caller's posts in every status.
    pub async fn my_posts(&self, page: u64, size: u64) -> ClientResult<PageResponse<Post>> {
        self.require_session().await?;
        let req = self.request_with_query(
            Method::GET,
            &["api", "posts", "my-posts"],
            &[("page", page.to_string()), ("size", size.to_string())],
        )?;
        self.send(req).await
    }

    /// Count a view; returns the new total.
    pub async fn record_view(&self, id: Uuid) -> ClientResult<i64> {
        let id = id.to_string();
        let req = self.request(Method::POST, &["api", "posts", &id, "view"])?;
        Ok(self.send::<Views>(req).await?.views)
    }

    /// Published posts sharing a category or tag with `id`.
    pub async fn similar(&self, id: Uuid, limit: u64) -> ClientResult<Vec<Post>> {
        let id = id.to_string();
        let req = self.request_with_query(
            Method::GET,
            &["api", "posts", &id, "similar"],
            &[("limit", limit.to_string())],
        )?;
        self.send(req).await
    }

    /// Posts the caller bookmarked, newest bookmark first.
    pub async fn bookmarks(&self, page: u64, size: u64) -> ClientResult<PageResponse<Post>> {
        self.require_session().await?;
        let req = self.request_with_query(
            Method::GET,
            &["api", "me", "bookmarks"],
            &[("page", page.to_string()), ("size", size.to_string())],
        )?;
        self.send(req).await
    }

    pub async fn search_posts(
        &self,
        query: &str,
        page: u64,
        size: u64,
    ) -> ClientResult<PageResponse<Post>> {
        let req = self.request_with_query(
            Method::GET,
            &["api", "posts", "search"],
            &[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("size", size.to_string()),
            ],
        )?;
        self.send(req).await
    }

    pub async fn trending(&self, page: u64, size: u64) -> ClientResult<PageResponse<Post>> {
        let req = self.request_with_query(
            Method::GET,
            &["api", "posts", "trending"],
            &[("page", page.to_string()), ("size", size.to_string())],
        )?;
        self.send(req).await
    }

    /// Posts by followed authors.
    pub async fn feed(&self, page: u64, size: u64) -> ClientResult<PageResponse<Post>> {
        self.require_session().await?;
        let req = self.request_with_query(
            Method::GET,
            &["api", "posts", "feed"],
            &[("page", page.to_string()), ("size", size.to_string())],
        )?;
        self.send(req).await
    }

    // ── Comments ─────────────────────────────────────────────────

    /// The threaded comments of the post with `slug`.
    pub async fn comments(&self, slug: &str) -> ClientResult<Vec<Comment>> {
        let req = self.request(Method::GET, &["api", "posts", slug, "comments"])?;
        self.send(req).await
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> ClientResult<Comment> {
        self.require_session().await?;
        let post_id = post_id.to_string();
        let req = self
            .request(Method::POST, &["api", "posts", &post_id, "comments"])?
            .json(&json!({ "content": content, "parentId": parent_id }));
        self.send(req).await
    }

    pub async fn update_comment(&self, id: Uuid, content: &str) -> ClientResult<Comment> {
        self.require_session().await?;
        let id = id.to_string();
        let req = self
            .request(Method::PATCH, &["api", "comments", &id])?
            .json(&json!({ "content": content }));
        self.send(req).await
    }

    /// Delete a comment with its replies; returns how many were removed.
    pub async fn delete_comment(&self, id: Uuid) -> ClientResult<u64> {
        self.require_session().await?;
        let id = id.to_string();
        let req = self.request(Method::DELETE, &["api", "comments", &id])?;
        Ok(self.send::<Affected>(req).await?.affected)
    }

    // ── Interactions ─────────────────────────────────────────────

    pub async fn interaction_status(&self, post_id: Uuid) -> ClientResult<InteractionStatus> {
        let post_id = post_id.to_string();
        let req = self.request(Method::GET, &["api", "posts", &post_id, "status"])?;
        self.send(req).await
    }

    pub async fn toggle_like(&self, post_id: Uuid) -> ClientResult<InteractionStatus> {
        self.require_session().await?;
        let post_id = post_id.to_string();
        let req = self.request(Method::POST, &["api", "posts", &post_id, "like"])?;
        self.send(req).await
    }

    pub async fn toggle_bookmark(&self, post_id: Uuid) -> ClientResult<InteractionStatus> {
        self.require_session().await?;
        let post_id = post_id.to_string();
        let req = self.request(Method::POST, &["api", "posts", &post_id, "bookmark"])?;
        self.send(req).await
    }

    // ── Follows ──────────────────────────────────────────────────

    pub async fn follow(&self, username: &str) -> ClientResult<()> {
        self.require_session().await?;
        let req = self.request(Method::POST, &["api", "follows", username])?;
        self.send::<IgnoredAny>(req).await.map(|_| ())
    }

    pub async fn unfollow(&self, username: &str) -> ClientResult<()> {
        self.require_session().await?;
        let req = self.request(Method::DELETE, &["api", "follows", username])?;
        self.send::<IgnoredAny>(req).await.map(|_| ())
    }

    pub async fn is_following(&self, username: &str) -> ClientResult<bool> {
        self.require_session().await?;
        let req = self.request(Method::GET, &["api", "follows", username, "check"])?;
        Ok(self.send::<FollowCheck>(req).await?.is_following)
    }

    pub async fn follow_stats(&self, username: &str) -> ClientResult<FollowStats> {
        let req = self.request(Method::GET, &["api", "users", username, "follow-stats"])?;
        self.send(req).await
    }

    // ── Notifications ────────────────────────────────────────────

    pub async fn notifications(
        &self,
        page: u64,
        size: u64,
    ) -> ClientResult<PageResponse<Notification>> {
        self.require_session().await?;
        let req = self.request_with_query(
            Method::GET,
            &["api", "notifications"],
            &[("page", page.to_string()), ("size", size.to_string())],
        )?;
        self.send(req).await
    }

    pub async fn unread_count(&self) -> ClientResult<i64> {
        self.require_session().await?;
        let req = self.request(Method::GET, &["api", "notifications", "unread-count"])?;
        Ok(self.send::<Count>(req).await?.count)
    }

    pub async fn mark_read(&self, id: Uuid) -> ClientResult<()> {
        self.require_session().await?;
        let id = id.to_string();
        let req = self.request(Method::POST, &["api", "notifications", &id, "read"])?;
        self.send::<IgnoredAny>(req).await.map(|_| ())
    }

    pub async fn mark_all_read(&self) -> ClientResult<()> {
        self.require_session().await?;
        let req = self.request(Method::POST, &["api", "notifications", "read-all"])?;
        self.send::<IgnoredAny>(req).await.map(|_| ())
    }

    // ── Plumbing ─────────────────────────────────────────────────

    /// URL for the given path segments; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    fn request_with_query<V: AsRef<str>>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, V)],
    ) -> ClientResult<RequestBuilder> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_ref())));
        Ok(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let req = match self.session.read().await.as_ref() {
            Some(session) => req.bearer_auth(&session.access_token),
            None => req,
        };
        let response = req.send().await?;
        parse_response(response).await
    }

    async fn require_session(&self) -> ClientResult<()> {
        if self.is_authenticated().await {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    async fn store_session(&self, session: Session) -> ClientResult<()> {
        if let Some(store) = &self.store {
            store.save(&session).await?;
        }
        *self.session.write().await = Some(session);
        Ok(())
    }

    async fn merge_into_session(&self, patch: SessionUserPatch) -> ClientResult<()> {
        if let Some(store) = &self.store {
            if let Some(session) = store.update_user(patch).await? {
                *self.session.write().await = Some(session);
            }
        } else if let Some(session) = self.session.write().await.as_mut() {
            crate::session::apply_patch(&mut session.user, patch);
        }
        Ok(())
    }

    async fn clear_session(&self) -> ClientResult<()> {
        *self.session.write().await = None;
        if let Some(store) = &self.store {
            store.clear().await?;
        }
        Ok(())
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status.as_u16(), &body);
    debug!(status = status.as_u16(), %message, "API call failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// The `message` of an error body, or a fallback when the body is not one.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(body) {
        return err.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with status {status}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new("http://localhost:8080").unwrap();

        let url = client.endpoint(&["api", "users", "a b/c"]).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8080/api/users/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("https://example.com/blog").unwrap();

        let url = client.endpoint(&["api", "health"]).unwrap();

        assert_eq!(url.as_str(), "https://example.com/blog/api/health");
    }

    #[test]
    fn test_post_and_profile_urls() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        let id = Uuid::nil().to_string();

        let url = |segments: &[&str]| client.endpoint(segments).unwrap().to_string();
        assert_eq!(
            url(&["api", "posts", &id]),
            format!("http://localhost:8080/api/posts/{id}")
        );
        assert_eq!(
            url(&["api", "posts", "my-posts"]),
            "http://localhost:8080/api/posts/my-posts"
        );
        assert_eq!(
            url(&["api", "posts", &id, "view"]),
            format!("http://localhost:8080/api/posts/{id}/view")
        );
        assert_eq!(
            url(&["api", "me", "bookmarks"]),
            "http://localhost:8080/api/me/bookmarks"
        );
        assert_eq!(
            url(&["api", "comments", &id]),
            format!("http://localhost:8080/api/comments/{id}")
        );
        assert_eq!(url(&["api", "users", "me"]), "http://localhost:8080/api/users/me");
    }

    #[test]
    fn test_similar_request_carries_limit() {
        let client = ApiClient::new("http://localhost:8080").unwrap();
        let id = Uuid::nil().to_string();

        let request = client
            .request_with_query(
                Method::GET,
                &["api", "posts", &id, "similar"],
                &[("limit", "5")],
            )
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(*request.method(), Method::GET);
        assert_eq!(
            request.url().as_str(),
            format!("http://localhost:8080/api/posts/{id}/similar?limit=5")
        );
    }

    #[test]
    fn test_changes_skip_untouched_fields() {
        let body = serde_json::to_value(PostChanges {
            title: Some("New title".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "title": "New title" }));

        let body = serde_json::to_value(ProfileChanges {
            bio: Some("hi".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "bio": "hi" }));
    }

    #[tokio::test]
    async fn test_signed_out_writes_fail_fast() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let id = Uuid::new_v4();

        assert!(matches!(
            client.update_post(id, &PostChanges::default()).await,
            Err(ClientError::NotAuthenticated)
        ));
        assert!(matches!(client.delete_post(id).await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(client.my_posts(1, 10).await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(client.bookmarks(1, 10).await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(
            client.update_comment(id, "x").await,
            Err(ClientError::NotAuthenticated)
        ));
        assert!(matches!(
            client.update_me(&ProfileChanges::default()).await,
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_error_message_prefers_server_body() {
        let body = r#"{"error":"CONFLICT","message":"Email is already in use"}"#;
        assert_eq!(error_message(409, body), "Email is already in use");
        assert_eq!(error_message(502, "Bad gateway"), "Bad gateway");
        assert_eq!(error_message(500, ""), "Request failed with status 500");
    }

    #[tokio::test]
    async fn test_signed_out_calls_fail_fast() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();

        assert!(matches!(client.feed(1, 10).await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(client.refresh().await, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_restores_saved_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let session = Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            user: SessionUser {
                id: Uuid::new_v4(),
                username: "alice".into(),
                email: "alice@example.com".into(),
                display_name: "Alice".into(),
                role: "USER".into(),
                avatar_url: None,
                bio: None,
            },
        };
        store.save(&session).await.unwrap();

        let client = ApiClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_session_store(store)
            .await;

        assert!(client.is_authenticated().await);
        assert_eq!(client.current_user().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_logout_clears_local_session_even_when_server_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::new(&path);
        store
            .save(&Session {
                access_token: "a".into(),
                refresh_token: "r".into(),
                user: SessionUser {
                    id: Uuid::new_v4(),
                    username: "bob".into(),
                    email: "bob@example.com".into(),
                    display_name: "Bob".into(),
                    role: "USER".into(),
                    avatar_url: None,
                    bio: None,
                },
            })
            .await
            .unwrap();
        let client = ApiClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_session_store(store)
            .await;

        client.logout().await.unwrap();

        assert!(!client.is_authenticated().await);
        assert!(!path.exists());
    }
}
