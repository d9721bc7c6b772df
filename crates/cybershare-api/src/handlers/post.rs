//! Post handlers: authoring, reading and discovery.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cybershare_core::types::PageResponse;
use cybershare_service::ImageKind;
use cybershare_service::post::PostDetail;

use crate::dto::request::{
    CreatePostRequest, LimitQuery, PostListQuery, PostStatusQuery, SearchQuery, TrendingQuery,
    UpdatePostRequest,
};
use crate::dto::response::{ImageUploadResponse, MessageResponse, ViewCountResponse};
use crate::error::ApiResult;
use crate::extractors::upload::read_file_field;
use crate::extractors::{AuthUser, ClientIp, MaybeAuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

const DEFAULT_SIMILAR_LIMIT: i64 = 10;

/// POST /api/posts
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostDetail>)> {
    let post = state.post_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /api/posts/upload-image (multipart, field `file`)
pub async fn upload_image(
    State(state): State<AppState>,
    _auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<ImageUploadResponse>> {
    let file = read_file_field(multipart).await?;
    let stored = state
        .image_store
        .save(
            ImageKind::PostImage,
            file.content_type.as_deref(),
            file.file_name.as_deref(),
            &file.data,
        )
        .await?;
    Ok(Json(ImageUploadResponse {
        file_name: stored.file_name,
        file_url: stored.url,
    }))
}

/// PATCH /api/posts/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdatePostRequest>,
) -> ApiResult<Json<PostDetail>> {
    let post = state.post_service.update(&auth, id, req.into()).await?;
    Ok(Json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.post_service.delete(&auth, id).await?;
    Ok(Json(MessageResponse::new("Post deleted")))
}

/// GET /api/posts/{id}
pub async fn get(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostDetail>> {
    let post = state.post_service.get(viewer.context(), id).await?;
    Ok(Json(post))
}

/// GET /api/posts/slug/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(slug): Path<String>,
) -> ApiResult<Json<PostDetail>> {
    let post = state.post_service.get_by_slug(viewer.context(), &slug).await?;
    Ok(Json(post))
}

/// GET /api/posts?author=&categoryId=&tagId=&tagSlug=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<PostListQuery>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let (author, filter) = query.into_parts();
    let page = params.into_page_request();
    let posts = state
        .post_service
        .list_published(author.as_deref(), filter, &page)
        .await?;
    Ok(Json(posts))
}

/// GET /api/posts/my-posts?status=
pub async fn my_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<PostStatusQuery>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let page = params.into_page_request();
    let posts = state
        .post_service
        .my_posts(&auth, query.status, &page)
        .await?;
    Ok(Json(posts))
}

/// POST /api/posts/{id}/view
pub async fn record_view(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ViewCountResponse>> {
    let views = state
        .post_service
        .record_view(id, viewer.user_id(), ip.as_deref())
        .await?;
    Ok(Json(ViewCountResponse { views }))
}

/// GET /api/posts/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let page = params.into_page_request();
    let posts = state
        .post_service
        .search(query.q.as_deref().unwrap_or_default(), &page)
        .await?;
    Ok(Json(posts))
}

/// GET /api/posts/trending?since=
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<TrendingQuery>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let page = params.into_page_request();
    let posts = state.post_service.trending(query.since, &page).await?;
    Ok(Json(posts))
}

/// GET /api/posts/feed
pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let page = params.into_page_request();
    let posts = state.post_service.feed(&auth, &page).await?;
    Ok(Json(posts))
}

/// GET /api/posts/{id}/similar?limit=
pub async fn similar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<PostDetail>>> {
    let posts = state
        .post_service
        .similar(id, query.clamped(DEFAULT_SIMILAR_LIMIT))
        .await?;
    Ok(Json(posts))
}

/// GET /api/me/bookmarks
pub async fn my_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<PageResponse<PostDetail>>> {
    let page = params.into_page_request();
    let posts = state.post_service.bookmarks(&auth, &page).await?;
    Ok(Json(posts))
}
