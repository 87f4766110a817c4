use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::db::services::TagService;
use crate::web::extract::{JsonPayload, PathParam};
use crate::web::models::attribute_models::{AssignedOnlyQuery, NamePayload, TagResponse};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn list_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AssignedOnlyQuery>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = TagService::list_tags(
        &app_state.db_pool,
        authenticated_user.id,
        query.assigned_only()?,
    )
    .await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

async fn create_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload<NamePayload>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let name = payload.validate_required()?;
    let tag = TagService::create_tag(&app_state.db_pool, authenticated_user.id, name).await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}

async fn get_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(tag_id): PathParam<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = TagService::get_tag(&app_state.db_pool, tag_id, authenticated_user.id).await?;
    Ok(Json(tag.into()))
}

async fn update_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(tag_id): PathParam<i32>,
    JsonPayload(payload): JsonPayload<NamePayload>,
) -> Result<Json<TagResponse>, AppError> {
    let name = payload.validate_required()?;
    let tag = TagService::update_tag(
        &app_state.db_pool,
        tag_id,
        authenticated_user.id,
        Some(name),
    )
    .await?;
    Ok(Json(tag.into()))
}

async fn partial_update_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(tag_id): PathParam<i32>,
    JsonPayload(payload): JsonPayload<NamePayload>,
) -> Result<Json<TagResponse>, AppError> {
    let name = payload.validate_partial()?;
    let tag = TagService::update_tag(&app_state.db_pool, tag_id, authenticated_user.id, name)
        .await?;
    Ok(Json(tag.into()))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(tag_id): PathParam<i32>,
) -> Result<StatusCode, AppError> {
    TagService::delete_tag(&app_state.db_pool, tag_id, authenticated_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tags/", get(list_tags_handler).post(create_tag_handler))
        .route(
            "/tags/{tag_id}/",
            get(get_tag_handler)
                .put(update_tag_handler)
                .patch(partial_update_tag_handler)
                .delete(delete_tag_handler),
        )
}
