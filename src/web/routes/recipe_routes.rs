use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::db::services::RecipeService;
use crate::web::extract::{JsonPayload, PathParam};
use crate::web::models::recipe_models::{
    RecipeDetailResponse, RecipeListQuery, RecipePayload, RecipeResponse,
};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn list_recipes_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let filter = query.into_filter()?;
    let recipes =
        RecipeService::list_recipes(&app_state.db_pool, authenticated_user.id, &filter).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

async fn create_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let new_recipe = payload.into_new_recipe()?;
    let recipe =
        RecipeService::create_recipe(&app_state.db_pool, authenticated_user.id, new_recipe)
            .await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// The detail view resolves tags and ingredients into objects.
async fn get_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(recipe_id): PathParam<i32>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let detail =
        RecipeService::get_recipe_detail(&app_state.db_pool, recipe_id, authenticated_user.id)
            .await?;
    Ok(Json(detail.into()))
}

async fn update_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(recipe_id): PathParam<i32>,
    JsonPayload(payload): JsonPayload<RecipePayload>,
) -> Result<Json<RecipeResponse>, AppError> {
    let changes = payload.into_replacement()?;
    let recipe = RecipeService::update_recipe(
        &app_state.db_pool,
        recipe_id,
        authenticated_user.id,
        changes,
    )
    .await?;
    Ok(Json(recipe.into()))
}

async fn partial_update_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(recipe_id): PathParam<i32>,
    JsonPayload(payload): JsonPayload<RecipePayload>,
) -> Result<Json<RecipeResponse>, AppError> {
    let changes = payload.into_changes()?;
    let recipe = RecipeService::update_recipe(
        &app_state.db_pool,
        recipe_id,
        authenticated_user.id,
        changes,
    )
    .await?;
    Ok(Json(recipe.into()))
}

async fn delete_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(recipe_id): PathParam<i32>,
) -> Result<StatusCode, AppError> {
    RecipeService::delete_recipe(&app_state.db_pool, recipe_id, authenticated_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_recipes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/recipes/",
            get(list_recipes_handler).post(create_recipe_handler),
        )
        .route(
            "/recipes/{recipe_id}/",
            get(get_recipe_handler)
                .put(update_recipe_handler)
                .patch(partial_update_recipe_handler)
                .delete(delete_recipe_handler),
        )
}
