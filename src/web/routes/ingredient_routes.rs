use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::db::services::IngredientService;
use crate::web::extract::{JsonPayload, PathParam};
use crate::web::models::attribute_models::{AssignedOnlyQuery, IngredientResponse, NamePayload};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn list_ingredients_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AssignedOnlyQuery>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let ingredients = IngredientService::list_ingredients(
        &app_state.db_pool,
        authenticated_user.id,
        query.assigned_only()?,
    )
    .await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

async fn create_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload<NamePayload>,
) -> Result<(StatusCode, Json<IngredientResponse>), AppError> {
    let name = payload.validate_required()?;
    let ingredient =
        IngredientService::create_ingredient(&app_state.db_pool, authenticated_user.id, name)
            .await?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

async fn get_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(ingredient_id): PathParam<i32>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient = IngredientService::get_ingredient(
        &app_state.db_pool,
        ingredient_id,
        authenticated_user.id,
    )
    .await?;
    Ok(Json(ingredient.into()))
}

async fn update_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(ingredient_id): PathParam<i32>,
    JsonPayload(payload): JsonPayload<NamePayload>,
) -> Result<Json<IngredientResponse>, AppError> {
    let name = payload.validate_required()?;
    let ingredient = IngredientService::update_ingredient(
        &app_state.db_pool,
        ingredient_id,
        authenticated_user.id,
        Some(name),
    )
    .await?;
    Ok(Json(ingredient.into()))
}

async fn partial_update_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(ingredient_id): PathParam<i32>,
    JsonPayload(payload): JsonPayload<NamePayload>,
) -> Result<Json<IngredientResponse>, AppError> {
    let name = payload.validate_partial()?;
    let ingredient = IngredientService::update_ingredient(
        &app_state.db_pool,
        ingredient_id,
        authenticated_user.id,
        name,
    )
    .await?;
    Ok(Json(ingredient.into()))
}

async fn delete_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    PathParam(ingredient_id): PathParam<i32>,
) -> Result<StatusCode, AppError> {
    IngredientService::delete_ingredient(&app_state.db_pool, ingredient_id, authenticated_user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_ingredients_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/ingredients/",
            get(list_ingredients_handler).post(create_ingredient_handler),
        )
        .route(
            "/ingredients/{ingredient_id}/",
            get(get_ingredient_handler)
                .put(update_ingredient_handler)
                .patch(partial_update_ingredient_handler)
                .delete(delete_ingredient_handler),
        )
}
