use axum::Router;
use std::sync::Arc;

use crate::web::AppState;

pub mod ingredient_routes;
pub mod recipe_routes;
pub mod tag_routes;
pub mod user_routes;

/// Everything served under `/api/recipe`.
pub fn create_recipe_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(tag_routes::create_tags_router())
        .merge(ingredient_routes::create_ingredients_router())
        .merge(recipe_routes::create_recipes_router())
}
