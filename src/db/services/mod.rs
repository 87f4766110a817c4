//! Owner-scoped data access for the recipe store.
//!
//! Every query in here filters on the owning user, so a handler can never see
//! or touch another user's rows by passing a foreign id. Sub-modules are split
//! per resource and re-exported under `crate::db::services::`.

use sea_orm::DbErr;

pub mod ingredient_service;
pub mod recipe_service;
pub mod tag_service;
pub mod user_service;

pub use ingredient_service::IngredientService;
pub use recipe_service::{
    NewRecipe, RecipeChanges, RecipeDetail, RecipeFilter, RecipeService, RecipeWithRefs,
};
pub use tag_service::TagService;
pub use user_service::UserService;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i32 },
    /// Ids in `field` that do not exist or belong to someone else.
    #[error("Unknown {field} ids: {ids:?}")]
    InvalidReference { field: &'static str, ids: Vec<i32> },
    #[error("{0} already exists")]
    AlreadyExists(String),
}
