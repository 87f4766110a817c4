use serde::{Deserialize, Serialize};

use crate::db::services::{NewRecipe, RecipeChanges, RecipeDetail, RecipeFilter, RecipeWithRefs};
use crate::web::error::AppError;
use crate::web::models::attribute_models::{IngredientResponse, TagResponse};
use crate::web::models::present;
use crate::web::validation::{self, FieldErrors};

/// Compact recipe: related tags and ingredients as ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
}

impl From<RecipeWithRefs> for RecipeResponse {
    fn from(value: RecipeWithRefs) -> Self {
        let recipe = value.recipe;
        Self {
            id: recipe.id,
            title: recipe.title,
            tags: value.tag_ids,
            ingredients: value.ingredient_ids,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
        }
    }
}

/// Detail recipe: related tags and ingredients as full objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDetailResponse {
    pub id: i32,
    pub title: String,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
}

impl From<RecipeDetail> for RecipeDetailResponse {
    fn from(value: RecipeDetail) -> Self {
        let recipe = value.recipe;
        Self {
            id: recipe.id,
            title: recipe.title,
            tags: value.tags.into_iter().map(TagResponse::from).collect(),
            ingredients: value
                .ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
        }
    }
}

/// Body for POST, PUT and PATCH on recipes. Each field is `None` when absent
/// and `Some(None)` when sent as `null`; which ones are required depends on
/// the method.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub time_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tags: Option<Option<Vec<i32>>>,
    #[serde(default, deserialize_with = "present")]
    pub ingredients: Option<Option<Vec<i32>>>,
}

/// Validated fields; `None` where the field was absent or invalid.
struct Fields {
    title: Option<String>,
    time_minutes: Option<i32>,
    price: Option<f64>,
    link: Option<Option<String>>,
    tag_ids: Option<Vec<i32>>,
    ingredient_ids: Option<Vec<i32>>,
}

impl RecipePayload {
    fn fields(self, errors: &mut FieldErrors, require_all: bool) -> Fields {
        let title = validation::not_null(errors, "title", self.title, require_all)
            .and_then(|title| validation::text(errors, "title", &title));
        let time_minutes =
            validation::not_null(errors, "time_minutes", self.time_minutes, require_all)
                .and_then(|minutes| validation::non_negative(errors, "time_minutes", minutes));
        let price = validation::not_null(errors, "price", self.price, require_all)
            .and_then(|price| validation::price(errors, "price", price));
        let link = match self.link {
            Some(link) => Some(validation::optional_text(errors, "link", link.as_deref())),
            // A full replacement without a link clears it.
            None if require_all => Some(None),
            None => None,
        };

        Fields {
            title,
            time_minutes,
            price,
            link,
            tag_ids: validation::not_null(errors, "tags", self.tags, false),
            ingredient_ids: validation::not_null(errors, "ingredients", self.ingredients, false),
        }
    }

    /// POST: title, time_minutes and price are required.
    pub fn into_new_recipe(self) -> Result<NewRecipe, FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = self.fields(&mut errors, true);
        let (Some(title), Some(time_minutes), Some(price)) =
            (fields.title, fields.time_minutes, fields.price)
        else {
            return Err(errors);
        };

        errors.finish(NewRecipe {
            title,
            time_minutes,
            price,
            link: fields.link.flatten(),
            tag_ids: fields.tag_ids.unwrap_or_default(),
            ingredient_ids: fields.ingredient_ids.unwrap_or_default(),
        })
    }

    /// PUT: same requirements as POST. Omitted `tags`/`ingredients` keep
    /// the current associations.
    pub fn into_replacement(self) -> Result<RecipeChanges, FieldErrors> {
        self.into_changes_with(true)
    }

    /// PATCH: only the fields present are validated and applied.
    pub fn into_changes(self) -> Result<RecipeChanges, FieldErrors> {
        self.into_changes_with(false)
    }

    fn into_changes_with(self, require_all: bool) -> Result<RecipeChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = self.fields(&mut errors, require_all);
        errors.finish(RecipeChanges {
            title: fields.title,
            time_minutes: fields.time_minutes,
            price: fields.price,
            link: fields.link,
            tag_ids: fields.tag_ids,
            ingredient_ids: fields.ingredient_ids,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

impl RecipeListQuery {
    pub fn into_filter(self) -> Result<RecipeFilter, AppError> {
        Ok(RecipeFilter {
            tag_ids: parse_id_list("tags", self.tags.as_deref())?,
            ingredient_ids: parse_id_list("ingredients", self.ingredients.as_deref())?,
        })
    }
}

/// Parses `"1,2, 3"` into ids. Empty segments are skipped.
fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Vec<i32>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>().map_err(|_| {
                AppError::InvalidInput(format!("Invalid id list for '{field}': {raw}"))
            })
        })
        .collect()
}
