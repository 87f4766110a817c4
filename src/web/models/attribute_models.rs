//! Wire shapes for the name-only resources (tags and ingredients).

use serde::{Deserialize, Serialize};

use crate::db::entities::{ingredient, tag};
use crate::web::error::AppError;
use crate::web::models::present;
use crate::web::validation::{self, FieldErrors};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(ingredient: ingredient::Model) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

/// Create/update body for tags and ingredients. A missing `name` or an
/// explicit `null` becomes a field error, not a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct NamePayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
}

impl NamePayload {
    fn validate(self, required: bool) -> Result<Option<String>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = validation::not_null(&mut errors, "name", self.name, required)
            .and_then(|name| validation::text(&mut errors, "name", &name));
        errors.finish(name)
    }

    /// For POST and PUT: `name` must be present and non-blank.
    pub fn validate_required(self) -> Result<String, FieldErrors> {
        Ok(self.validate(true)?.unwrap_or_default())
    }

    /// For PATCH: `name` may be omitted, but if given it follows the same rules.
    pub fn validate_partial(self) -> Result<Option<String>, FieldErrors> {
        self.validate(false)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignedOnlyQuery {
    pub assigned_only: Option<String>,
}

impl AssignedOnlyQuery {
    /// `assigned_only=1` (any non-zero integer) or `true` turns the filter on.
    pub fn assigned_only(&self) -> Result<bool, AppError> {
        let Some(raw) = self.assigned_only.as_deref().map(str::trim) else {
            return Ok(false);
        };
        match raw {
            "" | "false" | "False" => Ok(false),
            "true" | "True" => Ok(true),
            other => other.parse::<i64>().map(|v| v != 0).map_err(|_| {
                AppError::InvalidInput(format!("Invalid value for 'assigned_only': {other}"))
            }),
        }
    }
}
