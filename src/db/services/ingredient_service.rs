use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::db::entities::{ingredient, prelude::Ingredient, recipe_ingredient};
use crate::db::services::ServiceError;

pub struct IngredientService;

impl IngredientService {
    pub async fn list_ingredients(
        db: &DbConn,
        user_id: i32,
        assigned_only: bool,
    ) -> Result<Vec<ingredient::Model>, ServiceError> {
        let mut query = Ingredient::find().filter(ingredient::Column::UserId.eq(user_id));
        if assigned_only {
            query = query.filter(
                ingredient::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_ingredient::Column::IngredientId)
                        .from(recipe_ingredient::Entity)
                        .to_owned(),
                ),
            );
        }

        Ok(query
            .order_by_desc(ingredient::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn get_ingredient(
        db: &DbConn,
        ingredient_id: i32,
        user_id: i32,
    ) -> Result<ingredient::Model, ServiceError> {
        Ingredient::find_by_id(ingredient_id)
            .filter(ingredient::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound {
                resource: "Ingredient",
                id: ingredient_id,
            })
    }

    pub async fn create_ingredient(
        db: &DbConn,
        user_id: i32,
        name: String,
    ) -> Result<ingredient::Model, ServiceError> {
        let new_ingredient = ingredient::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let ingredient = new_ingredient.insert(db).await?;
        debug!(ingredient_id = ingredient.id, user_id, "Ingredient created.");
        Ok(ingredient)
    }

    pub async fn update_ingredient(
        db: &DbConn,
        ingredient_id: i32,
        user_id: i32,
        name: Option<String>,
    ) -> Result<ingredient::Model, ServiceError> {
        let ingredient = Self::get_ingredient(db, ingredient_id, user_id).await?;

        match name {
            Some(name) => {
                let mut active_ingredient: ingredient::ActiveModel = ingredient.into();
                active_ingredient.name = Set(name);
                Ok(active_ingredient.update(db).await?)
            }
            None => Ok(ingredient),
        }
    }

    pub async fn delete_ingredient(
        db: &DbConn,
        ingredient_id: i32,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        let ingredient = Self::get_ingredient(db, ingredient_id, user_id).await?;
        ingredient.delete(db).await?;
        debug!(ingredient_id, user_id, "Ingredient deleted.");
        Ok(())
    }
}
