use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::db::entities::prelude::{Ingredient, Recipe, RecipeIngredient, RecipeTag, Tag};
use crate::db::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use crate::db::services::ServiceError;

/// Restricts a recipe listing to recipes carrying any of the given tags
/// and any of the given ingredients. Empty lists do not filter.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

/// Field-level changes for an existing recipe. `None` means "keep".
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<f64>,
    pub link: Option<Option<String>>,
    pub tag_ids: Option<Vec<i32>>,
    pub ingredient_ids: Option<Vec<i32>>,
}

/// A recipe together with the ids it references, ascending.
#[derive(Debug, Clone)]
pub struct RecipeWithRefs {
    pub recipe: recipe::Model,
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

/// A recipe with its tags and ingredients resolved, each ordered by name.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: recipe::Model,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<ingredient::Model>,
}

pub struct RecipeService;

impl RecipeService {
    pub async fn list_recipes(
        db: &DbConn,
        user_id: i32,
        filter: &RecipeFilter,
    ) -> Result<Vec<RecipeWithRefs>, ServiceError> {
        let mut query = Recipe::find().filter(recipe::Column::UserId.eq(user_id));

        if !filter.tag_ids.is_empty() {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_tag::Column::RecipeId)
                        .from(recipe_tag::Entity)
                        .and_where(recipe_tag::Column::TagId.is_in(filter.tag_ids.clone()))
                        .to_owned(),
                ),
            );
        }
        if !filter.ingredient_ids.is_empty() {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_ingredient::Column::RecipeId)
                        .from(recipe_ingredient::Entity)
                        .and_where(
                            recipe_ingredient::Column::IngredientId
                                .is_in(filter.ingredient_ids.clone()),
                        )
                        .to_owned(),
                ),
            );
        }

        let recipes = query.order_by_desc(recipe::Column::Id).all(db).await?;
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let (mut tag_refs, mut ingredient_refs) = load_refs(db, &recipe_ids).await?;

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeWithRefs {
                tag_ids: tag_refs.remove(&recipe.id).unwrap_or_default(),
                ingredient_ids: ingredient_refs.remove(&recipe.id).unwrap_or_default(),
                recipe,
            })
            .collect())
    }

    pub async fn get_recipe(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
    ) -> Result<recipe::Model, ServiceError> {
        find_owned(db, recipe_id, user_id).await
    }

    pub async fn get_recipe_detail(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
    ) -> Result<RecipeDetail, ServiceError> {
        let recipe = find_owned(db, recipe_id, user_id).await?;
        let tags = recipe
            .find_related(Tag)
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?;
        let ingredients = recipe
            .find_related(Ingredient)
            .order_by_asc(ingredient::Column::Name)
            .all(db)
            .await?;

        Ok(RecipeDetail {
            recipe,
            tags,
            ingredients,
        })
    }

    /// Inserts the recipe and its links in one transaction. Every referenced
    /// tag and ingredient must belong to `user_id`.
    pub async fn create_recipe(
        db: &DbConn,
        user_id: i32,
        new_recipe: NewRecipe,
    ) -> Result<RecipeWithRefs, ServiceError> {
        let txn = db.begin().await?;

        let tag_ids = owned_tag_ids(&txn, user_id, &new_recipe.tag_ids).await?;
        let ingredient_ids =
            owned_ingredient_ids(&txn, user_id, &new_recipe.ingredient_ids).await?;

        let now = Utc::now();
        let recipe = recipe::ActiveModel {
            user_id: Set(user_id),
            title: Set(new_recipe.title),
            time_minutes: Set(new_recipe.time_minutes),
            price: Set(new_recipe.price),
            link: Set(new_recipe.link),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        replace_tag_links(&txn, recipe.id, &tag_ids).await?;
        replace_ingredient_links(&txn, recipe.id, &ingredient_ids).await?;
        txn.commit().await?;

        info!(recipe_id = recipe.id, user_id, "Recipe created.");
        Ok(RecipeWithRefs {
            recipe,
            tag_ids,
            ingredient_ids,
        })
    }

    pub async fn update_recipe(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
        changes: RecipeChanges,
    ) -> Result<RecipeWithRefs, ServiceError> {
        let txn = db.begin().await?;
        let existing = find_owned(&txn, recipe_id, user_id).await?;

        let tag_ids = match &changes.tag_ids {
            Some(ids) => Some(owned_tag_ids(&txn, user_id, ids).await?),
            None => None,
        };
        let ingredient_ids = match &changes.ingredient_ids {
            Some(ids) => Some(owned_ingredient_ids(&txn, user_id, ids).await?),
            None => None,
        };

        let mut active_recipe: recipe::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active_recipe.title = Set(title);
        }
        if let Some(time_minutes) = changes.time_minutes {
            active_recipe.time_minutes = Set(time_minutes);
        }
        if let Some(price) = changes.price {
            active_recipe.price = Set(price);
        }
        if let Some(link) = changes.link {
            active_recipe.link = Set(link);
        }
        active_recipe.updated_at = Set(Utc::now());
        let recipe = active_recipe.update(&txn).await?;

        if let Some(ids) = &tag_ids {
            replace_tag_links(&txn, recipe.id, ids).await?;
        }
        if let Some(ids) = &ingredient_ids {
            replace_ingredient_links(&txn, recipe.id, ids).await?;
        }

        let (mut tag_refs, mut ingredient_refs) = load_refs(&txn, &[recipe.id]).await?;
        txn.commit().await?;

        debug!(recipe_id, user_id, "Recipe updated.");
        Ok(RecipeWithRefs {
            tag_ids: tag_refs.remove(&recipe.id).unwrap_or_default(),
            ingredient_ids: ingredient_refs.remove(&recipe.id).unwrap_or_default(),
            recipe,
        })
    }

    pub async fn delete_recipe(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        let recipe = find_owned(db, recipe_id, user_id).await?;
        recipe.delete(db).await?;
        debug!(recipe_id, user_id, "Recipe deleted.");
        Ok(())
    }
}

async fn find_owned<C>(db: &C, recipe_id: i32, user_id: i32) -> Result<recipe::Model, ServiceError>
where
    C: ConnectionTrait,
{
    Recipe::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound {
            resource: "Recipe",
            id: recipe_id,
        })
}

type RefMap = HashMap<i32, Vec<i32>>;

/// Tag and ingredient ids per recipe, each list ascending.
async fn load_refs<C>(db: &C, recipe_ids: &[i32]) -> Result<(RefMap, RefMap), DbErr>
where
    C: ConnectionTrait,
{
    let mut tag_refs = RefMap::new();
    let mut ingredient_refs = RefMap::new();
    if recipe_ids.is_empty() {
        return Ok((tag_refs, ingredient_refs));
    }

    let tag_links = RecipeTag::find()
        .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.to_vec()))
        .order_by_asc(recipe_tag::Column::TagId)
        .all(db)
        .await?;
    for link in tag_links {
        tag_refs.entry(link.recipe_id).or_default().push(link.tag_id);
    }

    let ingredient_links = RecipeIngredient::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
        .order_by_asc(recipe_ingredient::Column::IngredientId)
        .all(db)
        .await?;
    for link in ingredient_links {
        ingredient_refs
            .entry(link.recipe_id)
            .or_default()
            .push(link.ingredient_id);
    }

    Ok((tag_refs, ingredient_refs))
}

/// Deduplicates `ids` and checks each one is a tag owned by `user_id`.
async fn owned_tag_ids<C>(db: &C, user_id: i32, ids: &[i32]) -> Result<Vec<i32>, ServiceError>
where
    C: ConnectionTrait,
{
    let wanted: BTreeSet<i32> = ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let found: BTreeSet<i32> = Tag::find()
        .filter(tag::Column::UserId.eq(user_id))
        .filter(tag::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    check_references("tags", wanted, &found)
}

async fn owned_ingredient_ids<C>(
    db: &C,
    user_id: i32,
    ids: &[i32],
) -> Result<Vec<i32>, ServiceError>
where
    C: ConnectionTrait,
{
    let wanted: BTreeSet<i32> = ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let found: BTreeSet<i32> = Ingredient::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .filter(ingredient::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    check_references("ingredients", wanted, &found)
}

fn check_references(
    field: &'static str,
    wanted: BTreeSet<i32>,
    found: &BTreeSet<i32>,
) -> Result<Vec<i32>, ServiceError> {
    let missing: Vec<i32> = wanted.difference(found).copied().collect();
    if !missing.is_empty() {
        return Err(ServiceError::InvalidReference { field, ids: missing });
    }
    Ok(wanted.into_iter().collect())
}

async fn replace_tag_links<C>(db: &C, recipe_id: i32, tag_ids: &[i32]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    RecipeTag::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }

    let links = tag_ids.iter().map(|&tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(tag_id),
    });
    RecipeTag::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn replace_ingredient_links<C>(
    db: &C,
    recipe_id: i32,
    ingredient_ids: &[i32],
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    RecipeIngredient::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    if ingredient_ids.is_empty() {
        return Ok(());
    }

    let links = ingredient_ids
        .iter()
        .map(|&ingredient_id| recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient_id),
        });
    RecipeIngredient::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}
