use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::db::entities::{prelude::Tag, recipe_tag, tag};
use crate::db::services::ServiceError;

pub struct TagService;

impl TagService {
    /// Lists the user's tags, newest name first. With `assigned_only`, only
    /// tags attached to at least one recipe are returned.
    pub async fn list_tags(
        db: &DbConn,
        user_id: i32,
        assigned_only: bool,
    ) -> Result<Vec<tag::Model>, ServiceError> {
        let mut query = Tag::find().filter(tag::Column::UserId.eq(user_id));
        if assigned_only {
            query = query.filter(
                tag::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_tag::Column::TagId)
                        .from(recipe_tag::Entity)
                        .to_owned(),
                ),
            );
        }

        Ok(query.order_by_desc(tag::Column::Name).all(db).await?)
    }

    pub async fn get_tag(
        db: &DbConn,
        tag_id: i32,
        user_id: i32,
    ) -> Result<tag::Model, ServiceError> {
        Tag::find_by_id(tag_id)
            .filter(tag::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound { resource: "Tag", id: tag_id })
    }

    pub async fn create_tag(
        db: &DbConn,
        user_id: i32,
        name: String,
    ) -> Result<tag::Model, ServiceError> {
        let new_tag = tag::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let tag = new_tag.insert(db).await?;
        debug!(tag_id = tag.id, user_id, "Tag created.");
        Ok(tag)
    }

    /// Renames a tag. `None` leaves the name untouched.
    pub async fn update_tag(
        db: &DbConn,
        tag_id: i32,
        user_id: i32,
        name: Option<String>,
    ) -> Result<tag::Model, ServiceError> {
        let tag = Self::get_tag(db, tag_id, user_id).await?;

        let Some(name) = name else {
            return Ok(tag);
        };

        let mut active_tag: tag::ActiveModel = tag.into();
        active_tag.name = Set(name);
        Ok(active_tag.update(db).await?)
    }

    /// Deletes a tag. Recipe links go with it through the cascading foreign key.
    pub async fn delete_tag(db: &DbConn, tag_id: i32, user_id: i32) -> Result<(), ServiceError> {
        let tag = Self::get_tag(db, tag_id, user_id).await?;
        tag.delete(db).await?;
        debug!(tag_id, user_id, "Tag deleted.");
        Ok(())
    }
}
