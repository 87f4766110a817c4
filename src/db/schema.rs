use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};
use tracing::{debug, info};

use crate::db::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag, user};

/// Creates every table the service needs, skipping the ones that already exist.
/// Referenced tables come first.
pub async fn create_tables<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    create_table(db, user::Entity).await?;
    create_table(db, tag::Entity).await?;
    create_table(db, ingredient::Entity).await?;
    create_table(db, recipe::Entity).await?;
    create_table(db, recipe_tag::Entity).await?;
    create_table(db, recipe_ingredient::Entity).await?;
    info!("Database schema is ready.");
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    debug!(table = entity.table_name(), "Ensuring table exists.");
    db.execute(backend.build(&statement)).await?;
    Ok(())
}
