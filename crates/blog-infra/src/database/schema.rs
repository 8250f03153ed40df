//! Schema creation straight from the entity definitions.
//!
//! The `migration` crate owns the production schema; this builds the same
//! tables for throwaway databases (in-memory SQLite in tests).

use sea_orm::{ConnectionTrait, DbConn, DbErr, EntityTrait, Schema};

use super::entity::{category, comment, location, post, user};

/// Create every blog table, parents before children.
pub async fn create_schema(db: &DbConn) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, category::Entity).await?;
    create_table(db, location::Entity).await?;
    create_table(db, post::Entity).await?;
    create_table(db, comment::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DbConn, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let statement = Schema::new(backend).create_table_from_entity(entity);
    db.execute(backend.build(&statement)).await?;
    Ok(())
}
