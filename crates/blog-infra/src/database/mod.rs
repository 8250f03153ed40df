//! Persistence: connection management, SeaORM entities and repositories.

mod base_repo;
mod connections;
mod repositories;
pub mod schema;

pub mod entity;

pub use base_repo::SeaOrmRepository;
pub use connections::{DatabaseConfig, DatabaseConnections};
pub use repositories::{
    SqlCategoryRepository, SqlCommentRepository, SqlLocationRepository, SqlPostRepository,
    SqlUserRepository,
};

#[cfg(test)]
mod tests;
