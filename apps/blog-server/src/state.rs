//! Application state - shared across all handlers.

use std::sync::Arc;

use sea_orm::DbConn;
use tera::Tera;

use blog_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use blog_infra::database::{
    SqlCategoryRepository, SqlCommentRepository, SqlLocationRepository, SqlPostRepository,
    SqlUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub templates: Arc<Tera>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Wire the SQL repositories over one connection pool.
    pub fn from_connection(
        db: DbConn,
        templates: Tera,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        let state = Self {
            users: Arc::new(SqlUserRepository::new(db.clone())),
            categories: Arc::new(SqlCategoryRepository::new(db.clone())),
            locations: Arc::new(SqlLocationRepository::new(db.clone())),
            posts: Arc::new(SqlPostRepository::new(db.clone())),
            comments: Arc::new(SqlCommentRepository::new(db.clone())),
            db,
            templates: Arc::new(templates),
            tokens,
            passwords,
        };

        tracing::info!("Application state initialized");
        state
    }
}
