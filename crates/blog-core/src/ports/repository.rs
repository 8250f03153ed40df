use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentView, Location, Post, PostView, User};
use crate::error::RepoError;
use crate::pagination::Page;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Read-only access to categories.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// A category by slug, only if it is published.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Every category, ordered by title, for form choices.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

/// Read-only access to locations.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// Every location, ordered by name, for form choices.
    async fn list_all(&self) -> Result<Vec<Location>, RepoError>;
}

/// Post repository. Every listing is ordered by publication date, newest
/// first, and annotated with comment counts.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// A post with its author, category, location and comment count,
    /// without any visibility filter.
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError>;

    /// Publicly visible posts.
    async fn list_visible(&self, now: DateTime<Utc>, page: u64)
    -> Result<Page<PostView>, RepoError>;

    /// Publicly visible posts of one category.
    async fn list_visible_in_category(
        &self,
        category_id: Uuid,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostView>, RepoError>;

    /// All posts of one author, published or not.
    async fn list_by_author(&self, author_id: Uuid, page: u64)
    -> Result<Page<PostView>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post with their authors, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;
}
