//! Blog repository implementations on top of [`SeaOrmRepository`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, ItemsAndPagesNumber, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use blog_core::domain::{Category, Comment, CommentView, Location, Post, PostView, User};
use blog_core::error::RepoError;
use blog_core::pagination::{PAGE_SIZE, Page, clamp_page};
use blog_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::base_repo::{SeaOrmRepository, map_db_err};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

pub type SqlUserRepository = SeaOrmRepository<UserEntity>;
pub type SqlCategoryRepository = SeaOrmRepository<CategoryEntity>;
pub type SqlLocationRepository = SeaOrmRepository<LocationEntity>;
pub type SqlPostRepository = SeaOrmRepository<PostEntity>;
pub type SqlCommentRepository = SeaOrmRepository<CommentEntity>;

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for SqlCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for SqlLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// SQL form of [`blog_core::visibility::is_publicly_visible`].
///
/// Needs `categories` LEFT JOINed onto `posts`; see [`visible_posts`].
fn visibility_condition(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(DateTimeWithTimeZone::from(now)))
        .add(
            Condition::any()
                .add(post::Column::CategoryId.is_null())
                .add(category::Column::IsPublished.eq(true)),
        )
}

fn visible_posts(now: DateTime<Utc>) -> Select<PostEntity> {
    PostEntity::find()
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .filter(visibility_condition(now))
}

impl SqlPostRepository {
    /// Run a feed query: newest first, clamped page, relations attached.
    async fn paginate(
        &self,
        query: Select<PostEntity>,
        page: u64,
    ) -> Result<Page<PostView>, RepoError> {
        let paginator = query
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, PAGE_SIZE);

        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator.num_items_and_pages().await.map_err(map_db_err)?;

        let number = clamp_page(page, number_of_pages);
        let posts = paginator.fetch_page(number - 1).await.map_err(map_db_err)?;
        let views = self.attach_relations(posts).await?;

        Ok(Page::new(views, number, number_of_pages, number_of_items))
    }

    /// Load authors, categories, locations and comment counts for a batch
    /// of posts, keeping the input order.
    async fn attach_relations(
        &self,
        posts: Vec<post::Model>,
    ) -> Result<Vec<PostView>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let category_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.category_id).collect();
        let location_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.location_id).collect();

        let authors: HashMap<Uuid, User> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let categories: HashMap<Uuid, Category> = CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let locations: HashMap<Uuid, Location> = LocationEntity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let counts: HashMap<Uuid, i64> = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .collect();

        posts
            .into_iter()
            .map(|model| {
                let post: Post = model.into();
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!(
                        "author {} of post {} is missing",
                        post.author_id, post.id
                    ))
                })?;
                let category = post.category_id.and_then(|id| categories.get(&id).cloned());
                let location = post.location_id.and_then(|id| locations.get(&id).cloned());
                let comment_count = counts.get(&post.id).copied().unwrap_or(0) as u64;

                Ok(PostView {
                    post,
                    author,
                    category,
                    location,
                    comment_count,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(self.attach_relations(vec![model]).await?.pop())
    }

    async fn list_visible(
        &self,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostView>, RepoError> {
        self.paginate(visible_posts(now), page).await
    }

    async fn list_visible_in_category(
        &self,
        category_id: Uuid,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostView>, RepoError> {
        let query = visible_posts(now).filter(post::Column::CategoryId.eq(category_id));
        self.paginate(query, page).await
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: u64,
    ) -> Result<Page<PostView>, RepoError> {
        let query = PostEntity::find().filter(post::Column::AuthorId.eq(author_id));
        self.paginate(query, page).await
    }
}

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let comment: Comment = comment.into();
                let author = author.ok_or_else(|| {
                    RepoError::Query(format!(
                        "author {} of comment {} is missing",
                        comment.author_id, comment.id
                    ))
                })?;

                Ok(CommentView {
                    comment,
                    author: author.into(),
                })
            })
            .collect()
    }
}
