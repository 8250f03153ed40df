use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseBackend, DbConn, MockDatabase};
use uuid::Uuid;

use blog_core::domain::{Category, Comment, Location, Post, PostChanges, User};
use blog_core::error::RepoError;
use blog_core::pagination::PAGE_SIZE;
use blog_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blog_core::visibility::is_publicly_visible;

use super::entity::post;
use super::repositories::{
    SqlCategoryRepository, SqlCommentRepository, SqlLocationRepository, SqlPostRepository,
    SqlUserRepository,
};
use super::schema::create_schema;

async fn sqlite() -> DbConn {
    let opts = ConnectOptions::new("sqlite::memory:")
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false)
        .to_owned();
    let db = Database::connect(opts).await.unwrap();
    create_schema(&db).await.unwrap();
    db
}

struct Fixture {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Fixture {
    async fn new() -> Self {
        let db = sqlite().await;
        Self {
            users: Arc::new(SqlUserRepository::new(db.clone())),
            categories: Arc::new(SqlCategoryRepository::new(db.clone())),
            locations: Arc::new(SqlLocationRepository::new(db.clone())),
            posts: Arc::new(SqlPostRepository::new(db.clone())),
            comments: Arc::new(SqlCommentRepository::new(db)),
        }
    }

    async fn user(&self, username: &str) -> User {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        );
        self.users.create(user).await.unwrap()
    }

    async fn category(&self, slug: &str, is_published: bool) -> Category {
        let category = Category::new(
            slug.to_uppercase(),
            String::new(),
            slug.to_string(),
            is_published,
        );
        self.categories.create(category).await.unwrap()
    }

    async fn post(
        &self,
        author: &User,
        title: &str,
        pub_date: DateTime<Utc>,
        is_published: bool,
        category: Option<&Category>,
    ) -> Post {
        let post = Post::new(
            author.id,
            PostChanges {
                title: title.to_string(),
                text: format!("{title} body"),
                pub_date,
                is_published,
                category_id: category.map(|c| c.id),
                location_id: None,
            },
        );
        self.posts.create(post).await.unwrap()
    }

    async fn comment(&self, post: &Post, author: &User, text: &str) -> Comment {
        self.comments
            .create(Comment::new(post.id, author.id, text.to_string()))
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_find_post_by_id_with_mock() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            title: "Test Post".to_owned(),
            text: "Content".to_owned(),
            pub_date: now.into(),
            is_published: true,
            author_id,
            category_id: None,
            location_id: None,
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = SqlPostRepository::new(db);

    let post = BaseRepository::<Post, Uuid>::find_by_id(&repo, post_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(post.title, "Test Post");
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn test_global_feed_matches_visibility_predicate() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    let author = fx.user("author").await;
    let published = fx.category("travel", true).await;
    let hidden = fx.category("drafts", false).await;

    let mut all = Vec::new();
    for is_published in [true, false] {
        for offset in [Duration::days(-2), Duration::hours(-1), Duration::days(1)] {
            for category in [None, Some(&published), Some(&hidden)] {
                let title = format!("{is_published}/{offset}/{:?}", category.map(|c| &c.slug));
                let post = fx.post(&author, &title, now + offset, is_published, category).await;
                all.push((post, category.cloned()));
            }
        }
    }

    let feed = fx.posts.list_visible(now, 1).await.unwrap();
    let mut listed: Vec<Uuid> = feed.items.iter().map(|v| v.post.id).collect();
    listed.sort();

    let mut expected: Vec<Uuid> = all
        .iter()
        .filter(|(post, category)| is_publicly_visible(post, category.as_ref(), now))
        .map(|(post, _)| post.id)
        .collect();
    expected.sort();

    assert_eq!(expected.len(), 4);
    assert_eq!(listed, expected);
    assert_eq!(feed.total_items, 4);
}

#[tokio::test]
async fn test_feed_is_newest_first_and_location_does_not_hide_posts() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    let author = fx.user("author").await;
    let category = fx.category("travel", true).await;
    let hidden_place = fx
        .locations
        .create(Location::new("Atlantis".into(), false))
        .await
        .unwrap();

    let older = fx.post(&author, "Older", now - Duration::days(3), true, Some(&category)).await;
    let mut newer = fx.post(&author, "Hello", now - Duration::days(1), true, Some(&category)).await;
    newer.location_id = Some(hidden_place.id);
    fx.posts.update(newer.clone()).await.unwrap();

    let feed = fx.posts.list_visible(now, 1).await.unwrap();
    let titles: Vec<&str> = feed.items.iter().map(|v| v.post.title.as_str()).collect();

    assert_eq!(titles, vec!["Hello", "Older"]);
    assert_eq!(feed.items[0].location.as_ref().map(|l| l.name.as_str()), Some("Atlantis"));
    assert_eq!(feed.items[1].post.id, older.id);
}

#[tokio::test]
async fn test_pagination_clamps_to_last_page() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    let author = fx.user("author").await;

    for i in 0..(PAGE_SIZE + 3) {
        fx.post(&author, &format!("Post {i}"), now - Duration::minutes(i as i64 + 1), true, None)
            .await;
    }

    let first = fx.posts.list_visible(now, 1).await.unwrap();
    assert_eq!(first.items.len() as u64, PAGE_SIZE);
    assert_eq!(first.num_pages, 2);
    assert_eq!(first.items[0].post.title, "Post 0");

    let last = fx.posts.list_visible(now, 2).await.unwrap();
    let beyond = fx.posts.list_visible(now, 99).await.unwrap();
    let last_ids: Vec<Uuid> = last.items.iter().map(|v| v.post.id).collect();
    let beyond_ids: Vec<Uuid> = beyond.items.iter().map(|v| v.post.id).collect();

    assert_eq!(last.items.len(), 3);
    assert_eq!(beyond.number, 2);
    assert_eq!(beyond_ids, last_ids);
}

#[tokio::test]
async fn test_empty_feed_has_one_empty_page() {
    let fx = Fixture::new().await;

    let page = fx.posts.list_visible(Utc::now(), 7).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.number, 1);
    assert_eq!(page.num_pages, 1);
}

#[tokio::test]
async fn test_comment_counts_are_exact() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    let author = fx.user("author").await;
    let reader = fx.user("reader").await;

    let busy = fx.post(&author, "Busy", now - Duration::hours(2), true, None).await;
    let quiet = fx.post(&author, "Quiet", now - Duration::hours(1), true, None).await;
    for i in 0..3 {
        fx.comment(&busy, &reader, &format!("comment {i}")).await;
    }

    let feed = fx.posts.list_visible(now, 1).await.unwrap();
    let count_of = |id: Uuid| {
        feed.items
            .iter()
            .find(|v| v.post.id == id)
            .map(|v| v.comment_count)
    };

    assert_eq!(count_of(busy.id), Some(3));
    assert_eq!(count_of(quiet.id), Some(0));
}

#[tokio::test]
async fn test_category_feed_only_lists_that_category() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    let author = fx.user("author").await;
    let travel = fx.category("travel", true).await;
    let food = fx.category("food", true).await;

    let trip = fx.post(&author, "Trip", now - Duration::hours(1), true, Some(&travel)).await;
    fx.post(&author, "Soup", now - Duration::hours(1), true, Some(&food)).await;
    fx.post(&author, "Future trip", now + Duration::days(1), true, Some(&travel)).await;

    let feed = fx
        .posts
        .list_visible_in_category(travel.id, now, 1)
        .await
        .unwrap();

    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].post.id, trip.id);
}

#[tokio::test]
async fn test_profile_feed_includes_unpublished_posts() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    let author = fx.user("author").await;
    let other = fx.user("other").await;

    fx.post(&author, "Draft", now - Duration::hours(1), false, None).await;
    fx.post(&author, "Scheduled", now + Duration::days(1), true, None).await;
    fx.post(&other, "Not mine", now - Duration::hours(1), true, None).await;

    let feed = fx.posts.list_by_author(author.id, 1).await.unwrap();
    let titles: Vec<&str> = feed.items.iter().map(|v| v.post.title.as_str()).collect();

    assert_eq!(titles, vec!["Scheduled", "Draft"]);
}

#[tokio::test]
async fn test_find_view_is_unfiltered() {
    let fx = Fixture::new().await;
    let author = fx.user("author").await;
    let hidden = fx.category("hidden", false).await;

    let post = fx
        .post(&author, "Secret", Utc::now() + Duration::days(1), false, Some(&hidden))
        .await;

    let view = fx.posts.find_view(post.id).await.unwrap().unwrap();

    assert_eq!(view.author.username, "author");
    assert_eq!(view.category.map(|c| c.slug), Some("hidden".to_string()));
    assert!(fx.posts.find_view(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_post_cascades_to_comments() {
    let fx = Fixture::new().await;
    let author = fx.user("author").await;
    let post = fx.post(&author, "Doomed", Utc::now(), true, None).await;
    let comment = fx.comment(&post, &author, "first").await;

    fx.posts.delete(post.id).await.unwrap();

    assert!(fx.comments.find_by_id(comment.id).await.unwrap().is_none());
    assert!(fx.comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comments_are_listed_oldest_first_with_authors() {
    let fx = Fixture::new().await;
    let author = fx.user("author").await;
    let reader = fx.user("reader").await;
    let post = fx.post(&author, "Chatty", Utc::now(), true, None).await;

    let mut first = Comment::new(post.id, reader.id, "first".into());
    first.created_at = Utc::now() - Duration::minutes(5);
    fx.comments.create(first).await.unwrap();
    fx.comment(&post, &author, "second").await;

    let comments = fx.comments.list_for_post(post.id).await.unwrap();
    let texts: Vec<(&str, &str)> = comments
        .iter()
        .map(|c| (c.comment.text.as_str(), c.author.username.as_str()))
        .collect();

    assert_eq!(texts, vec![("first", "reader"), ("second", "author")]);
}

#[tokio::test]
async fn test_unique_username_and_lookup() {
    let fx = Fixture::new().await;
    fx.user("dostoevsky").await;

    let duplicate = fx
        .users
        .create(User::new("dostoevsky".into(), "x@example.com".into(), "hash".into()))
        .await;
    assert!(matches!(duplicate, Err(RepoError::Constraint(_))));

    let found = fx.users.find_by_username("dostoevsky").await.unwrap();
    assert!(found.is_some());
    assert!(fx.users.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_only_published_categories_resolve_by_slug() {
    let fx = Fixture::new().await;
    fx.category("travel", true).await;
    fx.category("drafts", false).await;

    assert!(fx.categories.find_published_by_slug("travel").await.unwrap().is_some());
    assert!(fx.categories.find_published_by_slug("drafts").await.unwrap().is_none());
    assert_eq!(fx.categories.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_and_delete_missing_rows() {
    let fx = Fixture::new().await;
    let author = fx.user("author").await;
    let ghost = Post::new(
        author.id,
        PostChanges {
            title: "Ghost".into(),
            text: "Boo".into(),
            pub_date: Utc::now(),
            is_published: true,
            category_id: None,
            location_id: None,
        },
    );

    assert!(matches!(fx.posts.update(ghost.clone()).await, Err(RepoError::NotFound)));
    assert!(matches!(fx.posts.delete(ghost.id).await, Err(RepoError::NotFound)));
    assert!(fx.locations.list_all().await.unwrap().is_empty());
}
