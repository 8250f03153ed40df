//! Which posts a reader may see.
//!
//! A post is publicly visible when it is published, its publication date
//! has passed, and its category (if any) is published. The location's flag
//! plays no part. The author of a post sees it regardless.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post, PostView};

/// The visibility predicate applied to listings and to non-owner detail views.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published
        && post.pub_date <= now
        && category.is_none_or(|category| category.is_published)
}

/// Outcome of looking up a single post on behalf of a reader.
#[derive(Debug, Clone)]
pub enum PostAccess {
    /// The requester wrote the post; publish state is ignored.
    Owner(PostView),
    /// The requester is someone else and the post passes the predicate.
    Visible(PostView),
    /// No such post, or it is hidden from this requester.
    NotFound,
}

impl PostAccess {
    pub fn into_view(self) -> Option<PostView> {
        match self {
            PostAccess::Owner(view) | PostAccess::Visible(view) => Some(view),
            PostAccess::NotFound => None,
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, PostAccess::Owner(_))
    }
}

/// Decide what `requester` gets for an unfiltered post lookup.
///
/// `view` is the post fetched by id without any visibility filter.
pub fn resolve_post_access(
    view: Option<PostView>,
    requester: Option<Uuid>,
    now: DateTime<Utc>,
) -> PostAccess {
    let Some(view) = view else {
        return PostAccess::NotFound;
    };

    if requester == Some(view.post.author_id) {
        return PostAccess::Owner(view);
    }

    if is_publicly_visible(&view.post, view.category.as_ref(), now) {
        PostAccess::Visible(view)
    } else {
        PostAccess::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostChanges, User};
    use chrono::Duration;

    fn post(is_published: bool, pub_date: DateTime<Utc>, author_id: Uuid) -> Post {
        Post::new(
            author_id,
            PostChanges {
                title: "Title".into(),
                text: "Text".into(),
                pub_date,
                is_published,
                category_id: None,
                location_id: None,
            },
        )
    }

    fn category(is_published: bool) -> Category {
        Category::new("Travel".into(), "".into(), "travel".into(), is_published)
    }

    fn view(post: Post, category: Option<Category>) -> PostView {
        let mut author = User::new("author".into(), "a@example.com".into(), "hash".into());
        author.id = post.author_id;
        PostView {
            post,
            author,
            category,
            location: None,
            comment_count: 0,
        }
    }

    #[test]
    fn test_predicate_truth_table() {
        let now = Utc::now();
        let past = now - Duration::days(1);
        let future = now + Duration::days(1);
        let author = Uuid::new_v4();

        let published = category(true);
        let hidden = category(false);

        for is_published in [true, false] {
            for date in [past, now, future] {
                for cat in [None, Some(&published), Some(&hidden)] {
                    let expected = is_published
                        && date <= now
                        && cat.map(|c| c.is_published).unwrap_or(true);
                    let actual = is_publicly_visible(&post(is_published, date, author), cat, now);
                    assert_eq!(actual, expected, "{is_published} {date} {cat:?}");
                }
            }
        }
    }

    #[test]
    fn test_owner_sees_future_post() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let future = view(post(true, now + Duration::days(1), author), None);

        let access = resolve_post_access(Some(future), Some(author), now);
        assert!(access.is_owner());
    }

    #[test]
    fn test_other_reader_gets_not_found_for_hidden_post() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let hidden = view(post(true, now - Duration::days(1), author), Some(category(false)));

        let access = resolve_post_access(Some(hidden.clone()), Some(Uuid::new_v4()), now);
        assert!(matches!(access, PostAccess::NotFound));

        let anonymous = resolve_post_access(Some(hidden), None, now);
        assert!(matches!(anonymous, PostAccess::NotFound));
    }

    #[test]
    fn test_other_reader_sees_visible_post() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let visible = view(post(true, now - Duration::hours(1), author), Some(category(true)));

        let access = resolve_post_access(Some(visible), None, now);
        assert!(matches!(access, PostAccess::Visible(_)));
        assert!(access.into_view().is_some());
    }

    #[test]
    fn test_missing_post_is_not_found() {
        let access = resolve_post_access(None, Some(Uuid::new_v4()), Utc::now());
        assert!(access.into_view().is_none());
    }
}
