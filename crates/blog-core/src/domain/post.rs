use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Location, User};

/// Post entity - a publication written by exactly one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields a post's author may change after creation.
///
/// The author is deliberately absent: it is fixed when the post is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

impl Post {
    /// Create a new post authored by `author_id`.
    pub fn new(author_id: Uuid, changes: PostChanges) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: changes.title,
            text: changes.text,
            pub_date: changes.pub_date,
            is_published: changes.is_published,
            author_id,
            category_id: changes.category_id,
            location_id: changes.location_id,
            created_at: Utc::now(),
        }
    }

    /// Apply an edit. Identity, author and creation time are left untouched.
    pub fn apply(&mut self, changes: PostChanges) {
        self.title = changes.title;
        self.text = changes.text;
        self.pub_date = changes.pub_date;
        self.is_published = changes.is_published;
        self.category_id = changes.category_id;
        self.location_id = changes.location_id;
    }

    /// The editable fields of this post, e.g. to pre-fill a form.
    pub fn changes(&self) -> PostChanges {
        PostChanges {
            title: self.title.clone(),
            text: self.text.clone(),
            pub_date: self.pub_date,
            is_published: self.is_published,
            category_id: self.category_id,
            location_id: self.location_id,
        }
    }
}

/// A post together with its related rows, as listings and detail pages show it.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub author: User,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn changes(title: &str) -> PostChanges {
        PostChanges {
            title: title.to_string(),
            text: "Body".to_string(),
            pub_date: Utc::now(),
            is_published: true,
            category_id: None,
            location_id: None,
        }
    }

    #[test]
    fn test_apply_never_touches_author() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, changes("Hello"));
        let id = post.id;
        let created_at = post.created_at;

        let mut edit = changes("Hello again");
        edit.pub_date = Utc::now() + Duration::days(1);
        edit.is_published = false;
        post.apply(edit.clone());

        assert_eq!(post.id, id);
        assert_eq!(post.author_id, author);
        assert_eq!(post.created_at, created_at);
        assert_eq!(post.changes(), edit);
    }
}
