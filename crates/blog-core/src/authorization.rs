//! Who may mutate what: only the author of a post or comment.

use uuid::Uuid;

use crate::domain::{Comment, Post};

/// Anything with a fixed author.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// Result of an edit or delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAccess {
    Allowed,
    /// Not the author: send the actor back to the post's detail page,
    /// without an error and without touching the item.
    RedirectToDetail,
}

pub fn authorize_mutation<T: Authored>(item: &T, actor: Uuid) -> MutationAccess {
    if item.author_id() == actor {
        MutationAccess::Allowed
    } else {
        MutationAccess::RedirectToDetail
    }
}
