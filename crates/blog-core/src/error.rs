//! Errors raised by the blog's core and its storage ports.

use thiserror::Error;
use uuid::Uuid;

/// A lookup for a post, comment, category or user came back empty, or the
/// requester may not see what it found.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: &'static str, id: Uuid },
}

/// Failures reported by repository implementations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database unreachable: {0}")]
    Connection(String),

    #[error("Database query failed: {0}")]
    Query(String),

    /// An update or delete touched no row.
    #[error("Row not found")]
    NotFound,

    /// Unique username/slug or foreign key violated.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity_and_id() {
        let id = Uuid::new_v4();
        let err = DomainError::NotFound {
            entity_type: "Comment",
            id,
        };

        assert_eq!(err.to_string(), format!("Comment {id} not found"));
    }
}
