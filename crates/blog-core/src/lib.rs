//! # Blog Core
//!
//! The domain layer of the blog.
//! Entities, the post visibility predicate, authorization rules and
//! pagination arithmetic live here with zero infrastructure dependencies.

pub mod authorization;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod visibility;

pub use error::DomainError;
