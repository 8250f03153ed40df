//! # Blog Shared
//!
//! Form payloads submitted by the browser, with their field-level
//! validation rules, and the error page payload.

pub mod forms;
pub mod response;

pub use forms::{
    CommentForm, FormErrors, LoginForm, PostForm, ProfileForm, RegistrationForm, format_datetime,
};
pub use response::ErrorPage;
