//! Template rendering helpers shared by the page handlers.

use actix_web::HttpResponse;
use actix_web::http::header;
use serde::{Deserialize, Serialize};
use tera::Context;
use uuid::Uuid;

use blog_core::pagination::{Page, parse_page_number};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// `?page=` on listing pages. Kept as a string so junk falls back to page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> u64 {
        parse_page_number(self.page.as_deref())
    }
}

/// Pagination controls as the templates see them.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub number: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
}

impl<T> From<&Page<T>> for PageContext {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            total_items: page.total_items,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous_page_number: page.previous_page_number(),
            next_page_number: page.next_page_number(),
        }
    }
}

/// Context every page starts from: the signed-in user, if any.
pub fn base_context(identity: Option<&Identity>) -> Context {
    let mut context = Context::new();
    context.insert("user", &identity);
    context
}

/// Put a listing page into `context` as `posts` + `page_obj`.
pub fn insert_page<T: Serialize>(context: &mut Context, page: &Page<T>) {
    context.insert("posts", &page.items);
    context.insert("page_obj", &PageContext::from(page));
}

pub fn render(state: &AppState, template: &str, context: &Context) -> AppResult<HttpResponse> {
    let body = state.templates.render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub fn post_url(post_id: Uuid) -> String {
    format!("/posts/{}/", post_id)
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", username)
}

pub const INDEX_URL: &str = "/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_context_flags() {
        let page = Page::new(vec![1, 2, 3], 2, 3, 23);
        let ctx = PageContext::from(&page);

        assert!(ctx.has_previous && ctx.has_next);
        assert_eq!(ctx.previous_page_number, Some(1));
        assert_eq!(ctx.next_page_number, Some(3));
    }

    #[test]
    fn test_page_query_falls_back_to_first_page() {
        let query = PageQuery {
            page: Some("last".into()),
        };
        assert_eq!(query.number(), 1);
        assert_eq!(PageQuery::default().number(), 1);
    }
}
