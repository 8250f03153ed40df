//! Post pages: feeds, detail and the author-only create/edit/delete flow.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blog_core::authorization::{MutationAccess, authorize_mutation};
use blog_core::domain::{Post, PostChanges};
use blog_core::error::DomainError;
use blog_core::visibility::resolve_post_access;
use blog_shared::{CommentForm, FormErrors, PostForm, format_datetime};

use super::render::{
    INDEX_URL, PageQuery, base_context, insert_page, post_url, profile_url, redirect, render,
};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.list_visible(Utc::now(), query.number()).await?;

    let mut context = base_context(identity.0.as_ref());
    insert_page(&mut context, &page);
    render(&state, "blog/index.html", &context)
}

/// GET /posts/{post_id}/
///
/// The author sees the post whatever its state; everyone else only when it
/// passes the public visibility rule.
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let view = state.posts.find_view(post_id).await?;

    let access = resolve_post_access(view, identity.user_id(), Utc::now());
    let is_owner = access.is_owner();
    let post = access.into_view().ok_or(DomainError::NotFound {
        entity_type: "Post",
        id: post_id,
    })?;

    let comments = state.comments.list_for_post(post_id).await?;

    let mut context = base_context(identity.0.as_ref());
    context.insert("post", &post);
    context.insert("comments", &comments);
    context.insert("is_owner", &is_owner);
    context.insert("form", &CommentForm::default());
    context.insert("errors", &FormErrors::new());
    render(&state, "blog/detail.html", &context)
}

/// GET /category/{category_slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No published category '{}'", slug)))?;

    let page = state
        .posts
        .list_visible_in_category(category.id, Utc::now(), query.number())
        .await?;

    let mut context = base_context(identity.0.as_ref());
    context.insert("category", &category);
    insert_page(&mut context, &page);
    render(&state, "blog/category.html", &context)
}

/// GET /profile/{username}/
///
/// Lists every post of the user, drafts and scheduled posts included.
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let profile = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user '{}'", username)))?;

    let page = state.posts.list_by_author(profile.id, query.number()).await?;

    let mut context = base_context(identity.0.as_ref());
    context.insert("is_self", &(identity.user_id() == Some(profile.id)));
    context.insert("profile", &profile);
    insert_page(&mut context, &page);
    render(&state, "blog/profile.html", &context)
}

/// GET /posts/create/
pub async fn create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let form = PostForm {
        pub_date: format_datetime(Utc::now()),
        is_published: true,
        ..PostForm::default()
    };

    render_post_form(&state, &identity, &form, &FormErrors::new(), None).await
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    let changes = match validate_post_form(&state, &form).await? {
        Ok(changes) => changes,
        Err(errors) => {
            return render_post_form(&state, &identity, &form, &errors, None).await;
        }
    };

    let post = state
        .posts
        .create(Post::new(identity.user_id, changes))
        .await?;
    tracing::info!(post_id = %post.id, author = %identity.username, "Post created");

    Ok(redirect(profile_url(&identity.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = match load_for_mutation(&state, path.into_inner(), &identity).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    render_post_form(&state, &identity, &form_from_post(&post), &FormErrors::new(), Some(&post))
        .await
}

/// POST /posts/{post_id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = match load_for_mutation(&state, path.into_inner(), &identity).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };
    let form = form.into_inner();

    let changes = match validate_post_form(&state, &form).await? {
        Ok(changes) => changes,
        Err(errors) => {
            return render_post_form(&state, &identity, &form, &errors, Some(&post)).await;
        }
    };

    post.apply(changes);
    let post = state.posts.update(post).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(redirect(post_url(post.id)))
}

/// GET /posts/{post_id}/delete/
pub async fn delete_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = match load_for_mutation(&state, path.into_inner(), &identity).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    let mut context = base_context(Some(&identity));
    context.insert("post", &post);
    context.insert("form", &form_from_post(&post));
    context.insert("errors", &FormErrors::new());
    context.insert("confirm_delete", &true);
    render(&state, "blog/create.html", &context)
}

/// POST /posts/{post_id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = match load_for_mutation(&state, path.into_inner(), &identity).await? {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted with its comments");

    Ok(redirect(INDEX_URL))
}

/// Fetch a post for an edit/delete request.
///
/// `Err` carries the redirect back to the detail page for non-authors.
async fn load_for_mutation(
    state: &AppState,
    post_id: Uuid,
    identity: &Identity,
) -> AppResult<Result<Post, HttpResponse>> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "Post",
            id: post_id,
        })?;

    match authorize_mutation(&post, identity.user_id) {
        MutationAccess::Allowed => Ok(Ok(post)),
        MutationAccess::RedirectToDetail => {
            tracing::debug!(%post_id, user = %identity.username, "Not the author, redirecting");
            Ok(Err(redirect(post_url(post_id))))
        }
    }
}

fn form_from_post(post: &Post) -> PostForm {
    let id_or_empty = |id: Option<Uuid>| id.map(|id| id.to_string()).unwrap_or_default();

    PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: format_datetime(post.pub_date),
        is_published: post.is_published,
        location: id_or_empty(post.location_id),
        category: id_or_empty(post.category_id),
    }
}

/// Field rules plus the checks that need the database: the chosen
/// category and location must exist.
async fn validate_post_form(
    state: &AppState,
    form: &PostForm,
) -> AppResult<Result<PostChanges, FormErrors>> {
    let mut errors = FormErrors::check(form);

    if errors.get("category").is_none() {
        if let Some(id) = form.category_id() {
            if state.categories.find_by_id(id).await?.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
        }
    }

    if errors.get("location").is_none() {
        if let Some(id) = form.location_id() {
            if state.locations.find_by_id(id).await?.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
        }
    }

    let pub_date = match form.pub_date() {
        Some(pub_date) if errors.is_empty() => pub_date,
        _ => return Ok(Err(errors)),
    };

    Ok(Ok(PostChanges {
        title: form.title.trim().to_string(),
        text: form.text.trim().to_string(),
        pub_date,
        is_published: form.is_published,
        category_id: form.category_id(),
        location_id: form.location_id(),
    }))
}

async fn render_post_form(
    state: &AppState,
    identity: &Identity,
    form: &PostForm,
    errors: &FormErrors,
    post: Option<&Post>,
) -> AppResult<HttpResponse> {
    let categories = state.categories.list_all().await?;
    let locations = state.locations.list_all().await?;

    let mut context = base_context(Some(identity));
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("post", &post);
    context.insert("categories", &categories);
    context.insert("locations", &locations);
    context.insert("confirm_delete", &false);
    render(state, "blog/create.html", &context)
}
