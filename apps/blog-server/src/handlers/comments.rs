//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::authorization::{MutationAccess, authorize_mutation};
use blog_core::domain::Comment;
use blog_core::error::DomainError;
use blog_shared::{CommentForm, FormErrors};

use super::render::{base_context, post_url, redirect, render};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /posts/{post_id}/comment/
///
/// An invalid comment is dropped without feedback; the reader lands back on
/// the post either way.
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "Post",
            id: post_id,
        })?;

    if FormErrors::check(&*form).is_empty() {
        let comment = Comment::new(post.id, identity.user_id, form.text.trim().to_string());
        let comment = state.comments.create(comment).await?;
        tracing::info!(comment_id = %comment.id, %post_id, "Comment added");
    } else {
        tracing::debug!(%post_id, user = %identity.username, "Dropping invalid comment");
    }

    Ok(redirect(post_url(post.id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = match load_for_mutation(&state, post_id, comment_id, &identity).await? {
        Ok(comment) => comment,
        Err(response) => return Ok(response),
    };

    let form = CommentForm {
        text: comment.text.clone(),
    };
    render_comment_page(&state, &identity, &comment, Some(&form), &FormErrors::new())
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = match load_for_mutation(&state, post_id, comment_id, &identity).await? {
        Ok(comment) => comment,
        Err(response) => return Ok(response),
    };

    let errors = FormErrors::check(&*form);
    if !errors.is_empty() {
        return render_comment_page(&state, &identity, &comment, Some(&*form), &errors);
    }

    comment.text = form.text.trim().to_string();
    state.comments.update(comment).await?;
    tracing::info!(%comment_id, %post_id, "Comment updated");

    Ok(redirect(post_url(post_id)))
}

/// GET /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = match load_for_mutation(&state, post_id, comment_id, &identity).await? {
        Ok(comment) => comment,
        Err(response) => return Ok(response),
    };

    render_comment_page(&state, &identity, &comment, None, &FormErrors::new())
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = match load_for_mutation(&state, post_id, comment_id, &identity).await? {
        Ok(comment) => comment,
        Err(response) => return Ok(response),
    };

    state.comments.delete(comment.id).await?;
    tracing::info!(%comment_id, %post_id, "Comment deleted");

    Ok(redirect(post_url(post_id)))
}

/// The comment must belong to the post in the path; only its author may
/// change it.
async fn load_for_mutation(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
    identity: &Identity,
) -> AppResult<Result<Comment, HttpResponse>> {
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or(DomainError::NotFound {
            entity_type: "Comment",
            id: comment_id,
        })?;

    match authorize_mutation(&comment, identity.user_id) {
        MutationAccess::Allowed => Ok(Ok(comment)),
        MutationAccess::RedirectToDetail => Ok(Err(redirect(post_url(post_id)))),
    }
}

/// `blog/comment.html` doubles as the delete confirmation when no form is
/// given.
fn render_comment_page(
    state: &AppState,
    identity: &Identity,
    comment: &Comment,
    form: Option<&CommentForm>,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = base_context(Some(identity));
    context.insert("comment", comment);
    context.insert("form", &form);
    context.insert("errors", errors);
    render(state, "blog/comment.html", &context)
}
