//! Editing the signed-in user's own profile.

use actix_web::{HttpResponse, web};

use blog_core::domain::{ProfileChanges, User};
use blog_core::error::{DomainError, RepoError};
use blog_shared::{FormErrors, ProfileForm};

use super::render::{base_context, profile_url, render};
use crate::middleware::auth::{Identity, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(super) const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// GET /profile/edit/
pub async fn edit_form(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;

    let form = ProfileForm {
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
    };
    render_profile_form(&state, &identity, &form, &FormErrors::new())
}

/// POST /profile/edit/
///
/// A rename invalidates the session token, so a fresh one is issued.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let mut user = current_user(&state, &identity).await?;
    let form = form.into_inner();

    let mut errors = FormErrors::check(&form);
    let username = form.username.trim().to_string();

    if errors.get("username").is_none() {
        if let Some(other) = state.users.find_by_username(&username).await? {
            if other.id != user.id {
                errors.add("username", USERNAME_TAKEN);
            }
        }
    }

    if !errors.is_empty() {
        return render_profile_form(&state, &identity, &form, &errors);
    }

    user.apply(ProfileChanges {
        username,
        email: form.email.trim().to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
    });

    let user = match state.users.update(user).await {
        Ok(user) => user,
        Err(RepoError::Constraint(_)) => {
            errors.add("username", USERNAME_TAKEN);
            return render_profile_form(&state, &identity, &form, &errors);
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");

    let token = state.tokens.generate_token(user.id, &user.username)?;
    Ok(HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, profile_url(&user.username)))
        .cookie(session_cookie(token, state.tokens.expiration_seconds()))
        .finish())
}

async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "User",
            id: identity.user_id,
        })?;
    Ok(user)
}

fn render_profile_form(
    state: &AppState,
    identity: &Identity,
    form: &ProfileForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = base_context(Some(identity));
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "blog/user.html", &context)
}
