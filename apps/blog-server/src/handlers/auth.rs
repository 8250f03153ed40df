//! Registration, login and logout.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use blog_core::domain::User;
use blog_core::error::RepoError;
use blog_shared::{FormErrors, LoginForm, RegistrationForm};

use super::profile::USERNAME_TAKEN;
use super::render::{INDEX_URL, base_context, render};
use crate::middleware::auth::{OptionalIdentity, removal_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: &str) -> &str {
    let is_local =
        next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    if is_local { next } else { INDEX_URL }
}

/// Redirect carrying a fresh session cookie for `user`.
fn sign_in(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(session_cookie(token, state.tokens.expiration_seconds()))
        .finish())
}

/// GET /auth/registration/
pub async fn registration_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    render_registration(&state, &identity, &RegistrationForm::default(), &FormErrors::new())
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let mut errors = FormErrors::check(&form);
    let username = form.username.trim().to_string();

    if errors.get("username").is_none() && state.users.find_by_username(&username).await?.is_some()
    {
        errors.add("username", USERNAME_TAKEN);
    }

    if !errors.is_empty() {
        return render_registration(&state, &identity, &form, &errors);
    }

    let password_hash = state.passwords.hash(&form.password1)?;
    let user = User::new(username, form.email.trim().to_string(), password_hash);

    let user = match state.users.create(user).await {
        Ok(user) => user,
        Err(RepoError::Constraint(_)) => {
            errors.add("username", USERNAME_TAKEN);
            return render_registration(&state, &identity, &form, &errors);
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    sign_in(&state, &user, INDEX_URL)
}

/// GET /auth/login/
pub async fn login_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    let form = LoginForm {
        next: query.into_inner().next.unwrap_or_default(),
        ..LoginForm::default()
    };
    render_login(&state, &identity, &form, &FormErrors::new())
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let mut errors = FormErrors::check(&form);
    if !errors.is_empty() {
        return render_login(&state, &identity, &form, &errors);
    }

    let user = state.users.find_by_username(form.username.trim()).await?;
    let verified = match &user {
        Some(user) => state
            .passwords
            .verify(&form.password, &user.password_hash)
            .unwrap_or_else(|err| {
                tracing::warn!(user_id = %user.id, error = %err, "Stored password hash is unreadable");
                false
            }),
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::info!(username = %form.username, "Failed login attempt");
        errors.add_non_field(INVALID_LOGIN);
        return render_login(&state, &identity, &form, &errors);
    };

    tracing::info!(user_id = %user.id, "User logged in");
    sign_in(&state, &user, safe_next(&form.next))
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, INDEX_URL))
        .cookie(removal_cookie())
        .finish()
}

fn render_registration(
    state: &AppState,
    identity: &OptionalIdentity,
    form: &RegistrationForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = base_context(identity.0.as_ref());
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "registration/registration_form.html", &context)
}

fn render_login(
    state: &AppState,
    identity: &OptionalIdentity,
    form: &LoginForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let mut context = base_context(identity.0.as_ref());
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "registration/login.html", &context)
}
