use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::user::*,
    routes::{documents::AppState, render_page},
};
use askama::Template;
use axum::{extract::State, http::StatusCode, response::Response, Form};

#[derive(Template)]
#[template(path = "signin.html")]
pub struct SignInTemplate {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub form_username: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignUpTemplate {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub form_username: String,
    pub error: Option<String>,
}

pub async fn signin_form(ctx: SessionContext) -> Result<Response, AppError> {
    render_signin(ctx, StatusCode::OK, String::new(), None)
}

pub async fn signin(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let username = form.username().to_string();

    if !state.credentials.verify(&username, &form.password).await? {
        tracing::warn!("Failed sign-in attempt for {:?}", username);
        return render_signin(
            ctx,
            StatusCode::UNPROCESSABLE_ENTITY,
            username,
            Some(AppError::InvalidCredentials.to_string()),
        );
    }

    tracing::info!("{} signed in", username);
    let session = ctx.session.clone().sign_in(username).with_flash("Welcome!");
    ctx.redirect(&session, "/")
}

pub async fn signup_form(ctx: SessionContext) -> Result<Response, AppError> {
    render_signup(ctx, StatusCode::OK, String::new(), None)
}

pub async fn signup(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let username = form.username().to_string();

    match state.credentials.register(&username, &form.password).await {
        Ok(()) => {
            let session = ctx
                .session
                .clone()
                .sign_in(username.clone())
                .with_flash(format!("Welcome, {}! Your account has been created.", username));
            ctx.redirect(&session, "/")
        }
        Err(AppError::Validation(message)) | Err(AppError::AlreadyExists(message)) => {
            render_signup(ctx, StatusCode::UNPROCESSABLE_ENTITY, username, Some(message))
        }
        Err(e) => Err(e),
    }
}

pub async fn signout(ctx: SessionContext) -> Result<Response, AppError> {
    if let Some(user) = ctx.session.username.as_deref() {
        tracing::info!("{} signed out", user);
    }
    let session = ctx
        .session
        .clone()
        .sign_out()
        .with_flash("You have been signed out.");
    ctx.redirect(&session, "/")
}

fn render_signin(
    ctx: SessionContext,
    status: StatusCode,
    form_username: String,
    error: Option<String>,
) -> Result<Response, AppError> {
    render_page(ctx, status, |page| {
        SignInTemplate {
            flash: page.flash,
            username: page.username,
            form_username,
            error,
        }
        .render()
    })
}

fn render_signup(
    ctx: SessionContext,
    status: StatusCode,
    form_username: String,
    error: Option<String>,
) -> Result<Response, AppError> {
    render_page(ctx, status, |page| {
        SignUpTemplate {
            flash: page.flash,
            username: page.username,
            form_username,
            error,
        }
        .render()
    })
}
