use crate::auth::{password, token};
use crate::document::{user_document, Meta};
use crate::error::{FieldErrors, HandlerError};
use actix_web::{post, web, HttpResponse, Responder};
use flashcards_repo::user_repo::{UserRepo, UserRepoError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[post("/signup")]
pub async fn signup(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<UserCredentials>,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();
    let email = normalize_email(&credentials.email);

    let mut errors = FieldErrors::new();
    if !looks_like_email(&email) {
        errors.add("email", "is invalid");
    }
    password::validate_password(&credentials.password, &mut errors);
    errors.into_result()?;

    let password_hash = password::encode_password(credentials.password)?;
    let user = token::register_user(user_repo.get_ref().as_ref(), email, password_hash).await?;
    info!(user_id = user.id, "Registered user");

    let document = user_document(&user, &[]).with_meta(Meta {
        auth_token: user.auth_token_for_web.clone(),
    });
    Ok(HttpResponse::Created().json(document))
}

#[post("/get_token")]
pub async fn get_token(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<UserCredentials>,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();

    let user = match user_repo
        .get_user_by_email(&normalize_email(&credentials.email))
        .await
    {
        Ok(user) => user,
        Err(UserRepoError::EmailNotFound(_)) => return Ok(HttpResponse::Unauthorized().finish()),
        Err(e) => return Err(e.into()),
    };

    let matched = password::verify_password(credentials.password, &user.password_hash)?;
    if matched {
        Ok(HttpResponse::Ok().body(user.auth_token_for_web))
    } else {
        Ok(HttpResponse::Unauthorized().finish())
    }
}
