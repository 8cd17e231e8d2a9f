use crate::auth::{password, token};
use crate::document::user_document;
use crate::error::{FieldErrors, HandlerError};
use crate::user::UserId;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use flashcards_repo::label_repo::LabelRepo;
use flashcards_repo::user_repo::UserRepo;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct NewPassword {
    pub password: String,
}

#[get("")]
pub async fn get_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let user = user_repo.get_user(user_id).await?;
    let labels = label_repo.get_labels(user_id).await?;
    Ok(HttpResponse::Ok().json(user_document(&user, &labels)))
}

#[delete("")]
pub async fn delete_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    user_repo.delete_user(user_id).await?;
    info!(user_id, "Deleted user");
    Ok(HttpResponse::NoContent().finish())
}

#[put("/password")]
pub async fn update_password(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
    new_password: web::Json<NewPassword>,
) -> Result<impl Responder, HandlerError> {
    let new_password = new_password.into_inner();

    let mut errors = FieldErrors::new();
    password::validate_password(&new_password.password, &mut errors);
    errors.into_result()?;

    let password_hash = password::encode_password(new_password.password)?;
    user_repo
        .update_password_hash(user_id.into_inner(), &password_hash)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/chrome_token")]
pub async fn regenerate_chrome_token(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let token =
        token::regenerate_chrome_token(user_repo.get_ref().as_ref(), user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "auth_token_for_chrome": token })))
}
