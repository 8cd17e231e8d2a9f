use crate::document::{label_resource, Document, LabelAttributesPayload, Payload};
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use flashcards_repo::label_repo::{LabelId, LabelRepo, NewLabel};
use std::sync::Arc;

fn validated_name(name: String) -> Result<String, HandlerError> {
    let name = name.trim();
    if name.is_empty() {
        Err(HandlerError::invalid("name", "can't be blank"))
    } else {
        Ok(name.to_owned())
    }
}

#[get("")]
pub async fn get_labels(
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let labels = label_repo.get_labels(user_id.into_inner()).await?;
    let resources: Vec<_> = labels.iter().map(label_resource).collect();
    Ok(HttpResponse::Ok().json(Document::new(resources)))
}

#[post("")]
pub async fn create_label(
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
    payload: web::Json<Payload<LabelAttributesPayload>>,
) -> Result<impl Responder, HandlerError> {
    let attributes = payload.into_inner().data.attributes;
    let name = validated_name(attributes.name.unwrap_or_default())?;

    let label = label_repo
        .create_label(user_id.into_inner(), NewLabel::new(name))
        .await?;
    Ok(HttpResponse::Created().json(Document::new(label_resource(&label))))
}

#[patch("/{label_id}")]
pub async fn update_label(
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
    label_id: web::Path<LabelId>,
    payload: web::Json<Payload<LabelAttributesPayload>>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let label_id = label_id.into_inner();

    let label = match payload.into_inner().data.attributes.name {
        Some(name) => {
            let name = validated_name(name)?;
            label_repo
                .update_label(user_id, label_id, NewLabel::new(name))
                .await?
        }
        None => label_repo.get_label(user_id, label_id).await?,
    };
    Ok(HttpResponse::Ok().json(Document::new(label_resource(&label))))
}

#[delete("/{label_id}")]
pub async fn delete_label(
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
    label_id: web::Path<LabelId>,
) -> Result<impl Responder, HandlerError> {
    label_repo
        .delete_label(user_id.into_inner(), label_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
