use crate::document::{
    card_collection, card_document, CardAttributesPayload, Payload, ResourcePayload,
};
use crate::error::{FieldErrors, HandlerError};
use crate::import::{self, HeaderMode, ImportPayload, PreviewList, MAX_UPLOAD_BYTES};
use crate::user::UserId;
use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use flashcards_repo::card_repo::{CardId, CardRepo, NewCard};
use flashcards_repo::label_repo::{LabelId, LabelRepo};
use futures_util::TryStreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Deserialize)]
pub struct CardQuery {
    pub label_id: Option<String>,
}

impl CardQuery {
    /// An empty `label_id` means no filter.
    fn label_id(&self) -> Result<Option<LabelId>, HandlerError> {
        match self.label_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label_id) => label_id
                .parse()
                .map(Some)
                .map_err(|_| HandlerError::invalid("label_id", "must be an integer")),
        }
    }
}

/// Applies the attributes and the `labels` relationship present in `data` on top of `card`.
fn apply_payload(
    mut card: NewCard,
    data: ResourcePayload<CardAttributesPayload>,
) -> Result<NewCard, HandlerError> {
    let mut errors = FieldErrors::new();
    let attributes = data.attributes;

    if let Some(side_a) = attributes.side_a {
        card.side_a = side_a;
    }
    if let Some(side_b) = attributes.side_b {
        card.side_b = side_b;
    }
    if let Some(level) = attributes.proficiency_level {
        match level.to_i32().filter(|level| *level >= 0) {
            Some(level) => card.proficiency_level = level,
            None => errors.add("proficiency-level", "must be a non-negative integer"),
        }
    }
    if card.side_a.trim().is_empty() {
        errors.add("side-a", "can't be blank");
    }
    if card.side_b.trim().is_empty() {
        errors.add("side-b", "can't be blank");
    }
    if let Some(labels) = data.relationships.labels {
        match labels.ids() {
            Some(label_ids) => card.label_ids = label_ids,
            None => errors.add("labels", "must reference labels by id"),
        }
    }
    errors.into_result()?;

    Ok(NewCard::new(
        card.side_a,
        card.side_b,
        card.proficiency_level,
        card.label_ids,
    ))
}

#[get("")]
pub async fn get_cards(
    card_repo: web::Data<Arc<dyn CardRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<CardQuery>,
) -> Result<impl Responder, HandlerError> {
    let cards = card_repo
        .get_cards(user_id.into_inner(), query.label_id()?)
        .await?;
    Ok(HttpResponse::Ok().json(card_collection(&cards)))
}

#[get("/{card_id}")]
pub async fn get_card(
    card_repo: web::Data<Arc<dyn CardRepo>>,
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
    card_id: web::Path<CardId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let card = card_repo.get_card(user_id, card_id.into_inner()).await?;
    let labels = label_repo.get_labels(user_id).await?;
    Ok(HttpResponse::Ok().json(card_document(&card, &labels)))
}

#[post("")]
pub async fn create_card(
    card_repo: web::Data<Arc<dyn CardRepo>>,
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
    payload: web::Json<Payload<CardAttributesPayload>>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let blank = NewCard::new(String::new(), String::new(), 0, Vec::new());
    let new_card = apply_payload(blank, payload.into_inner().data)?;

    let card = card_repo.create_card(user_id, new_card).await?;
    let labels = label_repo.get_labels(user_id).await?;
    Ok(HttpResponse::Created().json(card_document(&card, &labels)))
}

#[patch("/{card_id}")]
pub async fn update_card(
    card_repo: web::Data<Arc<dyn CardRepo>>,
    label_repo: web::Data<Arc<dyn LabelRepo>>,
    user_id: web::ReqData<UserId>,
    card_id: web::Path<CardId>,
    payload: web::Json<Payload<CardAttributesPayload>>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let card_id = card_id.into_inner();

    let existing = card_repo.get_card(user_id, card_id).await?;
    let updated_card = apply_payload(existing.into(), payload.into_inner().data)?;

    let card = card_repo
        .update_card(user_id, card_id, updated_card)
        .await?;
    let labels = label_repo.get_labels(user_id).await?;
    Ok(HttpResponse::Ok().json(card_document(&card, &labels)))
}

#[delete("/{card_id}")]
pub async fn delete_card(
    card_repo: web::Data<Arc<dyn CardRepo>>,
    user_id: web::ReqData<UserId>,
    card_id: web::Path<CardId>,
) -> Result<impl Responder, HandlerError> {
    card_repo
        .delete_card(user_id.into_inner(), card_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Reads the uploaded CSV and returns the cards it would create.
#[post("/preview_import")]
pub async fn preview_import(mut payload: Multipart) -> Result<impl Responder, HandlerError> {
    let mut file = None;
    let mut header = HeaderMode::Detect;

    while let Some(mut field) = payload.try_next().await? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_owned();

        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if content.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(import::ImportError::TooLarge.into());
            }
            content.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => file = Some(content),
            "has_header" => {
                header = HeaderMode::from_flag(&String::from_utf8_lossy(&content))
                    .ok_or_else(|| HandlerError::invalid("has_header", "must be true or false"))?;
            }
            other => debug!(field = other, "Ignoring multipart field"),
        }
    }

    let Some(file) = file else {
        return Err(HandlerError::invalid("file", "can't be blank"));
    };
    let cards = import::parse_csv(&file, header)?;
    Ok(HttpResponse::Ok().json(PreviewList { cards }))
}

#[post("/import")]
pub async fn import_cards(
    card_repo: web::Data<Arc<dyn CardRepo>>,
    user_id: web::ReqData<UserId>,
    payload: web::Json<ImportPayload>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let new_cards = import::cards_from_import(payload.into_inner())?;

    let cards = card_repo.create_cards(user_id, new_cards).await?;
    info!(user_id, count = cards.len(), "Imported cards");
    Ok(HttpResponse::Created().json(card_collection(&cards)))
}
