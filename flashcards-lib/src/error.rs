use crate::import::ImportError;
use actix_multipart::MultipartError;
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use flashcards_repo::card_repo::CardRepoError;
use flashcards_repo::label_repo::LabelRepoError;
use flashcards_repo::user_repo::UserRepoError;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Validation messages keyed by the offending field.
#[derive(Serialize, Default, Debug, PartialEq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> FieldErrors {
        FieldErrors::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> HandlerError {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        HandlerError::Validation(errors)
    }
}

impl From<FieldErrors> for HandlerError {
    fn from(errors: FieldErrors) -> Self {
        HandlerError::Validation(errors)
    }
}

impl From<UserRepoError> for HandlerError {
    fn from(e: UserRepoError) -> Self {
        match e {
            UserRepoError::UserNotFound(_) | UserRepoError::EmailNotFound(_) => {
                HandlerError::NotFound("user")
            }
            UserRepoError::EmailTaken(_) => HandlerError::invalid("email", "has already been taken"),
            taken @ UserRepoError::TokenTaken(_) => HandlerError::Internal(taken.into()),
            UserRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<LabelRepoError> for HandlerError {
    fn from(e: LabelRepoError) -> Self {
        match e {
            LabelRepoError::LabelNotFound(_) => HandlerError::NotFound("label"),
            LabelRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<CardRepoError> for HandlerError {
    fn from(e: CardRepoError) -> Self {
        match e {
            CardRepoError::CardNotFound(_) => HandlerError::NotFound("card"),
            CardRepoError::LabelNotFound(_) => HandlerError::NotFound("label"),
            CardRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<argon2::Error> for HandlerError {
    fn from(e: argon2::Error) -> Self {
        HandlerError::Internal(anyhow::Error::new(e).context("Password hashing failed"))
    }
}

impl From<MultipartError> for HandlerError {
    fn from(e: MultipartError) -> Self {
        HandlerError::invalid("file", format!("could not be read: {}", e))
    }
}

impl From<ImportError> for HandlerError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::InvalidRows(errors) => HandlerError::Validation(errors),
            other => HandlerError::invalid("file", other.to_string()),
        }
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            HandlerError::NotFound(resource) => {
                let mut errors = FieldErrors::new();
                errors.add(*resource, "not found");
                HttpResponse::NotFound().json(serde_json::json!({ "errors": errors }))
            }
            HandlerError::Validation(errors) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({ "errors": errors }))
            }
            HandlerError::Internal(e) => {
                error!(error = ?e, "Request failed");
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}
