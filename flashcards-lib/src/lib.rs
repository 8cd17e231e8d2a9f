pub mod auth;
pub mod card;
pub mod config;
pub mod document;
mod error;
mod health;
pub mod import;
pub mod label;
pub mod tracing;
pub mod user;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use actix_web_httpauth::middleware::HttpAuthentication;
use flashcards_repo::Repos;

pub use error::{FieldErrors, HandlerError};

/// Turns JSON body deserialization failures into a 400 response with a JSON body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        ::tracing::error!(req_path = req.path(), %err);
        match err {
            JsonPayloadError::Deserialize(deserialize_err) => {
                let error_body = serde_json::json!({
                    "error": "Unable to parse JSON payload",
                    "detail": format!("{}", deserialize_err),
                });
                actix_web::error::InternalError::from_response(
                    deserialize_err,
                    HttpResponse::BadRequest()
                        .content_type("application/json")
                        .body(error_body.to_string()),
                )
                .into()
            }
            _ => err.into(),
        }
    })
}

/// Turns query string deserialization failures into a 400 response with a JSON body.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        ::tracing::error!(req_path = req.path(), %err);
        match err {
            QueryPayloadError::Deserialize(deserialize_err) => {
                let error_body = serde_json::json!({
                    "error": "Unable to parse query string",
                    "detail": format!("{}", deserialize_err),
                });
                actix_web::error::InternalError::from_response(
                    deserialize_err,
                    HttpResponse::BadRequest()
                        .content_type("application/json")
                        .body(error_body.to_string()),
                )
                .into()
            }
            _ => err.into(),
        }
    })
}

/// Registers the repos and every service. The user, label and card services require a bearer
/// token; `/auth/signup` is only mounted if `signups_enabled` is set.
pub fn configure_app(cfg: &mut web::ServiceConfig, repos: &Repos, signups_enabled: bool) {
    let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);
    cfg.app_data(Data::new(repos.user_repo.clone()))
        .app_data(Data::new(repos.label_repo.clone()))
        .app_data(Data::new(repos.card_repo.clone()))
        .app_data(Data::new(repos.health_check.clone()))
        .app_data(json_config())
        .app_data(query_config())
        .service(health::health)
        .service(auth::auth_service(signups_enabled))
        .service(user::user_service().wrap(bearer_auth_middleware.clone()))
        .service(label::label_service().wrap(bearer_auth_middleware.clone()))
        .service(card::card_service().wrap(bearer_auth_middleware));
}
