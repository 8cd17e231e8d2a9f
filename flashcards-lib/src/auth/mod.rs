use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage, Scope};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::extractors::{bearer, AuthenticationError};
use actix_web_httpauth::headers::www_authenticate::bearer::Bearer;
use flashcards_repo::user_repo::UserRepo;
use std::sync::Arc;
use tracing::error;
use tracing_actix_web::RootSpan;

pub mod handlers;
pub mod password;
pub mod token;

pub fn auth_service(signups_enabled: bool) -> Scope {
    let scope = web::scope("/auth").service(handlers::get_token);
    if signups_enabled {
        scope.service(handlers::signup)
    } else {
        scope
    }
}

/// Resolves the bearer token to its owner, accepting either the web or the chrome token. If
/// found, injects the user id into the request and into the [RootSpan].
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(user_repo) = req.app_data::<web::Data<Arc<dyn UserRepo>>>().cloned() else {
        error!("User repo is not registered");
        let e = HandlerError::Internal(anyhow::anyhow!("User repo is not registered"));
        return Err((e.into(), req));
    };

    match user_repo.find_user_by_token(credentials.token()).await {
        Ok(Some(user)) => {
            if let Some(root_span) = req.extensions().get::<RootSpan>() {
                root_span.record("user_id", &user.id);
            }
            req.extensions_mut().insert::<UserId>(user.id);
            Ok(req)
        }
        Ok(None) => {
            let challenge = Bearer::build().error(bearer::Error::InvalidToken).finish();
            Err((AuthenticationError::new(challenge).into(), req))
        }
        Err(e) => Err((HandlerError::from(e).into(), req)),
    }
}
