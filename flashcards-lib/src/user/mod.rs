use actix_web::{web, Scope};

mod handlers;

pub use flashcards_repo::user_repo::UserId;

pub fn user_service() -> Scope {
    web::scope("/user")
        .service(handlers::get_user)
        .service(handlers::delete_user)
        .service(handlers::update_password)
        .service(handlers::regenerate_chrome_token)
}
