use actix_web::{web, Scope};

mod handlers;

pub fn card_service() -> Scope {
    web::scope("/cards")
        .service(handlers::preview_import)
        .service(handlers::import_cards)
        .service(handlers::get_cards)
        .service(handlers::get_card)
        .service(handlers::create_card)
        .service(handlers::update_card)
        .service(handlers::delete_card)
}
