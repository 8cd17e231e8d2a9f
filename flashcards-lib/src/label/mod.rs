use actix_web::{web, Scope};

mod handlers;

pub fn label_service() -> Scope {
    web::scope("/labels")
        .service(handlers::get_labels)
        .service(handlers::create_label)
        .service(handlers::update_label)
        .service(handlers::delete_label)
}
