use crate::modules::message::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/messages")
            .service(search_messages)
            .service(create_message)
            .service(react_to_message)
            .service(delete_message)
            .service(soft_delete_message),
    );
}
