use crate::modules::chat::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/rooms").service(create_room).service(list_rooms).service(get_room));
}
