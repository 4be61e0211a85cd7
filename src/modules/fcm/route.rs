use crate::modules::fcm::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/fcm").service(register_token).service(list_tokens).service(delete_token));
}
