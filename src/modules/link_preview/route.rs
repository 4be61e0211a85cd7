use crate::modules::link_preview::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/link-preview").service(get_link_preview));
}
