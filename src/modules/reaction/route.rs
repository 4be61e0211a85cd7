use actix_web::web::{ServiceConfig, scope};

use crate::modules::reaction::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/reactions").service(update_reaction).service(delete_reaction));
}
