use crate::modules::post::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/posts")
            .service(get_feed)
            .service(get_user_posts)
            .service(create_post)
            .service(react_to_post)
            .service(remove_post_reaction)
            .service(delete_post),
    );
}
