use crate::modules::comment::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/comments")
            .service(get_comments)
            .service(create_comment)
            .service(react_to_comment_attachment)
            .service(react_to_comment)
            .service(delete_comment),
    );
}
