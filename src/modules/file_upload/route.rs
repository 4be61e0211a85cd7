use actix_web::web;

use crate::modules::file_upload::handle;
use crate::modules::file_upload::repository::FileRepository;

pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: FileRepository + Send + Sync + 'static,
{
    cfg.service(
        web::scope("/files")
            .service(web::resource("/upload").route(web::post().to(handle::upload_file::<R>)))
            .service(
                web::resource("/{file_id}")
                    .route(web::get().to(handle::get_file::<R>))
                    .route(web::delete().to(handle::delete_file::<R>)),
            ),
    );
}
