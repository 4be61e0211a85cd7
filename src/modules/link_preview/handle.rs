use actix_web::{get, web};

use crate::{
    api::{error, success},
    modules::link_preview::{
        model::{LinkPreviewQuery, LinkPreviewResponse},
        service::LinkPreviewService,
    },
    utils::ValidatedQuery,
};

#[get("")]
pub async fn get_link_preview(
    link_preview_service: web::Data<LinkPreviewService>,
    query: ValidatedQuery<LinkPreviewQuery>,
) -> Result<success::Success<LinkPreviewResponse>, error::Error> {
    let preview = link_preview_service.get_preview(&query.0.url).await?;
    Ok(success::Success::ok(Some(preview)).message("Link preview retrieved successfully"))
}
