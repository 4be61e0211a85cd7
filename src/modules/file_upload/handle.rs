use actix_multipart::Multipart;
use actix_web::{HttpRequest, web};
use futures_util::TryStreamExt;
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::{error, success};
use crate::middlewares::get_claims;
use crate::modules::file_upload::{
    model::UploadPart,
    repository::FileRepository,
    schema::{FileEntity, FileUploadResponse},
    service::FileUploadService,
};

/// Drains a multipart payload into text fields and file parts. Shared
/// by the upload endpoint and the post/comment/message create paths.
pub async fn collect_multipart(
    mut payload: Multipart,
) -> Result<(HashMap<String, String>, Vec<UploadPart>), error::Error> {
    let mut fields = HashMap::new();
    let mut parts = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(|_| error::Error::InternalServer)?
    {
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| error::Error::bad_request("Missing content disposition"))?;

        let field_name = content_disposition.get_name().unwrap_or("").to_string();
        let filename = content_disposition.get_filename().map(|s| s.to_string());

        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .or_else(|| {
                filename
                    .as_deref()
                    .map(|f| mime_guess::from_path(f).first_or_octet_stream().to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|_| error::Error::InternalServer)? {
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(original_filename) => {
                parts.push(UploadPart { original_filename, mime_type, bytes });
            }
            None => {
                let value = String::from_utf8(bytes)
                    .map_err(|_| error::Error::bad_request("Form field is not valid UTF-8"))?;
                fields.insert(field_name, value);
            }
        }
    }

    Ok((fields, parts))
}

pub async fn upload_file<R>(
    payload: Multipart,
    req: HttpRequest,
    service: web::Data<FileUploadService<R>>,
) -> Result<success::Success<FileUploadResponse>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
{
    let user_id = get_claims(&req)?.sub;

    let (_, mut parts) = collect_multipart(payload).await?;
    let part = match parts.pop() {
        Some(p) if parts.is_empty() => p,
        Some(_) => return Err(error::Error::bad_request("Expected exactly one file")),
        None => return Err(error::Error::bad_request("No file found in request")),
    };

    let result = service.upload(part, user_id).await?;
    Ok(success::Success::created(Some(result)).message("File uploaded successfully"))
}

pub async fn get_file<R>(
    file_id: web::Path<Uuid>,
    service: web::Data<FileUploadService<R>>,
) -> Result<success::Success<FileEntity>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
{
    match service.get_file(&file_id.into_inner()).await? {
        Some(file) => Ok(success::Success::ok(Some(file))),
        None => Err(error::Error::not_found("File not found")),
    }
}

pub async fn delete_file<R>(
    file_id: web::Path<Uuid>,
    req: HttpRequest,
    service: web::Data<FileUploadService<R>>,
) -> Result<success::Success<()>, error::Error>
where
    R: FileRepository + Send + Sync + 'static,
{
    let user_id = get_claims(&req)?.sub;
    service.delete_file(&file_id.into_inner(), &user_id).await?;
    Ok(success::Success::no_content())
}
