use futures_util::future::try_join_all;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::file_upload::{
    model::{NewFile, UploadConfig, UploadPart},
    repository::FileRepository,
    schema::{FileEntity, FileUploadResponse, MimeCategory},
};

#[derive(Clone)]
pub struct FileUploadService<R>
where
    R: FileRepository + Send + Sync,
{
    file_repo: Arc<R>,
    config: UploadConfig,
}

impl<R> FileUploadService<R>
where
    R: FileRepository + Send + Sync,
{
    pub fn new(file_repo: Arc<R>, config: UploadConfig) -> Self {
        Self { file_repo, config }
    }

    pub fn with_defaults(file_repo: Arc<R>) -> Self {
        Self::new(file_repo, UploadConfig::default())
    }

    fn validate_part(&self, part: &UploadPart) -> Result<(), error::SystemError> {
        if part.bytes.is_empty() {
            return Err(error::SystemError::bad_request("Uploaded file is empty"));
        }
        if part.bytes.len() > self.config.max_file_size {
            return Err(error::SystemError::bad_request(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.config.max_file_size
            )));
        }
        Ok(())
    }

    fn generate_filename(&self, original_filename: &str) -> String {
        let extension =
            Path::new(original_filename).extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let uuid = Uuid::now_v7();
        if extension.is_empty() {
            uuid.to_string()
        } else {
            format!("{}.{}", uuid, extension)
        }
    }

    async fn save_to_disk(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, error::SystemError> {
        tokio::fs::create_dir_all(&self.config.upload_dir).await?;

        let file_path = format!("{}/{}", self.config.upload_dir, filename);
        tokio::fs::write(&file_path, bytes).await?;

        Ok(file_path)
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", self.config.base_url, filename)
    }

    pub async fn upload(
        &self,
        part: UploadPart,
        uploaded_by: Uuid,
    ) -> Result<FileUploadResponse, error::SystemError> {
        self.validate_part(&part)?;

        let filename = self.generate_filename(&part.original_filename);
        let storage_path = self.save_to_disk(&filename, &part.bytes).await?;

        let new_file = NewFile {
            filename: filename.clone(),
            original_filename: part.original_filename,
            mime_category: MimeCategory::from_mime(&part.mime_type),
            mime_type: part.mime_type,
            file_size: part.bytes.len() as i64,
            storage_path,
            uploaded_by,
        };

        let mut tx = self.file_repo.get_pool().begin().await?;
        let file_entity = self.file_repo.create(&new_file, &mut *tx).await?;
        tx.commit().await?;

        Ok(self.to_response(file_entity))
    }

    /// Fan-out upload: one concurrent task per file, joined before the
    /// caller persists the owning row. Any single failure fails the
    /// whole batch; a silently dropped attachment would be worse.
    pub async fn upload_many(
        &self,
        parts: Vec<UploadPart>,
        uploaded_by: Uuid,
    ) -> Result<Vec<FileUploadResponse>, error::SystemError> {
        for part in &parts {
            self.validate_part(part)?;
        }

        let uploads = parts.into_iter().map(|part| self.upload(part, uploaded_by));
        try_join_all(uploads).await
    }

    pub async fn get_file(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        self.file_repo.find_by_id(file_id).await
    }

    pub async fn delete_file(
        &self,
        file_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;

        if file.uploaded_by != *user_id {
            return Err(error::SystemError::forbidden(
                "You don't have permission to delete this file",
            ));
        }

        tokio::fs::remove_file(&file.storage_path).await.ok();

        let mut tx = self.file_repo.get_pool().begin().await?;
        self.file_repo.delete(file_id, &mut *tx).await?;
        tx.commit().await?;

        Ok(())
    }

    pub fn to_response(&self, entity: FileEntity) -> FileUploadResponse {
        let url = self.public_url(&entity.filename);
        FileUploadResponse {
            id: entity.id,
            filename: entity.filename,
            original_filename: entity.original_filename,
            mime_type: entity.mime_type,
            mime_category: entity.mime_category,
            file_size: entity.file_size,
            url,
            created_at: entity.created_at,
        }
    }
}
