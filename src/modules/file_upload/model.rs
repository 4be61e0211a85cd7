use uuid::Uuid;

use crate::ENV;
use crate::modules::file_upload::schema::MimeCategory;

#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub mime_category: MimeCategory,
    pub file_size: i64,
    pub storage_path: String,
    pub uploaded_by: Uuid,
}

/// One decoded part of a multipart upload, before it reaches storage.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub original_filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub upload_dir: String,
    pub base_url: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 25 * 1024 * 1024,
            upload_dir: ENV.upload_dir.clone(),
            base_url: ENV.upload_base_url.clone(),
        }
    }
}
