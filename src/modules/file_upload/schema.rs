use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Coarse media category derived from the content-type prefix.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "mime_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MimeCategory {
    Image,
    Video,
    Audio,
    Raw,
}

impl MimeCategory {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            MimeCategory::Image
        } else if mime_type.starts_with("video/") {
            MimeCategory::Video
        } else if mime_type.starts_with("audio/") {
            MimeCategory::Audio
        } else {
            MimeCategory::Raw
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub mime_category: MimeCategory,
    pub file_size: i64,
    pub storage_path: String,
    pub uploaded_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub mime_category: MimeCategory,
    pub file_size: i64,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_prefix() {
        assert_eq!(MimeCategory::from_mime("image/png"), MimeCategory::Image);
        assert_eq!(MimeCategory::from_mime("video/mp4"), MimeCategory::Video);
        assert_eq!(MimeCategory::from_mime("audio/ogg"), MimeCategory::Audio);
    }

    #[test]
    fn unknown_prefix_is_raw() {
        assert_eq!(MimeCategory::from_mime("application/pdf"), MimeCategory::Raw);
        assert_eq!(MimeCategory::from_mime("text/plain"), MimeCategory::Raw);
        assert_eq!(MimeCategory::from_mime("imagefake"), MimeCategory::Raw);
    }
}
