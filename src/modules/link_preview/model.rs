use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LinkPreviewQuery {
    #[validate(length(min = 1, message = "url must not be blank"))]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPreviewResponse {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub site_name: Option<String>,
    pub success: bool,
}

impl LinkPreviewResponse {
    /// Fallback when the target could not be fetched or parsed. The
    /// endpoint degrades to this instead of failing the request.
    pub fn unavailable(url: String) -> Self {
        LinkPreviewResponse {
            url,
            title: None,
            description: None,
            image: None,
            site_name: None,
            success: false,
        }
    }
}
