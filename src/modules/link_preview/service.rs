use std::sync::Arc;
use std::time::Duration;

use crate::{
    ENV,
    api::error,
    configs::RedisCache,
    modules::link_preview::model::LinkPreviewResponse,
};

const CACHE_TTL_SECS: usize = 3600;

#[derive(Clone)]
pub struct LinkPreviewService {
    cache: Arc<RedisCache>,
    client: reqwest::Client,
}

impl LinkPreviewService {
    pub fn new(cache: Arc<RedisCache>) -> Result<Self, error::SystemError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(ENV.link_preview_timeout_ms))
            .build()?;

        Ok(LinkPreviewService { cache, client })
    }

    /// Cached OpenGraph preview for a URL. Fetch and parse failures
    /// degrade to an unavailable preview; only the URL itself can make
    /// this endpoint fail.
    pub async fn get_preview(
        &self,
        raw_url: &str,
    ) -> Result<LinkPreviewResponse, error::SystemError> {
        let url = validate_url(raw_url)
            .ok_or_else(|| error::SystemError::bad_request("Invalid preview URL"))?;

        let cache_key = format!("link_preview:{}", url);
        if let Some(cached) = self.cache.get::<LinkPreviewResponse>(&cache_key).await? {
            return Ok(cached);
        }

        let html = match self.fetch(url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Link preview fetch failed for {}: {:?}", url, e);
                return Ok(LinkPreviewResponse::unavailable(url.into()));
            }
        };

        let preview = build_preview(url.as_str(), &html);
        if preview.success {
            self.cache.set(&cache_key, &preview, CACHE_TTL_SECS).await?;
        }

        Ok(preview)
    }

    async fn fetch(&self, url: &str) -> Result<String, error::SystemError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Accepts absolute http(s) URLs with a named host. Bare IP targets
/// are refused.
pub fn validate_url(raw: &str) -> Option<reqwest::Url> {
    let url = reqwest::Url::parse(raw.trim()).ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.is_empty() || bare.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }

    Some(url)
}

fn build_preview(url: &str, html: &str) -> LinkPreviewResponse {
    let title = meta_content(html, "og:title").or_else(|| page_title(html));
    let description =
        meta_content(html, "og:description").or_else(|| named_meta_content(html, "description"));
    let image = meta_content(html, "og:image");
    let site_name = meta_content(html, "og:site_name");

    let success = title.is_some() || description.is_some() || image.is_some();
    LinkPreviewResponse {
        url: url.to_string(),
        title,
        description,
        image,
        site_name,
        success,
    }
}

/// Naive scan for `<meta property="..." content="...">`. Good enough
/// for OpenGraph tags; this is not an HTML parser.
fn meta_content(html: &str, property: &str) -> Option<String> {
    tag_attribute(html, &format!("property=\"{property}\""))
}

fn named_meta_content(html: &str, name: &str) -> Option<String> {
    tag_attribute(html, &format!("name=\"{name}\""))
}

fn tag_attribute(html: &str, marker: &str) -> Option<String> {
    let idx = html.find(marker)?;
    let tag_start = html[..idx].rfind('<')?;
    let tag_end = tag_start + html[tag_start..].find('>')?;
    let tag = &html[tag_start..tag_end];

    let content_idx = tag.find("content=\"")?;
    let rest = &tag[content_idx + "content=\"".len()..];
    let end = rest.find('"')?;

    let value = rest[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn page_title(html: &str) -> Option<String> {
    let start = html.find("<title>")? + "<title>".len();
    let end = start + html[start..].find("</title>")?;
    let title = html[start..end].trim();
    (!title.is_empty()).then(|| title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_domains() {
        assert!(validate_url("https://example.com/article").is_some());
        assert!(validate_url("http://example.com").is_some());
    }

    #[test]
    fn rejects_other_schemes_and_hostless_urls() {
        assert!(validate_url("ftp://example.com").is_none());
        assert!(validate_url("file:///etc/passwd").is_none());
        assert!(validate_url("not a url").is_none());
        assert!(validate_url("https://127.0.0.1/admin").is_none());
    }

    #[test]
    fn extracts_og_tags() {
        let html = r#"
            <html><head>
            <meta property="og:title" content="Hello World">
            <meta property="og:description" content="A greeting">
            <meta property="og:image" content="https://example.com/img.png">
            </head><body></body></html>
        "#;

        let preview = build_preview("https://example.com", html);
        assert!(preview.success);
        assert_eq!(preview.title.as_deref(), Some("Hello World"));
        assert_eq!(preview.description.as_deref(), Some("A greeting"));
        assert_eq!(preview.image.as_deref(), Some("https://example.com/img.png"));
    }

    #[test]
    fn falls_back_to_title_and_description_tags() {
        let html = r#"
            <html><head>
            <title>Plain Title</title>
            <meta name="description" content="Plain description">
            </head></html>
        "#;

        let preview = build_preview("https://example.com", html);
        assert!(preview.success);
        assert_eq!(preview.title.as_deref(), Some("Plain Title"));
        assert_eq!(preview.description.as_deref(), Some("Plain description"));
    }

    #[test]
    fn pages_without_metadata_are_unsuccessful() {
        let preview = build_preview("https://example.com", "<html><body>hi</body></html>");
        assert!(!preview.success);
        assert!(preview.title.is_none());
    }
}
