//! Page metadata lookup behind `GET /api/link-info`.

use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::types::deeplink::LinkInfo;
use crate::types::errors::TransferError;

fn meta_content(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(
        r#"meta[property="{0}"], meta[name="{0}"]"#,
        property
    ))
    .ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// Pulls title, description and preview image out of an HTML page.
///
/// Open Graph values win over `<title>` / `description`; a relative
/// `og:image` is resolved against `url`.
pub fn extract_link_info(url: &str, html: &str) -> LinkInfo {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "og:title").or_else(|| page_title(&document));
    let description =
        meta_content(&document, "og:description").or_else(|| meta_content(&document, "description"));
    let image = meta_content(&document, "og:image").map(|raw| {
        Url::parse(url)
            .and_then(|base| base.join(&raw))
            .map(|u| u.to_string())
            .unwrap_or(raw)
    });

    LinkInfo {
        url: url.to_string(),
        title,
        description,
        image,
    }
}

#[derive(Debug, Clone)]
pub struct LinkInfoClient {
    http: reqwest::Client,
}

impl LinkInfoClient {
    pub fn new(timeout: Duration) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linkvault/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransferError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http })
    }

    pub async fn fetch(&self, url: &str) -> Result<LinkInfo, TransferError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;
        Ok(extract_link_info(&final_url, &body))
    }
}
