//! Page fetching.
//!
//! `HttpFetcher` downloads a URL with reqwest, enforces a size limit and
//! reduces HTML to plain text.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::core::errors::{RagError, Result};
use crate::rag::html::html_to_text;
use crate::rag::types::Document;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL and return its text content.
    async fn fetch(&self, url: &str) -> Result<Document>;
}

/// Configuration for web requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for web requests in seconds
    pub timeout_secs: u64,
    /// Largest response body accepted, in bytes
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_bytes: 10_000_000,
            user_agent: concat!("webrag/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Html,
    PlainText,
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(RagError::invalid_config)?;
        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    async fn read_body(&self, url: &str, response: reqwest::Response) -> Result<Vec<u8>> {
        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(RagError::fetch(
                    url,
                    format!("body of {} bytes exceeds limit of {}", length, self.max_bytes),
                ));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| RagError::fetch(url, e))?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(RagError::fetch(
                    url,
                    format!("body exceeds limit of {} bytes", self.max_bytes),
                ));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Document> {
        let parsed = Url::parse(url).map_err(|e| RagError::fetch(url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RagError::fetch(
                url,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        tracing::debug!("Fetching {}", url);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| RagError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::fetch(url, format!("status {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let kind = classify_content_type(content_type.as_deref()).ok_or_else(|| {
            RagError::fetch(
                url,
                format!(
                    "unsupported content type '{}'",
                    content_type.as_deref().unwrap_or_default()
                ),
            )
        })?;

        let body = self.read_body(url, response).await?;
        let text = String::from_utf8_lossy(&body);
        let raw_text = match kind {
            ContentKind::Html => html_to_text(&text),
            ContentKind::PlainText => text.into_owned(),
        };

        tracing::info!(
            "Fetched {} ({} bytes, {} chars of text)",
            url,
            body.len(),
            raw_text.chars().count()
        );
        Ok(Document {
            source_url: url.to_string(),
            raw_text,
        })
    }
}

/// Missing content types are treated as HTML.
fn classify_content_type(content_type: Option<&str>) -> Option<ContentKind> {
    let Some(value) = content_type else {
        return Some(ContentKind::Html);
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "text/html" | "application/xhtml+xml" => Some(ContentKind::Html),
        "" => Some(ContentKind::Html),
        m if m.starts_with("text/") => Some(ContentKind::PlainText),
        _ => None,
    }
}
