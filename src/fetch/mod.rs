//! Source retrieval: URL guard, download, and text extraction for HTML and PDF.

mod extractor;
mod guard;
mod pdf;

use std::future::Future;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

pub use guard::{DnsResolver, TokioDnsResolver};

const MAX_RESPONSE_BYTES: usize = 10_000_000;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: must be HTTP(S)")]
    InvalidScheme,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("blocked: internal/private host not allowed")]
    InternalHost,

    #[error("fetch failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("fetch timed out")]
    Timeout,

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    #[error("fetch failed: status {0}")]
    Status(u16),

    #[error("response too large (>{} bytes)", MAX_RESPONSE_BYTES)]
    TooLarge,

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("no text content")]
    EmptyDocument,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(e)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Pdf,
}

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL after redirects.
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub kind: DocumentKind,
}

/// URL in, plain text out.
pub trait DocumentSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedDocument, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher<R = TokioDnsResolver> {
    http: Client,
    resolver: R,
    allow_private: bool,
}

impl HttpFetcher {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            resolver: TokioDnsResolver,
            allow_private: false,
        }
    }
}

impl<R> HttpFetcher<R> {
    #[cfg(test)]
    pub(crate) fn allowing_private(http: Client, resolver: R) -> Self {
        Self {
            http,
            resolver,
            allow_private: true,
        }
    }
}

impl<R: DnsResolver + Sync> DocumentSource for HttpFetcher<R> {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        guard::check_url(url, &self.resolver, self.allow_private).await?;
        let download = download(&self.http, url).await?;
        // Redirects may land somewhere the original URL did not point.
        guard::check_url(&download.final_url, &self.resolver, self.allow_private).await?;

        let document = if is_pdf(url, &download) {
            let text = pdf::extract_text(&download.body).await?;
            FetchedDocument {
                url: download.final_url,
                title: None,
                text,
                kind: DocumentKind::Pdf,
            }
        } else {
            let html = String::from_utf8_lossy(&download.body);
            let article = extractor::extract_article(&html, Some(&download.final_url));
            let text = extractor::to_text(&article);
            FetchedDocument {
                url: download.final_url,
                title: article.title,
                text,
                kind: DocumentKind::Html,
            }
        };

        if document.text.trim().is_empty() {
            return Err(FetchError::EmptyDocument);
        }

        debug!(
            url = %guard::redact(&document.url),
            kind = ?document.kind,
            chars = document.text.len(),
            "document fetched"
        );
        Ok(document)
    }
}

struct Download {
    final_url: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

async fn download(client: &Client, url: &str) -> Result<Download, FetchError> {
    let mut response = client
        .get(url)
        .header("User-Agent", crate::USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase());

    if let Some(len) = response.content_length()
        && len as usize > MAX_RESPONSE_BYTES
    {
        return Err(FetchError::TooLarge);
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::TooLarge);
        }
    }

    Ok(Download {
        final_url,
        content_type,
        body,
    })
}

fn is_pdf(requested: &str, download: &Download) -> bool {
    let pdf_path = |raw: &str| {
        url::Url::parse(raw)
            .map(|u| u.path().to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false)
    };
    download
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/pdf"))
        || pdf_path(requested)
        || pdf_path(&download.final_url)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{DocumentKind, DocumentSource, FetchError, FetchedDocument};

    /// Serves text from a URL table; unknown URLs fail with status 404.
    #[derive(Default)]
    pub(crate) struct MapSource {
        pages: HashMap<String, String>,
        /// Requested URL to the URL it lands on.
        redirects: HashMap<String, String>,
        pub(crate) fetched: Mutex<Vec<String>>,
    }

    impl MapSource {
        pub(crate) fn with(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, text)| (url.to_string(), text.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        pub(crate) fn redirecting(mut self, from: &str, to: &str) -> Self {
            self.redirects.insert(from.to_string(), to.to_string());
            self
        }

        pub(crate) fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    impl DocumentSource for MapSource {
        async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            let text = self.pages.get(url).ok_or(FetchError::Status(404))?;
            let landed = self.redirects.get(url).map_or(url, String::as_str);
            Ok(FetchedDocument {
                url: landed.to_string(),
                title: Some(format!("Title of {url}")),
                text: text.clone(),
                kind: DocumentKind::Html,
            })
        }
    }
}
