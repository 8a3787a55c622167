use dom_smoothie::{Config, Readability};
use tracing::{debug, warn};

pub(super) struct ExtractedArticle {
    pub title: Option<String>,
    pub published_time: Option<String>,
    pub content_html: String,
    /// Readability found nothing usable and the whole page was kept.
    pub used_raw_fallback: bool,
}

pub(super) fn extract_article(html: &str, url: Option<&str>) -> ExtractedArticle {
    let mut readability = match Readability::new(html, url, Some(Config::default())) {
        Ok(r) => r,
        Err(e) => {
            warn!(%e, "readability init failed, using raw page");
            return raw_page(html);
        }
    };

    let readable = readability.is_probably_readable();

    match readability.parse() {
        Ok(article) if readable => ExtractedArticle {
            title: Some(article.title.to_string()).filter(|t| !t.is_empty()),
            published_time: article.published_time.map(|t| t.to_string()),
            content_html: article.content.to_string(),
            used_raw_fallback: false,
        },
        Ok(article) => ExtractedArticle {
            title: Some(article.title.to_string())
                .filter(|t| !t.is_empty())
                .or_else(|| title_tag(html)),
            published_time: None,
            content_html: html.to_string(),
            used_raw_fallback: true,
        },
        Err(e) => {
            warn!(%e, "readability parse failed, using raw page");
            raw_page(html)
        }
    }
}

/// Markdown body, headed by title and publication date when known.
/// The date line gives the funding extractor something to anchor on.
pub(super) fn to_text(article: &ExtractedArticle) -> String {
    let body = html2md::rewrite_html(&article.content_html, false);
    debug!(
        chars = body.len(),
        raw = article.used_raw_fallback,
        "html converted"
    );

    let mut text = String::new();
    if let Some(title) = &article.title {
        text.push_str(&format!("# {title}\n"));
    }
    if let Some(date) = &article.published_time {
        text.push_str(&format!("Published: {date}\n"));
    }
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(body.trim());
    text
}

fn raw_page(html: &str) -> ExtractedArticle {
    ExtractedArticle {
        title: title_tag(html),
        published_time: None,
        content_html: html.to_string(),
        used_raw_fallback: true,
    }
}

/// `<title>` lookup by string search, for pages readability rejects.
fn title_tag(html: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let tag_start = lower.find("<title")?;
    let content_start = tag_start + lower[tag_start..].find('>')? + 1;
    let content_end = content_start + lower[content_start..].find("</title>")?;
    let title = html[content_start..content_end].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
