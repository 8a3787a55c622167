//! Query translation through Google Translate's public `gtx` endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const API_BASE: &str = "https://translate.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation failed: status {0}")]
    Status(u16),

    #[error("unexpected translation response shape")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    /// Language code the service detected for the input.
    pub source_lang: Option<String>,
}

pub trait Translator {
    fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> impl Future<Output = Result<Translation, TranslateError>> + Send;
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    http: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<Translation, TranslateError> {
        if text.trim().is_empty() {
            return Ok(Translation {
                text: text.to_string(),
                source_lang: None,
            });
        }

        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let translation = parse_gtx_response(&body)?;
        debug!(
            target_lang,
            source_lang = translation.source_lang.as_deref().unwrap_or("?"),
            "translation complete"
        );
        Ok(translation)
    }
}

/// The gtx body is positional: `[[["out", "in", ...], ...], null, "detected", ...]`.
fn parse_gtx_response(body: &Value) -> Result<Translation, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or(TranslateError::Malformed)?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        return Err(TranslateError::Malformed);
    }

    let source_lang = body.get(2).and_then(Value::as_str).map(str::to_string);
    Ok(Translation { text, source_lang })
}
