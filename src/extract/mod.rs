//! Structured funding facts from fetched text, via the text generator.

pub mod amount;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::llm::{LlmError, TextGenerator, json};

pub use amount::parse_amount;

/// Characters of source text sent to the model.
pub const MAX_TEXT_CHARS: usize = 4000;

/// Placeholders models emit instead of leaving a field null.
const PLACEHOLDERS: [&str; 6] = ["null", "none", "n/a", "na", "unknown", "not mentioned"];

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("extraction model failed: {0}")]
    Llm(#[from] LlmError),

    #[error("extraction output had no JSON object")]
    Malformed,

    #[error("extraction found no funding fields")]
    Empty,
}

/// Funding facts claimed by one source. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedIntel {
    pub startup: Option<String>,
    pub amount: Option<String>,
    pub stage: Option<String>,
    pub investors: Vec<String>,
    pub date: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub evidence_url: String,
    pub confidence: f64,
}

impl ExtractedIntel {
    /// True when none of the seven extracted fields carries a value.
    pub fn is_empty(&self) -> bool {
        self.startup.is_none()
            && self.amount.is_none()
            && self.stage.is_none()
            && self.investors.is_empty()
            && self.date.is_none()
            && self.sector.is_none()
            && self.location.is_none()
    }

    /// Reads model JSON leniently: key aliases, numeric amounts, placeholder
    /// strings, and investors given as a string or a list of objects.
    pub fn from_json(map: &Map<String, Value>, evidence_url: &str) -> Self {
        let map: Map<String, Value> = map
            .iter()
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.clone()))
            .collect();
        let field = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k)).and_then(text_of);

        Self {
            startup: field(&["startup", "startup_name", "company", "company_name", "name"]),
            amount: field(&["amount", "funding_amount", "amount_raised"]),
            stage: field(&["stage", "funding_stage", "round"]),
            investors: ["investors", "investor", "lead_investors"]
                .iter()
                .find_map(|k| map.get(*k))
                .map(investors_of)
                .unwrap_or_default(),
            date: field(&["date", "announced_date", "funding_date"]),
            sector: field(&["sector", "industry"]),
            location: field(&["location", "city", "hq", "country"]),
            evidence_url: evidence_url.to_string(),
            confidence: map.get("confidence").map(confidence_of).unwrap_or(0.0),
        }
    }
}

pub fn extraction_prompt(text: &str) -> String {
    let end = text
        .char_indices()
        .nth(MAX_TEXT_CHARS)
        .map_or(text.len(), |(i, _)| i);
    format!(
        r#"
Extract structured startup funding data from this text.
Return ONLY valid JSON. Do not add explanation.

Fields:
startup, amount, stage, investors, date, sector, location

TEXT:
{}
"#,
        &text[..end]
    )
}

/// Asks the model for funding fields in `text`.
///
/// Fails with [`ExtractError::Malformed`] when no JSON object can be
/// recovered and [`ExtractError::Empty`] when the object has no values.
pub async fn extract_funding_intel(
    llm: &impl TextGenerator,
    text: &str,
    evidence_url: &str,
) -> Result<ExtractedIntel, ExtractError> {
    let output = llm.generate(&extraction_prompt(text)).await?;

    let Some(map) = json::extract_object(&output) else {
        let end = output.floor_char_boundary(200);
        warn!(url = %evidence_url, output = %&output[..end], "extraction output had no JSON object");
        return Err(ExtractError::Malformed);
    };

    let intel = ExtractedIntel::from_json(&map, evidence_url);
    if intel.is_empty() {
        debug!(url = %evidence_url, "extraction returned only empty fields");
        return Err(ExtractError::Empty);
    }

    debug!(
        url = %evidence_url,
        startup = intel.startup.as_deref().unwrap_or("-"),
        amount = intel.amount.as_deref().unwrap_or("-"),
        "funding intel extracted"
    );
    Ok(intel)
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text_of).collect();
            if parts.is_empty() { None } else { Some(parts.join(", ")) }
        }
        _ => None,
    }
}

fn clean(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn investors_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split(',').filter_map(clean).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => obj.get("name").and_then(text_of),
                other => text_of(other),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn confidence_of(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|c| c.is_finite()).map_or(0.0, |c| c.max(0.0))
}
