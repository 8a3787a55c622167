use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::PlanError;
use crate::llm::{TextGenerator, json};

pub const DEFAULT_MAX_LINKS: usize = 5;

fn selector_prompt(query: &str, max: usize) -> String {
    format!(
        r#"
Task: Return ONLY the top {max} most relevant URLs
containing verified funding related news for:

"{query}"

Rules:
- Prioritize: investment news, startup funding databases,
  official portals, investor announcements
- NO blogs, NO spam, NO PDFs, NO job listings
- Format output strictly as JSON array:
  ["url1", "url2", ...]
"#
    )
}

/// Asks the model for candidate funding URLs.
///
/// Entries may be strings or objects with a `url`/`link` field. Non-HTTP(S)
/// and unparseable URLs are dropped, duplicates removed, and at most `max`
/// are returned.
pub async fn select_funding_links(
    llm: &impl TextGenerator,
    query: &str,
    max: usize,
) -> Result<Vec<String>, PlanError> {
    let reply = llm.generate(&selector_prompt(query, max)).await?;
    let Some(items) = json::extract_array(&reply) else {
        let end = reply.floor_char_boundary(200);
        warn!(output = %&reply[..end], "link selector output was not a JSON array");
        return Err(PlanError::Malformed);
    };

    let mut links: Vec<String> = Vec::new();
    for item in &items {
        if links.len() >= max {
            break;
        }
        let raw = match item {
            Value::String(s) => s.as_str(),
            Value::Object(obj) => match obj.get("url").or_else(|| obj.get("link")) {
                Some(Value::String(s)) => s.as_str(),
                _ => continue,
            },
            _ => continue,
        };
        let Ok(url) = Url::parse(raw.trim()) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        let url = url.to_string();
        if !links.contains(&url) {
            links.push(url);
        }
    }

    debug!(proposed = items.len(), kept = links.len(), "funding links selected");
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::llm::testing::ScriptedGenerator;

    #[tokio::test]
    async fn filters_and_caps() {
        let llm = ScriptedGenerator::replying(&[r#"Here:
[
  "https://inc42.com/buzz/zepto-raises",
  {"url": "https://entrackr.com/zepto"},
  "ftp://files.example/list",
  "not a url",
  42,
  "https://inc42.com/buzz/zepto-raises",
  "https://yourstory.com/a",
  "https://economictimes.com/b",
  "https://vccircle.com/c",
  "https://techcrunch.com/d"
]"#]);
        let links = select_funding_links(&llm, "Zepto funding", DEFAULT_MAX_LINKS)
            .await
            .unwrap();
        assert_eq!(
            links,
            vec![
                "https://inc42.com/buzz/zepto-raises",
                "https://entrackr.com/zepto",
                "https://yourstory.com/a",
                "https://economictimes.com/b",
                "https://vccircle.com/c",
            ]
        );
        assert!(llm.prompts()[0].contains("\"Zepto funding\""));
    }

    #[tokio::test]
    async fn prompt_asks_for_configured_count() {
        let llm = ScriptedGenerator::replying(&[r#"["https://a.com/1", "https://a.com/2", "https://a.com/3"]"#]);
        let links = select_funding_links(&llm, "q", 2).await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(llm.prompts()[0].contains("top 2 most relevant"));
    }

    #[tokio::test]
    async fn no_array_is_malformed() {
        let llm = ScriptedGenerator::replying(&["I cannot browse the web."]);
        let result = select_funding_links(&llm, "q", 5).await;
        assert!(matches!(result, Err(PlanError::Malformed)));
    }

    #[tokio::test]
    async fn model_failure() {
        let llm = ScriptedGenerator::new(vec![Err(LlmError::EmptyResponse)]);
        let result = select_funding_links(&llm, "q", 5).await;
        assert!(matches!(result, Err(PlanError::Llm(LlmError::EmptyResponse))));
    }
}
