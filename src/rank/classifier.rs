use tracing::debug;

use crate::llm::{LlmError, TextGenerator};

fn intent_prompt(title: &str, snippet: &str) -> String {
    format!(
        r#"
Classify whether this text implies startup FUNDING news.

Return ONLY one of these JSON values:
{{"intent": "funding"}} or {{"intent": "other"}}

TEXT:
{title}. {snippet}
"#
    )
}

/// Whether a hit's title and snippet read like funding news.
///
/// Any reply mentioning "funding" counts as positive, so a model that
/// ignores the JSON format still classifies.
pub async fn classify_funding_intent(
    llm: &impl TextGenerator,
    title: &str,
    snippet: &str,
) -> Result<bool, LlmError> {
    let reply = llm.generate(&intent_prompt(title, snippet)).await?;
    let funding = reply.to_lowercase().contains("funding");
    debug!(title, funding, "intent classified");
    Ok(funding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;

    #[tokio::test]
    async fn json_reply() {
        let llm = ScriptedGenerator::replying(&[r#"{"intent": "funding"}"#, r#"{"intent": "other"}"#]);
        assert!(classify_funding_intent(&llm, "Zepto raises $200M", "Series F").await.unwrap());
        assert!(!classify_funding_intent(&llm, "Cricket scores", "India won").await.unwrap());
        assert!(llm.prompts()[0].contains("Zepto raises $200M. Series F"));
    }

    #[tokio::test]
    async fn prose_reply_still_counts() {
        let llm = ScriptedGenerator::replying(&["This is FUNDING news."]);
        assert!(classify_funding_intent(&llm, "t", "s").await.unwrap());
    }

    #[tokio::test]
    async fn failure_is_reported() {
        let llm = ScriptedGenerator::new(vec![Err(LlmError::RateLimited)]);
        let result = classify_funding_intent(&llm, "t", "s").await;
        assert!(matches!(result, Err(LlmError::RateLimited)));
    }
}
