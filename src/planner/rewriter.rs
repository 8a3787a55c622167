use crate::llm::{LlmError, TextGenerator};

fn rewrite_prompt(query: &str) -> String {
    format!(
        r#"
Rewrite the query to find **funding SOURCES** available to startups,
not news about funding raised by other companies.

Focus on:
- government startup schemes
- grants
- subsidies
- incubators / accelerators
- VC programs accepting applications

Include terms: apply, scheme, funding support, grant, subsidy,
eligibility, registration, India, Tamil Nadu (if relevant).

Return only the rewritten query.

Input: "{query}"
Output:
"#
    )
}

/// Reframes `query` toward funding sources.
///
/// Only the first non-blank line of the reply is kept, without an echoed
/// `Output:` label or wrapping quotes. A reply with nothing left is
/// [`LlmError::EmptyResponse`].
pub async fn rewrite_for_funding(llm: &impl TextGenerator, query: &str) -> Result<String, LlmError> {
    let reply = llm.generate(&rewrite_prompt(query)).await?;
    let line = reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let line = line.strip_prefix("Output:").unwrap_or(line).trim();
    let rewritten = line.trim_matches(|c| c == '"' || c == '\'').trim();

    if rewritten.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(rewritten.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;

    #[tokio::test]
    async fn cleans_reply() {
        let llm = ScriptedGenerator::replying(&[
            "\nOutput: \"EV startup grant scheme apply Tamil Nadu\"\n\nThis targets schemes.",
        ]);
        let rewritten = rewrite_for_funding(&llm, "EV startup funding").await.unwrap();
        assert_eq!(rewritten, "EV startup grant scheme apply Tamil Nadu");
        assert!(llm.prompts()[0].contains(r#"Input: "EV startup funding""#));
    }

    #[tokio::test]
    async fn plain_reply_is_kept() {
        let llm = ScriptedGenerator::replying(&["biotech grants India eligibility"]);
        let rewritten = rewrite_for_funding(&llm, "biotech").await.unwrap();
        assert_eq!(rewritten, "biotech grants India eligibility");
    }

    #[tokio::test]
    async fn quotes_only_is_empty() {
        let llm = ScriptedGenerator::replying(&["\"\""]);
        let result = rewrite_for_funding(&llm, "q").await;
        assert!(matches!(result, Err(LlmError::EmptyResponse)));
    }
}
