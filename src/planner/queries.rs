use tracing::{debug, warn};

use super::PlanError;
use crate::llm::{TextGenerator, json};

pub const DEFAULT_MAX_QUERIES: usize = 15;

fn planner_prompt(query: &str) -> String {
    format!(
        r#"
You are a multisource startup funding search planner.

Goal:
Generate diverse, high-quality search queries that maximize finding:
- startup funding eligibility
- government subsidies and grants
- accelerators, incubators
- official schemes and policies
- investment opportunities for the user's startup

RULES:
- Must prioritize results in India.
- Include relevant government domains: (.gov.in, tn.gov.in, msme, startupindia.gov.in)
- Include PDF search when Govt info expected.
- Include local language if needed.

Input Query:
"{query}"

Output: JSON list of top 10-15 search queries.
"#
    )
}

/// The single query searched when planning fails.
pub fn fallback_queries(query: &str) -> Vec<String> {
    vec![format!("{query} India funding")]
}

/// Expands `query` into at most `max` distinct search queries.
pub async fn build_queries(
    llm: &impl TextGenerator,
    query: &str,
    max: usize,
) -> Result<Vec<String>, PlanError> {
    let reply = llm.generate(&planner_prompt(query)).await?;

    let Some(list) = json::extract_string_list(&reply) else {
        let end = reply.floor_char_boundary(200);
        warn!(output = %&reply[..end], "planner output was not a JSON list");
        return Err(PlanError::Malformed);
    };

    let mut queries: Vec<String> = Vec::with_capacity(list.len());
    for q in list {
        if !queries.iter().any(|seen| seen.eq_ignore_ascii_case(&q)) {
            queries.push(q);
        }
    }
    queries.truncate(max);

    if queries.is_empty() {
        return Err(PlanError::Malformed);
    }
    debug!(count = queries.len(), "queries planned");
    Ok(queries)
}
