//! Model-driven query shaping: funding rewrite, query expansion, and the
//! fast-mode link selector.

pub mod links;
pub mod queries;
pub mod rewriter;

pub use links::select_funding_links;
pub use queries::{build_queries, fallback_queries};
pub use rewriter::rewrite_for_funding;

use crate::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("planner model failed: {0}")]
    Llm(#[from] LlmError),

    #[error("planner output had no usable list")]
    Malformed,
}
