//! Text-generation backends behind a single prompt-in, text-out capability.

pub mod gemini;
pub mod json;
pub mod ollama;
mod types;

use std::future::Future;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey")]
    ApiKeyNotSet,

    #[error("LLM rate limit exceeded")]
    RateLimited,

    #[error("LLM quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("LLM API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(e)
        }
    }
}

/// Prompt in, raw model text out.
/// Callers parse structure out of the text with [`json`].
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// The backend chosen at startup.
#[derive(Debug, Clone)]
pub enum Generator {
    Ollama(OllamaClient),
    Gemini(GeminiClient),
}

impl Generator {
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Ollama(_) => "ollama",
            Generator::Gemini(_) => "gemini",
        }
    }
}

impl TextGenerator for Generator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match self {
            Generator::Ollama(client) => client.generate(prompt).await,
            Generator::Gemini(client) => client.generate(prompt).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{LlmError, TextGenerator};

    /// Replays canned replies in order and records every prompt it sees.
    pub(crate) struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse))
        }
    }
}
