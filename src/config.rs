use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::llm::ollama;
use crate::pipeline::{ModeChoice, PipelineOptions};
use crate::search::SearchLang;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LlmProvider {
    /// Local model through the Ollama HTTP API
    Ollama,
    /// Google Gemini (needs GEMINI_API_KEY)
    Gemini,
}

/// Startup-funding search service.
///
/// Secrets are read from the environment only: SERPAPI_API_KEY for web
/// search, GEMINI_API_KEY and GEMINI_MODEL for the Gemini backend.
#[derive(Debug, Parser)]
#[command(name = "fundscout", version, about, long_about = None)]
pub struct Settings {
    /// Address to listen on
    #[arg(long, env = "FUNDSCOUT_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Mode used when a request does not pass `mode`
    #[arg(long, env = "FUNDSCOUT_MODE", value_enum, default_value_t = ModeChoice::Auto)]
    pub mode: ModeChoice,

    /// Text-generation backend
    #[arg(long, env = "FUNDSCOUT_LLM", value_enum, default_value_t = LlmProvider::Ollama)]
    pub llm: LlmProvider,

    #[arg(long, env = "OLLAMA_URL", default_value = ollama::DEFAULT_BASE_URL)]
    pub ollama_url: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = ollama::DEFAULT_MODEL)]
    pub ollama_model: String,

    /// Upper bound on a single text-generation call
    #[arg(long, env = "FUNDSCOUT_LLM_TIMEOUT_SECS", default_value_t = 120)]
    pub llm_timeout_secs: u64,

    /// Languages the broad mode searches in (comma-separated: en, hi, ta)
    #[arg(
        long,
        env = "FUNDSCOUT_SEARCH_LANGS",
        value_delimiter = ',',
        default_value = "en,hi,ta"
    )]
    pub search_langs: Vec<SearchLang>,

    /// Search country code
    #[arg(long, env = "FUNDSCOUT_COUNTRY", default_value = "in")]
    pub country: String,

    /// Organic results requested per (language, query) pair
    #[arg(
        long,
        env = "FUNDSCOUT_RESULTS_PER_QUERY",
        default_value_t = 3,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub results_per_query: u8,

    /// Cap on planned queries
    #[arg(long, env = "FUNDSCOUT_MAX_QUERIES", default_value_t = 15)]
    pub max_queries: usize,

    /// Links requested from the model in fast mode
    #[arg(long, env = "FUNDSCOUT_FAST_LINKS", default_value_t = 5)]
    pub fast_links: usize,

    /// Ask the model whether each hit is funding news before fetching it
    #[arg(long, env = "FUNDSCOUT_INTENT_FILTER")]
    pub intent_filter: bool,
}

impl Settings {
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let mut langs: Vec<SearchLang> = Vec::with_capacity(self.search_langs.len());
        for &lang in &self.search_langs {
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
        PipelineOptions {
            default_mode: self.mode,
            langs,
            country: self.country.trim().to_ascii_lowercase(),
            results_per_query: self.results_per_query,
            max_queries: self.max_queries.max(1),
            fast_links: self.fast_links.max(1),
            intent_filter: self.intent_filter,
        }
    }
}
