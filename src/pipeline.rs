//! The per-request funding search: translate, choose a mode, gather
//! candidates, rank.

use std::collections::HashSet;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extract::{ExtractError, ExtractedIntel, extract_funding_intel};
use crate::fetch::{DocumentSource, FetchError, FetchedDocument};
use crate::llm::TextGenerator;
use crate::planner::links::DEFAULT_MAX_LINKS;
use crate::planner::queries::DEFAULT_MAX_QUERIES;
use crate::planner::{build_queries, fallback_queries, rewrite_for_funding, select_funding_links};
use crate::rank::{Candidate, RankedResult, Ranking, RankingStrategy, classify_funding_intent};
use crate::search::multilang::FanOut;
use crate::search::{SearchLang, SearchResult, WebSearch, detect, is_english, multi_lang_search};
use crate::translate::Translator;

const SNIPPET_CHARS: usize = 200;

/// Requested mode. `Auto` picks fast for English queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModeChoice {
    #[default]
    Auto,
    Fast,
    Broad,
}

impl ModeChoice {
    pub fn resolve(self, translated: &str) -> Mode {
        match self {
            ModeChoice::Fast => Mode::Fast,
            ModeChoice::Broad => Mode::Broad,
            ModeChoice::Auto if is_english(translated) => Mode::Fast,
            ModeChoice::Auto => Mode::Broad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Model-proposed links, ordered by amount presence.
    #[serde(rename = "fast_llm_mode")]
    Fast,
    /// Multi-language search fan-out with weighted scoring.
    #[serde(rename = "global_web_mode")]
    Broad,
}

impl Mode {
    fn strategy(self) -> RankingStrategy {
        match self {
            Mode::Fast => RankingStrategy::AmountPresence,
            Mode::Broad => RankingStrategy::Weighted,
        }
    }

    fn explanation(self) -> &'static str {
        match self {
            Mode::Fast => "Ordered by presence of a funding amount",
            Mode::Broad => "Ranked by strength of funding evidence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSource {
    pub url: String,
    pub reason: String,
}

/// Ranked items under the key each mode has always used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RankedList {
    #[serde(rename = "top_funded_results")]
    TopFunded(Vec<RankedResult>),
    #[serde(rename = "results")]
    Selected(Vec<RankedResult>),
}

impl RankedList {
    pub fn items(&self) -> &[RankedResult] {
        match self {
            RankedList::TopFunded(items) | RankedList::Selected(items) => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub translated: String,
    pub mode: Mode,
    pub total_hits: usize,
    #[serde(flatten)]
    pub ranked: RankedList,
    pub explanation: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedSource>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub default_mode: ModeChoice,
    pub langs: Vec<SearchLang>,
    pub country: String,
    pub results_per_query: u8,
    pub max_queries: usize,
    pub fast_links: usize,
    /// Classify each hit's title and snippet before fetching it.
    pub intent_filter: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            default_mode: ModeChoice::Auto,
            langs: SearchLang::ALL.to_vec(),
            country: "in".to_string(),
            results_per_query: 3,
            max_queries: DEFAULT_MAX_QUERIES,
            fast_links: DEFAULT_MAX_LINKS,
            intent_filter: false,
        }
    }
}

/// What the HTTP layer needs from a pipeline.
pub trait FundingSearch: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
        mode: Option<ModeChoice>,
    ) -> impl Future<Output = SearchResponse> + Send;
}

#[derive(Debug, thiserror::Error)]
enum GatherError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

pub struct Pipeline<G, T, S, F> {
    llm: G,
    translator: T,
    search: S,
    fetcher: F,
    options: PipelineOptions,
}

impl<G, T, S, F> Pipeline<G, T, S, F>
where
    G: TextGenerator + Sync,
    T: Translator + Sync,
    S: WebSearch + Sync,
    F: DocumentSource + Sync,
{
    pub fn new(llm: G, translator: T, search: S, fetcher: F, options: PipelineOptions) -> Self {
        Self {
            llm,
            translator,
            search,
            fetcher,
            options,
        }
    }

    /// Runs one query end to end. Stage failures fall back or skip;
    /// the response always carries whatever survived.
    pub async fn run(&self, query: &str, mode: Option<ModeChoice>) -> SearchResponse {
        let translated = self.to_english(query).await;
        let mode = mode.unwrap_or(self.options.default_mode).resolve(&translated);
        info!(
            query,
            translated = %translated,
            detected = ?detect(&translated),
            ?mode,
            "funding search started"
        );

        let (candidates, skipped) = match mode {
            Mode::Fast => self.fast_candidates(&translated).await,
            Mode::Broad => self.broad_candidates(&translated).await,
        };
        let Ranking {
            total_hits,
            results,
        } = mode.strategy().rank(candidates);
        let ranked = match mode {
            Mode::Fast => RankedList::Selected(results),
            Mode::Broad => RankedList::TopFunded(results),
        };

        info!(
            ?mode,
            total_hits,
            returned = ranked.items().len(),
            skipped = skipped.len(),
            "funding search complete"
        );

        SearchResponse {
            query: query.to_string(),
            translated,
            mode,
            total_hits,
            ranked,
            explanation: mode.explanation(),
            skipped,
        }
    }

    async fn to_english(&self, query: &str) -> String {
        match self.translator.translate(query, "en").await {
            Ok(t) if !t.text.trim().is_empty() => t.text,
            Ok(_) => query.to_string(),
            Err(e) => {
                warn!(error = %e, "translation failed, using original query");
                query.to_string()
            }
        }
    }

    async fn fast_candidates(&self, translated: &str) -> (Vec<Candidate>, Vec<SkippedSource>) {
        let links = match select_funding_links(&self.llm, translated, self.options.fast_links).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "link selection failed, no candidates");
                Vec::new()
            }
        };

        let mut candidates = Vec::new();
        let mut skipped = Vec::new();
        for link in links {
            match self.gather(&link).await {
                Ok((doc, intel)) => candidates.push(Candidate {
                    hit: SearchResult {
                        title: doc.title.clone().unwrap_or_else(|| link.clone()),
                        snippet: snippet_of(&doc.text),
                        link,
                        language: SearchLang::En.code().to_string(),
                        source: "llm".to_string(),
                    },
                    intel,
                }),
                Err(e) => skipped.push(SkippedSource {
                    url: link,
                    reason: e.to_string(),
                }),
            }
        }
        (candidates, skipped)
    }

    async fn broad_candidates(&self, translated: &str) -> (Vec<Candidate>, Vec<SkippedSource>) {
        let funding_query = match rewrite_for_funding(&self.llm, translated).await {
            Ok(q) => q,
            Err(e) => {
                warn!(error = %e, "rewrite failed, using translated query");
                translated.to_string()
            }
        };

        let queries = match build_queries(&self.llm, &funding_query, self.options.max_queries).await {
            Ok(queries) => queries,
            Err(e) => {
                warn!(error = %e, "query planning failed, using fallback query");
                fallback_queries(&funding_query)
            }
        };
        info!(rewritten = %funding_query, queries = queries.len(), "queries planned");

        let fan_out = FanOut {
            langs: &self.options.langs,
            country: &self.options.country,
            per_query: self.options.results_per_query,
        };
        let hits = unique_links(multi_lang_search(&self.search, &self.translator, &queries, &fan_out).await);

        let mut candidates = Vec::new();
        let mut skipped = Vec::new();
        for hit in hits {
            if self.options.intent_filter {
                match classify_funding_intent(&self.llm, &hit.title, &hit.snippet).await {
                    Ok(true) => {}
                    Ok(false) => {
                        skipped.push(SkippedSource {
                            url: hit.link,
                            reason: "classified as not funding news".to_string(),
                        });
                        continue;
                    }
                    Err(e) => warn!(error = %e, link = %hit.link, "intent check failed, keeping hit"),
                }
            }

            match self.gather(&hit.link).await {
                Ok((_, intel)) => candidates.push(Candidate { hit, intel }),
                Err(e) => skipped.push(SkippedSource {
                    url: hit.link,
                    reason: e.to_string(),
                }),
            }
        }
        (candidates, skipped)
    }

    async fn gather(&self, url: &str) -> Result<(FetchedDocument, ExtractedIntel), GatherError> {
        let doc = self.fetcher.fetch(url).await?;
        let intel = extract_funding_intel(&self.llm, &doc.text, url).await?;
        Ok((doc, intel))
    }
}

impl<G, T, S, F> FundingSearch for Pipeline<G, T, S, F>
where
    G: TextGenerator + Send + Sync + 'static,
    T: Translator + Send + Sync + 'static,
    S: WebSearch + Send + Sync + 'static,
    F: DocumentSource + Send + Sync + 'static,
{
    fn search(
        &self,
        query: &str,
        mode: Option<ModeChoice>,
    ) -> impl Future<Output = SearchResponse> + Send {
        self.run(query, mode)
    }
}

/// First occurrence of each link, in order. Hits without a link are dropped.
fn unique_links(hits: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| !hit.link.is_empty() && seen.insert(hit.link.clone()))
        .collect()
}

fn snippet_of(text: &str) -> String {
    let trimmed = text.trim();
    let end = trimmed
        .char_indices()
        .nth(SNIPPET_CHARS)
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].to_string()
}
