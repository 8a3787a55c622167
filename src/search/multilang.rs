use tracing::{debug, info, warn};

use super::{SearchLang, SearchRequest, SearchResult, WebSearch};
use crate::translate::Translator;

#[derive(Debug, Clone)]
pub struct FanOut<'a> {
    pub langs: &'a [SearchLang],
    pub country: &'a str,
    pub per_query: u8,
}

/// Runs every query in every language, one call at a time.
///
/// Each query is translated into the search language first. A failed
/// translation searches the untranslated query; a failed search is skipped.
/// Results keep call order: language, then query, then provider rank.
pub async fn multi_lang_search(
    search: &impl WebSearch,
    translator: &impl Translator,
    queries: &[String],
    fan_out: &FanOut<'_>,
) -> Vec<SearchResult> {
    let mut all_results = Vec::new();
    let mut failures = 0usize;

    for &lang in fan_out.langs {
        for query in queries {
            let localized = match translator.translate(query, lang.code()).await {
                Ok(t) => t.text,
                Err(e) => {
                    debug!(error = %e, lang = lang.name(), "query translation failed, searching untranslated");
                    query.clone()
                }
            };

            let request = SearchRequest {
                query: &localized,
                lang,
                country: fan_out.country,
                num: fan_out.per_query,
            };

            match search.search(&request).await {
                Ok(results) => all_results.extend(results),
                Err(e) => {
                    failures += 1;
                    warn!(error = %e, lang = %lang, query = %localized, "search failed, skipping");
                }
            }
        }
    }

    info!(
        queries = queries.len(),
        langs = fan_out.langs.len(),
        hits = all_results.len(),
        failures,
        "multi-language search complete"
    );
    all_results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchError;
    use crate::search::testing::{MockSearch, hit};
    use crate::translate::testing::TableTranslator;

    static LANGS: [SearchLang; 3] = SearchLang::ALL;

    fn fan_out() -> FanOut<'static> {
        FanOut {
            langs: &LANGS,
            country: "in",
            per_query: 3,
        }
    }

    #[tokio::test]
    async fn searches_every_language_query_pair_in_order() {
        let search = MockSearch::new(vec![]);
        let translator = TableTranslator::with(&[
            ("seed grant", "hi", "बीज अनुदान"),
            ("seed grant", "ta", "விதை மானியம்"),
        ]);
        let queries = vec!["seed grant".to_string(), "incubator".to_string()];

        multi_lang_search(&search, &translator, &queries, &fan_out()).await;

        let calls = search.calls();
        assert_eq!(
            calls,
            vec![
                ("seed grant".to_string(), "en".to_string()),
                ("incubator".to_string(), "en".to_string()),
                ("बीज अनुदान".to_string(), "hi".to_string()),
                ("incubator".to_string(), "hi".to_string()),
                ("விதை மானியம்".to_string(), "ta".to_string()),
                ("incubator".to_string(), "ta".to_string()),
            ]
        );
        let translated: Vec<String> = translator
            .calls()
            .into_iter()
            .map(|(text, lang)| format!("{text}>{lang}"))
            .collect();
        assert_eq!(
            translated,
            [
                "seed grant>en",
                "incubator>en",
                "seed grant>hi",
                "incubator>hi",
                "seed grant>ta",
                "incubator>ta",
            ]
        );
    }

    #[tokio::test]
    async fn failed_search_is_skipped_and_others_kept() {
        let search = MockSearch::new(vec![
            Ok(vec![hit("A", "https://a.com", "en")]),
            Err(SearchError::RateLimited),
            Ok(vec![hit("C", "https://c.com", "ta")]),
        ]);
        let translator = TableTranslator::default();
        let queries = vec!["q".to_string()];

        let results = multi_lang_search(&search, &translator, &queries, &fan_out()).await;

        let links: Vec<_> = results.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://a.com", "https://c.com"]);
    }

    #[tokio::test]
    async fn translation_failure_searches_untranslated_query() {
        let search = MockSearch::new(vec![]);
        let translator = TableTranslator::failing();
        let queries = vec!["grant".to_string()];
        let langs = [SearchLang::Hi];
        let fan_out = FanOut {
            langs: &langs,
            country: "in",
            per_query: 3,
        };

        multi_lang_search(&search, &translator, &queries, &fan_out).await;

        assert_eq!(search.calls(), vec![("grant".to_string(), "hi".to_string())]);
        assert_eq!(translator.calls(), vec![("grant".to_string(), "hi".to_string())]);
    }

    #[tokio::test]
    async fn no_queries_means_no_calls() {
        let search = MockSearch::new(vec![]);
        let translator = TableTranslator::default();

        let results = multi_lang_search(&search, &translator, &[], &fan_out()).await;

        assert!(results.is_empty());
        assert!(search.calls().is_empty());
    }
}
