use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{SearchError, SearchRequest, SearchResult, WebSearch};

const API_URL: &str = "https://serpapi.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const SOURCE_TAG: &str = "SerpAPI";

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Google organic results through SerpAPI.
///
/// Constructed even without a key so the rest of the service can start;
/// every search then fails with [`SearchError::ApiKeyNotSet`].
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    http: Client,
    api_key: Option<ApiKey>,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

impl SerpApiClient {
    pub fn from_env(http: Client) -> Self {
        let api_key = env::var("SERPAPI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey);
        Self {
            http,
            api_key,
            endpoint: API_URL.to_string(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(http: Client, endpoint: &str, api_key: Option<&str>) -> Self {
        Self {
            http,
            api_key: api_key.map(|k| ApiKey(k.to_string())),
            endpoint: endpoint.to_string(),
        }
    }
}

impl WebSearch for SerpApiClient {
    async fn search(&self, request: &SearchRequest<'_>) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self.api_key.as_ref().ok_or(SearchError::ApiKeyNotSet)?;
        let num = request.num.to_string();

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", request.query),
                ("api_key", api_key.0.as_str()),
                ("hl", request.lang.code()),
                ("gl", request.country),
                ("num", num.as_str()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("SerpAPI rate limited");
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SerpResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(SearchError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: SerpResponse = response.json().await?;
        if let Some(message) = body.error
            && body.organic_results.is_empty()
            && !message.contains("hasn't returned any results")
        {
            return Err(SearchError::Api { code: 0, message });
        }

        let results = to_search_results(body.organic_results, request);
        debug!(
            query = %request.query,
            lang = %request.lang,
            hits = results.len(),
            "serpapi search complete"
        );
        Ok(results)
    }
}

fn to_search_results(organic: Vec<OrganicResult>, request: &SearchRequest<'_>) -> Vec<SearchResult> {
    organic
        .into_iter()
        .filter_map(|item| {
            let link = item.link.filter(|l| !l.trim().is_empty())?;
            Some(SearchResult {
                title: item.title.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
                link,
                language: request.lang.code().to_string(),
                source: SOURCE_TAG.to_string(),
            })
        })
        .take(request.num as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchLang;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(query: &str) -> SearchRequest<'_> {
        SearchRequest {
            query,
            lang: SearchLang::Ta,
            country: "in",
            num: 2,
        }
    }

    #[tokio::test]
    async fn maps_organic_results_and_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("engine", "google"))
            .and(query_param("q", "EV grant"))
            .and(query_param("api_key", "k"))
            .and(query_param("hl", "ta"))
            .and(query_param("gl", "in"))
            .and(query_param("num", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic_results": [
                    {"title": "A", "snippet": "sa", "link": "https://a.gov.in"},
                    {"title": "No link"},
                    {"title": "B", "link": "https://b.com"},
                    {"title": "C", "link": "https://c.com"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SerpApiClient::with_endpoint(Client::new(), &server.uri(), Some("k"));
        let results = client.search(&request("EV grant")).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://a.gov.in");
        assert_eq!(results[0].language, "ta");
        assert_eq!(results[0].source, "SerpAPI");
        assert_eq!(results[1].title, "B");
        assert_eq!(results[1].snippet, "");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = SerpApiClient::with_endpoint(Client::new(), "http://localhost:0", None);
        assert!(!client.has_key());
        assert!(matches!(
            client.search(&request("x")).await,
            Err(SearchError::ApiKeyNotSet)
        ));
    }

    #[tokio::test]
    async fn invalid_key_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Invalid API key."
            })))
            .mount(&server)
            .await;

        let client = SerpApiClient::with_endpoint(Client::new(), &server.uri(), Some("bad"));
        match client.search(&request("x")).await {
            Err(SearchError::Api { code: 401, message }) => assert!(message.contains("Invalid")),
            other => panic!("expected Api(401), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_results_is_empty_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Google hasn't returned any results for this query."
            })))
            .mount(&server)
            .await;

        let client = SerpApiClient::with_endpoint(Client::new(), &server.uri(), Some("k"));
        assert!(client.search(&request("x")).await.unwrap().is_empty());
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let client = SerpApiClient::with_endpoint(Client::new(), "http://x", Some("secret"));
        assert!(!format!("{client:?}").contains("secret"));
    }
}
