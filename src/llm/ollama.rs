use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{OllamaGenerateRequest, OllamaGenerateResponse};
use super::{LlmError, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Local model served by Ollama, called through its non-streaming generate endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(http: Client, base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaGenerateResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    let end = text.floor_char_boundary(200);
                    format!("HTTP {status}: {}", &text[..end])
                });
            warn!(status = %status, model = %self.model, "Ollama API error");
            return Err(LlmError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: OllamaGenerateResponse = response.json().await?;
        if let Some(message) = body.error {
            return Err(LlmError::Api { code: 0, message });
        }
        if body.response.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        debug!(model = %self.model, chars = body.response.len(), "ollama generation complete");
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> OllamaClient {
        OllamaClient::new(Client::new(), uri, DEFAULT_MODEL, Duration::from_secs(5))
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = OllamaClient::new(
            Client::new(),
            "http://localhost:11434/",
            "llama3.1",
            Duration::from_secs(1),
        );
        assert_eq!(c.base_url, "http://localhost:11434");
        assert_eq!(c.model(), "llama3.1");
    }

    #[tokio::test]
    async fn generate_sends_non_streaming_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.1",
                "prompt": "hello",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.1",
                "response": "{\"amount\": \"$2M\"}",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server.uri()).generate("hello").await.unwrap();
        assert_eq!(text, "{\"amount\": \"$2M\"}");
    }

    #[tokio::test]
    async fn generate_surfaces_model_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "model 'llama3.1' not found"
            })))
            .mount(&server)
            .await;

        match client(&server.uri()).generate("hello").await {
            Err(LlmError::Api { code: 404, message }) => assert!(message.contains("not found")),
            other => panic!("expected Api(404), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_blank_response_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "   ",
                "done": true
            })))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server.uri()).generate("hello").await,
            Err(LlmError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn generate_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let c = OllamaClient::new(
            Client::new(),
            &server.uri(),
            DEFAULT_MODEL,
            Duration::from_millis(200),
        );
        assert!(matches!(c.generate("hello").await, Err(LlmError::Timeout)));
    }
}
