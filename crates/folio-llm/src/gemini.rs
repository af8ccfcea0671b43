use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::CompletionProvider;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Google Gemini `generateContent` backend.
///
/// Auth is a `?key=` query parameter rather than a header, and the assistant
/// role on the wire is `model`.
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl Clone for GeminiProvider {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
        }
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: crate::http::default_client(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key,
            model,
        }
    }

    /// Override the API base URL. Trailing slashes are stripped.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    async fn send_request(&self, prompt: &str) -> Result<String, LlmError> {
        let body = RequestBody {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint_url())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Gemini API error {status}: {text}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let resp: ResponseBody = serde_json::from_str(&text)?;

        let reply = resp
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(LlmError::EmptyResponse { provider: "gemini" });
        }

        Ok(reply)
    }
}

impl CompletionProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.send_request(prompt).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ResponseBody {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new("test-key".into(), DEFAULT_MODEL.into()).with_base_url(&server.uri())
    }

    #[test]
    fn request_body_serializes_user_content() {
        let body = RequestBody {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"contents":[{"role":"user","parts":[{"text":"hello"}]}]}"#
        );
    }

    #[test]
    fn response_body_concatenates_parts() {
        let json = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let resp: ResponseBody = serde_json::from_str(json).unwrap();
        let text: String = resp.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn response_body_tolerates_missing_candidates() {
        let resp: ResponseBody = serde_json::from_str("{}").unwrap();
        assert!(resp.candidates.is_empty());
    }

    #[test]
    fn endpoint_url_contains_model_and_key() {
        let provider = GeminiProvider::new("secret".into(), "gemini-1.5-pro".into());
        let url = provider.endpoint_url();
        assert!(url.contains("/models/gemini-1.5-pro:generateContent"));
        assert!(url.ends_with("?key=secret"));
    }

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let provider = GeminiProvider::new("k".into(), "m".into())
            .with_base_url("http://localhost:9999///");
        assert!(provider.endpoint_url().starts_with("http://localhost:9999/models/"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = GeminiProvider::new("super-secret".into(), "gemini-1.5-pro".into());
        let debug = format!("{provider:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("gemini-1.5-pro"));
    }

    #[test]
    fn name_returns_gemini() {
        let provider = GeminiProvider::new("k".into(), "m".into());
        assert_eq!(provider.name(), "gemini");
    }

    #[tokio::test]
    async fn complete_returns_generated_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "ping"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "pong"}]}}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let reply = provider.complete("ping").await.unwrap();
        assert_eq!(reply, "pong");
    }

    #[tokio::test]
    async fn complete_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.complete("ping").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));
    }

    #[tokio::test]
    async fn complete_surfaces_quota_body_as_rate_limited_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error": {"status": "RESOURCE_EXHAUSTED", "message": "quota exceeded"}}"#,
            ))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.complete("ping").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 400, .. }));
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn complete_plain_server_error_is_not_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.complete("ping").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
        assert!(!err.is_rate_limited());
    }

    #[tokio::test]
    async fn complete_empty_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.complete("ping").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { provider: "gemini" }));
    }

    #[tokio::test]
    #[ignore = "requires GOOGLE_GEMINI_API_KEY env var"]
    async fn integration_gemini_complete() {
        let api_key =
            std::env::var("GOOGLE_GEMINI_API_KEY").expect("GOOGLE_GEMINI_API_KEY must be set");
        let provider = GeminiProvider::new(api_key, DEFAULT_MODEL.into());

        let reply = provider
            .complete("Reply with exactly: pong")
            .await
            .unwrap();
        assert!(reply.to_lowercase().contains("pong"));
    }
}
