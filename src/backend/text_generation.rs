//! Text-generation inference endpoint backend (Hugging Face Inference / TGI).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, GenerationRequest, GenerativeBackend};
use crate::error::{BackendError, ConfigError};
use crate::types::BackendSettings;

/// Hosted inference URL used when no endpoint is configured.
const HOSTED_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";

/// Client for a causal language model served behind a text-generation endpoint.
pub struct TextGenerationBackend {
    client: Client,
    url: String,
    api_token: Option<String>,
    max_new_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Batch(Vec<Generated>),
    Single(Generated),
    Error { error: String },
}

impl TextGenerationBackend {
    pub fn new(model: &str, settings: &BackendSettings) -> Result<Self, ConfigError> {
        let url = match &settings.text_generation_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{HOSTED_INFERENCE_URL}/{model}"),
        };
        Ok(Self {
            client: http_client(settings)?,
            url,
            api_token: settings.api_token.clone(),
            max_new_tokens: settings.max_new_tokens,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn parse_generate_response(body: &str) -> Result<String, BackendError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

    let text = match response {
        GenerateResponse::Batch(items) => items
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| BackendError::MalformedResponse("empty generation list".to_string()))?,
        GenerateResponse::Single(item) => item.generated_text,
        GenerateResponse::Error { error } => return Err(BackendError::MalformedResponse(error)),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(BackendError::EmptyOutput);
    }
    Ok(text.to_string())
}

#[async_trait]
impl GenerativeBackend for TextGenerationBackend {
    fn name(&self) -> &str {
        "text-generation"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let payload = GenerateRequest {
            inputs: &request.prompt,
            parameters: GenerateParameters {
                max_new_tokens: self.max_new_tokens,
                return_full_text: false,
            },
        };

        debug!(url = %self.url, intent = %request.intent, "Sending prompt to text generation endpoint");

        let mut builder = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_generate_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve;
    use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    #[test]
    fn test_parse_batch() {
        let body = r#"[{"generated_text":" A simpler sentence. "}]"#;
        assert_eq!(parse_generate_response(body).unwrap(), "A simpler sentence.");
    }

    #[test]
    fn test_parse_single() {
        let body = r#"{"generated_text":"Done."}"#;
        assert_eq!(parse_generate_response(body).unwrap(), "Done.");
    }

    #[test]
    fn test_parse_error_payload() {
        let body = r#"{"error":"Model is currently loading"}"#;
        match parse_generate_response(body) {
            Err(BackendError::MalformedResponse(msg)) => assert!(msg.contains("loading")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_default_url_uses_model() {
        let backend = TextGenerationBackend::new("gpt2", &BackendSettings::default()).unwrap();
        assert_eq!(backend.url(), "https://api-inference.huggingface.co/models/gpt2");
    }

    #[test]
    fn test_configured_url() {
        let settings = BackendSettings {
            text_generation_url: Some("http://tgi:8080/generate/".to_string()),
            ..Default::default()
        };
        let backend = TextGenerationBackend::new("ignored", &settings).unwrap();
        assert_eq!(backend.url(), "http://tgi:8080/generate");
    }

    async fn fake_generate(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> Response {
        let token = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if token != Some("Bearer secret") {
            return (StatusCode::UNAUTHORIZED, "missing token").into_response();
        }
        let text = format!(
            "{} ({} tokens, full={})",
            body["inputs"].as_str().unwrap_or_default(),
            body["parameters"]["max_new_tokens"],
            body["parameters"]["return_full_text"],
        );
        Json(json!([{ "generated_text": text }])).into_response()
    }

    async fn backend(api_token: Option<&str>) -> TextGenerationBackend {
        let base = serve(Router::new().route("/generate", post(fake_generate))).await;
        let settings = BackendSettings {
            text_generation_url: Some(format!("{base}/generate")),
            api_token: api_token.map(str::to_string),
            ..Default::default()
        };
        TextGenerationBackend::new("ignored", &settings).unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_bearer_token_and_parameters() {
        let text = backend(Some("secret"))
            .await
            .generate(&GenerationRequest::new("Hi.", "academic"))
            .await
            .unwrap();
        assert_eq!(text, "Hi. (200 tokens, full=false)");
    }

    #[tokio::test]
    async fn test_generate_without_token_is_rejected() {
        let result = backend(None)
            .await
            .generate(&GenerationRequest::new("Hi.", "academic"))
            .await;
        assert!(matches!(result, Err(BackendError::Status { status: 401, .. })));
    }
}
