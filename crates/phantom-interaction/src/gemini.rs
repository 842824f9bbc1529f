//! Gemini REST provider.
//!
//! Calls the Gemini `generateContent` endpoint directly; the full
//! transcript is sent on every call since the bridge owns the history.
//! Configuration comes from `secret.json`.

use async_trait::async_trait;
use phantom_core::chat::{ChatProvider, ChatTurn, ProviderError, TurnRole};
use phantom_infrastructure::SecretConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// [`ChatProvider`] implementation backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// Creates a provider with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Builds a provider from the secret configuration.
    ///
    /// `model_override` (from `config.toml`) wins over the secret file's
    /// model name; the model defaults to `gemini-2.5-flash`.
    ///
    /// # Errors
    ///
    /// Fails when the Gemini section or key is missing.
    pub fn from_secret(
        secret: &SecretConfig,
        model_override: Option<&str>,
    ) -> phantom_core::Result<Self> {
        let gemini = secret
            .gemini
            .as_ref()
            .ok_or_else(|| phantom_core::PhantomError::config("no gemini section in secret.json"))?;
        if gemini.api_key.trim().is_empty() {
            return Err(phantom_core::PhantomError::config(
                "gemini api_key in secret.json is empty",
            ));
        }
        let model = model_override
            .map(str::to_string)
            .or_else(|| gemini.model_name.clone())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        Ok(Self::new(gemini.api_key.clone(), model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );
        tracing::debug!(model = %self.model, turns = body.contents.len(), "calling generateContent");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::Http {
                status: None,
                message: format!("request failed: {err}"),
                retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: history.iter().map(Content::from_turn).collect(),
            system_instruction: Some(Content {
                role: "system".to_string(),
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            }),
        };
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn from_turn(turn: &ChatTurn) -> Self {
        let role = match turn.role {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        };
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: turn.text.clone(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or(ProviderError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String) -> ProviderError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ProviderError::Http {
        status: Some(status.as_u16()),
        message,
        retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phantom_infrastructure::GeminiConfig;

    #[test]
    fn test_request_shape_matches_the_api() {
        let request = GenerateContentRequest {
            contents: vec![
                Content::from_turn(&ChatTurn::user("hello")),
                Content::from_turn(&ChatTurn::model("hi")),
            ],
            system_instruction: Some(Content {
                role: "system".to_string(),
                parts: vec![Part {
                    text: "be brief".to_string(),
                }],
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{ "candidates": [ { "content": { "parts": [ { "text": "boo 👻" } ] } } ] }"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(parsed).unwrap(), "boo \u{1f47b}");
    }

    #[test]
    fn test_empty_candidates_is_an_empty_response() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{ "candidates": [] }"#).unwrap();
        assert!(matches!(
            extract_text_response(parsed),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn test_http_error_mapping_reads_the_api_error_body() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{ "error": { "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED" } }"#
                .to_string(),
        );
        match err {
            ProviderError::Http {
                status,
                message,
                retryable,
            } => {
                assert_eq!(status, Some(429));
                assert!(message.contains("RESOURCE_EXHAUSTED"));
                assert!(retryable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_secret_prefers_the_override_model() {
        let secret = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "key".to_string(),
                model_name: Some("gemini-pro".to_string()),
            }),
        };

        let provider = GeminiProvider::from_secret(&secret, Some("gemini-2.0-flash")).unwrap();
        assert_eq!(provider.model(), "gemini-2.0-flash");

        let provider = GeminiProvider::from_secret(&secret, None).unwrap();
        assert_eq!(provider.model(), "gemini-pro");
    }

    #[test]
    fn test_from_secret_requires_a_key() {
        let secret = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "  ".to_string(),
                model_name: None,
            }),
        };
        assert!(GeminiProvider::from_secret(&secret, None).is_err());
        assert!(GeminiProvider::from_secret(&SecretConfig::default(), None).is_err());
    }
}
