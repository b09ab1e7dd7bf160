//! Gemini `generateContent` HTTP client.

use serde::{Deserialize, Serialize};

use crate::config::Config;

use super::{AssistantClient, AssistantError};

/// Blocking HTTP client for a Gemini-style `generateContent` backend.
///
/// The reqwest client is built per request, inside `consult`, which always
/// runs on a blocking thread — a stored blocking client would have to be
/// constructed on the async runtime.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.backend_url,
            &config.api_key,
            &config.model,
            config.request_timeout_secs,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

// ── Wire types ──────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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

impl AssistantClient for GeminiClient {
    fn consult(
        &self,
        system_instruction: &str,
        user_text: &str,
    ) -> Result<String, AssistantError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: user_text }],
            }],
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| AssistantError::HttpClient(e.to_string()))?;

        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AssistantError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    AssistantError::Timeout(self.timeout_secs)
                } else {
                    AssistantError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AssistantError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| AssistantError::ResponseParsing(e.to_string()))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Mock assistant for testing — returns a configurable reply or failure.
pub struct MockAssistantClient {
    outcome: Result<String, AssistantError>,
}

impl MockAssistantClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            outcome: Ok(reply.to_string()),
        }
    }

    pub fn failing(error: AssistantError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl AssistantClient for MockAssistantClient {
    fn consult(
        &self,
        _system_instruction: &str,
        _user_text: &str,
    ) -> Result<String, AssistantError> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = GeminiClient::new("http://localhost:8080/", "k", "gemini-2.0-flash", 30);
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.model(), "gemini-2.0-flash");
        assert_eq!(client.timeout_secs, 30);
    }

    #[test]
    fn request_body_serializes_to_gemini_shape() {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sistema" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "consulta" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sistema");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "consulta");
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn response_text_is_joined_from_parts() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "Hola "}, {"text": "operador"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "Hola operador");
    }

    #[test]
    fn response_without_candidates_deserializes_empty() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn mock_replies_with_configured_text() {
        let mock = MockAssistantClient::replying("entendido");
        assert_eq!(mock.consult("s", "u").unwrap(), "entendido");
    }

    #[test]
    fn mock_fails_with_configured_error() {
        let mock = MockAssistantClient::failing(AssistantError::RateLimited);
        assert_eq!(mock.consult("s", "u"), Err(AssistantError::RateLimited));
    }
}
