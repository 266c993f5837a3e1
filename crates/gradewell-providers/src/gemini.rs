//! Google Gemini (Generative Language API) provider implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use gradewell_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

use crate::error::ProviderError;
use crate::http::{build_client, check_status, parse_error, send_error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client: build_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Replace the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> anyhow::Result<Self> {
        self.client = build_client(timeout_secs)?;
        self.timeout_secs = timeout_secs;
        Ok(self)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: GeminiUsage,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Translate a JSON Schema into Gemini's OpenAPI-subset dialect: upper-case
/// type names, no `additionalProperties`.
pub fn to_gemini_schema(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    let mut out = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "additionalProperties" => {}
            "type" => {
                let ty = value
                    .as_str()
                    .map(|t| Value::String(t.to_uppercase()))
                    .unwrap_or_else(|| value.clone());
                out.insert(key.clone(), ty);
            }
            "properties" => {
                let props = match value.as_object() {
                    Some(props) => Value::Object(
                        props
                            .iter()
                            .map(|(name, prop)| (name.clone(), to_gemini_schema(prop)))
                            .collect(),
                    ),
                    None => value.clone(),
                };
                out.insert(key.clone(), props);
            }
            "items" => {
                out.insert(key.clone(), to_gemini_schema(value));
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(out)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_prompt.as_ref().map(|s| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: s.clone() }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json".to_string()),
                response_schema: request.response_schema.as_ref().map(to_gemini_schema),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, request.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        let response = check_status(response, &request.model).await?;
        let api_response: GeminiResponse = response.json().await.map_err(parse_error)?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let candidate = api_response
            .candidates
            .first()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no candidates".into()))?;
        let content: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();
        if content.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(ProviderError::InvalidResponse(format!(
                "empty candidate (finish reason: {reason})"
            ))
            .into());
        }

        Ok(GenerateResponse {
            content,
            model: api_response
                .model_version
                .unwrap_or_else(|| request.model.clone()),
            token_usage: TokenUsage {
                prompt_tokens: api_response.usage_metadata.prompt_token_count,
                completion_tokens: api_response.usage_metadata.candidates_token_count,
                total_tokens: api_response.usage_metadata.total_token_count,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gemini-3-flash-preview".into(),
                name: "Gemini 3 Flash (preview)".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
            ModelInfo {
                id: "gemini-2.5-flash".into(),
                name: "Gemini 2.5 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
            ModelInfo {
                id: "gemini-2.5-pro".into(),
                name: "Gemini 2.5 Pro".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradewell_core::prompt::grading_response_schema;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-3-flash-preview".into(),
            prompt: "Grade this".into(),
            system_prompt: None,
            response_schema: Some(grading_response_schema()),
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    #[test]
    fn schema_translation() {
        let schema = to_gemini_schema(&grading_response_schema());
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["score"]["type"], "NUMBER");
        assert_eq!(
            schema["properties"]["detailedResults"]["items"]["properties"]["isCorrect"]["type"],
            "BOOLEAN"
        );
        assert!(schema.get("additionalProperties").is_none());
        assert!(schema["properties"]["detailedResults"]["items"]
            .get("additionalProperties")
            .is_none());
        assert_eq!(schema["required"][0], "score");
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"score\": 90}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 15, "totalTokenCount": 55},
            "modelVersion": "gemini-3-flash-preview"
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri())).unwrap();
        let response = provider.generate(&request()).await.unwrap();
        assert_eq!(response.content, "{\"score\": 90}");
        assert_eq!(response.token_usage.total_tokens, 55);
        assert_eq!(response.model, "gemini-3-flash-preview");
    }

    #[tokio::test]
    async fn blocked_candidate_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("key", Some(server.uri())).unwrap();
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"), "got: {err}");
    }

    #[tokio::test]
    async fn error_statuses_map_to_provider_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("bad", Some(server.uri())).unwrap();
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("key", Some(server.uri())).unwrap();
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::RateLimited {
                retry_after_ms: 7000
            })
        ));
    }
}
