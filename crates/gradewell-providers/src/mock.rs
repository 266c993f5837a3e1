//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use gradewell_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

use crate::error::ProviderError;

/// A provider that never leaves the process.
///
/// Responses are picked by prompt substring, falling back to a default. A
/// failing mock returns an `ApiError` on every call, which is how tests
/// drive the grading fallback.
pub struct MockProvider {
    /// Map of prompt substring to response body.
    responses: HashMap<String, String>,
    default_response: String,
    failure: Option<String>,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the given prompt to response mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "{}".to_string(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(HashMap::new())
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        if let Some(message) = &self.failure {
            return Err(ProviderError::ApiError {
                status: 503,
                message: message.clone(),
            }
            .into());
        }

        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        let prompt_tokens = (request.prompt.len() / 4) as u32; // rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            system_prompt: None,
            response_schema: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response(r#"{"score": 100}"#);

        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, r#"{"score": 100}"#);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert("Idioms".to_string(), r#"{"score": 0}"#.to_string());
        responses.insert("Tenses".to_string(), r#"{"score": 50}"#.to_string());

        let provider = MockProvider::new(responses);

        let resp = provider.generate(&request("Activity: Business Idioms")).await.unwrap();
        assert_eq!(resp.content, r#"{"score": 0}"#);

        let resp = provider.generate(&request("Activity: Tenses")).await.unwrap();
        assert_eq!(resp.content, r#"{"score": 50}"#);

        let resp = provider.generate(&request("Activity: Other")).await.unwrap();
        assert_eq!(resp.content, "{}");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_mock_counts_calls() {
        let provider = MockProvider::failing("service unavailable");

        let err = provider.generate(&request("x")).await.unwrap_err();
        assert!(err.to_string().contains("service unavailable"));
        assert_eq!(provider.call_count(), 1);
    }
}
