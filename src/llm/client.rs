//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LlmError;
use crate::records::{Message, RequestBody};

/// Default base URL for the standard OpenAI provider.
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Per-call deadline. A hung request resolves as a failure instead of
/// pinning a concurrency slot indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A chat completion distilled to what result records need: the
/// provider-assigned request id and the generated choices.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    /// Provider-assigned request identifier.
    pub id: String,
    /// Generated choices; the first one carries the classification output.
    pub choices: Vec<CompletionChoice>,
}

/// One generated choice of a completion.
#[derive(Debug, Clone)]
pub struct CompletionChoice {
    pub role: String,
    pub content: String,
}

/// Trait for clients that can complete a chat request.
///
/// The execution engine depends on this seam only, which keeps it testable
/// against in-memory fakes.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Execute one chat-completions call for the given request body.
    async fn complete(&self, body: &RequestBody) -> Result<ChatCompletion, LlmError>;
}

/// Provider-specific endpoint and authentication configuration.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// Standard OpenAI-compatible endpoint with bearer authentication.
    OpenAi { api_key: String, base_url: String },
    /// Azure OpenAI deployment endpoint with `api-key` header
    /// authentication. The per-call model field names the deployment.
    Azure {
        api_key: String,
        endpoint: String,
        api_version: String,
    },
}

/// Client for OpenAI-compatible chat-completions APIs.
pub struct ChatClient {
    provider: ProviderConfig,
    http_client: Client,
}

impl ChatClient {
    /// Create a client for the standard OpenAI provider. `base_url`
    /// defaults to the public OpenAI endpoint when not given.
    pub fn openai(api_key: String, base_url: Option<String>) -> Self {
        Self::new(ProviderConfig::OpenAi {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        })
    }

    /// Create a client for an Azure OpenAI resource.
    pub fn azure(api_key: String, endpoint: String, api_version: String) -> Self {
        Self::new(ProviderConfig::Azure {
            api_key,
            endpoint,
            api_version,
        })
    }

    /// Create a client from an explicit provider configuration.
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            http_client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Human-readable provider name, for startup logging.
    pub fn provider_name(&self) -> &'static str {
        match self.provider {
            ProviderConfig::OpenAi { .. } => "openai",
            ProviderConfig::Azure { .. } => "azure",
        }
    }

    /// Build the request URL for the given model/deployment name.
    fn request_url(&self, model: &str) -> String {
        match &self.provider {
            ProviderConfig::OpenAi { base_url, .. } => {
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            ProviderConfig::Azure {
                endpoint,
                api_version,
                ..
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                model,
                api_version
            ),
        }
    }
}

/// Wire-format request body. Temperature is always sent, defaulting to 1.0
/// when the record carries none.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a serde_json::Value>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ApiRequest<'a> {
    fn from_body(body: &'a RequestBody) -> Self {
        Self {
            model: &body.model,
            messages: &body.messages,
            response_format: body.response_format.as_ref(),
            temperature: body.temperature.unwrap_or(1.0),
            max_tokens: body.max_tokens,
        }
    }
}

/// Internal response structure from the OpenAI-compatible API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    id: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// Error response from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl ChatApi for ChatClient {
    async fn complete(&self, body: &RequestBody) -> Result<ChatCompletion, LlmError> {
        let api_request = ApiRequest::from_body(body);
        let url = self.request_url(&body.model);

        let mut http_request = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json");

        http_request = match &self.provider {
            ProviderConfig::OpenAi { api_key, .. } => {
                http_request.header("Authorization", format!("Bearer {}", api_key))
            }
            ProviderConfig::Azure { api_key, .. } => http_request.header("api-key", api_key),
        };

        let http_response = http_request
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = http_response.status();
        if !status.is_success() {
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            // Prefer the structured error message when the body parses
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(LlmError::ApiError {
                    code: status.as_u16(),
                    message: error_response.error.message,
                });
            }

            return Err(LlmError::ApiError {
                code: status.as_u16(),
                message: error_text,
            });
        }

        let api_response: ApiResponse = http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        Ok(ChatCompletion {
            id: api_response.id,
            choices: api_response
                .choices
                .into_iter()
                .map(|choice| CompletionChoice {
                    role: choice.message.role,
                    content: choice.message.content.unwrap_or_default(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_request_url() {
        let client = ChatClient::openai("key".to_string(), None);
        assert_eq!(
            client.request_url("gpt-5-mini"),
            "https://api.openai.com/v1/chat/completions"
        );

        let custom = ChatClient::openai(
            "key".to_string(),
            Some("http://localhost:4000/v1/".to_string()),
        );
        assert_eq!(
            custom.request_url("gpt-5-mini"),
            "http://localhost:4000/v1/chat/completions"
        );
    }

    #[test]
    fn test_azure_request_url_uses_deployment_name() {
        let client = ChatClient::azure(
            "key".to_string(),
            "https://my-resource.openai.azure.com/".to_string(),
            "2024-02-15-preview".to_string(),
        );
        assert_eq!(
            client.request_url("my-deployment"),
            "https://my-resource.openai.azure.com/openai/deployments/my-deployment/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_api_request_serialization_defaults_temperature() {
        let body = RequestBody {
            model: "gpt-5-mini".to_string(),
            messages: vec![Message::user(Some("test".to_string()))],
            response_format: None,
            temperature: None,
            max_tokens: None,
        };
        let json = serde_json::to_string(&ApiRequest::from_body(&body)).unwrap();

        assert!(json.contains("\"temperature\":1.0"));
        assert!(!json.contains("max_tokens"));
        assert!(!json.contains("response_format"));
    }

    #[test]
    fn test_api_request_serialization_passes_overrides() {
        let body = RequestBody {
            model: "gpt-5-mini".to_string(),
            messages: vec![],
            response_format: Some(serde_json::json!({"type": "json_schema"})),
            temperature: Some(0.2),
            max_tokens: Some(512),
        };
        let json = serde_json::to_string(&ApiRequest::from_body(&body)).unwrap();

        assert!(json.contains("\"temperature\":0.2"));
        assert!(json.contains("\"max_tokens\":512"));
        assert!(json.contains("json_schema"));
    }

    #[tokio::test]
    async fn test_complete_connection_error() {
        // Use a port that's unlikely to have a server
        let client = ChatClient::openai("key".to_string(), Some("http://localhost:65535".to_string()));
        let body = RequestBody {
            model: "gpt-5-mini".to_string(),
            messages: vec![Message::user(Some("test".to_string()))],
            response_format: None,
            temperature: None,
            max_tokens: None,
        };

        let result = client.complete(&body).await;
        assert!(matches!(result, Err(LlmError::RequestFailed(_))));
    }
}
