//! Request-side record types in the Batch API line format.

use serde::{Deserialize, Serialize};

fn default_method() -> String {
    "POST".to_string()
}

fn default_url() -> String {
    "/v1/chat/completions".to_string()
}

/// One unit of work: a single chat-completions call in the Batch API
/// envelope format.
///
/// `custom_id` is the correlation key between input and output records. It
/// must be stable and unique within a job store; uniqueness is not enforced
/// here, but downstream correlation breaks if it is violated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Caller-assigned correlation id, unique within a job store.
    pub custom_id: String,
    /// HTTP method, always "POST" for chat completions.
    #[serde(default = "default_method")]
    pub method: String,
    /// Target endpoint path, always "/v1/chat/completions".
    #[serde(default = "default_url")]
    pub url: String,
    /// Chat-completions request body.
    pub body: RequestBody,
}

impl BatchRequest {
    /// Create a new request envelope for the chat-completions endpoint.
    pub fn new(custom_id: impl Into<String>, body: RequestBody) -> Self {
        Self {
            custom_id: custom_id.into(),
            method: default_method(),
            url: default_url(),
            body,
        }
    }
}

/// Chat-completions request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Model (or Azure deployment) name to dispatch to.
    pub model: String,
    /// Ordered conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Structured-output schema descriptor, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
    /// Sampling temperature; the provider default of 1.0 applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate; absent means provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (e.g., "system", "user", "assistant").
    pub role: String,
    /// Content of the message; may be absent in source data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    /// Create a new user message. `None` content is preserved as-is for
    /// rows whose source text is missing.
    pub fn user(content: Option<String>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}
