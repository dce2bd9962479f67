//! Result-side record types in the Batch API output line format.

use serde::{Deserialize, Serialize};

/// Prefix prepended to `custom_id` to derive a result record's `id`.
pub const RESULT_ID_PREFIX: &str = "batch_req_";

/// Fixed error code carried by every failure result.
pub const ERROR_CODE: &str = "exception";

/// The outcome of processing one [`super::BatchRequest`].
///
/// Exactly one of `response` and `error` is populated; both fields are
/// serialized explicitly (`null` when absent) so output lines match the
/// Batch API shape byte-for-byte. A result is created once, when the
/// record's network call resolves, and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Derived id: `"batch_req_" + custom_id`.
    pub id: String,
    /// Correlation id copied from the originating request.
    pub custom_id: String,
    /// Success payload; `null` on failure.
    pub response: Option<ResultResponse>,
    /// Failure payload; `null` on success.
    pub error: Option<ResultError>,
}

/// Success payload of a result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    /// HTTP status code, 200 for direct-call successes.
    pub status_code: u16,
    /// Provider-assigned request identifier.
    pub request_id: String,
    /// Response body holding the generated choices.
    pub body: ResponseBody,
}

/// Body of a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBody {
    pub choices: Vec<ResultChoice>,
}

/// One generated choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultChoice {
    pub message: ResultMessage,
}

/// The generated message of a choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    pub content: String,
    pub role: String,
}

/// Failure payload of a result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultError {
    /// Human-readable description of the failure.
    pub message: String,
    /// Fixed generic failure code.
    pub code: String,
}

impl BatchResult {
    /// Build a success result from the provider's request id and the first
    /// generated message.
    pub fn success(
        custom_id: impl Into<String>,
        request_id: impl Into<String>,
        content: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        let custom_id = custom_id.into();
        Self {
            id: format!("{RESULT_ID_PREFIX}{custom_id}"),
            custom_id,
            response: Some(ResultResponse {
                status_code: 200,
                request_id: request_id.into(),
                body: ResponseBody {
                    choices: vec![ResultChoice {
                        message: ResultMessage {
                            content: content.into(),
                            role: role.into(),
                        },
                    }],
                },
            }),
            error: None,
        }
    }

    /// Build a failure result carrying the failure's description and the
    /// fixed generic error code.
    pub fn failure(custom_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        let custom_id = custom_id.into();
        Self {
            id: format!("{RESULT_ID_PREFIX}{custom_id}"),
            custom_id,
            response: None,
            error: Some(ResultError {
                message: message.to_string(),
                code: ERROR_CODE.to_string(),
            }),
        }
    }

    /// Whether this result carries a success payload.
    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }

    /// Content of the first generated choice, if this is a success result.
    pub fn first_content(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result_shape() {
        let result = BatchResult::success("news-7", "req_abc", "{\"is_clickbait\":true}", "assistant");

        assert_eq!(result.id, "batch_req_news-7");
        assert_eq!(result.custom_id, "news-7");
        assert!(result.is_success());
        assert!(result.error.is_none());

        let response = result.response.as_ref().unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.request_id, "req_abc");
        assert_eq!(result.first_content(), Some("{\"is_clickbait\":true}"));
    }

    #[test]
    fn test_failure_result_shape() {
        let result = BatchResult::failure("news-7", "connection refused");

        assert_eq!(result.id, "batch_req_news-7");
        assert!(!result.is_success());
        assert!(result.response.is_none());

        let error = result.error.as_ref().unwrap();
        assert_eq!(error.code, ERROR_CODE);
        assert_eq!(error.message, "connection refused");
        assert!(result.first_content().is_none());
    }

    #[test]
    fn test_serialization_keeps_explicit_nulls() {
        let ok = serde_json::to_string(&BatchResult::success("a", "r", "c", "assistant")).unwrap();
        assert!(ok.contains("\"error\":null"));
        assert!(ok.contains("\"choices\""));

        let err = serde_json::to_string(&BatchResult::failure("a", "boom")).unwrap();
        assert!(err.contains("\"response\":null"));
        assert!(err.contains("\"code\":\"exception\""));
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let original = BatchResult::success("id-ñ", "req_1", "contenido en español", "assistant");
        let line = serde_json::to_string(&original).unwrap();
        // Non-ASCII text stays unescaped in the stored line
        assert!(line.contains("español"));

        let parsed: BatchResult = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.id, original.id);
        assert_eq!(parsed.custom_id, original.custom_id);
        assert_eq!(parsed.first_content(), original.first_content());
    }
}
