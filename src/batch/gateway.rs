//! Thin client for the OpenAI Batch API.
//!
//! Uploads a request store as a batch input file, creates the batch job,
//! polls its status and downloads completed output. No logic beyond status
//! interpretation lives here; the direct execution engine is the drop-in
//! alternative producing the same output artifact.

use std::fmt;
use std::path::Path;

use reqwest::Client;
use serde::Deserialize;

use crate::error::BatchError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Upload/download calls move whole job files; allow them more time than a
/// single completion call.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Remote batch job status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Validating,
    InProgress,
    Finalizing,
    Completed,
    Failed,
    Expired,
    Cancelling,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BatchStatus {
    /// Whether the job is still moving through the provider's pipeline.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            BatchStatus::Validating | BatchStatus::InProgress | BatchStatus::Finalizing
        )
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchStatus::Validating => "validating",
            BatchStatus::InProgress => "in_progress",
            BatchStatus::Finalizing => "finalizing",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
            BatchStatus::Expired => "expired",
            BatchStatus::Cancelling => "cancelling",
            BatchStatus::Cancelled => "cancelled",
            BatchStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A batch job as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub status: BatchStatus,
    #[serde(default)]
    pub output_file_id: Option<String>,
    /// Error list reported for failed jobs, passed through for display.
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the asynchronous Batch API.
pub struct BatchGateway {
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl BatchGateway {
    /// Create a gateway. `base_url` defaults to the public OpenAI endpoint.
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            http_client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Upload a request store and create a batch job over it. Returns the
    /// provider-assigned batch id the operator must keep for polling.
    pub async fn submit(&self, path: &Path, job_name: &str) -> Result<String, BatchError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "batch_input.jsonl".to_string());

        let form = reqwest::multipart::Form::new()
            .text("purpose", "batch")
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .http_client
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BatchError::RequestFailed(e.to_string()))?;
        let file: FileObject = Self::parse_response(response).await?;
        tracing::info!(file_id = %file.id, "Input file uploaded");

        let body = serde_json::json!({
            "input_file_id": file.id,
            "endpoint": "/v1/chat/completions",
            "completion_window": "24h",
            "metadata": { "description": job_name },
        });
        let response = self
            .http_client
            .post(format!("{}/batches", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BatchError::RequestFailed(e.to_string()))?;
        let job: BatchJob = Self::parse_response(response).await?;

        tracing::info!(
            batch_id = %job.id,
            "Batch created; processing can take minutes up to 24h"
        );
        Ok(job.id)
    }

    /// Retrieve the current state of a batch job.
    pub async fn poll(&self, batch_id: &str) -> Result<BatchJob, BatchError> {
        let response = self
            .http_client
            .get(format!("{}/batches/{}", self.base_url, batch_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BatchError::RequestFailed(e.to_string()))?;
        Self::parse_response(response).await
    }

    /// Download the output file of a completed job and write it verbatim to
    /// `output`. Only valid once the job reports `completed`.
    pub async fn fetch_output(&self, job: &BatchJob, output: &Path) -> Result<(), BatchError> {
        let file_id = job
            .output_file_id
            .as_deref()
            .ok_or(BatchError::MissingOutputFile)?;

        let response = self
            .http_client
            .get(format!("{}/files/{}/content", self.base_url, file_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BatchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BatchError::Api {
                code: status.as_u16(),
                message: text,
            });
        }

        let content = response
            .text()
            .await
            .map_err(|e| BatchError::RequestFailed(e.to_string()))?;
        tokio::fs::write(output, content).await?;
        tracing::info!(path = %output.display(), "Batch output saved");
        Ok(())
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BatchError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(BatchError::Api {
                code: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| BatchError::ParseError(e.to_string()))
    }
}
