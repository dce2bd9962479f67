//! Error types for labelforge operations.
//!
//! Defines error types for the major subsystems:
//! - Job store reading and writing
//! - Chat-completions API interactions
//! - Batch API job submission and retrieval
//! - Request file generation from tabular datasets
//! - Token and cost estimation

use thiserror::Error;

/// Errors that can occur while reading or writing a line-delimited job store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during chat-completions API operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: set OPENAI_API_KEY or AZURE_OPENAI_API_KEY, or pass --api-key")]
    MissingApiKey,

    #[error("Missing Azure endpoint: set AZURE_OPENAI_ENDPOINT or pass --azure-endpoint")]
    MissingEndpoint,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },
}

/// Errors that can occur during Batch API operations.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Batch API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Failed to parse Batch API response: {0}")]
    ParseError(String),

    #[error("Batch is completed but has no output file id")]
    MissingOutputFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while generating a request file from a dataset.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Column '{column}' has unsupported type: expected {expected}")]
    ColumnType { column: String, expected: String },

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Job store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during token counting and cost estimation.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Unknown tokenizer encoding '{0}'")]
    UnknownEncoding(String),

    #[error("Failed to load tokenizer: {0}")]
    Tokenizer(String),

    #[error("Job store error: {0}")]
    Store(#[from] StoreError),
}
