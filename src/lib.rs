//! labelforge: news labeling pipeline for LLM text classification.
//!
//! This library provides tools for generating, pricing, submitting and
//! processing clickbait/sensationalism classification jobs against
//! OpenAI-compatible chat-completions APIs, either through the asynchronous
//! Batch API or through direct concurrency-bounded requests.

// Core modules
pub mod batch;
pub mod cli;
pub mod cost;
pub mod engine;
pub mod error;
pub mod generate;
pub mod llm;
pub mod prompts;
pub mod records;
pub mod store;

// Re-export commonly used error types
pub use error::{BatchError, EstimateError, GenerateError, LlmError, StoreError};
