//! Chat-completions API client.
//!
//! Provides the [`ChatApi`] trait the execution engine dispatches through
//! and a [`ChatClient`] implementation for OpenAI-compatible providers
//! (standard and Azure deployments).

mod client;

pub use client::{ChatApi, ChatClient, ChatCompletion, CompletionChoice, ProviderConfig};
