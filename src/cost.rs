//! Token counting and cost estimation for request files.
//!
//! A deterministic offline pass over a request store: counts prompt tokens
//! per message the way the provider bills chat completions and, when prices
//! are given, projects the run's input cost in USD. Output tokens cannot be
//! known ahead of time and are reported as zero.

use std::path::Path;

use tiktoken_rs::CoreBPE;

use crate::error::EstimateError;
use crate::records::BatchRequest;
use crate::store;

/// Fixed per-message token overhead of the chat format.
const TOKENS_PER_MESSAGE: usize = 3;

/// Fixed per-request token overhead of the chat format.
const TOKENS_PER_REQUEST: usize = 3;

/// Default tokenizer encoding (the GPT-4o/GPT-5 family).
pub const DEFAULT_ENCODING: &str = "o200k_base";

/// Token counts and projected cost for one request file.
#[derive(Debug, Clone)]
pub struct CostEstimate {
    /// Number of well-formed request lines counted.
    pub requests: usize,
    /// Total prompt-side tokens across all requests.
    pub input_tokens: usize,
    /// Completion-side tokens; always zero for a pre-run estimate.
    pub output_tokens: usize,
    /// Projected input cost, when an input price was given.
    pub cost_input_usd: Option<f64>,
    /// Projected output cost, when an output price was given.
    pub cost_output_usd: Option<f64>,
}

impl CostEstimate {
    /// Sum of input and output tokens.
    pub fn total_tokens(&self) -> usize {
        self.input_tokens + self.output_tokens
    }

    /// Total projected cost, when at least one price was given.
    pub fn total_cost_usd(&self) -> Option<f64> {
        match (self.cost_input_usd, self.cost_output_usd) {
            (None, None) => None,
            (input, output) => Some(input.unwrap_or(0.0) + output.unwrap_or(0.0)),
        }
    }

    /// Human-readable report table for CLI output.
    pub fn report(&self, file_name: &str) -> String {
        let separator = "─".repeat(40);
        let fmt_cost = |c: Option<f64>| match c {
            Some(v) => format!("${v:.4}"),
            None => "N/A".to_string(),
        };

        format!(
            "TOKEN AND COST REPORT\n{sep}\n\
             {:<20} : {file_name}\n\
             {:<20} : {}\n{sep}\n\
             {:<15} | {:<10} | EST. PRICE ($)\n{sep}\n\
             {:<15} | {:<10} | {}\n\
             {:<15} | {:<10} | {}\n{sep}\n\
             {:<15} | {:<10} | {}\n{sep}",
            "File",
            "Lines (requests)",
            self.requests,
            "TYPE",
            "COUNT",
            "Input tokens",
            self.input_tokens,
            fmt_cost(self.cost_input_usd),
            "Output tokens",
            self.output_tokens,
            fmt_cost(self.cost_output_usd),
            "TOTAL",
            self.total_tokens(),
            fmt_cost(self.total_cost_usd()),
            sep = separator,
        )
    }
}

/// Count the prompt tokens of every request in a store and project cost.
///
/// Prices are USD per 1 million tokens. Malformed lines are skipped by the
/// store reader, consistent with the rest of the pipeline.
pub fn estimate_file(
    path: &Path,
    encoding_name: &str,
    input_price_per_1m: Option<f64>,
    output_price_per_1m: Option<f64>,
) -> Result<CostEstimate, EstimateError> {
    let encoding = load_encoding(encoding_name)?;
    let requests: Vec<BatchRequest> = store::read_records(path)?;

    let mut input_tokens = 0usize;
    for request in &requests {
        input_tokens += count_request_tokens(&encoding, request);
    }
    let output_tokens = 0usize;

    let cost_input_usd =
        input_price_per_1m.map(|price| input_tokens as f64 / 1_000_000.0 * price);
    let cost_output_usd =
        output_price_per_1m.map(|price| output_tokens as f64 / 1_000_000.0 * price);

    Ok(CostEstimate {
        requests: requests.len(),
        input_tokens,
        output_tokens,
        cost_input_usd,
        cost_output_usd,
    })
}

/// Prompt-side token count of one request: per-message content and role
/// tokens plus the chat-format overheads, plus the serialized
/// response_format when present.
fn count_request_tokens(encoding: &CoreBPE, request: &BatchRequest) -> usize {
    let mut tokens = TOKENS_PER_REQUEST;

    for message in &request.body.messages {
        let content = message.content.as_deref().unwrap_or("");
        tokens += encoding.encode_ordinary(content).len();
        tokens += encoding.encode_ordinary(&message.role).len();
        tokens += TOKENS_PER_MESSAGE;
    }

    if let Some(format) = &request.body.response_format {
        let serialized = format.to_string();
        tokens += encoding.encode_ordinary(&serialized).len();
    }

    tokens
}

fn load_encoding(name: &str) -> Result<CoreBPE, EstimateError> {
    let result = match name {
        "o200k_base" => tiktoken_rs::o200k_base(),
        "cl100k_base" => tiktoken_rs::cl100k_base(),
        "p50k_base" => tiktoken_rs::p50k_base(),
        "r50k_base" => tiktoken_rs::r50k_base(),
        other => return Err(EstimateError::UnknownEncoding(other.to_string())),
    };
    result.map_err(|e| EstimateError::Tokenizer(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BatchRequest, Message, RequestBody};

    fn make_request(text: &str, response_format: Option<serde_json::Value>) -> BatchRequest {
        BatchRequest::new(
            "n1",
            RequestBody {
                model: "gpt-5-mini".to_string(),
                messages: vec![
                    Message::system("Eres un analista."),
                    Message::user(Some(text.to_string())),
                ],
                response_format,
                temperature: None,
                max_tokens: None,
            },
        )
    }

    fn write_store(dir: &tempfile::TempDir, requests: &[BatchRequest]) -> std::path::PathBuf {
        let path = dir.path().join("batch_input.jsonl");
        store::write_records(&path, requests).unwrap();
        path
    }

    #[test]
    fn test_estimate_counts_all_requests() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(
            &dir,
            &[make_request("primer titular", None), make_request("segundo", None)],
        );

        let estimate = estimate_file(&path, DEFAULT_ENCODING, None, None).unwrap();
        assert_eq!(estimate.requests, 2);
        // 2 messages per request: at least the fixed overheads
        assert!(estimate.input_tokens > 2 * (TOKENS_PER_REQUEST + 2 * TOKENS_PER_MESSAGE));
        assert_eq!(estimate.output_tokens, 0);
        assert!(estimate.total_cost_usd().is_none());
    }

    #[test]
    fn test_response_format_adds_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let bare = write_store(&dir, &[make_request("titular", None)]);
        let bare_estimate = estimate_file(&bare, DEFAULT_ENCODING, None, None).unwrap();

        let with_schema = dir.path().join("schema.jsonl");
        store::write_records(
            &with_schema,
            &[make_request(
                "titular",
                Some(crate::prompts::LabelTask::Clickbait.response_format()),
            )],
        )
        .unwrap();
        let schema_estimate = estimate_file(&with_schema, DEFAULT_ENCODING, None, None).unwrap();

        assert!(schema_estimate.input_tokens > bare_estimate.input_tokens);
    }

    #[test]
    fn test_cost_projection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(&dir, &[make_request("titular", None)]);

        let estimate = estimate_file(&path, DEFAULT_ENCODING, Some(2.5), Some(10.0)).unwrap();
        let expected = estimate.input_tokens as f64 / 1_000_000.0 * 2.5;
        assert!((estimate.cost_input_usd.unwrap() - expected).abs() < 1e-12);
        // Zero projected output tokens price to zero
        assert_eq!(estimate.cost_output_usd, Some(0.0));
        assert!((estimate.total_cost_usd().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_store_estimates_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::write(&path, "").unwrap();

        let estimate = estimate_file(&path, DEFAULT_ENCODING, None, None).unwrap();
        assert_eq!(estimate.requests, 0);
        assert_eq!(estimate.input_tokens, 0);
    }

    #[test]
    fn test_unknown_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(&dir, &[make_request("a", None)]);

        let result = estimate_file(&path, "x100k_fake", None, None);
        assert!(matches!(result, Err(EstimateError::UnknownEncoding(_))));
    }

    #[test]
    fn test_report_formatting() {
        let estimate = CostEstimate {
            requests: 3,
            input_tokens: 1200,
            output_tokens: 0,
            cost_input_usd: Some(0.003),
            cost_output_usd: None,
        };
        let report = estimate.report("batch_input.jsonl");
        assert!(report.contains("batch_input.jsonl"));
        assert!(report.contains("1200"));
        assert!(report.contains("$0.0030"));
        assert!(report.contains("N/A"));
    }
}
