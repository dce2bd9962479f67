//! Line-delimited (JSONL) job store.
//!
//! Reads and writes collections of request/result records as one JSON
//! object per line. Malformed lines are logged with their 1-based line
//! number and skipped; they never abort the read of subsequent lines.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Read all well-formed records from a job store file.
///
/// Empty lines are ignored. A line that fails to parse is reported via
/// `tracing::warn!` and skipped; lines before and after it are still
/// returned.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let content = fs::read_to_string(path)?;
    let mut records = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(line = idx + 1, error = %err, "Skipping malformed line");
            }
        }
    }

    Ok(records)
}

/// Write records to a job store file, one JSON object per line, in the
/// order provided. Non-ASCII text is written unescaped. An empty slice
/// produces an empty file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BatchRequest, BatchResult, Message, RequestBody};

    fn make_request(custom_id: &str, text: &str) -> BatchRequest {
        BatchRequest::new(
            custom_id,
            RequestBody {
                model: "gpt-5-mini".to_string(),
                messages: vec![Message::user(Some(text.to_string()))],
                response_format: None,
                temperature: None,
                max_tokens: None,
            },
        )
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch_input.jsonl");

        let requests = vec![make_request("n1", "hola"), make_request("n2", "adiós")];
        write_records(&path, &requests).unwrap();

        let loaded: Vec<BatchRequest> = read_records(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].custom_id, "n1");
        assert_eq!(loaded[1].custom_id, "n2");
        assert_eq!(
            loaded[1].body.messages[0].content.as_deref(),
            Some("adiós")
        );
    }

    #[test]
    fn test_non_ascii_written_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unicode.jsonl");

        write_records(&path, &[make_request("ñ1", "maña del titular")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("maña"));
        assert!(!raw.contains("\\u00f1"));
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn test_malformed_line_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.jsonl");

        let good1 = serde_json::to_string(&make_request("n1", "a")).unwrap();
        let good2 = serde_json::to_string(&make_request("n2", "b")).unwrap();
        fs::write(&path, format!("{good1}\nnot-json{{\n{good2}\n")).unwrap();

        let loaded: Vec<BatchRequest> = read_records(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].custom_id, "n1");
        assert_eq!(loaded[1].custom_id, "n2");
    }

    #[test]
    fn test_blank_lines_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blanks.jsonl");

        let good = serde_json::to_string(&make_request("n1", "a")).unwrap();
        fs::write(&path, format!("\n  \n{good}\n\n")).unwrap();

        let loaded: Vec<BatchRequest> = read_records(&path).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_empty_write_produces_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");

        let results: Vec<BatchResult> = Vec::new();
        write_records(&path, &results).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.is_empty());

        let loaded: Vec<BatchResult> = read_records(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_result_store_roundtrip_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");

        let results = vec![
            BatchResult::success("n1", "req_1", "ok", "assistant"),
            BatchResult::failure("n2", "timed out"),
        ];
        write_records(&path, &results).unwrap();

        let loaded: Vec<BatchResult> = read_records(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            serde_json::to_value(&results).unwrap()
        );
    }
}
