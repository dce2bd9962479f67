//! Request file generation from tabular datasets.
//!
//! Maps a Parquet dataset of news items to a Batch-API-ready request store:
//! one line per row, carrying the task's system prompt, the row text and a
//! strict structured-output schema.

use std::path::Path;

use arrow::array::{Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::GenerateError;
use crate::prompts::LabelTask;
use crate::records::{BatchRequest, Message, RequestBody};
use crate::store;

/// Default name of the dataset column holding the text to classify.
pub const DEFAULT_TEXT_COLUMN: &str = "texto";

/// Read a Parquet dataset and build one request record per row.
///
/// The `id` column supplies each record's `custom_id`; rows with a null id
/// cannot be correlated and are skipped with a warning.
pub fn generate_requests(
    input: &Path,
    model: &str,
    task: LabelTask,
    text_column: &str,
) -> Result<Vec<BatchRequest>, GenerateError> {
    let file = std::fs::File::open(input)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut requests = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let ids = string_column(&batch, "id")?;
        let texts = string_column(&batch, text_column)?;

        for (row, (id, text)) in ids.into_iter().zip(texts).enumerate() {
            let Some(custom_id) = id else {
                tracing::warn!(row, "Skipping row with null id");
                continue;
            };
            let body = RequestBody {
                model: model.to_string(),
                messages: vec![Message::system(task.prompt()), Message::user(text)],
                response_format: Some(task.response_format()),
                temperature: None,
                max_tokens: None,
            };
            requests.push(BatchRequest::new(custom_id, body));
        }
    }

    Ok(requests)
}

/// Generate a request store file from a Parquet dataset. Returns the
/// number of records written.
pub fn generate_file(
    input: &Path,
    output: &Path,
    model: &str,
    task: LabelTask,
    text_column: &str,
) -> Result<usize, GenerateError> {
    let requests = generate_requests(input, model, task, text_column)?;
    store::write_records(output, &requests)?;
    tracing::info!(
        path = %output.display(),
        records = requests.len(),
        "Request file written"
    );
    Ok(requests.len())
}

/// Extract a column as optional strings. Utf8 columns are taken as-is;
/// Int64 id columns are formatted, since upstream datasets carry both.
fn string_column(
    batch: &RecordBatch,
    name: &str,
) -> Result<Vec<Option<String>>, GenerateError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| GenerateError::MissingColumn(name.to_string()))?;

    if let Some(arr) = column.as_any().downcast_ref::<StringArray>() {
        return Ok((0..arr.len())
            .map(|i| (!arr.is_null(i)).then(|| arr.value(i).to_string()))
            .collect());
    }
    if let Some(arr) = column.as_any().downcast_ref::<Int64Array>() {
        return Ok((0..arr.len())
            .map(|i| (!arr.is_null(i)).then(|| arr.value(i).to_string()))
            .collect());
    }

    Err(GenerateError::ColumnType {
        column: name.to_string(),
        expected: "utf8 or int64".to_string(),
    })
}
