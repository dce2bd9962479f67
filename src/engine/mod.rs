//! Concurrency-bounded direct execution engine.
//!
//! Converts a batch-formatted job into direct chat-completions calls:
//! one call per request record, at most `concurrency` calls outstanding at
//! once, each record's failure isolated into its own result record. The
//! finished run is written back as a job store with the same shape the
//! Batch API would have produced.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::StoreError;
use crate::llm::ChatApi;
use crate::records::{BatchRequest, BatchResult};
use crate::store;

/// Outcome of a [`process_file`] run.
#[derive(Debug)]
pub enum RunOutcome {
    /// All records resolved and the output store was written.
    Completed(Vec<BatchResult>),
    /// The operator interrupted the run; in-flight calls were abandoned
    /// and no output was written.
    Interrupted,
}

/// Execute every request as a direct call, bounded by `concurrency`.
///
/// Admission follows input order through a counting semaphore; completion
/// order is unconstrained. `model_override`, when given, replaces the model
/// field of every record before dispatch (used to force an Azure deployment
/// name). Returns exactly one result per input record; a record whose call
/// fails yields a failure result instead of aborting the run.
pub async fn execute<C>(
    client: &C,
    records: Vec<BatchRequest>,
    concurrency: usize,
    model_override: Option<&str>,
) -> Vec<BatchResult>
where
    C: ChatApi + ?Sized,
{
    if concurrency == 0 {
        tracing::warn!("Concurrency must be at least 1; clamping");
    }
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = records.len();
    let done = AtomicUsize::new(0);
    let done = &done;

    let mut calls = Vec::with_capacity(total);
    for mut request in records {
        if let Some(model) = model_override {
            request.body.model = model.to_string();
        }
        let semaphore = semaphore.clone();
        calls.push(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let result = dispatch(client, &request).await;
            let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!(
                done = completed,
                total,
                custom_id = %request.custom_id,
                ok = result.is_success(),
                "Request resolved"
            );
            result
        });
    }

    futures::future::join_all(calls).await
}

/// Issue one call and convert its outcome into a result record. Failures
/// become data here; they never unwind past the fan-out boundary.
async fn dispatch<C>(client: &C, request: &BatchRequest) -> BatchResult
where
    C: ChatApi + ?Sized,
{
    match client.complete(&request.body).await {
        Ok(completion) => match completion.choices.into_iter().next() {
            Some(choice) => BatchResult::success(
                &request.custom_id,
                completion.id,
                choice.content,
                choice.role,
            ),
            None => BatchResult::failure(&request.custom_id, "response contained no choices"),
        },
        Err(err) => BatchResult::failure(&request.custom_id, err),
    }
}

/// Read a request store, execute it directly, and write the result store.
///
/// Races the run against Ctrl-C: on interrupt the in-flight futures are
/// dropped, nothing is written and the run reports [`RunOutcome::Interrupted`].
pub async fn process_file<C>(
    client: &C,
    input: &Path,
    output: &Path,
    concurrency: usize,
    model_override: Option<&str>,
) -> Result<RunOutcome, StoreError>
where
    C: ChatApi + ?Sized,
{
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    process_file_until(client, input, output, concurrency, model_override, interrupt).await
}

/// [`process_file`] with the shutdown trigger supplied by the caller.
///
/// When `shutdown` resolves first, the fan-out future set is dropped:
/// admission stops, in-flight calls are abandoned and no output is
/// written. A result file, when present, is therefore always complete.
pub async fn process_file_until<C, F>(
    client: &C,
    input: &Path,
    output: &Path,
    concurrency: usize,
    model_override: Option<&str>,
    shutdown: F,
) -> Result<RunOutcome, StoreError>
where
    C: ChatApi + ?Sized,
    F: std::future::Future<Output = ()>,
{
    let records: Vec<BatchRequest> = store::read_records(input)?;
    tracing::info!(
        records = records.len(),
        concurrency,
        "Starting direct processing"
    );
    if let Some(model) = model_override {
        tracing::warn!(model, "Forcing model/deployment name for every request");
    }

    tokio::select! {
        results = execute(client, records, concurrency, model_override) => {
            store::write_records(output, &results)?;
            let failed = results.iter().filter(|r| !r.is_success()).count();
            tracing::info!(
                path = %output.display(),
                total = results.len(),
                succeeded = results.len() - failed,
                failed,
                "Processing complete; results written"
            );
            Ok(RunOutcome::Completed(results))
        }
        _ = shutdown => {
            tracing::info!("Interrupted by operator; in-flight requests abandoned, no output written");
            Ok(RunOutcome::Interrupted)
        }
    }
}
