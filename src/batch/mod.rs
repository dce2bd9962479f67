//! Batch API job submission, polling and retrieval.

mod gateway;

pub use gateway::{BatchGateway, BatchJob, BatchStatus};
