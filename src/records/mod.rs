//! Canonical request and result record types.
//!
//! A [`BatchRequest`] describes one classification call to perform; a
//! [`BatchResult`] captures its outcome. Both serialize to the Batch API
//! line format, so the same records flow through file generation, batch
//! submission and direct processing.

mod request;
mod result;

pub use request::{BatchRequest, Message, RequestBody};
pub use result::{
    BatchResult, ResponseBody, ResultChoice, ResultError, ResultMessage, ResultResponse,
    ERROR_CODE, RESULT_ID_PREFIX,
};
