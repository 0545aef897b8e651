use thiserror::Error;

use crate::admission_request::Operation;

/// Requests the processor refuses to touch. The webhook transport turns
/// these into an HTTP 400 before any capability runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("admission request carries an empty uid")]
    MissingUid,

    #[error("admission request carries no kind")]
    MissingKind,

    #[error("admission request for a {operation} operation carries no object")]
    MissingObject { operation: Operation },
}
