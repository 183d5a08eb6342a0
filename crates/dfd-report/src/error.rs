//! Report error types.

use dfd_models::ResultShapeError;
use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Malformed result: {0}")]
    MalformedResult(#[from] ResultShapeError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
