use thiserror::Error;

/// Block offsets do not line up with the blocks they are meant to style.
///
/// Always an integration bug: styling is aborted before anything is sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("expected {expected} offsets (one per non-blank block), got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("offset {index} has start {start} after end {end}")]
    InvalidRange {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("offset {index} starts at {start}, not after the previous block ending at {previous_end}")]
    OutOfOrder {
        index: usize,
        start: usize,
        previous_end: usize,
    },

    #[error("offset {index} covers {actual} characters but its block text has {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Failure reported by a document service. Never retried.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to the document service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("document service response has no `{0}` field")]
    MissingField(&'static str),
}

/// A conversion that stopped before producing a finished document.
///
/// Every variant after [`ConvertError::Create`] carries the URL of the
/// document that was created, which exists but is incomplete.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("could not create document: {0}")]
    Create(#[source] ServiceError),

    #[error("document {url} was created but inserting its text failed: {source}")]
    Insert {
        url: String,
        #[source]
        source: ServiceError,
    },

    #[error("document {url} was left unformatted: {source}")]
    Alignment {
        url: String,
        #[source]
        source: AlignmentError,
    },

    #[error("formatting of document {url} is incomplete: {source}")]
    Styling {
        url: String,
        #[source]
        source: ServiceError,
    },
}

impl ConvertError {
    pub fn document_url(&self) -> Option<&str> {
        match self {
            ConvertError::Create(_) => None,
            ConvertError::Insert { url, .. }
            | ConvertError::Alignment { url, .. }
            | ConvertError::Styling { url, .. } => Some(url),
        }
    }
}
