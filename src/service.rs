use tracing::debug;

use crate::error::ServiceError;
use crate::requests::{BatchUpdate, DocsOptions, insert_text, to_docs_requests};
use crate::style::StyleOperation;

/// A remote document created by a [`DocumentService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub id: String,
    pub url: String,
}

impl DocumentHandle {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let url = document_url(&id);
        Self { id, url }
    }
}

pub fn document_url(id: &str) -> String {
    format!("https://docs.google.com/document/d/{id}/edit")
}

/// The remote side of a conversion.
///
/// Implementations report failures unchanged; retrying, auth and rate limits
/// are their own business.
pub trait DocumentService {
    fn create(&mut self, title: &str) -> Result<DocumentHandle, ServiceError>;

    fn insert_text(
        &mut self,
        document: &DocumentHandle,
        index: usize,
        text: &str,
    ) -> Result<(), ServiceError>;

    fn apply_styles(
        &mut self,
        document: &DocumentHandle,
        ops: &[StyleOperation],
    ) -> Result<(), ServiceError>;
}

/// Keeps every request in memory instead of sending it. Backs `--dry-run`.
#[derive(Debug, Default)]
pub struct RecordingService {
    options: DocsOptions,
    pub title: Option<String>,
    pub operations: Vec<StyleOperation>,
    pub batches: Vec<BatchUpdate>,
}

impl RecordingService {
    pub const DOCUMENT_ID: &'static str = "dry-run";

    pub fn new(options: DocsOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl DocumentService for RecordingService {
    fn create(&mut self, title: &str) -> Result<DocumentHandle, ServiceError> {
        self.title = Some(title.to_string());
        Ok(DocumentHandle::new(Self::DOCUMENT_ID))
    }

    fn insert_text(
        &mut self,
        _document: &DocumentHandle,
        index: usize,
        text: &str,
    ) -> Result<(), ServiceError> {
        self.batches.push(BatchUpdate {
            requests: vec![insert_text(index, text)],
        });
        Ok(())
    }

    fn apply_styles(
        &mut self,
        _document: &DocumentHandle,
        ops: &[StyleOperation],
    ) -> Result<(), ServiceError> {
        let requests = to_docs_requests(ops, &self.options);
        debug!(requests = requests.len(), "recorded style batch");
        self.operations.extend_from_slice(ops);
        self.batches.push(BatchUpdate { requests });
        Ok(())
    }
}
