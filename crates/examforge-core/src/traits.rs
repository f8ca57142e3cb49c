//! Core trait definitions for exam authoring backends.
//!
//! Implemented by the `examforge-authors` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{Document, ExamDraft};

/// Trait for backends that turn an ingested document into an exam draft.
#[async_trait]
pub trait ExamAuthor: Send + Sync {
    /// Human-readable backend name (e.g. "simulated").
    fn name(&self) -> &str;

    /// Produce an exam draft from a document.
    async fn author(&self, request: &AuthorRequest) -> anyhow::Result<ExamDraft>;
}

/// Request to author an exam from an uploaded document.
#[derive(Debug, Clone)]
pub struct AuthorRequest {
    /// The uploaded document.
    pub document: Document,
    /// When the upload finished.
    pub requested_at: DateTime<Utc>,
}

impl AuthorRequest {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            requested_at: Utc::now(),
        }
    }
}
