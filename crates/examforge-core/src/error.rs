//! Error types for exam validation, scoring, sessions and generation.
//!
//! Every variant is recoverable: callers at the presentation boundary are
//! expected to report the error and let the user retry.

use thiserror::Error;

use crate::model::DocumentFormat;
use crate::session::SessionPhase;

/// Structural problems with an exam or one of its questions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamError {
    /// The exam title is blank.
    #[error("exam title must not be empty")]
    EmptyTitle,

    /// A question was defined without any options.
    #[error("question {question_id} has no options")]
    NoOptions { question_id: u32 },

    /// The correct-answer index points past the option list.
    #[error("question {question_id}: answer index {answer} is out of range for {options} options")]
    AnswerOutOfRange {
        question_id: u32,
        answer: usize,
        options: usize,
    },

    /// Two questions in the same exam share an identifier.
    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(u32),

    /// An advisory question count contradicts the actual question list.
    #[error("declared question count {declared} does not match the {actual} questions provided")]
    QuestionCountMismatch { declared: usize, actual: usize },
}

/// Scoring precondition failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// Scoring an empty question set would divide by zero.
    #[error("cannot score an empty question set")]
    EmptyQuestionSet,
}

/// Rejected session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The selected exam has no questions yet.
    #[error("exam '{exam_id}' has no questions and cannot be started")]
    InvalidExamState { exam_id: String },

    /// No exam with this identifier exists in the catalog.
    #[error("exam not found: {0}")]
    ExamNotFound(String),

    /// The operation is not valid in the controller's current phase.
    #[error("cannot {operation} while in the {phase} phase")]
    InvalidTransition {
        operation: &'static str,
        phase: SessionPhase,
    },

    /// The question position does not exist in the active exam.
    #[error("question position {position} is out of range for {total} questions")]
    UnknownQuestion { position: usize, total: usize },

    /// The chosen option does not exist for the question.
    #[error("option {option} is out of range for question {position} ({options} options)")]
    InvalidAnswerIndex {
        position: usize,
        option: usize,
        options: usize,
    },

    /// Scoring failed during submission.
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Failures of the document-to-exam generation pipeline.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The document format is not one of the accepted formats.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The document exceeds the configured size ceiling.
    #[error("document is {size} bytes, exceeding the {limit} byte limit")]
    DocumentTooLarge { size: u64, limit: u64 },

    /// The document has no content.
    #[error("document '{0}' is empty")]
    EmptyDocument(String),

    /// The format is recognised but not enabled in this pipeline.
    #[error("{0} documents are not accepted by this pipeline")]
    FormatNotAccepted(DocumentFormat),

    /// The authoring backend failed.
    #[error("authoring failed: {0:#}")]
    Authoring(anyhow::Error),

    /// The authoring backend did not answer in time.
    #[error("authoring timed out after {0}s")]
    AuthoringTimeout(u64),

    /// The authoring backend returned an exam that fails validation.
    #[error("authored exam is invalid: {0}")]
    InvalidDraft(#[from] ExamError),

    /// The authoring backend returned an exam without questions.
    #[error("authored exam has no questions")]
    EmptyDraft,

    /// The caller cancelled the job.
    #[error("generation cancelled")]
    Cancelled,

    /// Another generation job is already in flight.
    #[error("a generation job is already in progress")]
    ConcurrentGenerationConflict,
}

impl GenerationError {
    /// Returns `true` if the document itself was rejected, so retrying with the
    /// same input cannot succeed.
    pub fn is_document_rejection(&self) -> bool {
        matches!(
            self,
            GenerationError::UnsupportedFormat(_)
                | GenerationError::DocumentTooLarge { .. }
                | GenerationError::EmptyDocument(_)
                | GenerationError::FormatNotAccepted(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_messages_name_the_phase() {
        let err = SessionError::InvalidTransition {
            operation: "submit",
            phase: SessionPhase::Catalog,
        };
        assert_eq!(err.to_string(), "cannot submit while in the catalog phase");
    }

    #[test]
    fn document_rejections_are_classified() {
        assert!(GenerationError::UnsupportedFormat("xlsx".into()).is_document_rejection());
        assert!(GenerationError::DocumentTooLarge { size: 2, limit: 1 }.is_document_rejection());
        assert!(!GenerationError::Cancelled.is_document_rejection());
        assert!(!GenerationError::ConcurrentGenerationConflict.is_document_rejection());
    }

    #[test]
    fn scoring_error_converts_into_session_error() {
        let err: SessionError = ScoringError::EmptyQuestionSet.into();
        assert_eq!(err, SessionError::Scoring(ScoringError::EmptyQuestionSet));
    }
}
