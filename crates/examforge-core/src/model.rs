//! Core data model types for examforge.
//!
//! Exams own an ordered list of single-choice questions. The question count
//! is always derived from that list; a catalog entry may carry a planned
//! count only while it has no questions yet.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ExamError, GenerationError};

/// A named, categorized assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    /// Unique identifier, stable for the lifetime of the process.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Free-form category label.
    pub category: String,
    /// Nominal duration in minutes. Displayed only, never enforced.
    pub duration_minutes: u32,
    /// Question count announced for an exam whose questions are not loaded yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_questions: Option<usize>,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    /// Mint a fresh exam identifier.
    pub fn generate_id() -> String {
        format!("ex-{}", Uuid::new_v4().simple())
    }

    /// Build an exam from an authored draft, assigning a new identifier.
    pub fn from_draft(draft: ExamDraft) -> Result<Self, ExamError> {
        let exam = Exam {
            id: Self::generate_id(),
            title: draft.title,
            category: draft.category,
            duration_minutes: draft.duration_minutes,
            planned_questions: None,
            questions: draft.questions,
        };
        exam.validate()?;
        Ok(exam)
    }

    /// Number of questions actually present.
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Whether the exam can be started.
    pub fn is_ready(&self) -> bool {
        !self.questions.is_empty()
    }

    /// Nominal duration.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_minutes) * 60)
    }

    /// Check structural invariants: non-blank title, valid questions with
    /// unique ids, and no planned count contradicting the real one.
    pub fn validate(&self) -> Result<(), ExamError> {
        if self.title.trim().is_empty() {
            return Err(ExamError::EmptyTitle);
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            question.validate()?;
            if !seen.insert(question.id) {
                return Err(ExamError::DuplicateQuestionId(question.id));
            }
        }

        if let Some(planned) = self.planned_questions {
            if self.is_ready() && planned != self.questions.len() {
                return Err(ExamError::QuestionCountMismatch {
                    declared: planned,
                    actual: self.questions.len(),
                });
            }
        }

        Ok(())
    }
}

/// Question type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Exactly one option is correct.
    #[default]
    Single,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Single => write!(f, "single"),
        }
    }
}

/// A single-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its exam.
    pub id: u32,
    /// Question type.
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    /// Prompt text.
    pub text: String,
    /// Option texts in display order.
    pub options: Vec<String>,
    /// Zero-based index of the correct option.
    pub answer: usize,
}

impl Question {
    /// Build a validated single-choice question.
    pub fn single(
        id: u32,
        text: impl Into<String>,
        options: Vec<String>,
        answer: usize,
    ) -> Result<Self, ExamError> {
        let question = Question {
            id,
            kind: QuestionKind::Single,
            text: text.into(),
            options,
            answer,
        };
        question.validate()?;
        Ok(question)
    }

    pub fn validate(&self) -> Result<(), ExamError> {
        if self.options.is_empty() {
            return Err(ExamError::NoOptions {
                question_id: self.id,
            });
        }
        if self.answer >= self.options.len() {
            return Err(ExamError::AnswerOutOfRange {
                question_id: self.id,
                answer: self.answer,
                options: self.options.len(),
            });
        }
        Ok(())
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer
    }

    /// Letter shown next to an option (A, B, C, ...).
    pub fn option_label(index: usize) -> char {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < 26)
            .map(|i| char::from(b'A' + i))
            .unwrap_or('?')
    }
}

/// What an authoring backend produces. The pipeline turns it into an [`Exam`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDraft {
    pub title: String,
    pub category: String,
    pub duration_minutes: u32,
    pub questions: Vec<Question>,
}

/// Accepted document formats for exam generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Txt,
    ];

    /// Detect the format from a file name's extension.
    pub fn from_file_name(name: &str) -> Result<Self, GenerationError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
            .map_err(|_| GenerationError::UnsupportedFormat(ext.to_string()))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::Txt => write!(f, "txt"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" | "text" => Ok(DocumentFormat::Txt),
            other => Err(format!("unknown document format: {other}")),
        }
    }
}

/// A document handed to the generation pipeline.
#[derive(Debug, Clone)]
pub struct Document {
    /// Original file name.
    pub name: String,
    /// Format detected from the file name.
    pub format: DocumentFormat,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Wrap in-memory contents, detecting the format from `name`.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, GenerationError> {
        let name = name.into();
        let format = DocumentFormat::from_file_name(&name)?;
        Ok(Document {
            name,
            format,
            bytes,
        })
    }

    /// Read a document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Document::new(name, bytes)?)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Plain-text content, for formats that have one.
    pub fn text(&self) -> Option<String> {
        match self.format {
            DocumentFormat::Txt => Some(String::from_utf8_lossy(&self.bytes).into_owned()),
            DocumentFormat::Pdf | DocumentFormat::Docx => None,
        }
    }
}
