//! Attempt records with per-question review and JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Exam;
use crate::scoring::{AnswerSheet, Score};
use crate::session::Session;

/// How one question was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// Position in the exam (0-based).
    pub position: usize,
    pub question_id: u32,
    pub text: String,
    /// Chosen option, `None` when left unanswered.
    pub chosen: Option<usize>,
    /// The correct option.
    pub correct: usize,
    pub is_correct: bool,
}

/// Compare an answer sheet with an exam's answer key, question by question.
pub fn review_answers(exam: &Exam, answers: &AnswerSheet) -> Vec<QuestionReview> {
    exam.questions
        .iter()
        .enumerate()
        .map(|(position, question)| {
            let chosen = answers.get(&position).copied();
            QuestionReview {
                position,
                question_id: question.id,
                text: question.text.clone(),
                chosen,
                correct: question.answer,
                is_correct: chosen.is_some_and(|c| question.is_correct(c)),
            }
        })
        .collect()
}

/// A submitted attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Unique attempt identifier.
    pub id: Uuid,
    pub exam_id: String,
    pub exam_title: String,
    pub score: Score,
    pub answers: AnswerSheet,
    pub review: Vec<QuestionReview>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub(crate) fn new(session: &Session, score: Score, finished_at: DateTime<Utc>) -> Self {
        let exam = session.exam();
        Self {
            id: Uuid::new_v4(),
            exam_id: exam.id.clone(),
            exam_title: exam.title.clone(),
            score,
            answers: session.answers().clone(),
            review: review_answers(exam, session.answers()),
            started_at: session.started_at(),
            finished_at,
        }
    }

    /// Questions answered wrongly or not at all.
    pub fn mistakes(&self) -> impl Iterator<Item = &QuestionReview> {
        self.review.iter().filter(|r| !r.is_correct)
    }

    /// Save the record as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize attempt")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write attempt to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attempt from {}", path.display()))?;
        let record: AttemptRecord =
            serde_json::from_str(&content).context("failed to parse attempt JSON")?;
        Ok(record)
    }

    /// Load every `.json` attempt in a directory (not recursive).
    /// Unreadable files are skipped with a warning.
    pub fn load_directory(dir: &Path) -> Result<Vec<Self>> {
        if !dir.is_dir() {
            anyhow::bail!("not a directory: {}", dir.display());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("failed to read directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match Self::load_json(&path) {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
                }
            }
        }
        records.sort_by_key(|r| r.finished_at);
        Ok(records)
    }
}
