//! Percentage scoring of submitted answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::model::Question;

/// Submitted answers: question position (0-based) → chosen option index.
///
/// Unanswered questions are absent from the map.
pub type AnswerSheet = BTreeMap<usize, usize>;

/// Outcome of scoring one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Integer percentage in `0..=100`.
    pub percent: u8,
    /// Number of correctly answered questions.
    pub correct: usize,
    /// Number of questions scored.
    pub total: usize,
}

impl Score {
    /// Whether the score meets a pass threshold given in percent.
    pub fn passed(&self, threshold: u8) -> bool {
        self.percent >= threshold
    }
}

/// Score `answers` against `questions`.
///
/// The percentage is `correct / total * 100` rounded half up, computed in
/// integer arithmetic so that e.g. 1 of 8 (12.5%) yields 13.
pub fn score(questions: &[Question], answers: &AnswerSheet) -> Result<Score, ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::EmptyQuestionSet);
    }

    let correct = questions
        .iter()
        .enumerate()
        .filter(|(position, question)| {
            answers
                .get(position)
                .is_some_and(|&chosen| question.is_correct(chosen))
        })
        .count();
    let total = questions.len();

    Ok(Score {
        percent: round_percent(correct, total),
        correct,
        total,
    })
}

fn round_percent(correct: usize, total: usize) -> u8 {
    let percent = (correct * 100 + total / 2) / total;
    // correct <= total, so percent <= 100
    u8::try_from(percent).unwrap_or(100)
}
