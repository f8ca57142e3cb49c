//! Aggregate statistics over completed attempts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::AttemptRecord;

/// Default pass threshold in percent.
pub const DEFAULT_PASS_THRESHOLD: u8 = 60;

/// Summary of a batch of attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptStats {
    /// Number of attempts considered.
    pub attempts: usize,
    /// Attempts at or above the pass threshold.
    pub passed: usize,
    /// `passed / attempts`, 0.0 when there are no attempts.
    pub pass_rate: f64,
    /// Mean percentage score.
    pub average_percent: f64,
    /// Best percentage per exam id.
    pub best_per_exam: BTreeMap<String, ExamBest>,
}

/// Best result for one exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamBest {
    pub title: String,
    pub attempts: usize,
    pub best_percent: u8,
}

/// Summarize attempts against a pass threshold (percent).
pub fn summarize(records: &[AttemptRecord], pass_threshold: u8) -> AttemptStats {
    if records.is_empty() {
        return AttemptStats::default();
    }

    let attempts = records.len();
    let passed = records
        .iter()
        .filter(|r| r.score.passed(pass_threshold))
        .count();
    let total_percent: u64 = records.iter().map(|r| u64::from(r.score.percent)).sum();

    let mut best_per_exam: BTreeMap<String, ExamBest> = BTreeMap::new();
    for record in records {
        let entry = best_per_exam
            .entry(record.exam_id.clone())
            .or_insert_with(|| ExamBest {
                title: record.exam_title.clone(),
                attempts: 0,
                best_percent: 0,
            });
        entry.attempts += 1;
        entry.best_percent = entry.best_percent.max(record.score.percent);
    }

    AttemptStats {
        attempts,
        passed,
        pass_rate: passed as f64 / attempts as f64,
        average_percent: total_percent as f64 / attempts as f64,
        best_per_exam,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{AnswerSheet, Score};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(exam_id: &str, percent: u8) -> AttemptRecord {
        AttemptRecord {
            id: Uuid::new_v4(),
            exam_id: exam_id.into(),
            exam_title: format!("Exam {exam_id}"),
            score: Score {
                percent,
                correct: 0,
                total: 1,
            },
            answers: AnswerSheet::new(),
            review: vec![],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input() {
        let stats = summarize(&[], DEFAULT_PASS_THRESHOLD);
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.pass_rate, 0.0);
        assert!(stats.best_per_exam.is_empty());
    }

    #[test]
    fn pass_rate_and_average() {
        let records = vec![record("a", 100), record("a", 40), record("b", 60), record("b", 0)];
        let stats = summarize(&records, 60);
        assert_eq!(stats.attempts, 4);
        assert_eq!(stats.passed, 2);
        assert!((stats.pass_rate - 0.5).abs() < f64::EPSILON);
        assert!((stats.average_percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.best_per_exam["a"].best_percent, 100);
        assert_eq!(stats.best_per_exam["b"].best_percent, 60);
        assert_eq!(stats.best_per_exam["b"].attempts, 2);
    }

    #[test]
    fn threshold_is_inclusive() {
        let records = vec![record("a", 59), record("a", 60)];
        assert_eq!(summarize(&records, 60).passed, 1);
        assert_eq!(summarize(&records, 0).passed, 2);
    }
}
