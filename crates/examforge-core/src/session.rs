//! Exam-taking state machine.
//!
//! ```text
//! catalog --select_exam--> active --submit--> result --reset--> catalog
//! ```
//!
//! Any other transition is rejected with [`SessionError::InvalidTransition`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::Exam;
use crate::report::{review_answers, AttemptRecord, QuestionReview};
use crate::repository::ExamRepository;
use crate::scoring::{self, AnswerSheet, Score};

/// Which screen of the exam flow the controller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Catalog,
    Active,
    Result,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Catalog => write!(f, "catalog"),
            SessionPhase::Active => write!(f, "active"),
            SessionPhase::Result => write!(f, "result"),
        }
    }
}

/// One attempt at one exam. Only the controller creates or mutates it.
#[derive(Debug, Clone)]
pub struct Session {
    exam: Arc<Exam>,
    answers: AnswerSheet,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn exam(&self) -> &Arc<Exam> {
        &self.exam
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[derive(Debug)]
enum State {
    Catalog,
    Active(Session),
    Result { session: Session, score: Score },
}

/// Drives a single user's exam attempt.
#[derive(Debug)]
pub struct SessionController {
    state: State,
    history: Vec<AttemptRecord>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: State::Catalog,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            State::Catalog => SessionPhase::Catalog,
            State::Active(_) => SessionPhase::Active,
            State::Result { .. } => SessionPhase::Result,
        }
    }

    /// The in-flight session, in the active and result phases.
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Catalog => None,
            State::Active(session) | State::Result { session, .. } => Some(session),
        }
    }

    pub fn exam(&self) -> Option<&Arc<Exam>> {
        self.session().map(Session::exam)
    }

    pub fn answers(&self) -> Option<&AnswerSheet> {
        self.session().map(Session::answers)
    }

    /// The option currently chosen for a question, if any.
    pub fn answer(&self, position: usize) -> Option<usize> {
        self.answers()
            .and_then(|answers| answers.get(&position).copied())
    }

    /// The score of the submitted attempt. Only available in the result phase.
    pub fn score(&self) -> Option<Score> {
        match &self.state {
            State::Result { score, .. } => Some(*score),
            _ => None,
        }
    }

    /// Completed attempts, oldest first.
    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn last_attempt(&self) -> Option<&AttemptRecord> {
        self.history.last()
    }

    /// Start an attempt. Exams without questions are refused and the
    /// controller stays in the catalog.
    pub fn select_exam(&mut self, exam: Arc<Exam>) -> Result<(), SessionError> {
        if !matches!(self.state, State::Catalog) {
            return Err(self.rejected("select an exam"));
        }
        if !exam.is_ready() {
            tracing::warn!(exam_id = %exam.id, "refusing to start exam without questions");
            return Err(SessionError::InvalidExamState {
                exam_id: exam.id.clone(),
            });
        }

        tracing::info!(exam_id = %exam.id, questions = exam.question_count(), "exam started");
        self.state = State::Active(Session {
            exam,
            answers: AnswerSheet::new(),
            started_at: Utc::now(),
        });
        Ok(())
    }

    /// Look an exam up in the catalog and start it.
    pub fn select_exam_by_id(
        &mut self,
        repository: &ExamRepository,
        exam_id: &str,
    ) -> Result<(), SessionError> {
        let exam = repository
            .find(exam_id)
            .ok_or_else(|| SessionError::ExamNotFound(exam_id.to_string()))?;
        self.select_exam(exam)
    }

    /// Choose an option for a question. A later choice replaces an earlier one.
    pub fn record_answer(&mut self, position: usize, option: usize) -> Result<(), SessionError> {
        let State::Active(session) = &mut self.state else {
            return Err(self.rejected("record an answer"));
        };

        let total = session.exam.question_count();
        let question = session
            .exam
            .questions
            .get(position)
            .ok_or(SessionError::UnknownQuestion { position, total })?;
        if option >= question.options.len() {
            return Err(SessionError::InvalidAnswerIndex {
                position,
                option,
                options: question.options.len(),
            });
        }

        tracing::debug!(position, option, "answer recorded");
        session.answers.insert(position, option);
        Ok(())
    }

    /// Score the attempt and move to the result phase.
    pub fn submit(&mut self) -> Result<Score, SessionError> {
        match std::mem::replace(&mut self.state, State::Catalog) {
            State::Active(session) => {
                match scoring::score(&session.exam.questions, &session.answers) {
                    Ok(score) => {
                        tracing::info!(
                            exam_id = %session.exam.id,
                            percent = score.percent,
                            correct = score.correct,
                            total = score.total,
                            "exam submitted"
                        );
                        self.history
                            .push(AttemptRecord::new(&session, score, Utc::now()));
                        self.state = State::Result { session, score };
                        Ok(score)
                    }
                    Err(e) => {
                        self.state = State::Active(session);
                        Err(e.into())
                    }
                }
            }
            other => {
                self.state = other;
                Err(self.rejected("submit"))
            }
        }
    }

    /// Leave the result screen and discard the session.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, State::Result { .. }) {
            return Err(self.rejected("return to the catalog"));
        }
        self.state = State::Catalog;
        tracing::info!("returned to catalog");
        Ok(())
    }

    /// Per-question breakdown of the submitted attempt.
    pub fn review(&self) -> Result<Vec<QuestionReview>, SessionError> {
        match &self.state {
            State::Result { session, .. } => Ok(review_answers(&session.exam, &session.answers)),
            _ => Err(self.rejected("review answers")),
        }
    }

    /// Time left on the nominal clock. Informational only; submission is
    /// accepted after it reaches zero.
    pub fn remaining_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        let State::Active(session) = &self.state else {
            return None;
        };
        let elapsed = now
            .signed_duration_since(session.started_at)
            .to_std()
            .unwrap_or_default();
        Some(session.exam.duration().saturating_sub(elapsed))
    }

    fn rejected(&self, operation: &'static str) -> SessionError {
        let phase = self.phase();
        tracing::warn!(%phase, operation, "rejected session operation");
        SessionError::InvalidTransition { operation, phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn exam_with_answers(answers: &[usize]) -> Arc<Exam> {
        let questions = answers
            .iter()
            .enumerate()
            .map(|(i, &answer)| {
                Question::single(
                    i as u32 + 1,
                    format!("question {i}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    answer,
                )
                .unwrap()
            })
            .collect();
        Arc::new(Exam {
            id: "ex-test".into(),
            title: "Test exam".into(),
            category: "test".into(),
            duration_minutes: 30,
            planned_questions: None,
            questions,
        })
    }

    fn empty_exam() -> Arc<Exam> {
        Arc::new(Exam {
            id: "ex-empty".into(),
            title: "Empty".into(),
            category: "test".into(),
            duration_minutes: 60,
            planned_questions: Some(10),
            questions: vec![],
        })
    }

    #[test]
    fn starts_in_catalog() {
        let controller = SessionController::new();
        assert_eq!(controller.phase(), SessionPhase::Catalog);
        assert!(controller.exam().is_none());
        assert!(controller.score().is_none());
    }

    #[test]
    fn full_flow() {
        let mut controller = SessionController::new();
        controller.select_exam(exam_with_answers(&[2, 1])).unwrap();
        assert_eq!(controller.phase(), SessionPhase::Active);
        assert!(controller.answers().unwrap().is_empty());

        controller.record_answer(0, 2).unwrap();
        controller.record_answer(1, 1).unwrap();
        let score = controller.submit().unwrap();
        assert_eq!(score.percent, 100);
        assert_eq!(controller.phase(), SessionPhase::Result);
        assert_eq!(controller.score(), Some(score));

        controller.reset().unwrap();
        assert_eq!(controller.phase(), SessionPhase::Catalog);
        assert!(controller.session().is_none());
        assert!(controller.score().is_none());
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn empty_exam_is_refused() {
        let mut controller = SessionController::new();
        let err = controller.select_exam(empty_exam()).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidExamState {
                exam_id: "ex-empty".into()
            }
        );
        assert_eq!(controller.phase(), SessionPhase::Catalog);
    }

    #[test]
    fn submit_outside_active_fails() {
        let mut controller = SessionController::new();
        assert!(matches!(
            controller.submit(),
            Err(SessionError::InvalidTransition {
                phase: SessionPhase::Catalog,
                ..
            })
        ));

        controller.select_exam(exam_with_answers(&[0])).unwrap();
        controller.submit().unwrap();
        assert!(matches!(
            controller.submit(),
            Err(SessionError::InvalidTransition {
                phase: SessionPhase::Result,
                ..
            })
        ));
        assert_eq!(controller.history().len(), 1, "no second attempt recorded");
    }

    #[test]
    fn last_answer_wins() {
        let mut controller = SessionController::new();
        controller.select_exam(exam_with_answers(&[3])).unwrap();
        controller.record_answer(0, 1).unwrap();
        controller.record_answer(0, 3).unwrap();
        assert_eq!(controller.answer(0), Some(3));
        assert_eq!(controller.answers().unwrap().len(), 1);
        assert_eq!(controller.submit().unwrap().percent, 100);
    }

    #[test]
    fn out_of_range_answers_are_rejected() {
        let mut controller = SessionController::new();
        controller.select_exam(exam_with_answers(&[0, 0])).unwrap();

        assert_eq!(
            controller.record_answer(0, 4),
            Err(SessionError::InvalidAnswerIndex {
                position: 0,
                option: 4,
                options: 4
            })
        );
        assert_eq!(
            controller.record_answer(2, 0),
            Err(SessionError::UnknownQuestion {
                position: 2,
                total: 2
            })
        );
        assert!(controller.answers().unwrap().is_empty());
    }

    #[test]
    fn partial_answers_score_unanswered_as_wrong() {
        let mut controller = SessionController::new();
        controller.select_exam(exam_with_answers(&[2, 1])).unwrap();
        controller.record_answer(0, 2).unwrap();
        assert_eq!(controller.submit().unwrap().percent, 50);

        let review = controller.review().unwrap();
        assert_eq!(review.len(), 2);
        assert!(review[0].is_correct);
        assert_eq!(review[1].chosen, None);
        assert!(!review[1].is_correct);
    }

    #[test]
    fn invalid_transitions_from_catalog_and_active() {
        let mut controller = SessionController::new();
        assert!(controller.record_answer(0, 0).is_err());
        assert!(controller.reset().is_err());
        assert!(controller.review().is_err());

        controller.select_exam(exam_with_answers(&[0])).unwrap();
        assert!(controller.select_exam(exam_with_answers(&[1])).is_err());
        assert!(controller.reset().is_err());
        assert_eq!(controller.phase(), SessionPhase::Active);
    }

    #[test]
    fn select_by_id_uses_repository() {
        let repo = ExamRepository::from_exams([(*exam_with_answers(&[0])).clone()]);
        let mut controller = SessionController::new();
        assert_eq!(
            controller.select_exam_by_id(&repo, "nope"),
            Err(SessionError::ExamNotFound("nope".into()))
        );
        controller.select_exam_by_id(&repo, "ex-test").unwrap();
        assert_eq!(controller.exam().unwrap().id, "ex-test");
    }

    #[test]
    fn fresh_session_after_reset() {
        let mut controller = SessionController::new();
        controller.select_exam(exam_with_answers(&[0, 0])).unwrap();
        controller.record_answer(0, 0).unwrap();
        controller.submit().unwrap();
        controller.reset().unwrap();

        controller.select_exam(exam_with_answers(&[0, 0])).unwrap();
        assert!(controller.answers().unwrap().is_empty());
        assert_eq!(controller.submit().unwrap().percent, 0);
        assert_eq!(controller.history().len(), 2);
    }

    #[test]
    fn remaining_time_counts_down_but_is_not_enforced() {
        let mut controller = SessionController::new();
        controller.select_exam(exam_with_answers(&[0])).unwrap();
        let started = controller.session().unwrap().started_at();

        let remaining = controller
            .remaining_time(started + chrono::Duration::minutes(10))
            .unwrap();
        assert_eq!(remaining, Duration::from_secs(20 * 60));

        let overdue = started + chrono::Duration::minutes(45);
        assert_eq!(controller.remaining_time(overdue), Some(Duration::ZERO));
        assert!(controller.submit().is_ok());
        assert!(controller.remaining_time(overdue).is_none());
    }
}
