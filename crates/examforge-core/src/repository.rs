//! In-memory exam catalog.

use std::sync::{Arc, PoisonError, RwLock};

use crate::model::Exam;

/// Ordered, shared collection of exams, most recently added first.
///
/// Cloning yields another handle to the same collection. Writers are
/// serialized by the lock, so concurrent `add` calls never lose an exam.
#[derive(Debug, Clone, Default)]
pub struct ExamRepository {
    exams: Arc<RwLock<Vec<Arc<Exam>>>>,
}

impl ExamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a repository, keeping the given order.
    pub fn from_exams(exams: impl IntoIterator<Item = Exam>) -> Self {
        let exams = exams.into_iter().map(Arc::new).collect();
        Self {
            exams: Arc::new(RwLock::new(exams)),
        }
    }

    /// Snapshot of every exam in catalog order.
    pub fn list_all(&self) -> Vec<Arc<Exam>> {
        self.exams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Insert an exam at the front of the catalog.
    pub fn add(&self, exam: Exam) -> Arc<Exam> {
        let exam = Arc::new(exam);
        self.exams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, Arc::clone(&exam));
        tracing::info!(exam_id = %exam.id, title = %exam.title, "exam added to catalog");
        exam
    }

    pub fn find(&self, id: &str) -> Option<Arc<Exam>> {
        self.exams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|exam| exam.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.exams.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(id: &str) -> Exam {
        Exam {
            id: id.into(),
            title: format!("Exam {id}"),
            category: "test".into(),
            duration_minutes: 10,
            planned_questions: None,
            questions: vec![],
        }
    }

    #[test]
    fn seed_order_is_preserved() {
        let repo = ExamRepository::from_exams([exam("a"), exam("b")]);
        let ids: Vec<_> = repo.list_all().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn add_prepends() {
        let repo = ExamRepository::from_exams([exam("a")]);
        repo.add(exam("b"));
        repo.add(exam("c"));
        let ids: Vec<_> = repo.list_all().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn clones_share_state() {
        let repo = ExamRepository::new();
        assert!(repo.is_empty());
        let other = repo.clone();
        other.add(exam("x"));
        assert_eq!(repo.find("x").map(|e| e.id.clone()), Some("x".to_string()));
        assert!(repo.find("missing").is_none());
    }

    #[test]
    fn snapshots_are_not_affected_by_later_adds() {
        let repo = ExamRepository::from_exams([exam("a")]);
        let snapshot = repo.list_all();
        repo.add(exam("b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn concurrent_adds_are_all_kept() {
        let repo = ExamRepository::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    repo.add(exam(&format!("t{i}")));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repo.len(), 8);
    }
}
