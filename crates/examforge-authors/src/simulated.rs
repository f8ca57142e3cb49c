//! Simulated AI author.
//!
//! Stands in for a real document-understanding backend: waits for a fixed
//! delay, then returns the same three-question machining exam every time.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;

use examforge_core::model::{ExamDraft, Question};
use examforge_core::traits::{AuthorRequest, ExamAuthor};

/// Delay of the reference authoring step.
pub const DEFAULT_AUTHORING_DELAY: Duration = Duration::from_millis(1500);

/// An author that fabricates a fixed exam after a delay.
pub struct SimulatedAuthor {
    delay: Duration,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Name of the last document received.
    last_document: Mutex<Option<String>>,
}

impl Default for SimulatedAuthor {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORING_DELAY)
    }
}

impl SimulatedAuthor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            call_count: AtomicU32::new(0),
            last_document: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this author.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the name of the last document this author received.
    pub fn last_document(&self) -> Option<String> {
        self.last_document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ExamAuthor for SimulatedAuthor {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn author(&self, request: &AuthorRequest) -> anyhow::Result<ExamDraft> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_document
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.document.name.clone());

        tracing::debug!(
            document = %request.document.name,
            delay_ms = self.delay.as_millis() as u64,
            "simulating authoring"
        );
        tokio::time::sleep(self.delay).await;

        Ok(ExamDraft {
            title: format!(
                "AI-generated exam - {}",
                request.requested_at.with_timezone(&Local).format("%Y-%m-%d")
            ),
            category: "Auto-generated".into(),
            duration_minutes: 20,
            questions: sample_questions()?,
        })
    }
}

fn sample_questions() -> anyhow::Result<Vec<Question>> {
    Ok(vec![
        Question::single(
            1,
            "Based on the document: what is the standard tolerance of this process?",
            vec![
                "±0.01mm".into(),
                "±0.05mm".into(),
                "±0.1mm".into(),
                "No tolerance".into(),
            ],
            0,
        )?,
        Question::single(
            2,
            "Which core lubricant grade does the document specify?",
            vec![
                "L-HT3".into(),
                "M-202".into(),
                "G-Standard".into(),
                "Z-Alpha".into(),
            ],
            1,
        )?,
        Question::single(
            3,
            "Which of these is NOT part of the pre-operation self-check?",
            vec![
                "Pressure test".into(),
                "Visual inspection".into(),
                "Temperature calibration".into(),
                "Clocking in for lunch".into(),
            ],
            3,
        )?,
    ])
}
