//! Document-to-exam generation pipeline.
//!
//! A job runs in two phases: uploading, which reports progress in fixed
//! steps up to 100%, and authoring, which hands the document to an
//! [`ExamAuthor`] and commits the resulting exam to the repository. Only one
//! job runs at a time; every exit path returns the pipeline to idle.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::GenerationError;
use crate::model::{Document, DocumentFormat, Exam};
use crate::repository::ExamRepository;
use crate::traits::{AuthorRequest, ExamAuthor};

/// Largest document accepted by default (20 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Configuration for the generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Progress increment per upload step, in percent.
    pub upload_step_percent: u8,
    /// Pause after each upload progress report.
    pub upload_step_delay: Duration,
    /// Size ceiling for documents.
    pub max_document_bytes: u64,
    /// Formats this pipeline accepts.
    pub accepted_formats: Vec<DocumentFormat>,
    /// Give up on the author after this long.
    pub authoring_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upload_step_percent: 20,
            upload_step_delay: Duration::from_millis(200),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            accepted_formats: DocumentFormat::ALL.to_vec(),
            authoring_timeout: None,
        }
    }
}

/// Phase of the current generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Idle,
    Uploading,
    Authoring,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Idle => write!(f, "idle"),
            JobPhase::Uploading => write!(f, "uploading"),
            JobPhase::Authoring => write!(f, "authoring"),
        }
    }
}

/// Observable state of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub phase: JobPhase,
    /// Upload progress in percent.
    pub progress: u8,
}

impl GenerationJob {
    pub const fn idle() -> Self {
        Self {
            phase: JobPhase::Idle,
            progress: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase != JobPhase::Idle
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_phase(&self, phase: JobPhase);
    fn on_progress(&self, percent: u8);
    fn on_complete(&self, exam: &Exam);
    fn on_failure(&self, error: &GenerationError);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_phase(&self, _: JobPhase) {}
    fn on_progress(&self, _: u8) {}
    fn on_complete(&self, _: &Exam) {}
    fn on_failure(&self, _: &GenerationError) {}
}

/// Progress values reported during upload: 0, step, 2*step, ... ending at 100.
pub fn upload_steps(step_percent: u8) -> Vec<u8> {
    let step = usize::from(step_percent.clamp(1, 100));
    let mut steps: Vec<u8> = (0..=100u8).step_by(step).collect();
    if steps.last() != Some(&100) {
        steps.push(100);
    }
    steps
}

/// Turns uploaded documents into exams, one job at a time.
pub struct GenerationPipeline {
    repository: ExamRepository,
    author: Arc<dyn ExamAuthor>,
    config: PipelineConfig,
    status: watch::Sender<GenerationJob>,
}

impl GenerationPipeline {
    pub fn new(
        repository: ExamRepository,
        author: Arc<dyn ExamAuthor>,
        config: PipelineConfig,
    ) -> Self {
        let (status, _) = watch::channel(GenerationJob::idle());
        Self {
            repository,
            author,
            config,
            status,
        }
    }

    /// Current job state.
    pub fn status(&self) -> GenerationJob {
        *self.status.borrow()
    }

    /// Watch job state changes.
    pub fn subscribe(&self) -> watch::Receiver<GenerationJob> {
        self.status.subscribe()
    }

    pub fn repository(&self) -> &ExamRepository {
        &self.repository
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one generation job.
    ///
    /// Success and failure are both reported to `progress` and returned. A
    /// call made while another job is running fails with
    /// [`GenerationError::ConcurrentGenerationConflict`] and leaves that job
    /// untouched. Documents that fail the format or size checks are rejected
    /// before the job state changes.
    pub async fn generate(
        &self,
        document: Document,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Arc<Exam>, GenerationError> {
        let result = match self.check_document(&document) {
            Err(e) => Err(e),
            Ok(()) => self.claim_and_run(document, progress, cancel).await,
        };

        match &result {
            Ok(exam) => progress.on_complete(exam),
            Err(e) => {
                tracing::error!("generation failed: {e}");
                progress.on_failure(e);
            }
        }
        result
    }

    async fn claim_and_run(
        &self,
        document: Document,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Arc<Exam>, GenerationError> {
        match self.claim() {
            Some(job) => {
                let result = self.run(document, progress, cancel).await;
                drop(job);
                result
            }
            None => {
                tracing::warn!("generation requested while another job is in flight");
                Err(GenerationError::ConcurrentGenerationConflict)
            }
        }
    }

    async fn run(
        &self,
        document: Document,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Arc<Exam>, GenerationError> {
        tracing::info!(
            document = %document.name,
            format = %document.format,
            bytes = document.size(),
            author = self.author.name(),
            "generation started"
        );

        progress.on_phase(JobPhase::Uploading);
        for percent in upload_steps(self.config.upload_step_percent) {
            self.status.send_modify(|job| job.progress = percent);
            progress.on_progress(percent);
            tracing::debug!(percent, "upload progress");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                _ = tokio::time::sleep(self.config.upload_step_delay) => {}
            }
        }

        self.status.send_modify(|job| job.phase = JobPhase::Authoring);
        progress.on_phase(JobPhase::Authoring);

        let request = AuthorRequest::new(document);
        let authored = async {
            match self.config.authoring_timeout {
                Some(limit) => {
                    match tokio::time::timeout(limit, self.author.author(&request)).await {
                        Ok(result) => result.map_err(GenerationError::Authoring),
                        Err(_) => Err(GenerationError::AuthoringTimeout(limit.as_secs())),
                    }
                }
                None => self
                    .author
                    .author(&request)
                    .await
                    .map_err(GenerationError::Authoring),
            }
        };

        let draft = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            draft = authored => draft?,
        };

        if draft.questions.is_empty() {
            return Err(GenerationError::EmptyDraft);
        }
        let exam = Exam::from_draft(draft)?;
        Ok(self.repository.add(exam))
    }

    fn check_document(&self, document: &Document) -> Result<(), GenerationError> {
        if !self.config.accepted_formats.contains(&document.format) {
            return Err(GenerationError::FormatNotAccepted(document.format));
        }
        if document.bytes.is_empty() {
            return Err(GenerationError::EmptyDocument(document.name.clone()));
        }
        if document.size() > self.config.max_document_bytes {
            return Err(GenerationError::DocumentTooLarge {
                size: document.size(),
                limit: self.config.max_document_bytes,
            });
        }
        Ok(())
    }

    fn claim(&self) -> Option<JobGuard<'_>> {
        let claimed = self.status.send_if_modified(|job| {
            if job.is_running() {
                return false;
            }
            *job = GenerationJob {
                phase: JobPhase::Uploading,
                progress: 0,
            };
            true
        });
        claimed.then(|| JobGuard {
            status: &self.status,
        })
    }
}

/// Returns the pipeline to idle when the job ends, however it ends.
struct JobGuard<'a> {
    status: &'a watch::Sender<GenerationJob>,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.status.send_replace(GenerationJob::idle());
    }
}
