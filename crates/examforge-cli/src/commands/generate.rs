//! The `examforge generate` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use examforge_authors::create_author;
use examforge_core::error::GenerationError;
use examforge_core::model::{Document, Exam};
use examforge_core::pipeline::{GenerationPipeline, JobPhase, ProgressReporter};

use super::{catalog_table, load_workspace};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_phase(&self, phase: JobPhase) {
        match phase {
            JobPhase::Uploading => eprintln!("  Uploading document..."),
            JobPhase::Authoring => eprintln!("  AI is generating the exam..."),
            JobPhase::Idle => {}
        }
    }

    fn on_progress(&self, percent: u8) {
        eprintln!("  Upload {percent}%");
    }

    fn on_complete(&self, exam: &Exam) {
        eprintln!(
            "  Done: {} ({} questions)",
            exam.title,
            exam.question_count()
        );
    }

    fn on_failure(&self, error: &GenerationError) {
        eprintln!("  FAILED: {error}");
    }
}

pub async fn execute(
    catalog: Option<PathBuf>,
    document_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, repository) = load_workspace(catalog, config_path.as_deref())?;
    let document = Document::from_path(&document_path)?;

    let author = Arc::from(create_author(&config.author));
    let pipeline = GenerationPipeline::new(
        repository.clone(),
        author,
        config.pipeline.to_pipeline_config(),
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    eprintln!(
        "Generating from {} ({} bytes, {})...",
        document.name,
        document.size(),
        document.format
    );
    let exam = pipeline
        .generate(document, &ConsoleReporter, &cancel)
        .await?;

    println!("Generated exam {} \"{}\"", exam.id, exam.title);
    println!("{}", catalog_table(&repository));

    Ok(())
}
