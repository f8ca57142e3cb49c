pub mod catalog;
pub mod generate;
pub mod init;
pub mod stats;
pub mod take;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use examforge_authors::config::load_config_from;
use examforge_authors::ExamforgeConfig;
use examforge_core::parser;
use examforge_core::repository::ExamRepository;

const DEFAULT_CATALOG: &str = "exams";

/// Load the config, then the catalog named on the command line, in the
/// config, or the default `exams/` directory, in that order.
pub fn load_workspace(
    catalog: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<(ExamforgeConfig, ExamRepository)> {
    let config = load_config_from(config_path)?;
    let catalog = catalog
        .or_else(|| config.catalog.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));

    anyhow::ensure!(
        catalog.exists(),
        "catalog not found: {} (run `examforge init` to create one)",
        catalog.display()
    );
    let exams = parser::load_catalog(&catalog)?;
    tracing::debug!("loaded {} exams from {}", exams.len(), catalog.display());
    Ok((config, ExamRepository::from_exams(exams)))
}

pub fn catalog_table(repository: &ExamRepository) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Title",
        "Category",
        "Questions",
        "Duration",
        "Status",
    ]);

    for exam in repository.list_all() {
        let questions = match (exam.is_ready(), exam.planned_questions) {
            (false, Some(planned)) => format!("0 (planned {planned})"),
            _ => exam.question_count().to_string(),
        };
        let status = if exam.is_ready() { "ready" } else { "not ready" };
        table.add_row(vec![
            Cell::new(&exam.id),
            Cell::new(&exam.title),
            Cell::new(&exam.category),
            Cell::new(questions),
            Cell::new(format!("{} min", exam.duration_minutes)),
            Cell::new(status),
        ]);
    }

    table
}
