//! The `examforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examforge_core::parser;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let exams = parser::load_catalog(&catalog_path)?;

    for exam in &exams {
        println!(
            "Exam: {} [{}] ({} questions)",
            exam.title,
            exam.id,
            exam.question_count()
        );
    }

    let warnings = parser::validate_catalog(&exams);
    for w in &warnings {
        let prefix = w
            .exam_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
