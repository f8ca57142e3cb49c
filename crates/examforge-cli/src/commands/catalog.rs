//! The `examforge catalog` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{catalog_table, load_workspace};

pub fn execute(catalog: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let (_, repository) = load_workspace(catalog, config_path.as_deref())?;

    let ready = repository
        .list_all()
        .iter()
        .filter(|exam| exam.is_ready())
        .count();
    println!(
        "{} exams in catalog, {} ready to take",
        repository.len(),
        ready
    );
    println!("{}", catalog_table(&repository));

    Ok(())
}
