//! The `examforge stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examforge_authors::config::load_config_from;
use examforge_core::report::AttemptRecord;
use examforge_core::statistics;

pub fn execute(
    reports: PathBuf,
    pass_threshold: Option<u8>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let threshold = match pass_threshold {
        Some(t) => {
            anyhow::ensure!(t <= 100, "pass threshold must be between 0 and 100, got {t}");
            t
        }
        None => load_config_from(config_path.as_deref())?.pass_threshold,
    };

    let records = AttemptRecord::load_directory(&reports)?;
    if records.is_empty() {
        println!("No attempts found in {}", reports.display());
        return Ok(());
    }

    let stats = statistics::summarize(&records, threshold);

    println!(
        "{} attempts, {} passed at {}% ({:.1}% pass rate), average score {:.1}%",
        stats.attempts,
        stats.passed,
        threshold,
        stats.pass_rate * 100.0,
        stats.average_percent
    );

    let mut table = Table::new();
    table.set_header(vec!["Exam", "Title", "Attempts", "Best"]);
    for (exam_id, best) in &stats.best_per_exam {
        table.add_row(vec![
            Cell::new(exam_id),
            Cell::new(&best.title),
            Cell::new(best.attempts),
            Cell::new(format!("{}%", best.best_percent)),
        ]);
    }
    println!("{table}");

    Ok(())
}
