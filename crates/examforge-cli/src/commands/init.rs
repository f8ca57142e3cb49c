//! The `examforge init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examforge.toml").exists() {
        println!("examforge.toml already exists, skipping.");
    } else {
        std::fs::write("examforge.toml", SAMPLE_CONFIG)?;
        println!("Created examforge.toml");
    }

    std::fs::create_dir_all("exams")?;
    let catalog_path = std::path::Path::new("exams/catalog.toml");
    if catalog_path.exists() {
        println!("exams/catalog.toml already exists, skipping.");
    } else {
        std::fs::write(catalog_path, EXAMPLE_CATALOG)?;
        println!("Created exams/catalog.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: examforge catalog");
    println!("  2. Run: examforge take --exam ex-001");
    println!("  3. Run: examforge generate --document <file.pdf>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examforge configuration

pass_threshold = 60
catalog = "exams"

[pipeline]
upload_step_percent = 20
upload_step_delay_ms = 200
max_document_bytes = 20971520
accepted_formats = ["pdf", "docx", "txt"]
# authoring_timeout_secs = 30

[author]
type = "simulated"
delay_ms = 1500

# Serve a hand-written draft instead:
# [author]
# type = "fixture"
# path = "${HOME}/drafts/next.toml"
"#;

const EXAMPLE_CATALOG: &str = r#"[[exams]]
id = "ex-001"
title = "2024 Workplace Safety Assessment"
category = "Safety & Compliance"
duration = 30

[[exams.questions]]
id = 1
type = "single"
text = "Which of the following is forbidden in the production area?"
options = ["Wearing a hard hat", "Wearing overalls", "Smoking", "Wearing a badge"]
answer = 2

[[exams.questions]]
id = 2
type = "single"
text = "In which zone should an extinguisher pressure gauge needle sit?"
options = ["Red", "Yellow", "Green", "Blue"]
answer = 2

[[exams]]
id = "ex-002"
title = "Machining Process Standard, Rev. A"
category = "Process Standards"
questions_count = 10
duration = 60
"#;
