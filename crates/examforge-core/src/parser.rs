//! TOML exam catalog parser.
//!
//! Loads exam catalogs from TOML files and directories, and validates them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Exam, Question, QuestionKind};

/// Intermediate TOML structure for catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    #[serde(default)]
    exams: Vec<TomlExam>,
}

#[derive(Debug, Deserialize)]
struct TomlExam {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    questions_count: Option<usize>,
    #[serde(default = "default_duration")]
    duration: u32,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

fn default_category() -> String {
    "General".to_string()
}

fn default_duration() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u32,
    #[serde(rename = "type", default)]
    kind: QuestionKind,
    text: String,
    options: Vec<String>,
    answer: usize,
}

/// Parse a single TOML catalog file.
pub fn parse_catalog(path: &Path) -> Result<Vec<Exam>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into exams (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Vec<Exam>> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    parsed
        .exams
        .into_iter()
        .map(|e| -> Result<Exam> {
            let questions = e
                .questions
                .into_iter()
                .map(|q| Question {
                    id: q.id,
                    kind: q.kind,
                    text: q.text,
                    options: q.options,
                    answer: q.answer,
                })
                .collect();

            let exam = Exam {
                id: e.id.unwrap_or_else(Exam::generate_id),
                title: e.title,
                category: e.category,
                duration_minutes: e.duration,
                planned_questions: e.questions_count,
                questions,
            };
            exam.validate().with_context(|| {
                format!("invalid exam '{}' in {}", exam.id, source_path.display())
            })?;
            Ok(exam)
        })
        .collect()
}

/// Recursively load all `.toml` catalog files from a directory, in file name
/// order. Files that fail to parse are skipped with a warning; an exam ID
/// defined in more than one file is an error.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Exam>> {
    let mut files = Vec::new();
    collect_catalog_files(dir, &mut files)?;
    merge_unique(files)
}

fn collect_catalog_files(dir: &Path, files: &mut Vec<(PathBuf, Vec<Exam>)>) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_catalog_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalog(&path) {
                Ok(parsed) => files.push((path, parsed)),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// Flatten per-file exams, rejecting any exam ID seen twice.
fn merge_unique(files: Vec<(PathBuf, Vec<Exam>)>) -> Result<Vec<Exam>> {
    let mut sources: HashMap<String, PathBuf> = HashMap::new();
    let mut exams = Vec::new();

    for (path, parsed) in files {
        for exam in parsed {
            if let Some(first) = sources.get(&exam.id) {
                anyhow::bail!(
                    "duplicate exam ID '{}' in {} (first defined in {})",
                    exam.id,
                    path.display(),
                    first.display()
                );
            }
            sources.insert(exam.id.clone(), path.clone());
            exams.push(exam);
        }
    }

    Ok(exams)
}

/// Load a catalog from a file or a directory. Exam IDs must be unique
/// across everything loaded.
pub fn load_catalog(path: &Path) -> Result<Vec<Exam>> {
    if path.is_dir() {
        load_catalog_directory(path)
    } else {
        merge_unique(vec![(path.to_path_buf(), parse_catalog(path)?)])
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The exam ID (if applicable).
    pub exam_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a catalog for issues that do not prevent loading it.
pub fn validate_catalog(exams: &[Exam]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for exam in exams {
        if !seen_ids.insert(&exam.id) {
            warnings.push(ValidationWarning {
                exam_id: Some(exam.id.clone()),
                message: format!("duplicate exam ID: {}", exam.id),
            });
        }
    }

    for exam in exams {
        if !exam.is_ready() {
            warnings.push(ValidationWarning {
                exam_id: Some(exam.id.clone()),
                message: "exam has no questions and cannot be started".into(),
            });
        }

        if exam.duration_minutes == 0 {
            warnings.push(ValidationWarning {
                exam_id: Some(exam.id.clone()),
                message: "duration is zero minutes".into(),
            });
        }

        for question in &exam.questions {
            if question.text.trim().is_empty() {
                warnings.push(ValidationWarning {
                    exam_id: Some(exam.id.clone()),
                    message: format!("question {} has an empty prompt", question.id),
                });
            }

            let distinct: HashSet<&str> = question.options.iter().map(|o| o.trim()).collect();
            if distinct.len() != question.options.len() {
                warnings.push(ValidationWarning {
                    exam_id: Some(exam.id.clone()),
                    message: format!("question {} has duplicate options", question.id),
                });
            }

            if question.options.len() == 1 {
                warnings.push(ValidationWarning {
                    exam_id: Some(exam.id.clone()),
                    message: format!("question {} has a single option", question.id),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[[exams]]
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
text = "In which zone should an extinguisher gauge needle sit?"
options = ["Red", "Yellow", "Green", "Blue"]
answer = 2

[[exams]]
id = "ex-002"
title = "Machining Process Standard, Rev. A"
category = "Technical Standards"
questions_count = 10
duration = 60
"#;

    #[test]
    fn parse_valid_toml() {
        let exams = parse_catalog_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(exams.len(), 2);
        assert_eq!(exams[0].id, "ex-001");
        assert_eq!(exams[0].question_count(), 2);
        assert_eq!(exams[0].questions[1].kind, QuestionKind::Single);
        assert!(exams[0].is_ready());
        assert_eq!(exams[1].planned_questions, Some(10));
        assert!(!exams[1].is_ready());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[[exams]]
title = "Minimal"

[[exams.questions]]
id = 1
text = "Pick one"
options = ["yes"]
answer = 0
"#;
        let exams = parse_catalog_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(exams[0].id.starts_with("ex-"));
        assert_eq!(exams[0].category, "General");
        assert_eq!(exams[0].duration_minutes, 30);
    }

    #[test]
    fn reject_answer_out_of_range() {
        let toml = r#"
[[exams]]
id = "bad"
title = "Bad"

[[exams.questions]]
id = 1
text = "Pick one"
options = ["a", "b"]
answer = 2
"#;
        let err = parse_catalog_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("out of range"));
    }

    #[test]
    fn reject_count_contradicting_questions() {
        let toml = r#"
[[exams]]
id = "mismatch"
title = "Mismatch"
questions_count = 5

[[exams.questions]]
id = 1
text = "Pick one"
options = ["a", "b"]
answer = 0
"#;
        let err = parse_catalog_str(toml, &PathBuf::from("m.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("does not match"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_catalog_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_flags_not_ready_and_duplicates() {
        let mut exams = parse_catalog_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        exams.push(exams[0].clone());
        let warnings = validate_catalog(&exams);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate exam ID")));
        assert!(warnings
            .iter()
            .any(|w| w.exam_id.as_deref() == Some("ex-002") && w.message.contains("no questions")));
    }

    #[test]
    fn validate_flags_duplicate_options() {
        let toml = r#"
[[exams]]
id = "dup"
title = "Dup"

[[exams.questions]]
id = 1
text = "Pick one"
options = ["same", "same "]
answer = 0
"#;
        let exams = parse_catalog_str(toml, &PathBuf::from("d.toml")).unwrap();
        let warnings = validate_catalog(&exams);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate options")));
    }

    #[test]
    fn load_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            "[[exams]]\nid = \"second\"\ntitle = \"B\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.toml"),
            "[[exams]]\nid = \"first\"\ntitle = \"A\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [toml").unwrap();

        let exams = load_catalog(dir.path()).unwrap();
        let ids: Vec<_> = exams.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn load_directory_rejects_ids_shared_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let exam = |answer: usize| {
            format!(
                "[[exams]]\nid = \"ex-001\"\ntitle = \"Safety\"\n\n[[exams.questions]]\nid = 1\ntext = \"Pick\"\noptions = [\"a\", \"b\"]\nanswer = {answer}\n"
            )
        };
        std::fs::write(dir.path().join("a.toml"), exam(0)).unwrap();
        std::fs::create_dir(dir.path().join("more")).unwrap();
        std::fs::write(dir.path().join("more").join("b.toml"), exam(1)).unwrap();

        let err = load_catalog(dir.path()).unwrap_err().to_string();
        assert!(err.contains("duplicate exam ID 'ex-001'"));
        assert!(err.contains("b.toml"));
        assert!(err.contains("a.toml"));
    }

    #[test]
    fn load_file_rejects_repeated_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[exams]]\nid = \"same\"\ntitle = \"A\"\n\n[[exams]]\nid = \"same\"\ntitle = \"B\"\n",
        )
        .unwrap();

        let err = load_catalog(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate exam ID 'same'"));
        // the single-file parser still returns both for validation
        assert_eq!(parse_catalog(&path).unwrap().len(), 2);
    }
}
