//! The `examforge take` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};

use examforge_core::model::{Exam, Question};
use examforge_core::session::SessionController;

use super::load_workspace;

pub fn execute(
    catalog: Option<PathBuf>,
    exam_id: String,
    answers: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, repository) = load_workspace(catalog, config_path.as_deref())?;

    let mut controller = SessionController::new();
    controller.select_exam_by_id(&repository, &exam_id)?;
    let exam = controller
        .exam()
        .cloned()
        .context("no active session after selecting an exam")?;

    println!(
        "{} [{}], {} questions, {} min",
        exam.title,
        exam.id,
        exam.question_count(),
        exam.duration_minutes
    );

    let choices = match answers {
        Some(pairs) => parse_answers(&pairs)?,
        None => prompt_answers(&exam)?,
    };
    for (position, option) in choices {
        controller.record_answer(position, option)?;
    }

    if let Some(remaining) = controller.remaining_time(Utc::now()) {
        if remaining.is_zero() {
            println!("Time is up; submitting anyway.");
        }
    }

    let score = controller.submit()?;
    let review = controller.review()?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct", "Result"]);
    for item in &review {
        let chosen = item
            .chosen
            .map(|c| Question::option_label(c).to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(item.position + 1),
            Cell::new(&item.text),
            Cell::new(chosen),
            Cell::new(Question::option_label(item.correct)),
            Cell::new(if item.is_correct { "OK" } else { "WRONG" }),
        ]);
    }
    println!("{table}");

    let verdict = if score.passed(config.pass_threshold) {
        "PASS"
    } else {
        "FAIL"
    };
    println!(
        "\nScore: {}% ({}/{} correct) {verdict}",
        score.percent, score.correct, score.total
    );

    if let Some(path) = output {
        let record = controller
            .last_attempt()
            .context("submitted attempt missing from history")?;
        record.save_json(&path)?;
        println!("Attempt saved to {}", path.display());
    }

    controller.reset()?;
    Ok(())
}

/// Parse `position:option` pairs such as `0:2,1:B`. Options may be given as
/// a 0-based index or as a letter label.
fn parse_answers(input: &str) -> Result<Vec<(usize, usize)>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (position, option) = pair
                .split_once(':')
                .with_context(|| format!("invalid answer '{pair}', expected position:option"))?;
            let position: usize = position
                .trim()
                .parse()
                .with_context(|| format!("invalid question position in '{pair}'"))?;
            let option = parse_option(option.trim())
                .with_context(|| format!("invalid option in '{pair}'"))?;
            Ok((position, option))
        })
        .collect()
}

fn parse_option(token: &str) -> Option<usize> {
    if let Ok(index) = token.parse::<usize>() {
        return Some(index);
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(usize::from(c.to_ascii_uppercase() as u8 - b'A'))
        }
        _ => None,
    }
}

/// Ask for each answer on stdin. A blank line leaves the question unanswered.
fn prompt_answers(exam: &Exam) -> Result<Vec<(usize, usize)>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut choices = Vec::new();

    for (position, question) in exam.questions.iter().enumerate() {
        println!("\nQ{}. {}", position + 1, question.text);
        for (index, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", Question::option_label(index));
        }

        loop {
            print!("Answer: ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(choices);
            };
            let line = line?;
            let token = line.trim();
            if token.is_empty() {
                break;
            }
            match parse_option(token) {
                Some(option) if option < question.options.len() => {
                    choices.push((position, option));
                    break;
                }
                _ => println!("Please choose one of the listed options."),
            }
        }
    }

    Ok(choices)
}
