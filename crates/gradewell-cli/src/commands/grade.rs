//! The `gradewell grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use gradewell_core::model::GradingResult;
use gradewell_core::parser::{parse_activity, parse_answers};
use gradewell_providers::build_grader;

use crate::GlobalArgs;

pub async fn execute(
    global: &GlobalArgs,
    activity_path: PathBuf,
    answers_path: PathBuf,
    offline: bool,
    format: String,
) -> Result<()> {
    let config = global.load_config()?;
    let activity = parse_activity(&activity_path)?;
    let answers = parse_answers(&answers_path)?;
    let grader = build_grader(&config, offline)?;

    let result = grader
        .grade(&activity.title, &activity.questions, &answers)
        .await
        .with_context(|| format!("cannot grade activity `{}`", activity.id))?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => print_result(&activity.title, &result),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

/// Print a grading result as a verdict table.
pub fn print_result(title: &str, result: &GradingResult) {
    println!("{title}");
    println!(
        "Score: {}/100 ({} of {} correct, graded by {})",
        result.score,
        result.correct_count(),
        result.detailed_results.len(),
        result.graded_by
    );
    println!("Feedback: {}", result.feedback);

    let mut table = Table::new();
    table.set_header(vec!["Question", "Answer", "Correct", "Feedback"]);
    for verdict in &result.detailed_results {
        table.add_row(vec![
            Cell::new(&verdict.question_id),
            Cell::new(&verdict.student_answer),
            Cell::new(if verdict.is_correct { "yes" } else { "no" }),
            Cell::new(&verdict.feedback),
        ]);
    }
    println!("{table}");
}
