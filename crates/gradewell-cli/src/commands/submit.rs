//! The `gradewell submit` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradewell_core::parser::parse_answers;
use gradewell_providers::build_grader;

use crate::commands::grade::print_result;
use crate::GlobalArgs;

pub async fn execute(
    global: &GlobalArgs,
    activity_id: String,
    student_id: String,
    answers_path: PathBuf,
    offline: bool,
) -> Result<()> {
    let config = global.load_config()?;
    let answers = parse_answers(&answers_path)?;
    let grader = build_grader(&config, offline)?;
    let mut portal = global.open_portal(&config)?;

    let submission = portal
        .submit(&grader, &activity_id, &student_id, answers)
        .await
        .with_context(|| format!("submission for `{activity_id}` failed"))?;

    let title = portal
        .activity(&activity_id)
        .map(|a| a.title.as_str())
        .unwrap_or(activity_id.as_str());
    print_result(title, &submission.result);
    println!("Stored submission {}", submission.id);

    Ok(())
}
