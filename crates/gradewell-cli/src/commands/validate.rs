//! The `gradewell validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradewell_core::parser::{load_activities, validate_activity};

pub fn execute(activity_path: PathBuf) -> Result<()> {
    let activities = load_activities(&activity_path)?;
    if activities.is_empty() {
        anyhow::bail!("no activities found in {}", activity_path.display());
    }

    let mut total_warnings = 0;

    for activity in &activities {
        println!(
            "Activity: {} ({} questions)",
            activity.title,
            activity.questions.len()
        );

        let warnings = validate_activity(activity);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All activities valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
