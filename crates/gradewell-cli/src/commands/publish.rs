//! The `gradewell publish` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradewell_core::parser::load_activities;

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, activity_path: PathBuf) -> Result<()> {
    let config = global.load_config()?;
    let activities = load_activities(&activity_path)?;
    if activities.is_empty() {
        anyhow::bail!("no activities found in {}", activity_path.display());
    }

    let mut portal = global.open_portal(&config)?;
    for activity in activities {
        let id = activity.id.clone();
        let questions = activity.questions.len();
        portal
            .publish_activity(activity)
            .with_context(|| format!("cannot publish activity `{id}`"))?;
        println!("Published {id} ({questions} questions)");
    }

    Ok(())
}
