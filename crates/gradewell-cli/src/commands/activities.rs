//! The `gradewell activities` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, student: Option<String>) -> Result<()> {
    let config = global.load_config()?;
    let portal = global.open_portal(&config)?;

    let activities = match &student {
        Some(id) => portal.activities_for(id),
        None => portal.activities().iter().collect(),
    };

    if activities.is_empty() {
        println!("No activities published.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "Kind", "Questions", "Status"]);
    for activity in activities {
        let status = match &student {
            Some(id) if portal.pending_activities(id).iter().any(|a| a.id == activity.id) => {
                "pending".to_string()
            }
            Some(_) => "submitted".to_string(),
            None => format!("{} assigned", activity.assigned_to.len()),
        };
        table.add_row(vec![
            Cell::new(&activity.id),
            Cell::new(&activity.title),
            Cell::new(activity.kind),
            Cell::new(activity.questions.len()),
            Cell::new(status),
        ]);
    }
    println!("{table}");

    if let Some(id) = &student {
        let summary = portal.student_summary(id);
        let average = summary
            .average_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} submitted, {} pending, average score {average}",
            summary.submitted, summary.pending
        );
    }

    Ok(())
}
