//! The `gradewell submissions` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, student: Option<String>) -> Result<()> {
    let config = global.load_config()?;
    let portal = global.open_portal(&config)?;

    let submissions = match &student {
        Some(id) => portal.submissions_for(id),
        None => portal.submissions().iter().collect(),
    };

    if submissions.is_empty() {
        println!("No submissions yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Submitted", "Student", "Activity", "Score", "Result", "Graded by",
    ]);
    for s in submissions {
        table.add_row(vec![
            Cell::new(s.submitted_at.format("%Y-%m-%d %H:%M")),
            Cell::new(&s.student_id),
            Cell::new(&s.activity_id),
            Cell::new(s.result.score),
            Cell::new(if s.passed() { "pass" } else { "retry" }),
            Cell::new(s.result.graded_by),
        ]);
    }
    println!("{table}");

    Ok(())
}
