//! The `gradewell init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("gradewell.toml").exists() {
        println!("gradewell.toml already exists, skipping.");
    } else {
        std::fs::write("gradewell.toml", SAMPLE_CONFIG)?;
        println!("Created gradewell.toml");
    }

    std::fs::create_dir_all("activities")?;
    let sample_path = Path::new("activities/sample.toml");
    if sample_path.exists() {
        println!("activities/sample.toml already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_ACTIVITY)?;
        println!("Created activities/sample.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set GRADEWELL_GEMINI_KEY (or edit gradewell.toml)");
    println!("  2. Run: gradewell validate --activity activities/sample.toml");
    println!("  3. Run: gradewell publish --activity activities/sample.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradewell configuration

default_provider = "gemini"
default_model = "gemini-3-flash-preview"
default_temperature = 0.0
max_tokens = 2048
timeout_secs = 60
school_name = "English With Gab"
feedback_language = "Portuguese"
data_dir = "./gradewell-data"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;

const SAMPLE_ACTIVITY: &str = r#"[activity]
id = "act-sample"
title = "Past Simple Warm-up"
description = "Regular and irregular verbs in the past."
kind = "homework"
assigned_to = ["student-1", "student-2"]

[[questions]]
id = "q1"
prompt = "Choose the correct past form of 'go'."
options = ["goed", "went", "gone"]
correct_answer = "went"

[[questions]]
id = "q2"
kind = "text"
prompt = 'Put into the past: "I play football."'
correct_answer = "I played football."
"#;
