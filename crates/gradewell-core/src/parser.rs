//! TOML activity parser.
//!
//! Loads activities from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::GradingError;
use crate::grading::check_activity;
use crate::model::{Activity, ActivityKind, AnswerSet, Question, QuestionKind};

/// Intermediate TOML structure for parsing activity files.
#[derive(Debug, Deserialize)]
struct TomlActivityFile {
    activity: TomlActivityHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlActivityHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    assigned_to: Vec<String>,
}

fn default_kind() -> String {
    "homework".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default)]
    kind: Option<String>,
    prompt: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    correct_answer: String,
}

/// Parse a single TOML file into an `Activity`.
pub fn parse_activity(path: &Path) -> Result<Activity> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read activity file: {}", path.display()))?;

    parse_activity_str(&content, path)
}

/// Parse a TOML string into an `Activity` (useful for testing).
pub fn parse_activity_str(content: &str, source_path: &Path) -> Result<Activity> {
    let parsed: TomlActivityFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let kind: ActivityKind = parsed
        .activity
        .kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            // Questions with options default to multiple choice
            let kind = match q.kind {
                Some(k) => k.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?,
                None if q.options.is_some() => QuestionKind::MultipleChoice,
                None => QuestionKind::FreeText,
            };
            Ok(Question {
                id: q.id,
                kind,
                prompt: q.prompt,
                options: q.options,
                correct_answer: q.correct_answer,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Activity {
        id: parsed.activity.id,
        title: parsed.activity.title,
        description: parsed.activity.description,
        kind,
        questions,
        assigned_to: parsed.activity.assigned_to,
    })
}

/// Recursively load all `.toml` activity files from a directory.
pub fn load_activity_directory(dir: &Path) -> Result<Vec<Activity>> {
    let mut activities = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            activities.extend(load_activity_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_activity(&path) {
                Ok(activity) => activities.push(activity),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(activities)
}

/// Load a file or every activity in a directory.
pub fn load_activities(path: &Path) -> Result<Vec<Activity>> {
    if path.is_dir() {
        load_activity_directory(path)
    } else {
        Ok(vec![parse_activity(path)?])
    }
}

/// Parse a JSON object of `question id -> answer` strings.
pub fn parse_answers_str(content: &str) -> Result<AnswerSet> {
    serde_json::from_str(content).context("answers must be a JSON object of strings")
}

pub fn parse_answers(path: &Path) -> Result<AnswerSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;
    parse_answers_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))
}

/// A warning from activity validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an activity for common authoring issues.
///
/// Anything that would make the activity ungradable is reported too, so a
/// clean run here means `Portal::publish_activity` will accept it.
pub fn validate_activity(activity: &Activity) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate ids are reported per question below
    if let Err(e @ (GradingError::NoQuestions | GradingError::EmptyTitle)) =
        check_activity(activity)
    {
        warnings.push(ValidationWarning {
            question_id: None,
            message: e.to_string(),
        });
    }

    if activity.assigned_to.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "activity is not assigned to any student".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in &activity.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &activity.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "prompt is empty".into(),
            });
        }
        if q.correct_answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "correct answer is empty".into(),
            });
        }
    }

    for q in &activity.questions {
        if q.kind != QuestionKind::MultipleChoice {
            continue;
        }
        match &q.options {
            None => warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "multiple-choice question has no options".into(),
            }),
            Some(options) if options.is_empty() => warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "multiple-choice question has no options".into(),
            }),
            Some(options) if !options.iter().any(|o| o == &q.correct_answer) => {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id.clone()),
                    message: "correct answer is not one of the options".into(),
                })
            }
            Some(_) => {}
        }
    }

    warnings
}
