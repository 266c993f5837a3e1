//! Core data model types for gradewell.
//!
//! Field names serialize in camelCase so persisted blobs stay readable by
//! the browser portal that shares the same storage layout.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Student answers keyed by question id. A missing entry means unanswered.
pub type AnswerSet = BTreeMap<String, String>;

/// Generate a record id such as `sub-5f0c...`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    #[serde(alias = "text")]
    FreeText,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
            QuestionKind::FreeText => write!(f, "free_text"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple_choice" | "choice" | "mc" => Ok(QuestionKind::MultipleChoice),
            "free_text" | "text" => Ok(QuestionKind::FreeText),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A single question inside an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within its activity.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub prompt: String,
    /// Ordered choices, multiple-choice only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
}

/// Whether an activity is regular homework or optional extra practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Homework,
    Extra,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Homework => write!(f, "homework"),
            ActivityKind::Extra => write!(f, "extra"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "homework" => Ok(ActivityKind::Homework),
            "extra" => Ok(ActivityKind::Extra),
            other => Err(format!("unknown activity kind: {other}")),
        }
    }
}

/// A published set of questions assigned to students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub questions: Vec<Question>,
    /// Student ids this activity is assigned to.
    #[serde(default)]
    pub assigned_to: Vec<String>,
}

impl Activity {
    pub fn is_assigned_to(&self, student_id: &str) -> bool {
        self.assigned_to.iter().any(|s| s == student_id)
    }
}

/// Which path produced a grading result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingMethod {
    /// Scored by the remote text-generation service.
    Remote,
    /// Scored locally after the remote path failed or was unavailable.
    Fallback,
}

impl fmt::Display for GradingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingMethod::Remote => write!(f, "remote"),
            GradingMethod::Fallback => write!(f, "fallback"),
        }
    }
}

/// Verdict for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionVerdict {
    pub question_id: String,
    pub is_correct: bool,
    /// The student's raw answer, empty when unanswered.
    #[serde(default)]
    pub student_answer: String,
    pub feedback: String,
}

/// Outcome of grading one answer set against an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    /// Total score, 0 to 100. Stored blobs may carry a fractional number.
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub feedback: String,
    /// One verdict per question, in question order.
    pub detailed_results: Vec<QuestionVerdict>,
    #[serde(default = "default_method")]
    pub graded_by: GradingMethod,
}

fn default_method() -> GradingMethod {
    GradingMethod::Remote
}

fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom(format!("score is not finite: {raw}")));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

impl GradingResult {
    pub fn correct_count(&self) -> usize {
        self.detailed_results.iter().filter(|v| v.is_correct).count()
    }
}

/// A stored, graded attempt at an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub activity_id: String,
    pub student_id: String,
    pub answers: AnswerSet,
    #[serde(flatten)]
    pub result: GradingResult,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Wrap a grading result into a new submission stamped with the current time.
    pub fn new(
        activity_id: &str,
        student_id: &str,
        answers: AnswerSet,
        result: GradingResult,
    ) -> Self {
        Self {
            id: new_id("sub"),
            activity_id: activity_id.to_string(),
            student_id: student_id.to_string(),
            answers,
            result,
            submitted_at: Utc::now(),
        }
    }

    /// Scores at or above this are shown as a pass.
    pub const PASSING_SCORE: u8 = 70;

    pub fn passed(&self) -> bool {
        self.result.score >= Self::PASSING_SCORE
    }
}

/// Portal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Class,
    Exam,
    Event,
}

/// An entry on the shared calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// RFC 3339 on write; a bare `YYYY-MM-DD` reads as midnight UTC.
    #[serde(deserialize_with = "deserialize_event_date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn deserialize_event_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_event_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognized event date: {raw:?}"))
    })
}

/// Parse an RFC 3339 timestamp, a zone-less `YYYY-MM-DDTHH:MM[:SS]`, or a
/// plain date. Zone-less values are taken as UTC.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Display theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
