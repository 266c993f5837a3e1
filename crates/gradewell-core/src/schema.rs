//! Validation of the remote grader's structured output.
//!
//! Nothing from the remote response reaches a `GradingResult` without
//! passing through `parse_remote_grade` first.

use serde::Deserialize;

use crate::error::SchemaError;
use crate::traits::extract_json_payload;

/// A remote grading response that passed validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteGrade {
    pub score: f64,
    pub feedback: String,
    pub detailed_results: Vec<RemoteVerdict>,
}

/// One verdict as the model returned it. `question_id` is whatever the
/// model echoed and is never trusted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVerdict {
    pub question_id: String,
    pub is_correct: bool,
    pub feedback: String,
}

impl RemoteGrade {
    /// The score rounded to an integer percentage.
    pub fn rounded_score(&self) -> u8 {
        self.score.round() as u8
    }
}

/// Parse and validate a raw model response for an activity with
/// `question_count` questions.
pub fn parse_remote_grade(content: &str, question_count: usize) -> Result<RemoteGrade, SchemaError> {
    let payload = extract_json_payload(content);
    let grade: RemoteGrade =
        serde_json::from_str(&payload).map_err(|e| SchemaError::Malformed(e.to_string()))?;

    if !grade.score.is_finite() || !(0.0..=100.0).contains(&grade.score) {
        return Err(SchemaError::ScoreOutOfRange(grade.score));
    }
    if grade.detailed_results.len() != question_count {
        return Err(SchemaError::VerdictCount {
            expected: question_count,
            actual: grade.detailed_results.len(),
        });
    }

    Ok(grade)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "score": 85,
        "feedback": "Great job!",
        "detailedResults": [
            {"questionId": "bogus", "isCorrect": true, "feedback": "ok"},
            {"questionId": "other", "isCorrect": false, "feedback": "no"}
        ]
    }"#;

    #[test]
    fn parses_valid_response() {
        let grade = parse_remote_grade(VALID, 2).unwrap();
        assert_eq!(grade.rounded_score(), 85);
        assert_eq!(grade.feedback, "Great job!");
        assert_eq!(grade.detailed_results[0].question_id, "bogus");
        assert!(!grade.detailed_results[1].is_correct);
    }

    #[test]
    fn parses_fenced_response() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_remote_grade(&fenced, 2).is_ok());
    }

    #[test]
    fn fractional_score_rounds() {
        let json = r#"{"score": 66.6, "feedback": "", "detailedResults": []}"#;
        assert_eq!(parse_remote_grade(json, 0).unwrap().rounded_score(), 67);
    }

    #[test]
    fn rejects_missing_field() {
        let json = r#"{"score": 50, "detailedResults": []}"#;
        assert!(matches!(
            parse_remote_grade(json, 0),
            Err(SchemaError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_wrong_type() {
        let json = r#"{"score": 50, "feedback": "x", "detailedResults": [
            {"questionId": "q1", "isCorrect": "yes", "feedback": "x"}
        ]}"#;
        assert!(matches!(
            parse_remote_grade(json, 1),
            Err(SchemaError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_score() {
        let json = r#"{"score": 140, "feedback": "x", "detailedResults": []}"#;
        assert_eq!(
            parse_remote_grade(json, 0),
            Err(SchemaError::ScoreOutOfRange(140.0))
        );
    }

    #[test]
    fn rejects_verdict_count_mismatch() {
        assert_eq!(
            parse_remote_grade(VALID, 3),
            Err(SchemaError::VerdictCount {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_remote_grade("I cannot grade this.", 1).is_err());
    }
}
