//! Grading prompt and the response schema sent alongside it.

use std::fmt::Write;

use serde_json::json;

use crate::model::{AnswerSet, Question};

/// Shown to the model in place of an answer the student left blank.
pub const NO_ANSWER_PLACEHOLDER: &str = "(No answer provided)";

/// Knobs for the grading prompt.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    /// School the grader speaks for.
    pub school_name: String,
    /// Language the feedback should be written in.
    pub feedback_language: String,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            school_name: "English With Gab".to_string(),
            feedback_language: "Portuguese".to_string(),
        }
    }
}

/// Build the single natural-language grading request for one answer set.
///
/// Questions appear in activity order; the remote verdicts are matched back
/// to them by that same order.
pub fn build_grading_prompt(
    activity_title: &str,
    questions: &[Question],
    answers: &AnswerSet,
    options: &PromptOptions,
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are an expert English Teacher for \"{}\".",
        options.school_name
    );
    let _ = writeln!(
        prompt,
        "Please correct the following student responses for the activity \"{activity_title}\".",
    );
    prompt.push_str("\nQuestions and Student Answers:\n");

    for (index, question) in questions.iter().enumerate() {
        let answer = answers
            .get(&question.id)
            .filter(|a| !a.is_empty())
            .map(String::as_str)
            .unwrap_or(NO_ANSWER_PLACEHOLDER);
        let _ = writeln!(prompt, "\n{}. Question: {}", index + 1, question.prompt);
        if let Some(choices) = &question.options {
            let _ = writeln!(prompt, "   Options: {}", choices.join(" | "));
        }
        let _ = writeln!(prompt, "   Expected Answer: {}", question.correct_answer);
        let _ = writeln!(prompt, "   Student Answer: {answer}");
    }

    let _ = write!(
        prompt,
        "\nProvide:\n\
         1. A total score from 0 to 100.\n\
         2. A general feedback message in {lang} encouraging the student.\n\
         3. For each question, in the order given, indicate if it is correct and provide \
         a short explanation (feedback) in {lang}.\n",
        lang = options.feedback_language
    );
    prompt
}

/// JSON Schema for the structured grading response.
pub fn grading_response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "score": { "type": "number" },
            "feedback": { "type": "string" },
            "detailedResults": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "questionId": { "type": "string" },
                        "isCorrect": { "type": "boolean" },
                        "feedback": { "type": "string" }
                    },
                    "required": ["questionId", "isCorrect", "feedback"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["score", "feedback", "detailedResults"],
        "additionalProperties": false
    })
}
