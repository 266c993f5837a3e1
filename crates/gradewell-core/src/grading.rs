//! The activity grading workflow.
//!
//! One grading call makes at most one remote request. If that request fails
//! in any way (transport, HTTP status, malformed or schema-violating body)
//! the answers are graded locally instead, so a well-formed activity always
//! yields a `GradingResult`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::error::GradingError;
use crate::model::{
    Activity, AnswerSet, GradingMethod, GradingResult, Question, QuestionVerdict,
};
use crate::prompt::{build_grading_prompt, grading_response_schema, PromptOptions};
use crate::schema::{parse_remote_grade, RemoteGrade};
use crate::traits::{GenerateRequest, LlmProvider};

/// General feedback attached to locally graded results.
pub const FALLBACK_FEEDBACK: &str = "Correção automática processada (Modo Offline).";
/// Per-question feedback for a locally graded correct answer.
pub const FALLBACK_CORRECT_FEEDBACK: &str = "Muito bem!";
/// Per-question feedback for a locally graded wrong or missing answer.
pub const FALLBACK_INCORRECT_FEEDBACK: &str = "Tente novamente na próxima.";

/// Configuration for the grader.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens for the grading response.
    pub max_tokens: u32,
    pub prompt: PromptOptions,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            prompt: PromptOptions::default(),
        }
    }
}

/// Grades answer sets, remotely when a provider is configured.
pub struct Grader {
    provider: Option<Arc<dyn LlmProvider>>,
    config: GraderConfig,
}

impl Grader {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GraderConfig) -> Self {
        Self {
            provider: Some(provider),
            config,
        }
    }

    /// A grader with no remote scorer; every call takes the local path.
    pub fn offline(config: GraderConfig) -> Self {
        Self {
            provider: None,
            config,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.provider.is_none()
    }

    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    /// Grade `answers` against `questions`.
    ///
    /// Only precondition violations are returned as errors; remote failures
    /// are absorbed by the local fallback.
    #[instrument(skip_all, fields(activity = %activity_title, questions = questions.len()))]
    pub async fn grade(
        &self,
        activity_title: &str,
        questions: &[Question],
        answers: &AnswerSet,
    ) -> Result<GradingResult, GradingError> {
        check_questions(questions)?;

        let Some(provider) = &self.provider else {
            info!("no remote grader configured, grading locally");
            return Ok(fallback_grade(questions, answers));
        };

        let start = Instant::now();
        match self
            .grade_remote(provider.as_ref(), activity_title, questions, answers)
            .await
        {
            Ok(result) => {
                info!(
                    provider = provider.name(),
                    score = result.score,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "graded remotely"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    "remote grading failed, falling back to local grading: {e:#}"
                );
                Ok(fallback_grade(questions, answers))
            }
        }
    }

    async fn grade_remote(
        &self,
        provider: &dyn LlmProvider,
        activity_title: &str,
        questions: &[Question],
        answers: &AnswerSet,
    ) -> Result<GradingResult> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_grading_prompt(activity_title, questions, answers, &self.config.prompt),
            system_prompt: None,
            response_schema: Some(grading_response_schema()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = provider.generate(&request).await?;
        let grade = parse_remote_grade(&response.content, questions.len())?;
        Ok(remap_remote_grade(grade, questions, answers))
    }
}

/// Reject question lists the workflow cannot grade meaningfully.
pub fn check_questions(questions: &[Question]) -> Result<(), GradingError> {
    if questions.is_empty() {
        return Err(GradingError::NoQuestions);
    }
    let mut seen = HashSet::new();
    for q in questions {
        if !seen.insert(q.id.as_str()) {
            return Err(GradingError::DuplicateQuestionId(q.id.clone()));
        }
    }
    Ok(())
}

/// Publication check for an activity: a title and a gradable question list.
pub fn check_activity(activity: &Activity) -> Result<(), GradingError> {
    if activity.title.trim().is_empty() {
        return Err(GradingError::EmptyTitle);
    }
    check_questions(&activity.questions)
}

/// Rebuild remote verdicts against the real questions by position.
///
/// The model's echoed `questionId` is dropped; the id and the student's raw
/// answer come from `questions[i]` and `answers`.
pub fn remap_remote_grade(
    grade: RemoteGrade,
    questions: &[Question],
    answers: &AnswerSet,
) -> GradingResult {
    let score = grade.rounded_score();
    let detailed_results = grade
        .detailed_results
        .into_iter()
        .zip(questions)
        .map(|(verdict, question)| QuestionVerdict {
            question_id: question.id.clone(),
            is_correct: verdict.is_correct,
            student_answer: answers.get(&question.id).cloned().unwrap_or_default(),
            feedback: verdict.feedback,
        })
        .collect();

    GradingResult {
        score,
        feedback: grade.feedback,
        detailed_results,
        graded_by: GradingMethod::Remote,
    }
}

/// Trimmed, case-insensitive exact match.
pub fn answers_match(answer: &str, expected: &str) -> bool {
    answer.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// `round(100 * correct / total)` with halves rounding up; 0 when `total` is 0.
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    ((200 * correct + total) / (2 * total)) as u8
}

/// Deterministic local grading used when the remote path is unavailable.
pub fn fallback_grade(questions: &[Question], answers: &AnswerSet) -> GradingResult {
    let detailed_results: Vec<QuestionVerdict> = questions
        .iter()
        .map(|q| {
            let answer = answers.get(&q.id);
            let is_correct = answer.is_some_and(|a| answers_match(a, &q.correct_answer));
            QuestionVerdict {
                question_id: q.id.clone(),
                is_correct,
                student_answer: answer.cloned().unwrap_or_default(),
                feedback: if is_correct {
                    FALLBACK_CORRECT_FEEDBACK
                } else {
                    FALLBACK_INCORRECT_FEEDBACK
                }
                .to_string(),
            }
        })
        .collect();

    let correct = detailed_results.iter().filter(|v| v.is_correct).count();

    GradingResult {
        score: percentage(correct, questions.len()),
        feedback: FALLBACK_FEEDBACK.to_string(),
        detailed_results,
        graded_by: GradingMethod::Fallback,
    }
}
