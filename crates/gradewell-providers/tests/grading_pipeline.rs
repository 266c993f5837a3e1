//! Grader plus real HTTP providers against a mocked service.

use std::sync::Arc;

use gradewell_core::grading::{Grader, GraderConfig, FALLBACK_FEEDBACK};
use gradewell_core::model::{AnswerSet, GradingMethod};
use gradewell_core::portal::Portal;
use gradewell_core::seed::sample_activities;
use gradewell_core::store::MemoryStore;
use gradewell_providers::gemini::GeminiProvider;
use gradewell_providers::ollama::OllamaProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}, "finishReason": "STOP"}],
        "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 60, "totalTokenCount": 180}
    })
}

fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn gemini_grader(server: &MockServer) -> Grader {
    let provider = GeminiProvider::new("test-key", Some(server.uri())).unwrap();
    Grader::new(Arc::new(provider), GraderConfig::default())
}

#[tokio::test]
async fn remote_verdicts_are_remapped_by_position() {
    let server = MockServer::start().await;
    let graded = r#"```json
{"score": 50, "feedback": "Bom trabalho!", "detailedResults": [
  {"questionId": "x", "isCorrect": true, "feedback": "Correto."},
  {"questionId": "y", "isCorrect": false, "feedback": "Use does not."}
]}
```"#;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(graded)))
        .expect(1)
        .mount(&server)
        .await;

    let grader = gemini_grader(&server).await;
    let activity = &sample_activities()[0];
    let answers = answers(&[("q1", "I am eating now."), ("q2", "She no like coffee.")]);

    let result = grader
        .grade(&activity.title, &activity.questions, &answers)
        .await
        .unwrap();

    assert_eq!(result.graded_by, GradingMethod::Remote);
    assert_eq!(result.score, 50);
    assert_eq!(result.feedback, "Bom trabalho!");
    assert_eq!(result.detailed_results[0].question_id, "q1");
    assert_eq!(result.detailed_results[1].question_id, "q2");
    assert_eq!(result.detailed_results[1].student_answer, "She no like coffee.");
    assert!(!result.detailed_results[1].is_correct);
}

#[tokio::test]
async fn server_error_falls_back_to_local_grading() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let grader = gemini_grader(&server).await;
    let activity = &sample_activities()[0];
    let answers = answers(&[
        ("q1", "I am eating now."),
        ("q2", "she does not like coffee."),
    ]);

    let result = grader
        .grade(&activity.title, &activity.questions, &answers)
        .await
        .unwrap();

    assert_eq!(result.graded_by, GradingMethod::Fallback);
    assert_eq!(result.score, 100);
    assert_eq!(result.feedback, FALLBACK_FEEDBACK);
}

#[tokio::test]
async fn wrong_verdict_count_falls_back() {
    let server = MockServer::start().await;
    let graded = r#"{"score": 100, "feedback": "ok", "detailedResults": [
        {"questionId": "q1", "isCorrect": true, "feedback": "ok"}
    ]}"#;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(graded)))
        .mount(&server)
        .await;

    let grader = gemini_grader(&server).await;
    let activity = &sample_activities()[0];

    let result = grader
        .grade(&activity.title, &activity.questions, &AnswerSet::new())
        .await
        .unwrap();

    assert_eq!(result.graded_by, GradingMethod::Fallback);
    assert_eq!(result.score, 0);
}

#[tokio::test]
async fn unreachable_ollama_falls_back() {
    // Nothing listens on port 9 on a test host.
    let provider = OllamaProvider::new("http://127.0.0.1:9").unwrap();
    let grader = Grader::new(Arc::new(provider), GraderConfig::default());
    let activity = &sample_activities()[1];

    let result = grader
        .grade(&activity.title, &activity.questions, &AnswerSet::new())
        .await
        .unwrap();

    assert_eq!(result.graded_by, GradingMethod::Fallback);
    assert_eq!(result.detailed_results.len(), 1);
}

#[tokio::test]
async fn portal_submission_through_remote_grader() {
    let server = MockServer::start().await;
    let graded = r#"{"score": 100, "feedback": "Excelente!", "detailedResults": [
        {"questionId": "q3", "isCorrect": true, "feedback": "Perfeito."}
    ]}"#;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(graded)))
        .mount(&server)
        .await;

    let grader = gemini_grader(&server).await;
    let mut portal = Portal::open(MemoryStore::new());

    let submission = portal
        .submit(
            &grader,
            "act-2",
            "student-1",
            answers(&[("q3", "To do something badly to save time or money.")]),
        )
        .await
        .unwrap();

    assert_eq!(submission.result.score, 100);
    assert!(submission.passed());
    assert_eq!(portal.submissions_for("student-1").len(), 1);
    assert!(portal.pending_activities("student-1").iter().all(|a| a.id != "act-2"));
}
