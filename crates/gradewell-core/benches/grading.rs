use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradewell_core::grading::fallback_grade;
use gradewell_core::model::{AnswerSet, Question, QuestionKind};
use gradewell_core::prompt::{build_grading_prompt, PromptOptions};
use gradewell_core::schema::parse_remote_grade;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("q{i}"),
            kind: QuestionKind::FreeText,
            prompt: format!("Transform sentence number {i} to the negative form."),
            options: None,
            correct_answer: format!("She does not like coffee number {i}."),
        })
        .collect()
}

fn make_answers(n: usize) -> AnswerSet {
    (0..n)
        .filter(|i| i % 3 != 0)
        .map(|i| (format!("q{i}"), format!("  she DOES NOT like coffee number {i}. ")))
        .collect()
}

fn bench_fallback(c: &mut Criterion) {
    let mut group = c.benchmark_group("fallback_grade");

    for n in [2usize, 20, 200] {
        let questions = make_questions(n);
        let answers = make_answers(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| fallback_grade(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_prompt(c: &mut Criterion) {
    let questions = make_questions(20);
    let answers = make_answers(20);
    let options = PromptOptions::default();

    c.bench_function("build_grading_prompt_20", |b| {
        b.iter(|| {
            build_grading_prompt(
                black_box("Present Simple vs Continuous"),
                black_box(&questions),
                black_box(&answers),
                &options,
            )
        })
    });
}

fn bench_parse_remote(c: &mut Criterion) {
    let verdicts: Vec<String> = (0..20)
        .map(|i| format!(r#"{{"questionId": "x{i}", "isCorrect": true, "feedback": "Muito bem!"}}"#))
        .collect();
    let body = format!(
        r#"{{"score": 85, "feedback": "Great job!", "detailedResults": [{}]}}"#,
        verdicts.join(",")
    );

    c.bench_function("parse_remote_grade_20", |b| {
        b.iter(|| parse_remote_grade(black_box(&body), 20))
    });
}

criterion_group!(benches, bench_fallback, bench_prompt, bench_parse_remote);
criterion_main!(benches);
