//! Starter users and activities for a fresh portal.

use crate::model::{Activity, ActivityKind, Question, QuestionKind, Role, User};

pub fn initial_users() -> Vec<User> {
    vec![
        User {
            id: "teacher-1".into(),
            name: "Gabriele".into(),
            email: "gab@englishwithgab.com".into(),
            role: Role::Teacher,
            avatar: "https://picsum.photos/seed/gab/200".into(),
            phone: Some("+55 (11) 99999-9999".into()),
            bio: Some("English Teacher specialized in Business English.".into()),
        },
        User {
            id: "student-1".into(),
            name: "João Silva".into(),
            email: "joao@email.com".into(),
            role: Role::Student,
            avatar: "https://picsum.photos/seed/joao/200".into(),
            phone: Some("+55 (11) 88888-8888".into()),
            bio: None,
        },
        User {
            id: "student-2".into(),
            name: "Maria Santos".into(),
            email: "maria@email.com".into(),
            role: Role::Student,
            avatar: "https://picsum.photos/seed/maria/200".into(),
            phone: Some("+55 (11) 77777-7777".into()),
            bio: None,
        },
    ]
}

/// Look up a seeded user by id.
pub fn find_user(id: &str) -> Option<User> {
    initial_users().into_iter().find(|u| u.id == id)
}

pub fn sample_activities() -> Vec<Activity> {
    vec![
        Activity {
            id: "act-1".into(),
            title: "Present Simple vs Continuous".into(),
            description: "A deep dive into basic tense structures.".into(),
            kind: ActivityKind::Homework,
            assigned_to: vec!["student-1".into(), "student-2".into()],
            questions: vec![
                Question {
                    id: "q1".into(),
                    kind: QuestionKind::MultipleChoice,
                    prompt: "Which sentence is correct?".into(),
                    options: Some(vec![
                        "I am eating now.".into(),
                        "I eating now.".into(),
                        "I am eat now.".into(),
                    ]),
                    correct_answer: "I am eating now.".into(),
                },
                Question {
                    id: "q2".into(),
                    kind: QuestionKind::FreeText,
                    prompt: "Transform to negative: \"She likes coffee.\"".into(),
                    options: None,
                    correct_answer: "She does not like coffee.".into(),
                },
            ],
        },
        Activity {
            id: "act-2".into(),
            title: "Business Idioms".into(),
            description: "Common expressions used in the corporate world.".into(),
            kind: ActivityKind::Extra,
            assigned_to: vec!["student-1".into()],
            questions: vec![Question {
                id: "q3".into(),
                kind: QuestionKind::FreeText,
                prompt: "What does \"to cut corners\" mean?".into(),
                options: None,
                correct_answer: "To do something in the easiest or cheapest way.".into(),
            }],
        },
    ]
}
