use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::Utc;
use quizgate_core::model::{Answers, AttemptResult, Question, QuizOption, QuizSet, UserIdentity};
use quizgate_core::scoring::grade;
use quizgate_core::statistics::{aggregate_question_stats, detect_distractors, student_performance};

const OPTION_IDS: [&str; 4] = ["a", "b", "c", "d"];

fn make_set(questions: usize) -> QuizSet {
    let mut set = QuizSet::new("bench", "bench@example.com");
    set.questions = (0..questions)
        .map(|i| Question {
            id: format!("q{i}"),
            text: format!("Question {i}"),
            options: OPTION_IDS
                .iter()
                .map(|o| QuizOption {
                    id: o.to_string(),
                    text: o.to_string(),
                })
                .collect(),
            correct_option_id: OPTION_IDS[i % 4].to_string(),
            area: ["Grammar", "Vocabulary", "Reading"][i % 3].to_string(),
            explanation: None,
            hint: None,
            translation: None,
        })
        .collect();
    set
}

fn make_history(set: &QuizSet, attempts: usize) -> Vec<AttemptResult> {
    (0..attempts)
        .map(|n| {
            let answers: Answers = set
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| (q.id.clone(), OPTION_IDS[(n * 7 + i) % 4].to_string()))
                .collect();
            let g = grade(&set.questions, &answers);
            AttemptResult {
                attempt_number: (n % 3) as u32 + 1,
                quiz_set_id: set.id.clone(),
                area_scores: g.area_scores,
                is_complete_success: g.is_complete_success,
                answers,
                timestamp: Utc::now(),
                user: Some(UserIdentity::new(&format!("student{}@example.com", n % 40), None)),
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let set = make_set(30);
    let history = make_history(&set, 2_000);

    let mut group = c.benchmark_group("aggregate");

    group.bench_function("question_stats/30q x 2000", |b| {
        b.iter(|| aggregate_question_stats(black_box(&set), black_box(&history)))
    });

    let stats = aggregate_question_stats(&set, &history);
    group.bench_function("distractors/30q", |b| {
        b.iter(|| detect_distractors(black_box(&stats)))
    });

    group.bench_function("students/2000 attempts", |b| {
        b.iter(|| student_performance(black_box(&history)))
    });

    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
