//! Attempt scoring.
//!
//! Grades a full answer set against a quiz set's questions, builds the
//! immutable [`AttemptResult`], and persists it through an [`AttemptStore`].

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::model::{Answers, AreaScore, AttemptResult, Question, UserIdentity};
use crate::traits::AttemptStore;

/// Outcome of grading one answer set, before it becomes a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub area_scores: BTreeMap<String, AreaScore>,
    pub is_complete_success: bool,
}

/// Grade `answers` against `questions`.
///
/// Area buckets come from the distinct areas of `questions`. A missing answer
/// counts as incorrect; nothing is rejected.
pub fn grade(questions: &[Question], answers: &Answers) -> Grade {
    let mut area_scores: BTreeMap<String, AreaScore> = questions
        .iter()
        .map(|q| (q.area.clone(), AreaScore::default()))
        .collect();
    let mut is_complete_success = true;

    for question in questions {
        let selected = answers.get(&question.id).map(String::as_str);
        let bucket = area_scores.entry(question.area.clone()).or_default();
        bucket.total += 1;
        if question.is_correct(selected) {
            bucket.correct += 1;
        } else {
            is_complete_success = false;
        }
    }

    Grade {
        area_scores,
        is_complete_success,
    }
}

/// Scores submissions and appends them to the attempt log.
pub struct AttemptScorer<'a> {
    store: &'a dyn AttemptStore,
}

impl<'a> AttemptScorer<'a> {
    pub fn new(store: &'a dyn AttemptStore) -> Self {
        Self { store }
    }

    /// Score and persist one submission.
    ///
    /// Calling this always appends a record; completeness of `answers` is the
    /// caller's concern and only lowers the score when violated.
    pub fn score(
        &self,
        quiz_set_id: &str,
        questions: &[Question],
        answers: Answers,
        attempt_number: u32,
        user: &UserIdentity,
    ) -> Result<AttemptResult> {
        let grade = grade(questions, &answers);

        let result = AttemptResult {
            attempt_number,
            quiz_set_id: quiz_set_id.to_string(),
            area_scores: grade.area_scores,
            is_complete_success: grade.is_complete_success,
            answers,
            timestamp: Utc::now(),
            user: Some(user.clone()),
        };

        self.store
            .append(&result)
            .with_context(|| format!("failed to persist attempt for set {quiz_set_id}"))?;

        tracing::info!(
            quiz_set_id,
            user = %user.email,
            attempt_number,
            passed = result.is_complete_success,
            "attempt recorded"
        );

        Ok(result)
    }
}

/// Question ids from `questions` that have no entry in `answers`.
pub fn unanswered<'q>(questions: &'q [Question], answers: &Answers) -> Vec<&'q str> {
    questions
        .iter()
        .filter(|q| !answers.contains_key(&q.id))
        .map(|q| q.id.as_str())
        .collect()
}
