//! Analytics over a quiz set's full attempt history.
//!
//! Every function here is a full recompute over the history it is given.
//! Nothing is cached, so editing a question's correct answer retroactively
//! reclassifies past attempts the next time stats are requested.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AreaScore, AttemptResult, QuizSet};
use crate::traits::{AttemptStore, QuizSetStore};

/// Identity key for attempts that carry no user.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Error count a question must exceed before it can be flagged as a
/// distractor. Exclusive: exactly two errors is never enough.
pub const DISTRACTOR_ERROR_FLOOR: u32 = 2;

/// Share of errors a single wrong option must exceed to be a distractor.
/// Exclusive, like the error floor.
pub const DISTRACTOR_SHARE_FLOOR: f64 = 0.4;

/// Error rate (percent) above which a question counts as high-error.
pub const HIGH_ERROR_RATE_PERCENT: f64 = 50.0;

/// How often one wrong option was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCount {
    pub option_id: String,
    pub count: u32,
}

/// Per-question aggregate for one quiz set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminQuestionStats {
    pub question_id: String,
    /// Question text at aggregation time.
    pub question_text: String,
    /// 1-based position in the set.
    pub original_index: usize,
    pub area: String,
    pub error_count: u32,
    pub total_attempts: u32,
    /// Wrong option choices in the order each was first seen.
    pub wrong_options: Vec<OptionCount>,
}

impl AdminQuestionStats {
    /// Errors as a percentage of attempts; 0 when never attempted.
    pub fn error_rate_percent(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.error_count as f64 / self.total_attempts as f64 * 100.0
        }
    }

    /// The most chosen wrong option; ties go to the one seen first.
    pub fn top_wrong_option(&self) -> Option<&OptionCount> {
        let mut top: Option<&OptionCount> = None;
        for entry in &self.wrong_options {
            if top.map_or(true, |t| entry.count > t.count) {
                top = Some(entry);
            }
        }
        top
    }

    fn record_wrong(&mut self, option_id: &str) {
        let wrong = &mut self.wrong_options;
        match wrong.iter_mut().find(|o| o.option_id == option_id) {
            Some(entry) => entry.count += 1,
            None => wrong.push(OptionCount {
                option_id: option_id.to_string(),
                count: 1,
            }),
        }
    }
}

/// Aggregate per-question stats for `set` from `attempts`.
///
/// Buckets come from the set's current questions. Attempts on other sets and
/// answers to questions no longer in the set are ignored. The result is
/// sorted by descending error count, stable on ties.
pub fn aggregate_question_stats(
    set: &QuizSet,
    attempts: &[AttemptResult],
) -> Vec<AdminQuestionStats> {
    let mut stats: Vec<AdminQuestionStats> = set
        .questions
        .iter()
        .enumerate()
        .map(|(index, q)| AdminQuestionStats {
            question_id: q.id.clone(),
            question_text: q.text.clone(),
            original_index: index + 1,
            area: q.area.clone(),
            error_count: 0,
            total_attempts: 0,
            wrong_options: Vec::new(),
        })
        .collect();

    let positions: BTreeMap<&str, usize> = set
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| (q.id.as_str(), i))
        .collect();

    for attempt in attempts.iter().filter(|a| a.quiz_set_id == set.id) {
        for (question_id, option_id) in &attempt.answers {
            let Some(&pos) = positions.get(question_id.as_str()) else {
                continue;
            };
            let stat = &mut stats[pos];
            stat.total_attempts += 1;
            if *option_id != set.questions[pos].correct_option_id {
                stat.error_count += 1;
                stat.record_wrong(option_id);
            }
        }
    }

    stats.sort_by(|a, b| b.error_count.cmp(&a.error_count));
    stats
}

/// Load a set and its history from the stores and aggregate it.
///
/// An unknown set yields an empty result, not an error.
pub fn aggregate(
    sets: &dyn QuizSetStore,
    attempts: &dyn AttemptStore,
    quiz_set_id: &str,
) -> Result<Vec<AdminQuestionStats>> {
    let Some(set) = sets.get_set(quiz_set_id)? else {
        tracing::debug!(quiz_set_id, "aggregate requested for unknown set");
        return Ok(Vec::new());
    };
    let history = attempts.list_by_set(quiz_set_id)?;
    Ok(aggregate_question_stats(&set, &history))
}

// ---------------------------------------------------------------------------
// Distractor detection
// ---------------------------------------------------------------------------

/// The dominant wrong answer on one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistractorFinding {
    pub question_id: String,
    pub question_text: String,
    pub original_index: usize,
    pub area: String,
    pub error_count: u32,
    pub top_wrong_option_id: String,
    pub top_wrong_count: u32,
    /// `top_wrong_count / error_count`.
    pub share: f64,
    /// More than two errors and a share above 0.4.
    pub is_significant: bool,
}

/// Find the dominant wrong option of every question with errors.
///
/// Sorted by descending `top_wrong_count`, stable on ties.
pub fn detect_distractors(stats: &[AdminQuestionStats]) -> Vec<DistractorFinding> {
    let mut findings: Vec<DistractorFinding> = stats
        .iter()
        .filter(|s| s.error_count > 0)
        .filter_map(|s| {
            let top = s.top_wrong_option()?;
            let share = top.count as f64 / s.error_count as f64;
            Some(DistractorFinding {
                question_id: s.question_id.clone(),
                question_text: s.question_text.clone(),
                original_index: s.original_index,
                area: s.area.clone(),
                error_count: s.error_count,
                top_wrong_option_id: top.option_id.clone(),
                top_wrong_count: top.count,
                share,
                is_significant: s.error_count > DISTRACTOR_ERROR_FLOOR
                    && share > DISTRACTOR_SHARE_FLOOR,
            })
        })
        .collect();

    findings.sort_by(|a, b| b.top_wrong_count.cmp(&a.top_wrong_count));
    findings
}

/// Only the findings flagged as significant distractors.
pub fn significant_distractors(stats: &[AdminQuestionStats]) -> Vec<DistractorFinding> {
    detect_distractors(stats)
        .into_iter()
        .filter(|f| f.is_significant)
        .collect()
}

// ---------------------------------------------------------------------------
// Student performance matrix
// ---------------------------------------------------------------------------

/// Per-user aggregate over one set's attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStat {
    /// Email, or [`ANONYMOUS_USER`].
    pub user_key: String,
    pub display_name: String,
    pub attempts: u32,
    pub passes: u32,
    /// Running mean of per-attempt score percentages.
    pub average_score: f64,
    pub last_active: DateTime<Utc>,
    /// Cumulative per-area tallies across all of the user's attempts.
    pub area_totals: BTreeMap<String, AreaScore>,
}

/// Fold attempts into one [`StudentStat`] per distinct user.
///
/// The running average is the arithmetic mean, so fold order does not
/// matter. Output is sorted ascending by average score (at-risk first),
/// ties by user key.
pub fn student_performance(attempts: &[AttemptResult]) -> Vec<StudentStat> {
    let mut by_user: BTreeMap<String, StudentStat> = BTreeMap::new();

    for attempt in attempts {
        let (key, name) = match &attempt.user {
            Some(u) => (u.email.clone(), u.display_name.clone()),
            None => (ANONYMOUS_USER.to_string(), ANONYMOUS_USER.to_string()),
        };

        let stat = by_user.entry(key.clone()).or_insert_with(|| StudentStat {
            user_key: key,
            display_name: name,
            attempts: 0,
            passes: 0,
            average_score: 0.0,
            last_active: attempt.timestamp,
            area_totals: BTreeMap::new(),
        });

        stat.attempts += 1;
        if attempt.is_complete_success {
            stat.passes += 1;
        }
        if attempt.timestamp > stat.last_active {
            stat.last_active = attempt.timestamp;
        }

        let n = stat.attempts as f64;
        stat.average_score = (stat.average_score * (n - 1.0) + attempt.score_percent()) / n;

        for (area, score) in &attempt.area_scores {
            let total = stat.area_totals.entry(area.clone()).or_default();
            total.correct += score.correct;
            total.total += score.total;
        }
    }

    let mut students: Vec<StudentStat> = by_user.into_values().collect();
    students.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));
    students
}

// ---------------------------------------------------------------------------
// Error frequency series
// ---------------------------------------------------------------------------

/// One point of the error-frequency-by-sequence series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorFrequencyPoint {
    /// Short label, `Q1`, `Q2`, ...
    pub label: String,
    pub original_index: usize,
    pub attempts: u32,
    pub errors: u32,
    pub error_rate_percent: f64,
    /// Error rate above 50%.
    pub is_high_error: bool,
}

/// Re-order stats by question position for charting.
pub fn error_frequency_series(stats: &[AdminQuestionStats]) -> Vec<ErrorFrequencyPoint> {
    let mut ordered: Vec<&AdminQuestionStats> = stats.iter().collect();
    ordered.sort_by_key(|s| s.original_index);
    ordered
        .into_iter()
        .map(|s| {
            let rate = s.error_rate_percent();
            ErrorFrequencyPoint {
                label: format!("Q{}", s.original_index),
                original_index: s.original_index,
                attempts: s.total_attempts,
                errors: s.error_count,
                error_rate_percent: rate,
                is_high_error: rate > HIGH_ERROR_RATE_PERCENT,
            }
        })
        .collect()
}
