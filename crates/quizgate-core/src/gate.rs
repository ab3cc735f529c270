//! Access gate: who may answer, and who may see what afterwards.
//!
//! The gate is rebuilt from the stored attempt history every time a learner
//! opens a set. Only the unlock is held in memory; reloading re-derives
//! `LOCKED_REVIEW` until the passcode is entered again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GateError;
use crate::model::{AttemptResult, Question, QuizSet, MAX_ATTEMPTS};

/// Placeholder shown for answers to questions no longer in the set.
pub const DELETED_QUESTION: &str = "deleted question";

/// Placeholder shown for selections that match no current option.
pub const UNKNOWN_OPTION: &str = "unknown option";

/// Learner-facing state of one quiz set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateState {
    InProgress,
    Passed,
    LockedReview,
    UnlockedReview,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::InProgress => write!(f, "IN_PROGRESS"),
            GateState::Passed => write!(f, "PASSED"),
            GateState::LockedReview => write!(f, "LOCKED_REVIEW"),
            GateState::UnlockedReview => write!(f, "UNLOCKED_REVIEW"),
        }
    }
}

impl GateState {
    /// Answers may still be selected and submitted.
    pub fn can_select_answers(self) -> bool {
        self == GateState::InProgress
    }

    /// Correct answers and explanations are visible.
    pub fn can_view_solutions(self) -> bool {
        matches!(self, GateState::Passed | GateState::UnlockedReview)
    }

    /// The learner may see their own prior selections.
    pub fn can_view_own_selections(self) -> bool {
        self != GateState::InProgress
    }
}

/// Per-learner gate over one quiz set.
#[derive(Debug, Clone)]
pub struct AccessGate {
    state: GateState,
    attempts_used: u32,
    max_attempts: u32,
    passcode: String,
}

impl AccessGate {
    /// Derive the gate for `email` from the set's attempt history.
    pub fn from_history(set: &QuizSet, history: &[AttemptResult], email: &str) -> Self {
        Self::with_max_attempts(set, history, email, MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(
        set: &QuizSet,
        history: &[AttemptResult],
        email: &str,
        max_attempts: u32,
    ) -> Self {
        let mine: Vec<&AttemptResult> = history
            .iter()
            .filter(|a| a.quiz_set_id == set.id && a.is_by(email))
            .collect();
        let attempts_used = mine.len() as u32;

        let state = if mine.iter().any(|a| a.is_complete_success) {
            GateState::Passed
        } else if attempts_used < max_attempts {
            GateState::InProgress
        } else {
            GateState::LockedReview
        };

        Self {
            state,
            attempts_used,
            max_attempts,
            passcode: set.effective_passcode().to_string(),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts_used)
    }

    /// Number the next submission should carry.
    pub fn next_attempt_number(&self) -> u32 {
        self.attempts_used + 1
    }

    /// Check that a submission is allowed right now.
    pub fn ensure_can_submit(&self) -> Result<(), GateError> {
        if self.state.can_select_answers() {
            Ok(())
        } else {
            Err(GateError::AnswersLocked { state: self.state })
        }
    }

    /// Apply a freshly scored attempt.
    pub fn record_attempt(&mut self, attempt: &AttemptResult) -> Result<GateState, GateError> {
        self.ensure_can_submit()?;
        self.attempts_used += 1;

        let previous = self.state;
        if attempt.is_complete_success {
            self.state = GateState::Passed;
        } else if self.attempts_used >= self.max_attempts {
            self.state = GateState::LockedReview;
        }

        if previous != self.state {
            tracing::info!(from = %previous, to = %self.state, "gate transition");
        }
        Ok(self.state)
    }

    /// Unlock review with the set's passcode.
    ///
    /// The comparison is exact and in plaintext.
    pub fn unlock(&mut self, passcode: &str) -> Result<GateState, GateError> {
        if self.state != GateState::LockedReview {
            return Err(GateError::NotLocked { state: self.state });
        }
        if passcode != self.passcode {
            tracing::warn!("review unlock rejected: incorrect passcode");
            return Err(GateError::IncorrectPasscode);
        }
        self.state = GateState::UnlockedReview;
        tracing::info!(from = %GateState::LockedReview, to = %self.state, "gate transition");
        Ok(self.state)
    }
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// One answered question resolved to display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub question_id: String,
    pub question_text: String,
    pub selected_option_id: String,
    pub selected_text: String,
}

fn option_label(q: &Question, option_id: &str) -> String {
    q.option_text(option_id)
        .unwrap_or(UNKNOWN_OPTION)
        .to_string()
}

/// Resolve a stored attempt's answers against the set's current content.
///
/// Missing questions and options degrade to placeholder labels. Entries keep
/// the set's question order; answers to deleted questions trail behind.
pub fn trace_attempt(set: &QuizSet, attempt: &AttemptResult) -> Vec<TraceEntry> {
    let mut entries: Vec<TraceEntry> = set
        .questions
        .iter()
        .filter_map(|q| {
            let selected = attempt.answers.get(&q.id)?;
            Some(TraceEntry {
                question_id: q.id.clone(),
                question_text: q.text.clone(),
                selected_option_id: selected.clone(),
                selected_text: option_label(q, selected),
            })
        })
        .collect();

    for (question_id, option_id) in &attempt.answers {
        if set.question(question_id).is_none() {
            entries.push(TraceEntry {
                question_id: question_id.clone(),
                question_text: DELETED_QUESTION.to_string(),
                selected_option_id: option_id.clone(),
                selected_text: UNKNOWN_OPTION.to_string(),
            });
        }
    }
    entries
}

/// What a learner is shown for one question in review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub question_id: String,
    pub question_text: String,
    pub area: String,
    /// The learner's selection in their latest attempt.
    pub selected_text: Option<String>,
    /// Only present when solutions are visible.
    pub is_correct: Option<bool>,
    pub correct_text: Option<String>,
    pub explanation: Option<String>,
}

/// Build the review for `attempt` as permitted by `state`.
///
/// Returns nothing while the quiz is still in progress.
pub fn review_items(set: &QuizSet, attempt: &AttemptResult, state: GateState) -> Vec<ReviewItem> {
    if !state.can_view_own_selections() {
        return Vec::new();
    }
    let solutions = state.can_view_solutions();

    set.questions
        .iter()
        .map(|q| {
            let selected = attempt.answers.get(&q.id).map(String::as_str);
            let correct_text = q.correct_option().map(|o| o.text.clone());
            ReviewItem {
                question_id: q.id.clone(),
                question_text: q.text.clone(),
                area: q.area.clone(),
                selected_text: selected.map(|id| option_label(q, id)),
                is_correct: solutions.then(|| q.is_correct(selected)),
                correct_text: correct_text.filter(|_| solutions),
                explanation: q.explanation.clone().filter(|_| solutions),
            }
        })
        .collect()
}

/// A learner's attempts on one set, newest first.
pub fn history_for<'a>(
    history: &'a [AttemptResult],
    quiz_set_id: &str,
    email: &str,
) -> Vec<&'a AttemptResult> {
    let mut mine: Vec<&AttemptResult> = history
        .iter()
        .filter(|a| a.quiz_set_id == quiz_set_id && a.is_by(email))
        .collect();
    mine.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    mine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answers, Question, QuizOption, UserIdentity};
    use chrono::{Duration, Utc};

    const EMAIL: &str = "ren@example.com";
    const OTHER: &str = "other@example.com";

    fn sample_set() -> QuizSet {
        let mut set = QuizSet::new("Gate", "admin@example.com");
        set.id = "set-1".into();
        set.questions = vec![Question {
            id: "q1".into(),
            text: "Pick a".into(),
            options: vec![
                QuizOption {
                    id: "a".into(),
                    text: "Alpha".into(),
                },
                QuizOption {
                    id: "b".into(),
                    text: "Beta".into(),
                },
            ],
            correct_option_id: "a".into(),
            area: "Grammar".into(),
            explanation: Some("Alpha comes first.".into()),
            hint: None,
            translation: None,
        }];
        set
    }

    fn attempt(number: u32, choice: &str, email: &str) -> AttemptResult {
        let set = sample_set();
        let answers: Answers = Answers::from([("q1".to_string(), choice.to_string())]);
        let grade = crate::scoring::grade(&set.questions, &answers);
        AttemptResult {
            attempt_number: number,
            quiz_set_id: set.id,
            area_scores: grade.area_scores,
            is_complete_success: grade.is_complete_success,
            answers,
            timestamp: Utc::now() + Duration::minutes(number as i64),
            user: Some(UserIdentity::new(email, None)),
        }
    }

    #[test]
    fn fresh_learner_is_in_progress() {
        let gate = AccessGate::from_history(&sample_set(), &[], EMAIL);
        assert_eq!(gate.state(), GateState::InProgress);
        assert_eq!(gate.next_attempt_number(), 1);
        assert_eq!(gate.remaining_attempts(), 3);
        assert!(gate.ensure_can_submit().is_ok());
    }

    #[test]
    fn three_failures_lock_then_default_passcode_unlocks() {
        let set = sample_set();
        let mut gate = AccessGate::from_history(&set, &[], EMAIL);

        for n in 1..=2 {
            let state = gate.record_attempt(&attempt(n, "b", EMAIL)).unwrap();
            assert_eq!(state, GateState::InProgress);
        }
        let state = gate.record_attempt(&attempt(3, "b", EMAIL)).unwrap();
        assert_eq!(state, GateState::LockedReview);

        assert_eq!(gate.unlock("wrong"), Err(GateError::IncorrectPasscode));
        assert_eq!(gate.state(), GateState::LockedReview);

        assert_eq!(gate.unlock("teacher").unwrap(), GateState::UnlockedReview);
        assert!(gate.state().can_view_solutions());
    }

    #[test]
    fn configured_passcode_replaces_fallback() {
        let mut set = sample_set();
        set.passcode = Some("open-sesame".into());
        let history: Vec<_> = (1..=3).map(|n| attempt(n, "b", EMAIL)).collect();

        let mut gate = AccessGate::from_history(&set, &history, EMAIL);
        assert_eq!(gate.state(), GateState::LockedReview);
        assert_eq!(gate.unlock("teacher"), Err(GateError::IncorrectPasscode));
        let state = gate.unlock("open-sesame").unwrap();
        assert_eq!(state, GateState::UnlockedReview);
    }

    #[test]
    fn any_success_in_history_means_passed() {
        let history = vec![attempt(1, "b", EMAIL), attempt(2, "a", EMAIL)];
        let gate = AccessGate::from_history(&sample_set(), &history, EMAIL);
        assert_eq!(gate.state(), GateState::Passed);
        let err = gate.ensure_can_submit().unwrap_err();
        assert_eq!(err.to_string(), "answers are locked: quiz is PASSED");
    }

    #[test]
    fn other_users_attempts_do_not_count() {
        let history: Vec<_> = (1..=3).map(|n| attempt(n, "b", OTHER)).collect();
        let gate = AccessGate::from_history(&sample_set(), &history, EMAIL);
        assert_eq!(gate.state(), GateState::InProgress);
    }

    #[test]
    fn success_on_last_attempt_passes() {
        let history = vec![attempt(1, "b", EMAIL), attempt(2, "b", EMAIL)];
        let mut gate = AccessGate::from_history(&sample_set(), &history, EMAIL);
        let state = gate.record_attempt(&attempt(3, "a", EMAIL)).unwrap();
        assert_eq!(state, GateState::Passed);
    }

    #[test]
    fn unlock_outside_locked_review_is_rejected() {
        let mut gate = AccessGate::from_history(&sample_set(), &[], EMAIL);
        let err = gate.unlock("teacher").unwrap_err();
        assert_eq!(err.to_string(), "review is not locked: quiz is IN_PROGRESS");
    }

    #[test]
    fn unlock_is_not_persisted() {
        let set = sample_set();
        let history: Vec<_> = (1..=3).map(|n| attempt(n, "b", EMAIL)).collect();
        let mut gate = AccessGate::from_history(&set, &history, EMAIL);
        gate.unlock("teacher").unwrap();

        let reloaded = AccessGate::from_history(&set, &history, EMAIL);
        assert_eq!(reloaded.state(), GateState::LockedReview);
    }

    #[test]
    fn locked_review_hides_solutions() {
        let set = sample_set();
        let last = attempt(3, "b", EMAIL);

        let locked = review_items(&set, &last, GateState::LockedReview);
        assert_eq!(locked[0].selected_text.as_deref(), Some("Beta"));
        assert_eq!(locked[0].is_correct, None);
        assert_eq!(locked[0].correct_text, None);
        assert_eq!(locked[0].explanation, None);

        let unlocked = review_items(&set, &last, GateState::UnlockedReview);
        assert_eq!(unlocked[0].is_correct, Some(false));
        assert_eq!(unlocked[0].correct_text.as_deref(), Some("Alpha"));
        assert!(unlocked[0].explanation.is_some());

        assert!(review_items(&set, &last, GateState::InProgress).is_empty());
    }

    #[test]
    fn trace_degrades_to_placeholders() {
        let set = sample_set();
        let mut stale = attempt(1, "z", EMAIL);
        stale.answers.insert("q-removed".into(), "a".into());

        let trace = trace_attempt(&set, &stale);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].selected_text, UNKNOWN_OPTION);
        assert_eq!(trace[1].question_text, DELETED_QUESTION);
    }

    #[test]
    fn history_is_newest_first() {
        let history = vec![
            attempt(1, "b", EMAIL),
            attempt(3, "b", EMAIL),
            attempt(2, "b", OTHER),
            attempt(2, "b", EMAIL),
        ];
        let mine = history_for(&history, "set-1", EMAIL);
        let numbers: Vec<u32> = mine.iter().map(|a| a.attempt_number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn state_display_matches_wire_name() {
        assert_eq!(GateState::LockedReview.to_string(), "LOCKED_REVIEW");
        assert_eq!(
            serde_json::to_string(&GateState::UnlockedReview).unwrap(),
            "\"UNLOCKED_REVIEW\""
        );
    }
}
