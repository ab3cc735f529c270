//! Core data model types for quizgate.
//!
//! These are the shapes the whole system shares: questions and quiz sets
//! authored by admins, the identity of whoever submits an attempt, and the
//! immutable attempt records produced by the scorer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Passcode that unlocks review when a quiz set does not configure its own.
pub const FALLBACK_PASSCODE: &str = "teacher";

/// Maximum number of attempts a learner gets on one quiz set.
pub const MAX_ATTEMPTS: u32 = 3;

/// Area assigned to freshly created questions.
pub const DEFAULT_AREA: &str = "Grammar";

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique within its quiz set.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Ordered options; at least two.
    pub options: Vec<QuizOption>,
    /// Must reference exactly one option id.
    pub correct_option_id: String,
    /// Free-form grouping label defined by the admin.
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Question {
    /// A placeholder question the editor starts from.
    pub fn new_placeholder() -> Self {
        let options = (1..=4)
            .map(|i| QuizOption {
                id: format!("opt{i}"),
                text: format!("Option {i}"),
            })
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            text: "New Question Text".into(),
            options,
            correct_option_id: "opt1".into(),
            area: DEFAULT_AREA.into(),
            explanation: Some("Explanation here.".into()),
            hint: None,
            translation: None,
        }
    }

    /// Whether the given selection is the correct option. A missing
    /// selection is never correct.
    pub fn is_correct(&self, selected: Option<&str>) -> bool {
        selected == Some(self.correct_option_id.as_str())
    }

    /// Look up the text of an option by id.
    pub fn option_text(&self, option_id: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.text.as_str())
    }

    /// The correct option, if `correct_option_id` resolves.
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == self.correct_option_id)
    }
}

/// An ordered collection of questions taken as one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSet {
    /// Unique identifier for this quiz set.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    /// Email of the admin who created the set.
    pub created_by: String,
    /// Shared secret gating post-failure review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
}

impl QuizSet {
    /// Create an empty set owned by `created_by`.
    pub fn new(title: &str, created_by: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: String::new(),
            questions: Vec::new(),
            created_at: Utc::now(),
            created_by: created_by.to_string(),
            passcode: None,
        }
    }

    /// Find a question by id.
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Distinct areas in order of first appearance.
    pub fn areas(&self) -> Vec<&str> {
        let mut areas: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !areas.contains(&q.area.as_str()) {
                areas.push(&q.area);
            }
        }
        areas
    }

    /// Questions grouped by area, areas in order of first appearance.
    pub fn questions_by_area(&self) -> Vec<(&str, Vec<&Question>)> {
        self.areas()
            .into_iter()
            .map(|area| {
                let questions = self.questions.iter().filter(|q| q.area == area).collect();
                (area, questions)
            })
            .collect()
    }

    /// The passcode that unlocks review: the configured one, or the fallback.
    pub fn effective_passcode(&self) -> &str {
        self.passcode.as_deref().unwrap_or(FALLBACK_PASSCODE)
    }
}

/// Who a session belongs to, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub email: String,
    pub display_name: String,
}

impl UserIdentity {
    /// Build an identity, falling back to the email's local part when no
    /// display name is supplied.
    pub fn new(email: &str, display_name: Option<&str>) -> Self {
        let display_name = match display_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => email.split('@').next().unwrap_or(email).to_string(),
        };
        Self {
            email: email.to_string(),
            display_name,
        }
    }
}

/// Role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Learner,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Learner => write!(f, "learner"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "learner" | "student" => Ok(UserRole::Learner),
            "admin" | "teacher" => Ok(UserRole::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An identity together with its resolved role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub identity: UserIdentity,
    pub role: UserRole,
}

/// Correct/total tally for one area within an attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaScore {
    pub correct: u32,
    pub total: u32,
}

impl AreaScore {
    /// Every question in the area was answered correctly.
    pub fn is_mastered(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// Mapping from question id to the chosen option id.
pub type Answers = BTreeMap<String, String>;

/// One scored submission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// 1-based, increasing per user per quiz set.
    pub attempt_number: u32,
    pub quiz_set_id: String,
    /// Area name to tally, covering every area of the set at scoring time.
    pub area_scores: BTreeMap<String, AreaScore>,
    /// True iff every question was answered correctly.
    pub is_complete_success: bool,
    pub answers: Answers,
    pub timestamp: DateTime<Utc>,
    /// Submitting user; absent on records that predate identity tracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserIdentity>,
}

impl AttemptResult {
    pub fn total_correct(&self) -> u32 {
        self.area_scores.values().map(|s| s.correct).sum()
    }

    pub fn total_questions(&self) -> u32 {
        self.area_scores.values().map(|s| s.total).sum()
    }

    /// Percentage of questions answered correctly; 0 when there were none.
    pub fn score_percent(&self) -> f64 {
        let total = self.total_questions();
        if total == 0 {
            0.0
        } else {
            100.0 * self.total_correct() as f64 / total as f64
        }
    }

    /// Areas where every question was answered correctly.
    pub fn mastered_areas(&self) -> Vec<&str> {
        self.area_scores
            .iter()
            .filter(|(_, s)| s.is_mastered())
            .map(|(area, _)| area.as_str())
            .collect()
    }

    /// Whether this attempt was submitted by `email`.
    pub fn is_by(&self, email: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.email == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, area: &str, correct: &str) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
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
            correct_option_id: correct.into(),
            area: area.into(),
            explanation: None,
            hint: None,
            translation: None,
        }
    }

    #[test]
    fn role_display_and_parse() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!("Learner".parse::<UserRole>().unwrap(), UserRole::Learner);
        assert_eq!("teacher".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("guest".parse::<UserRole>().is_err());
    }

    #[test]
    fn identity_falls_back_to_email_local_part() {
        let user = UserIdentity::new("hana@example.jp", None);
        assert_eq!(user.display_name, "hana");

        let named = UserIdentity::new("hana@example.jp", Some("Hana S."));
        assert_eq!(named.display_name, "Hana S.");
    }

    #[test]
    fn areas_keep_first_appearance_order() {
        let mut set = QuizSet::new("Set", "admin@example.com");
        set.questions = vec![
            question("q1", "Vocabulary", "a"),
            question("q2", "Grammar", "a"),
            question("q3", "Vocabulary", "b"),
        ];

        assert_eq!(set.areas(), vec!["Vocabulary", "Grammar"]);
        let grouped = set.questions_by_area();
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].1[0].id, "q2");
    }

    #[test]
    fn effective_passcode_uses_fallback() {
        let mut set = QuizSet::new("Set", "admin@example.com");
        assert_eq!(set.effective_passcode(), FALLBACK_PASSCODE);
        set.passcode = Some("s3cret".into());
        assert_eq!(set.effective_passcode(), "s3cret");
    }

    #[test]
    fn missing_selection_is_incorrect() {
        let q = question("q1", "Grammar", "a");
        assert!(q.is_correct(Some("a")));
        assert!(!q.is_correct(Some("b")));
        assert!(!q.is_correct(None));
        assert_eq!(q.option_text("b"), Some("Beta"));
        assert_eq!(q.option_text("z"), None);
    }

    #[test]
    fn placeholder_question_is_consistent() {
        let q = Question::new_placeholder();
        assert_eq!(q.options.len(), 4);
        assert!(q.correct_option().is_some());
        assert_eq!(q.area, DEFAULT_AREA);
    }

    #[test]
    fn attempt_serde_roundtrip() {
        let grammar = AreaScore {
            correct: 1,
            total: 2,
        };
        let mut area_scores = BTreeMap::new();
        area_scores.insert("Grammar".to_string(), grammar);
        let attempt = AttemptResult {
            attempt_number: 2,
            quiz_set_id: "set-1".into(),
            area_scores,
            is_complete_success: false,
            answers: Answers::from([("q1".to_string(), "a".to_string())]),
            timestamp: Utc::now(),
            user: Some(UserIdentity::new("kai@example.com", Some("Kai"))),
        };

        let json = serde_json::to_string(&attempt).unwrap();
        let parsed: AttemptResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, attempt);
        assert_eq!(parsed.score_percent(), 50.0);
        assert!(parsed.mastered_areas().is_empty());
    }

    #[test]
    fn attempt_without_user_deserializes() {
        let json = r#"{
            "attempt_number": 1,
            "quiz_set_id": "set-1",
            "area_scores": {},
            "is_complete_success": true,
            "answers": {},
            "timestamp": "2025-01-01T00:00:00Z"
        }"#;
        let parsed: AttemptResult = serde_json::from_str(json).unwrap();
        assert!(parsed.user.is_none());
        assert_eq!(parsed.score_percent(), 0.0);
    }
}
