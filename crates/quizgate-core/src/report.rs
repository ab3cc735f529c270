//! Analytics report with JSON persistence and Markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AttemptResult, QuizSet};
use crate::statistics::{
    aggregate_question_stats, detect_distractors, error_frequency_series, significant_distractors,
    student_performance, AdminQuestionStats, DistractorFinding, ErrorFrequencyPoint, StudentStat,
};

/// Everything the admin analytics view shows for one quiz set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub quiz_set: QuizSetSummary,
    /// Number of attempts the report was built from.
    pub attempt_count: usize,
    /// Per-question stats, highest error count first.
    pub questions: Vec<AdminQuestionStats>,
    pub distractors: Vec<DistractorFinding>,
    /// Per-student stats, lowest average first.
    pub students: Vec<StudentStat>,
    pub error_series: Vec<ErrorFrequencyPoint>,
}

/// Summary of a quiz set (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSetSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
    pub areas: Vec<String>,
}

impl AnalyticsReport {
    /// Build a report from a set and its attempt history.
    pub fn build(set: &QuizSet, attempts: &[AttemptResult]) -> Self {
        let attempts: Vec<AttemptResult> = attempts
            .iter()
            .filter(|a| a.quiz_set_id == set.id)
            .cloned()
            .collect();
        let questions = aggregate_question_stats(set, &attempts);

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz_set: QuizSetSummary {
                id: set.id.clone(),
                title: set.title.clone(),
                question_count: set.questions.len(),
                areas: set.areas().into_iter().map(String::from).collect(),
            },
            attempt_count: attempts.len(),
            distractors: detect_distractors(&questions),
            students: student_performance(&attempts),
            error_series: error_frequency_series(&questions),
            questions,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AnalyticsReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.quiz_set.title));
        md.push_str(&format!(
            "**Summary:** {} questions, {} attempts, {} students\n\n",
            self.quiz_set.question_count,
            self.attempt_count,
            self.students.len()
        ));

        if self.attempt_count == 0 {
            md.push_str("No attempts recorded yet.\n");
            return md;
        }

        md.push_str("## Error frequency\n\n");
        md.push_str("| # | Area | Attempts | Errors | Error rate |\n");
        md.push_str("|---|------|----------|--------|------------|\n");
        for point in &self.error_series {
            let area = self
                .questions
                .iter()
                .find(|q| q.original_index == point.original_index)
                .map(|q| q.area.as_str())
                .unwrap_or("");
            md.push_str(&format!(
                "| {} | {} | {} | {} | {:.1}%{} |\n",
                point.label,
                area,
                point.attempts,
                point.errors,
                point.error_rate_percent,
                if point.is_high_error { " ⚠" } else { "" }
            ));
        }
        md.push('\n');

        let significant = significant_distractors(&self.questions);
        if !significant.is_empty() {
            md.push_str("## Distractors\n\n");
            md.push_str("| # | Question | Top wrong option | Picks | Share |\n");
            md.push_str("|---|----------|------------------|-------|-------|\n");
            for d in significant {
                md.push_str(&format!(
                    "| Q{} | {} | {} | {}/{} | {:.0}% |\n",
                    d.original_index,
                    d.question_text,
                    d.top_wrong_option_id,
                    d.top_wrong_count,
                    d.error_count,
                    d.share * 100.0
                ));
            }
            md.push('\n');
        }

        md.push_str("## Students\n\n");
        md.push_str("| Student | Attempts | Passes | Average | Last active |\n");
        md.push_str("|---------|----------|--------|---------|-------------|\n");
        for s in &self.students {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% | {} |\n",
                s.display_name,
                s.attempts,
                s.passes,
                s.average_score,
                s.last_active.format("%Y-%m-%d %H:%M")
            ));
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answers, Question, QuizOption, UserIdentity};

    fn sample_set() -> QuizSet {
        let mut set = QuizSet::new("Unit 1", "admin@example.com");
        set.id = "unit-1".into();
        set.questions = (1..=2)
            .map(|i| Question {
                id: format!("q{i}"),
                text: format!("Question {i}"),
                options: ["x", "y", "z"]
                    .iter()
                    .map(|o| QuizOption {
                        id: o.to_string(),
                        text: o.to_string(),
                    })
                    .collect(),
                correct_option_id: "z".into(),
                area: "Grammar".into(),
                explanation: None,
                hint: None,
                translation: None,
            })
            .collect();
        set
    }

    fn attempt(set: &QuizSet, email: &str, q1: &str, q2: &str) -> AttemptResult {
        let answers = Answers::from([
            ("q1".to_string(), q1.to_string()),
            ("q2".to_string(), q2.to_string()),
        ]);
        let grade = crate::scoring::grade(&set.questions, &answers);
        AttemptResult {
            attempt_number: 1,
            quiz_set_id: set.id.clone(),
            area_scores: grade.area_scores,
            is_complete_success: grade.is_complete_success,
            answers,
            timestamp: Utc::now(),
            user: Some(UserIdentity::new(email, None)),
        }
    }

    fn make_report() -> AnalyticsReport {
        let set = sample_set();
        let attempts = vec![
            attempt(&set, "a@x.com", "x", "z"),
            attempt(&set, "b@x.com", "x", "z"),
            attempt(&set, "c@x.com", "x", "y"),
            attempt(&set, "d@x.com", "y", "z"),
        ];
        AnalyticsReport::build(&set, &attempts)
    }

    #[test]
    fn build_collects_all_views() {
        let report = make_report();
        assert_eq!(report.attempt_count, 4);
        assert_eq!(report.questions[0].question_id, "q1");
        assert_eq!(report.questions[0].error_count, 4);
        assert!(report.distractors[0].is_significant);
        assert_eq!(report.students.len(), 4);
        assert_eq!(report.error_series[0].label, "Q1");
        assert_eq!(report.quiz_set.areas, vec!["Grammar"]);
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("unit-1.json");

        report.save_json(&path).unwrap();
        let loaded = AnalyticsReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.quiz_set.id, "unit-1");
        assert_eq!(loaded.questions, report.questions);
    }

    #[test]
    fn markdown_output() {
        let md = make_report().to_markdown();
        assert!(md.contains("# Unit 1"));
        assert!(md.contains("## Distractors"));
        assert!(md.contains("| Q1 | Grammar | 4 | 4 | 100.0% ⚠ |"));
        assert!(md.contains("## Students"));
    }

    #[test]
    fn markdown_without_attempts() {
        let md = AnalyticsReport::build(&sample_set(), &[]).to_markdown();
        assert!(md.contains("No attempts recorded yet."));
        assert!(!md.contains("## Students"));
    }
}
