//! Quiz-set loading.
//!
//! Reads quiz sets from TOML files and directories, imports questions from
//! CSV exports, and validates sets for common authoring mistakes.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{Question, QuizOption, QuizSet};

/// Intermediate TOML structure for quiz-set files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz_set: TomlQuizSetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizSetHeader {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_author")]
    created_by: String,
    #[serde(default)]
    passcode: Option<String>,
}

fn default_author() -> String {
    "unknown".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    #[serde(default = "default_area")]
    area: String,
    correct: String,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    options: Vec<TomlOption>,
}

fn default_area() -> String {
    crate::model::DEFAULT_AREA.to_string()
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
}

/// Parse a single TOML file into a `QuizSet`.
pub fn parse_quiz_set(path: &Path) -> Result<QuizSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz set file: {}", path.display()))?;

    parse_quiz_set_str(&content, path)
}

/// Parse a TOML string into a `QuizSet`.
pub fn parse_quiz_set_str(content: &str, source_path: &Path) -> Result<QuizSet> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            text: q.text,
            options: q
                .options
                .into_iter()
                .map(|o| QuizOption {
                    id: o.id,
                    text: o.text,
                })
                .collect(),
            correct_option_id: q.correct,
            area: q.area,
            explanation: q.explanation,
            hint: q.hint,
            translation: q.translation,
        })
        .collect();

    let header = parsed.quiz_set;
    Ok(QuizSet {
        id: header.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        title: header.title,
        description: header.description,
        questions,
        created_at: Utc::now(),
        created_by: header.created_by,
        passcode: header.passcode,
    })
}

/// Recursively load all `.toml` quiz-set files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<QuizSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

/// Header row of the import template.
pub const CSV_HEADER: &str = "Category,Question,Option A,Option B,Option C,Option D,Correct Answer (A/B/C/D),Explanation,Hint (Optional),Translation (Optional)";

const CSV_EXAMPLE_ROW: &str = "Grammar,\"She ___ to the store.\",go,goes,going,gone,B,\"Third person singular requires **goes**.\",Think about subject-verb agreement,\"彼女は店に行きます\"";

/// Minimum columns a row needs: area, text, four options, answer.
const MIN_CSV_COLUMNS: usize = 7;

/// A printable import template: header plus one example row.
pub fn csv_template() -> String {
    format!("{CSV_HEADER}\n{CSV_EXAMPLE_ROW}\n")
}

/// Split one CSV line into trimmed cells. `""` inside quotes is a literal quote.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(cell.trim().to_string());
                cell.clear();
            }
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

/// Map `A`-`D` or `1`-`4` to an option index; anything else picks the first.
fn correct_index(raw: &str) -> usize {
    match raw.trim().to_lowercase().as_str() {
        "a" | "1" => 0,
        "b" | "2" => 1,
        "c" | "3" => 2,
        "d" | "4" => 3,
        _ => 0,
    }
}

/// Split on `\r\n`, `\n` or a lone `\r`.
fn csv_lines(content: &str) -> Vec<&str> {
    content
        .split("\r\n")
        .flat_map(|chunk| chunk.split(['\n', '\r']))
        .collect()
}

fn non_empty(cell: Option<&String>) -> Option<String> {
    cell.filter(|c| !c.is_empty()).cloned()
}

/// Parse CSV content into fresh questions.
///
/// Rows with fewer than seven columns and blank lines are skipped.
pub fn parse_csv_questions(content: &str) -> Vec<Question> {
    let lines = csv_lines(content);
    let start = match lines.first() {
        Some(first) if first.to_lowercase().contains("category") => 1,
        _ => 0,
    };

    let mut questions = Vec::new();
    for (line_no, line) in lines.iter().enumerate().skip(start) {
        if line.trim().is_empty() {
            continue;
        }
        let cols = split_csv_line(line);
        if cols.len() < MIN_CSV_COLUMNS {
            tracing::debug!(line = line_no + 1, "skipping short CSV row");
            continue;
        }

        let options: Vec<QuizOption> = cols[2..6]
            .iter()
            .map(|text| QuizOption {
                id: Uuid::new_v4().to_string(),
                text: text.clone(),
            })
            .collect();
        let correct_option_id = options[correct_index(&cols[6])].id.clone();

        questions.push(Question {
            id: Uuid::new_v4().to_string(),
            text: if cols[1].is_empty() {
                "Untitled Question".to_string()
            } else {
                cols[1].clone()
            },
            options,
            correct_option_id,
            area: if cols[0].is_empty() {
                "General".to_string()
            } else {
                cols[0].clone()
            },
            explanation: non_empty(cols.get(7)),
            hint: non_empty(cols.get(8)),
            translation: non_empty(cols.get(9)),
        });
    }
    questions
}

/// Read a CSV file and parse it into questions.
pub fn import_csv(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read CSV file: {}", path.display()))?;
    Ok(parse_csv_questions(&content))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A warning from quiz-set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz set for common issues.
pub fn validate_quiz_set(set: &QuizSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz set has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in &set.questions {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message,
            })
        };

        if !seen_ids.insert(&q.id) {
            warn(format!("duplicate question ID: {}", q.id));
        }
        if q.text.trim().is_empty() {
            warn("question text is empty".into());
        }
        if q.options.len() < 2 {
            warn(format!("only {} option(s); at least 2 required", q.options.len()));
        }

        let mut option_ids = HashSet::new();
        for o in &q.options {
            if !option_ids.insert(&o.id) {
                warn(format!("duplicate option ID: {}", o.id));
            }
        }
        if q.correct_option().is_none() {
            warn(format!(
                "correct option '{}' is not among the options",
                q.correct_option_id
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz_set]
id = "unit-3"
title = "Unit 3 Review"
description = "Tenses and vocabulary"
created_by = "tobita@kiryo.ac.jp"
passcode = "letmein"

[[questions]]
id = "q1"
text = "She ___ to school every day."
area = "Grammar"
correct = "b"
explanation = "Third person singular takes -s."

[[questions.options]]
id = "a"
text = "go"

[[questions.options]]
id = "b"
text = "goes"

[[questions]]
id = "q2"
text = "Choose the synonym of 'rapid'."
correct = "a"

[[questions.options]]
id = "a"
text = "fast"

[[questions.options]]
id = "b"
text = "slow"
"#;

    #[test]
    fn parse_valid_toml() {
        let set = parse_quiz_set_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(set.id, "unit-3");
        assert_eq!(set.passcode.as_deref(), Some("letmein"));
        assert_eq!(set.questions.len(), 2);
        assert_eq!(set.questions[0].options[1].text, "goes");
        assert_eq!(set.questions[1].area, "Grammar");
        assert!(validate_quiz_set(&set).is_empty());
    }

    #[test]
    fn missing_id_gets_generated() {
        let toml = "[quiz_set]\ntitle = \"Untitled\"\n";
        let set = parse_quiz_set_str(toml, &PathBuf::from("t.toml")).unwrap();
        assert!(!set.id.is_empty());
        assert_eq!(set.created_by, "unknown");
        assert!(set.questions.is_empty());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_quiz_set_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "nope = [").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("notes.txt"), "ignored").unwrap();

        let sets = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id, "unit-3");
    }

    #[test]
    fn csv_line_handles_quotes() {
        let cells = split_csv_line(r#"Grammar, "He said ""hi"", then left" ,b"#);
        assert_eq!(cells, vec!["Grammar", "He said \"hi\", then left", "b"]);
    }

    #[test]
    fn csv_import_from_template() {
        let questions = parse_csv_questions(&csv_template());
        assert_eq!(questions.len(), 1);

        let q = &questions[0];
        assert_eq!(q.area, "Grammar");
        assert_eq!(q.text, "She ___ to the store.");
        assert_eq!(q.correct_option().unwrap().text, "goes");
        assert_eq!(q.translation.as_deref(), Some("彼女は店に行きます"));
    }

    #[test]
    fn csv_import_defaults_and_skips() {
        let csv = "\
,,yes,no,maybe,never,3
Vocabulary,Too short,a,b
Reading,Pick one,w,x,y,z,q

Reading,Numbered,w,x,y,z,4,,hint only
";
        let questions = parse_csv_questions(csv);
        assert_eq!(questions.len(), 3);

        assert_eq!(questions[0].area, "General");
        assert_eq!(questions[0].text, "Untitled Question");
        assert_eq!(questions[0].correct_option().unwrap().text, "maybe");

        assert_eq!(questions[1].correct_option().unwrap().text, "w");

        assert_eq!(questions[2].correct_option().unwrap().text, "z");
        assert_eq!(questions[2].explanation, None);
        assert_eq!(questions[2].hint.as_deref(), Some("hint only"));
    }

    #[test]
    fn csv_accepts_any_line_ending() {
        let csv = [
            "Category,Question,A,B,C,D,Correct",
            "Grammar,One,a,b,c,d,B",
            "Grammar,Two,a,b,c,d,A",
        ]
        .join("\r");
        let questions = parse_csv_questions(&csv);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_option().unwrap().text, "b");
        assert_eq!(questions[1].text, "Two");

        let mixed = "Grammar,One,a,b,c,d,B\r\nGrammar,Two,a,b,c,d,A\rVocab,Three,a,b,c,d,C\n";
        let texts: Vec<String> = parse_csv_questions(mixed)
            .into_iter()
            .map(|q| q.text)
            .collect();
        assert_eq!(texts, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn csv_ids_are_fresh() {
        let csv = "Grammar,One,a,b,c,d,A\nGrammar,Two,a,b,c,d,A\n";
        let questions = parse_csv_questions(csv);
        assert_ne!(questions[0].id, questions[1].id);
        assert_ne!(questions[0].options[0].id, questions[1].options[0].id);
    }

    #[test]
    fn validate_catches_broken_questions() {
        let mut set = parse_quiz_set_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        set.questions[1].id = "q1".into();
        set.questions[1].correct_option_id = "zzz".into();
        set.questions[0].options.truncate(1);
        set.questions[0].correct_option_id = "a".into();

        let warnings = validate_quiz_set(&set);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate question ID")));
        assert!(messages.iter().any(|m| m.contains("at least 2")));
        assert!(messages.iter().any(|m| m.contains("'zzz'")));
    }

    #[test]
    fn validate_empty_set() {
        let set = QuizSet::new("Empty", "a@x.com");
        let warnings = validate_quiz_set(&set);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question_id.is_none());
    }
}
