pub mod admins;
pub mod import;
pub mod init;
pub mod insights;
pub mod models;
pub mod reset;
pub mod review;
pub mod sets;
pub mod stats;
pub mod take;
pub mod template;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizgate_core::model::{Answers, QuizSet};
use quizgate_core::traits::QuizSetStore;
use quizgate_insights::{load_config_from, QuizgateConfig};
use quizgate_store::JsonFileStore;

/// Options shared by every subcommand.
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Loaded configuration plus the opened data store.
pub struct Session {
    pub config: QuizgateConfig,
    pub store: JsonFileStore,
}

impl Session {
    pub fn open(opts: &GlobalOpts) -> Result<Self> {
        let config = load_config_from(opts.config.as_deref())?;
        let data_dir = opts
            .data_dir
            .clone()
            .unwrap_or_else(|| config.data_dir.clone());
        let store = JsonFileStore::open(&data_dir, &config.root_admin)?;
        Ok(Self { config, store })
    }

    /// Fetch a set or fail with a readable message.
    pub fn quiz_set(&self, id: &str) -> Result<QuizSet> {
        self.store
            .get_set(id)?
            .with_context(|| format!("quiz set not found: {id} (run `quizgate sets` to list them)"))
    }
}

/// Parse `q1=b,q2=c` into an answer map.
pub fn parse_answers(raw: &str) -> Result<Answers> {
    let mut answers = Answers::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (question, option) = pair
            .split_once('=')
            .with_context(|| format!("invalid answer '{pair}', expected question=option"))?;
        let (question, option) = (question.trim(), option.trim());
        anyhow::ensure!(
            !question.is_empty() && !option.is_empty(),
            "invalid answer '{pair}', expected question=option"
        );
        answers.insert(question.to_string(), option.to_string());
    }
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answer_pairs() {
        let answers = parse_answers("q1=b, q2 = c,").unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers["q2"], "c");
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_answers("q1").is_err());
        assert!(parse_answers("q1=").is_err());
    }
}
