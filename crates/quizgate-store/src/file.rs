//! JSON-file store.
//!
//! One JSON document per key inside a data directory. Every write goes to a
//! temporary file in the same directory and is renamed over the target, so a
//! crash never leaves a half-written blob behind. Read-modify-write cycles are
//! serialized by an in-process lock; separate processes sharing a directory
//! can still lose updates.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use quizgate_core::admin::AdminWhitelist;
use quizgate_core::error::WhitelistError;
use quizgate_core::model::{AttemptResult, QuizSet};
use quizgate_core::traits::{AdminStore, AttemptStore, QuizSetStore};

use crate::seed::default_quiz_set;

pub const QUIZ_SETS_FILE: &str = "quiz_sets.json";
pub const ATTEMPTS_FILE: &str = "attempts.json";
pub const ADMINS_FILE: &str = "admins.json";

/// Store backed by JSON files in a directory.
pub struct JsonFileStore {
    dir: PathBuf,
    root_admin: String,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>, root_admin: &str) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory: {}", dir.display()))?;
        Ok(Self {
            dir,
            root_admin: root_admin.to_string(),
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another writer panicked; the files
        // themselves are replaced atomically and stay consistent.
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.path(file);
        let json = serde_json::to_vec_pretty(value)
            .with_context(|| format!("failed to serialize {file}"))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed to create temp file in {}", self.dir.display()))?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn load_sets(&self) -> Result<Vec<QuizSet>> {
        match self.read(QUIZ_SETS_FILE)? {
            Some(sets) => Ok(sets),
            None => {
                let seeded = vec![default_quiz_set()];
                self.write(QUIZ_SETS_FILE, &seeded)?;
                tracing::info!(dir = %self.dir.display(), "seeded default quiz set");
                Ok(seeded)
            }
        }
    }

    fn load_attempts(&self) -> Result<Vec<AttemptResult>> {
        Ok(self.read(ATTEMPTS_FILE)?.unwrap_or_default())
    }

    fn load_whitelist(&self) -> Result<AdminWhitelist> {
        let stored: Vec<String> = self.read(ADMINS_FILE)?.unwrap_or_default();
        Ok(AdminWhitelist::from_members(&self.root_admin, stored))
    }

    fn save_whitelist(&self, list: &AdminWhitelist) -> Result<()> {
        let members: Vec<&String> = list.members().iter().collect();
        self.write(ADMINS_FILE, &members)
    }
}

impl QuizSetStore for JsonFileStore {
    fn get_set(&self, id: &str) -> Result<Option<QuizSet>> {
        let _guard = self.guard();
        Ok(self.load_sets()?.into_iter().find(|s| s.id == id))
    }

    fn list_sets(&self) -> Result<Vec<QuizSet>> {
        let _guard = self.guard();
        self.load_sets()
    }

    fn save_set(&self, set: &QuizSet) -> Result<()> {
        let _guard = self.guard();
        let mut sets = self.load_sets()?;
        match sets.iter_mut().find(|s| s.id == set.id) {
            Some(existing) => *existing = set.clone(),
            None => sets.push(set.clone()),
        }
        self.write(QUIZ_SETS_FILE, &sets)
            .with_context(|| format!("failed to save quiz set {}", set.id))
    }

    fn delete_set(&self, id: &str) -> Result<()> {
        let _guard = self.guard();
        let mut sets = self.load_sets()?;
        sets.retain(|s| s.id != id);
        self.write(QUIZ_SETS_FILE, &sets)
            .with_context(|| format!("failed to delete quiz set {id}"))
    }
}

impl AttemptStore for JsonFileStore {
    fn append(&self, attempt: &AttemptResult) -> Result<()> {
        let _guard = self.guard();
        let mut attempts = self.load_attempts()?;
        attempts.push(attempt.clone());
        self.write(ATTEMPTS_FILE, &attempts)
    }

    fn list_all(&self) -> Result<Vec<AttemptResult>> {
        let _guard = self.guard();
        self.load_attempts()
    }

    fn clear_all(&self) -> Result<()> {
        let _guard = self.guard();
        let empty: Vec<AttemptResult> = Vec::new();
        self.write(ATTEMPTS_FILE, &empty)?;
        tracing::warn!(dir = %self.dir.display(), "all attempts cleared");
        Ok(())
    }
}

impl AdminStore for JsonFileStore {
    fn list(&self) -> Result<BTreeSet<String>> {
        let _guard = self.guard();
        Ok(self.load_whitelist()?.members().clone())
    }

    fn add(&self, email: &str) -> Result<()> {
        let _guard = self.guard();
        let mut list = self.load_whitelist()?;
        if list.add(email)? {
            self.save_whitelist(&list)?;
        }
        Ok(())
    }

    fn remove(&self, email: &str) -> Result<()> {
        let _guard = self.guard();
        let mut list = self.load_whitelist()?;
        match list.remove(email) {
            Ok(true) => self.save_whitelist(&list),
            Ok(false) => Ok(()),
            Err(WhitelistError::ProtectedMember(root)) => {
                tracing::debug!(email = %root, "ignoring removal of protected admin");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizgate_core::admin::DEFAULT_ROOT_ADMIN;
    use quizgate_core::model::{Answers, UserIdentity};
    use quizgate_core::scoring::AttemptScorer;

    use crate::seed::DEFAULT_SET_ID;

    fn open(dir: &Path) -> JsonFileStore {
        JsonFileStore::open(dir, DEFAULT_ROOT_ADMIN).unwrap()
    }

    #[test]
    fn seeds_default_set_on_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        let sets = store.list_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id, DEFAULT_SET_ID);
        assert!(dir.path().join(QUIZ_SETS_FILE).exists());
    }

    #[test]
    fn deleted_sets_stay_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        store.delete_set(DEFAULT_SET_ID).unwrap();
        assert!(store.list_sets().unwrap().is_empty());
        assert!(open(dir.path()).get_set(DEFAULT_SET_ID).unwrap().is_none());
    }

    #[test]
    fn save_set_inserts_then_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        let mut set = QuizSet::new("Unit 2", "tobita@kiryo.ac.jp");
        set.passcode = Some("unit2".into());
        store.save_set(&set).unwrap();
        assert_eq!(store.list_sets().unwrap().len(), 2);

        set.title = "Unit 2 (revised)".into();
        store.save_set(&set).unwrap();

        let sets = store.list_sets().unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[1], set);
    }

    #[test]
    fn attempts_round_trip_losslessly() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        let set = store.get_set(DEFAULT_SET_ID).unwrap().unwrap();

        let scorer = AttemptScorer::new(&store);
        let answers: Answers = set
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.correct_option_id.clone()))
            .collect();
        let user = UserIdentity::new("kai@example.com", Some("Kai"));
        let recorded = scorer
            .score(&set.id, &set.questions, answers, 1, &user)
            .unwrap();

        let reopened = open(dir.path());
        let stored = reopened.list_by_set(DEFAULT_SET_ID).unwrap();
        assert_eq!(stored, vec![recorded]);
        assert!(reopened.list_by_set("other").unwrap().is_empty());
    }

    #[test]
    fn append_keeps_insertion_order_and_clear_empties() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        for n in 1..=3 {
            store
                .append(&AttemptResult {
                    attempt_number: n,
                    quiz_set_id: DEFAULT_SET_ID.into(),
                    area_scores: Default::default(),
                    is_complete_success: false,
                    answers: Answers::new(),
                    timestamp: Utc::now(),
                    user: None,
                })
                .unwrap();
        }
        let numbers: Vec<u32> = store
            .list_all()
            .unwrap()
            .iter()
            .map(|a| a.attempt_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        store.clear_all().unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn admin_list_protects_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        assert_eq!(store.list().unwrap().len(), 1);
        store.add("sora@example.com").unwrap();
        store.remove(DEFAULT_ROOT_ADMIN).unwrap();

        let admins = open(dir.path()).list().unwrap();
        assert!(admins.contains(DEFAULT_ROOT_ADMIN));
        assert!(admins.contains("sora@example.com"));

        store.remove("sora@example.com").unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn admin_add_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        let err = store.add("nobody").unwrap_err();
        assert!(err.to_string().contains("not an email address"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ATTEMPTS_FILE), "{not json").unwrap();
        let store = open(dir.path());

        let err = store.list_all().unwrap_err();
        assert!(format!("{err:#}").contains(ATTEMPTS_FILE));
    }
}
