//! In-memory store for tests and throwaway sessions.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;

use quizgate_core::admin::AdminWhitelist;
use quizgate_core::error::WhitelistError;
use quizgate_core::model::{AttemptResult, QuizSet};
use quizgate_core::traits::{AdminStore, AttemptStore, QuizSetStore};

/// Store that keeps everything in process memory.
pub struct MemoryStore {
    sets: Mutex<Vec<QuizSet>>,
    attempts: Mutex<Vec<AttemptResult>>,
    admins: Mutex<AdminWhitelist>,
}

/// A panicked writer leaves the data usable, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MemoryStore {
    /// An empty store with no quiz sets.
    pub fn new(root_admin: &str) -> Self {
        Self {
            sets: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
            admins: Mutex::new(AdminWhitelist::new(root_admin)),
        }
    }

    /// A store holding the given sets.
    pub fn with_sets(root_admin: &str, sets: Vec<QuizSet>) -> Self {
        let store = Self::new(root_admin);
        *lock(&store.sets) = sets;
        store
    }
}

impl QuizSetStore for MemoryStore {
    fn get_set(&self, id: &str) -> Result<Option<QuizSet>> {
        let sets = lock(&self.sets);
        Ok(sets.iter().find(|s| s.id == id).cloned())
    }

    fn list_sets(&self) -> Result<Vec<QuizSet>> {
        Ok(lock(&self.sets).clone())
    }

    fn save_set(&self, set: &QuizSet) -> Result<()> {
        let mut sets = lock(&self.sets);
        match sets.iter_mut().find(|s| s.id == set.id) {
            Some(existing) => *existing = set.clone(),
            None => sets.push(set.clone()),
        }
        Ok(())
    }

    fn delete_set(&self, id: &str) -> Result<()> {
        lock(&self.sets).retain(|s| s.id != id);
        Ok(())
    }
}

impl AttemptStore for MemoryStore {
    fn append(&self, attempt: &AttemptResult) -> Result<()> {
        lock(&self.attempts).push(attempt.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<AttemptResult>> {
        Ok(lock(&self.attempts).clone())
    }

    fn clear_all(&self) -> Result<()> {
        lock(&self.attempts).clear();
        Ok(())
    }
}

impl AdminStore for MemoryStore {
    fn list(&self) -> Result<BTreeSet<String>> {
        Ok(lock(&self.admins).members().clone())
    }

    fn add(&self, email: &str) -> Result<()> {
        lock(&self.admins).add(email)?;
        Ok(())
    }

    fn remove(&self, email: &str) -> Result<()> {
        match lock(&self.admins).remove(email) {
            Ok(_) | Err(WhitelistError::ProtectedMember(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
