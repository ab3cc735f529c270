//! Storage backends for quizgate: JSON files on disk and an in-memory store.
//!
//! Implements the `QuizSetStore`, `AttemptStore` and `AdminStore` traits
//! from `quizgate-core` over a directory of JSON files or plain memory.

pub mod file;
pub mod memory;
pub mod seed;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use seed::{default_quiz_set, DEFAULT_SET_ID};
