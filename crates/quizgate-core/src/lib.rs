//! quizgate-core — Attempt scoring, analytics aggregation, and review gating.
//!
//! This crate defines the content model, the collaborator traits, and the
//! pure functions over attempt history that the rest of quizgate builds on.

pub mod admin;
pub mod error;
pub mod gate;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod summary;
pub mod traits;
