//! examforge-core: Exam model, scoring, sessions and generation.
//!
//! This crate defines the exam data model, the scorer, the in-memory
//! catalog, the exam-taking state machine and the document-to-exam
//! generation pipeline that the rest of examforge builds on.

pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod repository;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod traits;
