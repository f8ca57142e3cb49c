//! examforge-authors: Exam authoring backends.
//!
//! Implements the `ExamAuthor` trait for the simulated AI author and for
//! TOML fixture files, and loads the `examforge.toml` configuration that
//! selects between them.

pub mod config;
pub mod error;
pub mod fixture;
pub mod simulated;

pub use config::{create_author, load_config, AuthorConfig, ExamforgeConfig, PipelineSettings};
pub use error::AuthorError;
