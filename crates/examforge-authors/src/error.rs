//! Author error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the bundled authoring backends.
#[derive(Debug, Error)]
pub enum AuthorError {
    /// The fixture file does not exist.
    #[error("fixture not found: {}", .0.display())]
    FixtureNotFound(PathBuf),

    /// The fixture file could not be read or parsed.
    #[error("invalid fixture {}: {message}", .path.display())]
    InvalidFixture { path: PathBuf, message: String },
}
