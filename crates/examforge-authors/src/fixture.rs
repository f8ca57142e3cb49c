//! Fixture author: serves an exam draft from a TOML file.
//!
//! The file is re-read on every call, so editing it changes the next
//! generated exam without restarting.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use examforge_core::model::ExamDraft;
use examforge_core::traits::{AuthorRequest, ExamAuthor};

use crate::error::AuthorError;

/// An author backed by a TOML draft file.
pub struct FixtureAuthor {
    path: PathBuf,
    delay: Duration,
}

impl FixtureAuthor {
    pub fn new(path: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            path: path.into(),
            delay,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_draft(&self) -> Result<ExamDraft, AuthorError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthorError::FixtureNotFound(self.path.clone()));
            }
            Err(e) => {
                return Err(AuthorError::InvalidFixture {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };

        toml::from_str(&content).map_err(|e| AuthorError::InvalidFixture {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ExamAuthor for FixtureAuthor {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn author(&self, request: &AuthorRequest) -> anyhow::Result<ExamDraft> {
        tracing::debug!(
            document = %request.document.name,
            fixture = %self.path.display(),
            "authoring from fixture"
        );
        tokio::time::sleep(self.delay).await;
        Ok(self.read_draft().await?)
    }
}
