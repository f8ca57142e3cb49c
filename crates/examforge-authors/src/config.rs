//! Configuration loading and author factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examforge_core::model::DocumentFormat;
use examforge_core::pipeline::{PipelineConfig, DEFAULT_MAX_DOCUMENT_BYTES};
use examforge_core::statistics::DEFAULT_PASS_THRESHOLD;
use examforge_core::traits::ExamAuthor;

use crate::fixture::FixtureAuthor;
use crate::simulated::SimulatedAuthor;

/// Which authoring backend to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthorConfig {
    Simulated {
        #[serde(default = "default_authoring_delay")]
        delay_ms: u64,
    },
    Fixture {
        path: String,
        #[serde(default)]
        delay_ms: u64,
    },
}

impl Default for AuthorConfig {
    fn default() -> Self {
        AuthorConfig::Simulated {
            delay_ms: default_authoring_delay(),
        }
    }
}

fn default_authoring_delay() -> u64 {
    1500
}

/// Timing and limits for the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Upload progress increment in percent.
    #[serde(default = "default_step_percent")]
    pub upload_step_percent: u8,
    /// Pause between upload progress reports.
    #[serde(default = "default_step_delay")]
    pub upload_step_delay_ms: u64,
    /// Largest accepted document.
    #[serde(default = "default_max_bytes")]
    pub max_document_bytes: u64,
    /// Accepted document formats.
    #[serde(default = "default_formats")]
    pub accepted_formats: Vec<DocumentFormat>,
    /// Authoring timeout; unset means wait indefinitely.
    #[serde(default)]
    pub authoring_timeout_secs: Option<u64>,
}

fn default_step_percent() -> u8 {
    20
}
fn default_step_delay() -> u64 {
    200
}
fn default_max_bytes() -> u64 {
    DEFAULT_MAX_DOCUMENT_BYTES
}
fn default_formats() -> Vec<DocumentFormat> {
    DocumentFormat::ALL.to_vec()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            upload_step_percent: default_step_percent(),
            upload_step_delay_ms: default_step_delay(),
            max_document_bytes: default_max_bytes(),
            accepted_formats: default_formats(),
            authoring_timeout_secs: None,
        }
    }
}

impl PipelineSettings {
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            upload_step_percent: self.upload_step_percent,
            upload_step_delay: Duration::from_millis(self.upload_step_delay_ms),
            max_document_bytes: self.max_document_bytes,
            accepted_formats: self.accepted_formats.clone(),
            authoring_timeout: self.authoring_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Top-level examforge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamforgeConfig {
    /// Minimum percentage counted as a pass.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u8,
    /// Default catalog file or directory.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub author: AuthorConfig,
}

fn default_pass_threshold() -> u8 {
    DEFAULT_PASS_THRESHOLD
}

impl Default for ExamforgeConfig {
    fn default() -> Self {
        Self {
            pass_threshold: default_pass_threshold(),
            catalog: None,
            pipeline: PipelineSettings::default(),
            author: AuthorConfig::default(),
        }
    }
}

impl ExamforgeConfig {
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.pass_threshold <= 100,
            "pass_threshold must be between 0 and 100, got {}",
            self.pass_threshold
        );
        anyhow::ensure!(
            (1..=100).contains(&self.pipeline.upload_step_percent),
            "pipeline.upload_step_percent must be between 1 and 100, got {}",
            self.pipeline.upload_step_percent
        );
        anyhow::ensure!(
            !self.pipeline.accepted_formats.is_empty(),
            "pipeline.accepted_formats must list at least one format"
        );
        Ok(())
    }
}

/// Expand `${VAR}` references from the environment. An unset variable or an
/// unterminated reference is an error rather than an empty substitution.
fn resolve_env_vars(raw: &str) -> Result<String> {
    let mut resolved = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find("${") {
        resolved.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after
            .find('}')
            .with_context(|| format!("unterminated ${{...}} reference in '{raw}'"))?;
        let name = &after[..close];
        let value = std::env::var(name).with_context(|| {
            format!("environment variable {name} referenced in '{raw}' is not set")
        })?;
        resolved.push_str(&value);
        rest = &after[close + 1..];
    }

    resolved.push_str(rest);
    Ok(resolved)
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examforge.toml` in the current directory
/// 2. `~/.config/examforge/config.toml`
///
/// Environment variable override: `EXAMFORGE_AUTHORING_DELAY_MS`.
pub fn load_config() -> Result<ExamforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<ExamforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamforgeConfig::default(),
    };

    if let Ok(value) = std::env::var("EXAMFORGE_AUTHORING_DELAY_MS") {
        let delay: u64 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid EXAMFORGE_AUTHORING_DELAY_MS: '{value}'"))?;
        match &mut config.author {
            AuthorConfig::Simulated { delay_ms } | AuthorConfig::Fixture { delay_ms, .. } => {
                *delay_ms = delay;
            }
        }
    }

    if let AuthorConfig::Fixture { path, .. } = &mut config.author {
        *path = resolve_env_vars(path).context("invalid author.path")?;
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examforge"))
}

/// Create an author instance from its configuration.
pub fn create_author(config: &AuthorConfig) -> Box<dyn ExamAuthor> {
    match config {
        AuthorConfig::Simulated { delay_ms } => {
            Box::new(SimulatedAuthor::new(Duration::from_millis(*delay_ms)))
        }
        AuthorConfig::Fixture { path, delay_ms } => Box::new(FixtureAuthor::new(
            path,
            Duration::from_millis(*delay_ms),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EXAMFORGE_TEST_VAR", "fixtures");
        assert_eq!(resolve_env_vars("${_EXAMFORGE_TEST_VAR}").unwrap(), "fixtures");
        assert_eq!(
            resolve_env_vars("/data/${_EXAMFORGE_TEST_VAR}/draft-${_EXAMFORGE_TEST_VAR}.toml")
                .unwrap(),
            "/data/fixtures/draft-fixtures.toml"
        );
        assert_eq!(resolve_env_vars("no vars").unwrap(), "no vars");
        std::env::remove_var("_EXAMFORGE_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_reports_unset_and_unterminated() {
        std::env::remove_var("_EXAMFORGE_UNSET_VAR");
        let err = resolve_env_vars("${_EXAMFORGE_UNSET_VAR}/draft.toml").unwrap_err();
        assert!(err.to_string().contains("_EXAMFORGE_UNSET_VAR"));
        assert!(err.to_string().contains("not set"));

        let err = resolve_env_vars("drafts/${HOME").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn fixture_path_with_unset_variable_fails_to_load() {
        std::env::remove_var("_EXAMFORGE_MISSING_DIR");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examforge.toml");
        std::fs::write(
            &path,
            "[author]\ntype = \"fixture\"\npath = \"${_EXAMFORGE_MISSING_DIR}/draft.toml\"\n",
        )
        .unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid author.path"));
        assert!(message.contains("_EXAMFORGE_MISSING_DIR"));
    }

    #[test]
    fn default_config() {
        let config = ExamforgeConfig::default();
        assert_eq!(config.pass_threshold, 60);
        assert_eq!(config.pipeline.upload_step_percent, 20);
        assert_eq!(config.pipeline.upload_step_delay_ms, 200);
        assert_eq!(config.pipeline.max_document_bytes, 20 * 1024 * 1024);
        assert_eq!(config.author, AuthorConfig::Simulated { delay_ms: 1500 });
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
pass_threshold = 75
catalog = "exams"

[pipeline]
upload_step_percent = 25
upload_step_delay_ms = 50
max_document_bytes = 1024
accepted_formats = ["pdf", "txt"]
authoring_timeout_secs = 10

[author]
type = "fixture"
path = "drafts/next.toml"
"#;
        let config: ExamforgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pass_threshold, 75);
        assert_eq!(config.catalog, Some(PathBuf::from("exams")));
        assert_eq!(
            config.pipeline.accepted_formats,
            vec![DocumentFormat::Pdf, DocumentFormat::Txt]
        );
        assert!(matches!(
            config.author,
            AuthorConfig::Fixture { ref path, delay_ms: 0 } if path == "drafts/next.toml"
        ));

        let pipeline = config.pipeline.to_pipeline_config();
        assert_eq!(pipeline.upload_step_delay, Duration::from_millis(50));
        assert_eq!(pipeline.authoring_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examforge.toml");
        std::fs::write(&path, "[pipeline]\nupload_step_percent = 0\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("upload_step_percent"));

        std::fs::write(&path, "pass_threshold = 101\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }

    #[test]
    fn factory_builds_named_authors() {
        assert_eq!(create_author(&AuthorConfig::default()).name(), "simulated");
        let fixture = AuthorConfig::Fixture {
            path: "draft.toml".into(),
            delay_ms: 0,
        };
        assert_eq!(create_author(&fixture).name(), "fixture");
    }
}
