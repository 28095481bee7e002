//! Loading item catalogs from JSON or YAML fixture files.

use std::{
    env,
    path::{Path, PathBuf},
};

use dirs_next::config_dir;
use notepal_types::Item;
use notepal_util::expand_tilde;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding the fixture location.
pub const FIXTURE_PATH_ENV: &str = "NOTEPAL_FIXTURE_PATH";

const DEMO_FIXTURE: &str = include_str!("../fixtures/demo.yaml");

/// Errors raised while reading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON fixture: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serialized shape of a catalog: stored items plus shadow items.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFixture {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub shadows: Vec<Item>,
}

impl RegistryFixture {
    /// Read a fixture, choosing the format from the file extension (`.yaml`/`.yml`, otherwise JSON).
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_yaml = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml"));
        let fixture = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };
        debug!(
            path = %path.display(),
            items = fixture.items.len(),
            shadows = fixture.shadows.len(),
            "Loaded item fixture"
        );
        Ok(fixture)
    }

    pub fn from_json_str(content: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// The small demo wiki bundled with the binary.
    pub fn demo() -> Result<Self, FixtureError> {
        Self::from_yaml_str(DEMO_FIXTURE)
    }
}

/// Fixture path from [`FIXTURE_PATH_ENV`], falling back to `<config>/notepal/items.yaml`.
pub fn default_fixture_path() -> PathBuf {
    if let Ok(path) = env::var(FIXTURE_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notepal")
        .join("items.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn demo_fixture_parses() {
        let fixture = RegistryFixture::demo().expect("demo fixture");
        assert!(!fixture.items.is_empty());
        assert!(fixture.shadows.iter().any(|item| item.has_tag("$:/tags/CommandPaletteTheme")));
    }

    #[test]
    fn format_follows_extension() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("items.json");
        fs::write(&json_path, r#"{"items":[{"title":"A","tags":"x"}]}"#).unwrap();
        let yaml_path = dir.path().join("items.yml");
        fs::write(&yaml_path, "shadows:\n  - title: B\n").unwrap();

        let json = RegistryFixture::from_path(&json_path).unwrap();
        assert_eq!(json.items[0].tags(), vec!["x"]);
        assert!(json.shadows.is_empty());

        let yaml = RegistryFixture::from_path(&yaml_path).unwrap();
        assert_eq!(yaml.shadows[0].title, "B");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let error = RegistryFixture::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(error, FixtureError::Io { .. }));
    }

    #[test]
    fn env_override_wins() {
        temp_env::with_var(FIXTURE_PATH_ENV, Some("/tmp/wiki.json"), || {
            assert_eq!(default_fixture_path(), PathBuf::from("/tmp/wiki.json"));
        });
    }
}
