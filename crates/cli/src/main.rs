use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notepal_registry::{ItemRegistry, RegistryFixture, default_fixture_path};
use notepal_util::{JsonDocumentStore, default_store_path, expand_tilde};

/// Terminal note browser driven by a command palette.
#[derive(Debug, Parser)]
#[command(name = "notepal", version, about)]
struct Cli {
    /// Item fixture to load (JSON, or YAML by extension). Defaults to NOTEPAL_FIXTURE_PATH or the bundled demo.
    #[arg(long, value_name = "PATH")]
    fixture: Option<PathBuf>,

    /// JSON document store holding palette settings and history. Defaults to NOTEPAL_STORE_PATH.
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Log destination; defaults to `notepal.log` next to the store.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store_path = cli
        .store
        .as_deref()
        .map(|path| expand_tilde(&path.to_string_lossy()))
        .unwrap_or_else(default_store_path);
    let log_path = cli.log_file.clone().unwrap_or_else(|| store_path.with_file_name("notepal.log"));
    init_tracing(&log_path)?;

    let store = JsonDocumentStore::new(store_path).context("failed to open the document store")?;
    let fixture = load_fixture(cli.fixture.as_deref())?;
    info!(
        items = fixture.items.len(),
        shadows = fixture.shadows.len(),
        store = %store.path().display(),
        "Starting notepal"
    );

    let registry = Arc::new(ItemRegistry::from_fixture(fixture));
    notepal_tui::run(registry, Arc::new(store)).await
}

/// Logs go to a file because the TUI owns the terminal.
fn init_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Explicit path, then the configured path when it exists, then the bundled demo.
fn load_fixture(explicit: Option<&Path>) -> Result<RegistryFixture> {
    if let Some(path) = explicit {
        let path = expand_tilde(&path.to_string_lossy());
        return RegistryFixture::from_path(&path).with_context(|| format!("failed to load fixture {}", path.display()));
    }

    let configured = default_fixture_path();
    if configured.exists() {
        match RegistryFixture::from_path(&configured) {
            Ok(fixture) => return Ok(fixture),
            Err(error) => warn!(path = %configured.display(), %error, "Ignoring unreadable fixture"),
        }
    }
    RegistryFixture::demo().context("bundled demo fixture is invalid")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_paths() {
        let cli = Cli::try_parse_from(["notepal", "--fixture", "items.yaml", "--store", "/tmp/store.json"]).expect("valid args");
        assert_eq!(cli.fixture, Some(PathBuf::from("items.yaml")));
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/store.json")));
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn explicit_fixture_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("items.json");
        fs::write(&path, r#"{ "items": [{ "title": "Only" }] }"#).expect("write fixture");

        let fixture = load_fixture(Some(&path)).expect("fixture");
        assert_eq!(fixture.items.len(), 1);
        assert_eq!(fixture.items[0].title, "Only");
    }

    #[test]
    fn missing_explicit_fixture_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_fixture(Some(&dir.path().join("absent.json"))).is_err());
    }
}
