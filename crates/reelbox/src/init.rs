//! # Bootstrap
//!
//! [`initialize`] turns "where is my library?" into an open, ready store:
//!
//! 1. Resolve the config directory: `REELBOX_CONFIG_DIR` if set (tests use
//!    this to isolate state), otherwise the OS config dir from `directories`.
//! 2. Load [`ReelboxConfig`] through clapfig, merging the user config with the
//!    library's own `reelbox.toml` when the root is known up front.
//! 3. Pick the root: the explicit override, else `root` from config. With
//!    neither, the store goes to `NeedsFolder` and the caller gets
//!    `NoRootSelected`.
//! 4. Open the store over [`FsBackend`].
//! 5. If the legacy store holds unmigrated data, run the migration once.

use crate::config::{ReelboxConfig, CONFIG_FILE};
use crate::error::{ReelboxError, Result};
use crate::migration::{self, JsonLegacyStore, MigrationReport, PassthroughTranscoder};
use crate::store::fs_backend::FsBackend;
use crate::store::LibraryStore;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_DIR_ENV: &str = "REELBOX_CONFIG_DIR";

pub struct ReelboxContext {
    pub store: LibraryStore<FsBackend>,
    pub config: ReelboxConfig,
    pub config_dir: PathBuf,
    /// Set when this start-up imported a legacy store.
    pub migration: Option<MigrationReport>,
}

/// The user config directory, honoring `REELBOX_CONFIG_DIR`.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "reelbox", "reelbox")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            ReelboxError::InvalidOperation("Could not determine config directory".to_string())
        })
}

/// Loads config from the user config dir and, if given, the library root.
/// Later paths override earlier ones. Unreadable config falls back to defaults.
pub fn load_config(config_dir: &Path, root: Option<&Path>) -> ReelboxConfig {
    let mut search_paths = vec![SearchPath::Path(config_dir.to_path_buf())];
    if let Some(root) = root {
        search_paths.push(SearchPath::Path(root.to_path_buf()));
    }
    Clapfig::builder()
        .app_name("reelbox")
        .file_name(CONFIG_FILE)
        .search_paths(search_paths)
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default()
}

/// Opens the library and runs a pending legacy migration.
///
/// # Arguments
///
/// * `root_override` - Library root to use instead of the configured one.
///
/// # Environment Variables
///
/// * `REELBOX_CONFIG_DIR` - Overrides the user config directory.
/// * `REELBOX__ROOT`, `REELBOX__LEGACY_DIR`, `REELBOX__TARGET_MIME` - Override
///   individual settings.
pub fn initialize(root_override: Option<PathBuf>) -> Result<ReelboxContext> {
    initialize_in(config_dir()?, root_override)
}

/// [`initialize`] with an explicit config directory.
pub fn initialize_in(config_dir: PathBuf, root_override: Option<PathBuf>) -> Result<ReelboxContext> {
    let config = load_config(&config_dir, root_override.as_deref());
    let root = root_override.or_else(|| config.root.clone());
    debug!(config_dir = %config_dir.display(), root = ?root, "Resolved library location");

    let mut store = LibraryStore::with_backend(FsBackend::new(root));
    store.init()?;

    let mut legacy = JsonLegacyStore::new(config.legacy_dir_or(&config_dir));
    let migration = if migration::needs_migration(&legacy)? {
        info!(legacy = %legacy.dir().display(), "Legacy data found, migrating");
        let transcoder = PassthroughTranscoder::new(config.target_mime.clone());
        Some(migration::migrate(&mut store, &mut legacy, &transcoder)?)
    } else {
        None
    };

    Ok(ReelboxContext {
        store,
        config,
        config_dir,
        migration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::legacy::{BLOB_DIR, LEGACY_FILE};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_without_root_needs_folder() {
        let config = TempDir::new().unwrap();
        let result = initialize_in(config.path().to_path_buf(), None);
        assert!(matches!(result, Err(ReelboxError::NoRootSelected)));
    }

    #[test]
    fn test_initialize_uses_configured_root() {
        let config = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        let root = library.path().join("lib");
        fs::write(
            config.path().join(CONFIG_FILE),
            format!("root = {:?}\n", root.to_string_lossy()),
        )
        .unwrap();

        let ctx = initialize_in(config.path().to_path_buf(), None).unwrap();
        assert!(ctx.store.is_ready());
        assert_eq!(ctx.config.root.as_deref(), Some(root.as_path()));
        assert!(root.join(crate::index::INDEX_FILE).is_file());
        assert!(ctx.migration.is_none());
    }

    #[test]
    fn test_initialize_runs_pending_migration_once() {
        let config = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        let legacy = config.path().join("legacy");
        fs::create_dir_all(legacy.join(BLOB_DIR)).unwrap();
        fs::write(
            legacy.join(LEGACY_FILE),
            r#"{"folders": [{"id": "a", "name": "X"}],
                "recordings": [{"id": "r1", "filename": "take.webm", "folderId": "a", "tabTitle": "take"}]}"#,
        )
        .unwrap();
        fs::write(legacy.join(BLOB_DIR).join("r1"), b"audio").unwrap();
        fs::write(legacy.join(BLOB_DIR).join("r1.mime"), "audio/webm").unwrap();

        let root = library.path().to_path_buf();
        let ctx = initialize_in(config.path().to_path_buf(), Some(root.clone())).unwrap();
        let report = ctx.migration.unwrap();
        assert_eq!(report.recordings_migrated, 1);
        assert!(root.join("X").join("take.webm").is_file());

        let again = initialize_in(config.path().to_path_buf(), Some(root)).unwrap();
        assert!(again.migration.is_none());
        assert_eq!(again.store.recordings().len(), 1);
    }
}
