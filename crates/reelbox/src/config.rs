//! # Configuration
//!
//! reelbox configuration is managed by [`clapfig`], which handles layered
//! loading from TOML files, environment variables, and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `REELBOX__ROOT`, `REELBOX__TARGET_MIME`, etc.
//! 2. **Library Config**: `<root>/reelbox.toml`, for settings that travel with
//!    one library.
//! 3. **User Config**: OS-appropriate config directory (via `directories`).
//! 4. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `root` | none | Library root directory used when `--root` is not given |
//! | `legacy_dir` | `<config dir>/legacy` | Location of a legacy flat store to import |
//! | `target_mime` | `audio/webm` | Audio format recordings are stored in |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::migration::DEFAULT_TARGET_MIME;

pub const CONFIG_FILE: &str = "reelbox.toml";

/// Configuration for reelbox, stored in `reelbox.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReelboxConfig {
    /// Library root directory.
    pub root: Option<PathBuf>,

    /// Directory of a legacy store (`legacy.json` + `blobs/`).
    pub legacy_dir: Option<PathBuf>,

    /// Content type new recordings are stored in. Legacy audio in any other
    /// format has to be transcoded during migration.
    #[config(default = "audio/webm")]
    pub target_mime: String,
}

impl Default for ReelboxConfig {
    fn default() -> Self {
        Self {
            root: None,
            legacy_dir: None,
            target_mime: DEFAULT_TARGET_MIME.to_string(),
        }
    }
}

impl ReelboxConfig {
    pub fn legacy_dir_or(&self, config_dir: &Path) -> PathBuf {
        self.legacy_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("legacy"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReelboxConfig::default();
        assert_eq!(config.target_mime, "audio/webm");
        assert!(config.root.is_none());
    }

    #[test]
    fn test_legacy_dir_defaults_under_config_dir() {
        let config = ReelboxConfig::default();
        assert_eq!(
            config.legacy_dir_or(Path::new("/cfg")),
            PathBuf::from("/cfg/legacy")
        );

        let config = ReelboxConfig {
            legacy_dir: Some(PathBuf::from("/old")),
            ..Default::default()
        };
        assert_eq!(config.legacy_dir_or(Path::new("/cfg")), PathBuf::from("/old"));
    }

    #[test]
    fn test_toml_shape() {
        let config: ReelboxConfig = toml::from_str(
            r#"
            root = "/music/library"
            target_mime = "audio/ogg"
            "#,
        )
        .unwrap();
        assert_eq!(config.root, Some(PathBuf::from("/music/library")));
        assert_eq!(config.target_mime, "audio/ogg");
        assert!(config.legacy_dir.is_none());
    }
}
