//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/launchgrid/config.json`.
//! Every section is optional: a minimal `{}` file is valid and all sections
//! fall back to their compiled-in defaults.  Unknown keys are ignored.
//!
//! # Example
//!
//! ```json
//! {
//!   "drag": { "edge_hover_ms": 500, "allow_trailing_page": true },
//!   "storage": {
//!     "data_file": "/home/me/.local/share/launchgrid/board.json",
//!     "prune_missing": true,
//!     "append_new_catalog_items": true
//!   },
//!   "catalog": { "manifest": "/home/me/.config/launchgrid/apps.json" },
//!   "launch": { "opener": "xdg-open" }
//! }
//! ```

use crate::hover::DragConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Drag and auto page-turn settings.
    #[serde(default)]
    pub drag: DragConfig,

    /// Where and how the board is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Where installed applications are listed.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// How items are opened.
    #[serde(default)]
    pub launch: LaunchConfig,
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot file.  Defaults to `$XDG_DATA_HOME/launchgrid/board.json`.
    pub data_file: Option<PathBuf>,
    /// Forget saved items whose launch handle no longer exists on disk.
    pub prune_missing: bool,
    /// Append catalog items that are not on the saved board yet.
    pub append_new_catalog_items: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            prune_missing: true,
            append_new_catalog_items: true,
        }
    }
}

/// Catalog settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON manifest listing the launchable items.  Defaults to
    /// `$XDG_CONFIG_HOME/launchgrid/apps.json`.
    pub manifest: Option<PathBuf>,
}

/// Launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Program invoked with the item's launch handle as its only argument.
    pub opener: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            opener: "xdg-open".into(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "drag": { "edge_hover_ms": 450, "allow_trailing_page": false },
            "storage": {
                "data_file": "/tmp/board.json",
                "prune_missing": false,
                "append_new_catalog_items": false
            },
            "catalog": { "manifest": "/tmp/apps.json" },
            "launch": { "opener": "open" }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.drag.edge_hover_ms, 450);
        assert!(!cfg.drag.allow_trailing_page);
        assert_eq!(cfg.storage.data_file, Some(PathBuf::from("/tmp/board.json")));
        assert!(!cfg.storage.prune_missing);
        assert!(!cfg.storage.append_new_catalog_items);
        assert_eq!(cfg.catalog.manifest, Some(PathBuf::from("/tmp/apps.json")));
        assert_eq!(cfg.launch.opener, "open");
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let dd = DragConfig::default();
        assert_eq!(cfg.drag.edge_hover_ms, dd.edge_hover_ms);
        assert_eq!(cfg.drag.allow_trailing_page, dd.allow_trailing_page);
        assert_eq!(cfg.storage.data_file, None);
        assert!(cfg.storage.prune_missing);
        assert!(cfg.storage.append_new_catalog_items);
        assert_eq!(cfg.catalog.manifest, None);
        assert_eq!(cfg.launch.opener, "xdg-open");
    }

    #[test]
    fn deserialize_partial_section() {
        let cfg: Config = serde_json::from_str(r#"{ "drag": { "edge_hover_ms": 0 } }"#).unwrap();
        assert_eq!(cfg.drag.edge_hover_ms, 0);
        assert!(cfg.drag.allow_trailing_page);
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "drag": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "launch": { "opener": "gio" } }"#).unwrap();
        assert_eq!(Config::load(&path).unwrap().launch.opener, "gio");
    }
}
