//! [`CatalogSource`] implementations.
//!
//! Discovering applications is the host's business; launchgrid only reads
//! an already-curated list.  [`ManifestCatalog`] takes that list from a JSON
//! file, [`StaticCatalog`] from memory.
//!
//! # Manifest format
//!
//! ```json
//! [
//!   { "name": "firefox", "displayName": "Firefox",
//!     "bundleIdentifier": "org.mozilla.firefox",
//!     "path": "/usr/share/applications/firefox.desktop" }
//! ]
//! ```
//!
//! Entries without an `id` get a fresh one on every scan; the board matches
//! them to saved items by path and bundle identifier.

use crate::item::Item;
use crate::traits::CatalogSource;
use log::info;
use std::path::{Path, PathBuf};

/// Error from reading a catalog.
#[derive(Debug, thiserror::Error)]
#[error("catalog error: {0}")]
pub struct CatalogError(String);

/// Items listed in a JSON manifest file.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    path: PathBuf,
}

impl ManifestCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for ManifestCatalog {
    type Error = CatalogError;

    fn scan(&mut self) -> Result<Vec<Item>, CatalogError> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| CatalogError(format!("failed to read {}: {}", self.path.display(), e)))?;
        let items: Vec<Item> = serde_json::from_str(&contents)
            .map_err(|e| CatalogError(format!("failed to parse {}: {}", self.path.display(), e)))?;
        info!("catalog {} lists {} item(s)", self.path.display(), items.len());
        Ok(items)
    }
}

/// A fixed list of items.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<Item>,
}

impl StaticCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl CatalogSource for StaticCatalog {
    type Error = CatalogError;

    fn scan(&mut self) -> Result<Vec<Item>, CatalogError> {
        Ok(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_items_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "firefox", "displayName": "Firefox",
                 "bundleIdentifier": "org.mozilla.firefox", "path": "/usr/bin/firefox"},
                {"name": "gimp", "displayName": "GIMP",
                 "bundleIdentifier": "org.gimp.GIMP", "path": "/usr/bin/gimp",
                 "iconPath": "/usr/share/icons/gimp.png"}
            ]"#,
        )
        .unwrap();
        let items = ManifestCatalog::new(&path).scan().unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["Firefox", "GIMP"]);
        assert_ne!(items[0].id, items[1].id);
        assert_eq!(items[1].icon_path.as_deref(), Some("/usr/share/icons/gimp.png"));
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ManifestCatalog::new(dir.path().join("apps.json")).scan().unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        std::fs::write(&path, r#"{"not": "a list"}"#).unwrap();
        let err = ManifestCatalog::new(&path).scan().unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn static_catalog_returns_its_items() {
        let item = Item::new("a", "A", "org.a", "/a");
        let mut catalog = StaticCatalog::new(vec![item.clone()]);
        assert_eq!(catalog.scan().unwrap(), vec![item]);
    }
}
