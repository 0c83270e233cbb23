/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Best-effort local graph cache.
//!
//! The store is plain JSON files in a data directory: the full graph
//! snapshot plus the recent-URL ring. Nothing here is a durability
//! guarantee; the controller logs store failures and keeps running
//! in-memory-only.

pub mod types;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use types::GraphSnapshot;

const GRAPH_FILE: &str = "graph.json";
const RECENT_URLS_FILE: &str = "recent_urls.json";

/// Store failure taxonomy; callers at the app boundary log and continue.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistent graph store rooted at a data directory.
pub struct GraphStore {
    base_dir: PathBuf,
}

impl GraphStore {
    /// Open (and create if needed) a store at `base_dir`.
    pub fn open(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Platform data directory for the explorer, when one exists.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("wikigraph"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write the full graph snapshot.
    pub fn save_graph(&self, snapshot: &GraphSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(self.base_dir.join(GRAPH_FILE), json)?;
        Ok(())
    }

    /// Load the cached snapshot; `None` when nothing has been saved yet.
    pub fn load_graph(&self) -> Result<Option<GraphSnapshot>, StoreError> {
        match fs::read_to_string(self.base_dir.join(GRAPH_FILE)) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the cached snapshot, if any.
    pub fn clear_graph(&self) -> Result<(), StoreError> {
        match fs::remove_file(self.base_dir.join(GRAPH_FILE)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Write the recent-URL ring.
    pub fn save_recent_urls(&self, urls: &[String]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(urls)?;
        fs::write(self.base_dir.join(RECENT_URLS_FILE), json)?;
        Ok(())
    }

    /// Load the recent-URL ring; empty when nothing has been saved yet.
    pub fn load_recent_urls(&self) -> Result<Vec<String>, StoreError> {
        match fs::read_to_string(self.base_dir.join(RECENT_URLS_FILE)) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FilterState, Graph};
    use crate::layout::LayoutMode;
    use tempfile::TempDir;

    fn store() -> (TempDir, GraphStore) {
        let dir = TempDir::new().unwrap();
        let store = GraphStore::open(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_load_graph_empty_store() {
        let (_dir, store) = store();
        assert!(store.load_graph().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_graph() {
        let (_dir, store) = store();
        let snapshot =
            Graph::new().to_snapshot(LayoutMode::Radial, &FilterState::default());

        store.save_graph(&snapshot).unwrap();
        let loaded = store.load_graph().unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_clear_graph() {
        let (_dir, store) = store();
        let snapshot = Graph::new().to_snapshot(LayoutMode::Force, &FilterState::default());
        store.save_graph(&snapshot).unwrap();

        store.clear_graph().unwrap();
        assert!(store.load_graph().unwrap().is_none());
        // Clearing an already-empty store is not an error.
        store.clear_graph().unwrap();
    }

    #[test]
    fn test_malformed_graph_file_is_an_error() {
        let (dir, store) = store();
        std::fs::write(dir.path().join(GRAPH_FILE), "{not json").unwrap();
        assert!(store.load_graph().is_err());
    }

    #[test]
    fn test_recent_urls_roundtrip() {
        let (_dir, store) = store();
        assert!(store.load_recent_urls().unwrap().is_empty());

        let urls = vec![
            "https://en.wikipedia.org/wiki/Rust".to_string(),
            "https://en.wikipedia.org/wiki/Graph_theory".to_string(),
        ];
        store.save_recent_urls(&urls).unwrap();
        assert_eq!(store.load_recent_urls().unwrap(), urls);
    }
}
