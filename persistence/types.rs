/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable types for graph persistence and export/import.
//!
//! The JSON shape (`nodes`, `edges`, `layoutMode`, `filter`, `version`) is
//! the explorer's wire format: exported files and the local cache share it.
//! Only `nodes` and `edges` are required on import; everything else falls
//! back to defaults and `version` is accepted unchecked.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::{ArticleData, EdgeStyle, FilterState};
use crate::layout::LayoutMode;

/// Screen position of a persisted node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedPosition {
    pub x: f32,
    pub y: f32,
}

/// Persisted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedNode {
    /// Stable node identity.
    pub id: Uuid,
    pub position: PersistedPosition,
    pub data: ArticleData,
}

/// Persisted edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedEdge {
    pub id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
    #[serde(default)]
    pub style: EdgeStyle,
}

/// Full graph snapshot: the unit of export, import, and the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
    #[serde(rename = "layoutMode", default)]
    pub layout_mode: LayoutMode,
    #[serde(default)]
    pub filter: FilterState,
    /// Forward-compatibility marker; never checked on import.
    #[serde(default)]
    pub version: u32,
}

impl GraphSnapshot {
    pub const CURRENT_VERSION: u32 = 1;
}
