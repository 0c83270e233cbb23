/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Explorer controller: the single write path for the article graph.
//!
//! All topology mutation funnels through [`GraphExplorerApp`]. The two entry
//! points deliberately differ in layout behavior:
//! - root insertion re-lays-out the whole graph, but only when the graph was
//!   non-empty before the insert (the very first article stays at the origin)
//! - expansion never re-lays-out; the new node lands at a jittered offset
//!   right of its parent and everything else keeps its position
//!
//! Persistence is best-effort: store failures are logged and the session
//! continues in memory.

use euclid::default::Point2D;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::graph::{AddNodeError, ArticleData, EdgeStyle, FilterState, Graph};
use crate::layout::{self, LayoutMode, LayoutOptions};
use crate::persistence::GraphStore;
use crate::persistence::types::GraphSnapshot;

/// Horizontal offset of an expanded node from its parent, before jitter.
const EXPANSION_OFFSET_X: f32 = 300.0;
/// Horizontal jitter range added to the base offset.
const EXPANSION_JITTER_X: f32 = 100.0;
/// Vertical jitter range below the parent.
const EXPANSION_JITTER_Y: f32 = 200.0;

/// Layout footprint used for full re-layouts from the controller.
const LAYOUT_NODE_WIDTH: f32 = 280.0;
const LAYOUT_NODE_HEIGHT: f32 = 300.0;
const LAYOUT_SPACING: f32 = 100.0;

/// Most recently visited URLs kept for the address bar.
const RECENT_URLS_CAP: usize = 10;

/// Result of an expansion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The parent id does not name a live node; nothing changed.
    ParentMissing,
    /// A fresh node was created next to the parent and linked to it.
    NodeAdded(Uuid),
    /// The article already had a node; only a new edge was added.
    EdgeAdded,
    /// The article already had a node and the edge already existed.
    EdgeExists,
}

/// Top-level explorer state and its mutation API.
pub struct GraphExplorerApp {
    graph: Graph,
    selected_node: Option<Uuid>,
    layout_mode: LayoutMode,
    filter: FilterState,
    recent_urls: Vec<String>,
    rng: StdRng,
    store: Option<GraphStore>,
}

impl GraphExplorerApp {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic controller for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            graph: Graph::new(),
            selected_node: None,
            layout_mode: LayoutMode::default(),
            filter: FilterState::default(),
            recent_urls: Vec::new(),
            rng,
            store: None,
        }
    }

    /// Attach a store; subsequent saves and loads go through it.
    pub fn attach_store(&mut self, store: GraphStore) {
        self.store = Some(store);
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn selected_node(&self) -> Option<Uuid> {
        self.selected_node
    }

    pub fn select_node(&mut self, id: Option<Uuid>) {
        self.selected_node = id;
    }

    pub fn recent_urls(&self) -> &[String] {
        &self.recent_urls
    }

    /// Insert an article as a new root-level node.
    ///
    /// The node starts at the origin. When the graph already held nodes the
    /// whole graph is re-laid-out afterwards; the first article of a session
    /// skips that and simply sits at the origin.
    pub fn insert_root_article(&mut self, data: ArticleData) -> Result<Uuid, AddNodeError> {
        let was_empty = self.graph.node_count() == 0;
        let id = self.graph.add_node(data, Point2D::origin())?;
        if !was_empty {
            self.relayout();
        }
        Ok(id)
    }

    /// Expand an article out of `parent`.
    ///
    /// If the article already has a node (exact title match) only an edge is
    /// added. Otherwise a new node is created at a jittered offset from the
    /// parent. No re-layout happens on either path.
    pub fn expand_article(&mut self, parent: Uuid, data: ArticleData) -> ExpandOutcome {
        let Some(parent_position) = self.graph.get_node(parent).map(|node| node.position) else {
            return ExpandOutcome::ParentMissing;
        };

        if let Some(existing) = self.graph.get_node_by_title(&data.title).map(|n| n.id) {
            return match self.graph.add_edge(parent, existing, EdgeStyle::default()) {
                Some(_) => ExpandOutcome::EdgeAdded,
                None => ExpandOutcome::EdgeExists,
            };
        }

        let position = Point2D::new(
            parent_position.x + EXPANSION_OFFSET_X + self.rng.gen_range(0.0..EXPANSION_JITTER_X),
            parent_position.y + self.rng.gen_range(0.0..EXPANSION_JITTER_Y),
        );
        let id = match self.graph.add_node(data, position) {
            Ok(id) => id,
            // Unreachable given the title check above, but never panic here.
            Err(AddNodeError::DuplicateTitle(_)) => return ExpandOutcome::EdgeExists,
        };
        self.graph.add_edge(parent, id, EdgeStyle::default());
        ExpandOutcome::NodeAdded(id)
    }

    /// Switch the layout mode and re-layout the (non-empty) graph.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.layout_mode = mode;
        if self.graph.node_count() > 0 {
            self.relayout();
        }
    }

    /// Recompute every node position under the current mode.
    pub fn relayout(&mut self) {
        let options = LayoutOptions {
            mode: self.layout_mode,
            node_width: Some(LAYOUT_NODE_WIDTH),
            node_height: Some(LAYOUT_NODE_HEIGHT),
            spacing: Some(LAYOUT_SPACING),
            ..LayoutOptions::for_mode(self.layout_mode)
        };
        let laid_out =
            layout::apply_layout(self.graph.nodes(), self.graph.edges(), &options, &mut self.rng);
        self.graph.commit_positions(&laid_out);
    }

    /// Remove a node (and its incident edges), clearing a matching selection.
    pub fn remove_node(&mut self, id: Uuid) -> bool {
        let removed = self.graph.remove_node(id);
        if removed && self.selected_node == Some(id) {
            self.selected_node = None;
        }
        removed
    }

    /// Reset the whole session to its initial state: graph, selection,
    /// layout mode, filter, and recent URLs.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.selected_node = None;
        self.layout_mode = LayoutMode::default();
        self.filter = FilterState::default();
        self.recent_urls.clear();
    }

    /// Record a visited URL: moved to the front, deduplicated, capped.
    pub fn add_recent_url(&mut self, url: &str) {
        self.recent_urls.retain(|known| known != url);
        self.recent_urls.insert(0, url.to_string());
        self.recent_urls.truncate(RECENT_URLS_CAP);
    }

    /// Serialize the current session to the export JSON shape.
    pub fn export_graph(&self) -> String {
        let snapshot = self.graph.to_snapshot(self.layout_mode, &self.filter);
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                warn!("export: serialization failed: {err}");
                String::new()
            }
        }
    }

    /// Replace the session from exported JSON.
    ///
    /// Malformed input leaves the current session untouched and returns
    /// `false`.
    pub fn import_graph(&mut self, json: &str) -> bool {
        let snapshot: GraphSnapshot = match serde_json::from_str(json) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("import: rejected malformed snapshot: {err}");
                return false;
            }
        };
        self.graph = Graph::from_snapshot(&snapshot);
        self.layout_mode = snapshot.layout_mode;
        self.filter = snapshot.filter;
        self.selected_node = None;
        true
    }

    /// Persist the session through the attached store, logging failures.
    pub fn save_to_store(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let snapshot = self.graph.to_snapshot(self.layout_mode, &self.filter);
        if let Err(err) = store.save_graph(&snapshot) {
            warn!("store: failed to save graph: {err}");
        }
        if let Err(err) = store.save_recent_urls(&self.recent_urls) {
            warn!("store: failed to save recent urls: {err}");
        }
    }

    /// Restore the session from the attached store, logging failures.
    pub fn load_from_store(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.load_graph() {
            Ok(Some(snapshot)) => {
                self.graph = Graph::from_snapshot(&snapshot);
                self.layout_mode = snapshot.layout_mode;
                self.filter = snapshot.filter;
                self.selected_node = None;
            }
            Ok(None) => {}
            Err(err) => warn!("store: failed to load graph: {err}"),
        }
        match store.load_recent_urls() {
            Ok(urls) => self.recent_urls = urls,
            Err(err) => warn!("store: failed to load recent urls: {err}"),
        }
    }
}

impl Default for GraphExplorerApp {
    fn default() -> Self {
        Self::new()
    }
}
