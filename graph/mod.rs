/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph data structures for the article explorer.
//!
//! Core structures:
//! - `Graph`: ordered node/edge store with a title index
//! - `Node`: one fetched article plus its screen position
//! - `Edge`: a directed "expanded from" link between two articles
//!
//! Identity invariant: two nodes are duplicates iff `data.title` matches
//! exactly (case-sensitive). Edge invariant: both endpoints must exist and
//! at most one edge per ordered (source, target) pair.
//!
//! Boundary: topology mutators are `pub(crate)`. Callers outside the
//! controller path in [`crate::app`] are single-write-path violations.

use std::collections::{BTreeSet, HashMap};

use euclid::default::Point2D;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::persistence::types::{GraphSnapshot, PersistedEdge, PersistedNode, PersistedPosition};

/// Namespace for deriving edge ids from their endpoint pair (UUIDv5).
const EDGE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x8c9e_6f1a_4b2d_43e7_9a05_d1c8_72f3_05b1);

/// Article payload attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleData {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub category: String,
    /// Outbound related-article titles, in document order.
    pub links: Vec<String>,
    pub popularity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<String>,
}

impl ArticleData {
    /// Minimal article payload with the fields every node needs.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: String::new(),
            url: url.into(),
            category: "General".to_string(),
            links: Vec::new(),
            popularity: 0.0,
            last_edited: None,
        }
    }
}

/// Rendering hint carried on an edge; never interpreted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    #[default]
    Smoothstep,
    Straight,
}

/// An article node in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable node identity.
    pub id: Uuid,

    /// Position in graph space (top-left anchored).
    pub position: Point2D<f32>,

    /// Fetched article payload.
    pub data: ArticleData,
}

/// A directed link recording that `target` was expanded from `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Derived deterministically from the ordered endpoint pair.
    pub id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
    pub style: EdgeStyle,
}

impl Edge {
    pub(crate) fn new(source: Uuid, target: Uuid, style: EdgeStyle) -> Self {
        Self {
            id: Self::derive_id(source, target),
            source,
            target,
            style,
        }
    }

    /// Deterministic edge id for an ordered (source, target) pair.
    pub fn derive_id(source: Uuid, target: Uuid) -> Uuid {
        let mut name = [0u8; 32];
        name[..16].copy_from_slice(source.as_bytes());
        name[16..].copy_from_slice(target.as_bytes());
        Uuid::new_v5(&EDGE_ID_NAMESPACE, &name)
    }
}

/// Link-density bucket for the stored (pass-through) filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDensity {
    #[default]
    All,
    High,
    Medium,
    Low,
}

/// Stored filter state; not enforced by the layout core.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub categories: BTreeSet<String>,
    #[serde(rename = "linkDensity")]
    pub link_density: LinkDensity,
}

/// Rejection reasons for node insertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddNodeError {
    /// A node with exactly this title already exists.
    #[error("article \"{0}\" already exists in the graph")]
    DuplicateTitle(String),
}

/// Ordered node/edge store.
///
/// Node order is insertion order; the radial layout anchors its traversal at
/// the first node of this sequence.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,

    /// Exact-title lookup backing the duplicate policy.
    title_index: HashMap<String, Uuid>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node with a fresh id, rejecting duplicate titles.
    pub(crate) fn add_node(
        &mut self,
        data: ArticleData,
        position: Point2D<f32>,
    ) -> Result<Uuid, AddNodeError> {
        self.add_node_with_id(Uuid::new_v4(), data, position)
    }

    /// Add a node with a pre-existing id (snapshot restore path).
    pub(crate) fn add_node_with_id(
        &mut self,
        id: Uuid,
        data: ArticleData,
        position: Point2D<f32>,
    ) -> Result<Uuid, AddNodeError> {
        if self.title_index.contains_key(&data.title) {
            return Err(AddNodeError::DuplicateTitle(data.title));
        }
        self.title_index.insert(data.title.clone(), id);
        self.nodes.push(Node { id, position, data });
        Ok(id)
    }

    /// Add an edge between two existing nodes.
    ///
    /// Returns `None` when either endpoint is missing or the ordered pair is
    /// already connected.
    pub(crate) fn add_edge(&mut self, source: Uuid, target: Uuid, style: EdgeStyle) -> Option<Uuid> {
        if self.get_node(source).is_none() || self.get_node(target).is_none() {
            return None;
        }
        if self.has_edge_between(source, target) {
            return None;
        }
        let edge = Edge::new(source, target, style);
        let id = edge.id;
        self.edges.push(edge);
        Some(id)
    }

    /// Remove a node and every edge touching it as source or target.
    pub(crate) fn remove_node(&mut self, id: Uuid) -> bool {
        let Some(index) = self.nodes.iter().position(|node| node.id == id) else {
            return false;
        };
        let node = self.nodes.remove(index);
        self.title_index.remove(&node.data.title);
        self.edges
            .retain(|edge| edge.source != id && edge.target != id);
        true
    }

    /// Drop all nodes and edges.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.title_index.clear();
    }

    /// Copy positions from a laid-out node sequence back into the store.
    ///
    /// Only `position` is taken; identity and article data in the store are
    /// never touched. Unknown ids are ignored.
    pub(crate) fn commit_positions(&mut self, laid_out: &[Node]) {
        let positions: HashMap<Uuid, Point2D<f32>> = laid_out
            .iter()
            .map(|node| (node.id, node.position))
            .collect();
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
        }
    }

    /// Get a node by id.
    pub fn get_node(&self, id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Get a node by its exact (case-sensitive) article title.
    pub fn get_node_by_title(&self, title: &str) -> Option<&Node> {
        let id = *self.title_index.get(title)?;
        self.get_node(id)
    }

    /// Check whether a directed edge exists for the ordered pair.
    pub fn has_edge_between(&self, source: Uuid, target: Uuid) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Count of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Count of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serialize the graph into a persistable snapshot.
    pub fn to_snapshot(
        &self,
        layout_mode: crate::layout::LayoutMode,
        filter: &FilterState,
    ) -> GraphSnapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|node| PersistedNode {
                id: node.id,
                position: PersistedPosition {
                    x: node.position.x,
                    y: node.position.y,
                },
                data: node.data.clone(),
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .map(|edge| PersistedEdge {
                id: edge.id,
                source: edge.source,
                target: edge.target,
                style: edge.style,
            })
            .collect();

        GraphSnapshot {
            nodes,
            edges,
            layout_mode,
            filter: filter.clone(),
            version: GraphSnapshot::CURRENT_VERSION,
        }
    }

    /// Rebuild a graph from a persisted snapshot.
    ///
    /// Nodes violating the duplicate-title policy and edges referencing
    /// missing endpoints are dropped with a warning; the snapshot `version`
    /// is accepted unchecked.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let mut graph = Graph::new();

        for pnode in &snapshot.nodes {
            let title = pnode.data.title.clone();
            let position = Point2D::new(pnode.position.x, pnode.position.y);
            if graph
                .add_node_with_id(pnode.id, pnode.data.clone(), position)
                .is_err()
            {
                warn!("snapshot: dropping duplicate-title node \"{title}\"");
            }
        }

        for pedge in &snapshot.edges {
            if graph
                .add_edge(pedge.source, pedge.target, pedge.style)
                .is_none()
            {
                warn!(
                    "snapshot: dropping edge {} -> {} (missing endpoint or duplicate pair)",
                    pedge.source, pedge.target
                );
            }
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> ArticleData {
        ArticleData::new(title, format!("https://en.wikipedia.org/wiki/{title}"))
    }

    #[test]
    fn test_graph_new() {
        let graph = Graph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_add_node() {
        let mut graph = Graph::new();
        let id = graph
            .add_node(article("Rust"), Point2D::new(10.0, 20.0))
            .unwrap();

        let node = graph.get_node(id).unwrap();
        assert_eq!(node.data.title, "Rust");
        assert_eq!(node.position.x, 10.0);
        assert_eq!(node.position.y, 20.0);
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let mut graph = Graph::new();
        graph.add_node(article("Rust"), Point2D::origin()).unwrap();

        let err = graph
            .add_node(article("Rust"), Point2D::new(5.0, 5.0))
            .unwrap_err();
        assert_eq!(err, AddNodeError::DuplicateTitle("Rust".to_string()));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_title_match_is_case_sensitive() {
        let mut graph = Graph::new();
        graph.add_node(article("Rust"), Point2D::origin()).unwrap();
        assert!(graph.add_node(article("rust"), Point2D::origin()).is_ok());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_get_node_by_title() {
        let mut graph = Graph::new();
        graph.add_node(article("Rust"), Point2D::origin()).unwrap();

        assert!(graph.get_node_by_title("Rust").is_some());
        assert!(graph.get_node_by_title("rust").is_none());
        assert!(graph.get_node_by_title("Go").is_none());
    }

    #[test]
    fn test_add_edge() {
        let mut graph = Graph::new();
        let a = graph.add_node(article("A"), Point2D::origin()).unwrap();
        let b = graph.add_node(article("B"), Point2D::origin()).unwrap();

        assert!(graph.add_edge(a, b, EdgeStyle::default()).is_some());
        assert!(graph.has_edge_between(a, b));
        assert!(!graph.has_edge_between(b, a));
    }

    #[test]
    fn test_add_edge_missing_endpoint() {
        let mut graph = Graph::new();
        let a = graph.add_node(article("A"), Point2D::origin()).unwrap();

        assert!(graph.add_edge(a, Uuid::new_v4(), EdgeStyle::default()).is_none());
        assert!(graph.add_edge(Uuid::new_v4(), a, EdgeStyle::default()).is_none());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_parallel_edge_rejected() {
        let mut graph = Graph::new();
        let a = graph.add_node(article("A"), Point2D::origin()).unwrap();
        let b = graph.add_node(article("B"), Point2D::origin()).unwrap();

        assert!(graph.add_edge(a, b, EdgeStyle::default()).is_some());
        assert!(graph.add_edge(a, b, EdgeStyle::default()).is_none());
        // The reverse direction is a distinct ordered pair.
        assert!(graph.add_edge(b, a, EdgeStyle::default()).is_some());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_edge_id_is_deterministic() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(Edge::derive_id(a, b), Edge::derive_id(a, b));
        assert_ne!(Edge::derive_id(a, b), Edge::derive_id(b, a));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = Graph::new();
        let a = graph.add_node(article("A"), Point2D::origin()).unwrap();
        let b = graph.add_node(article("B"), Point2D::origin()).unwrap();
        let c = graph.add_node(article("C"), Point2D::origin()).unwrap();
        graph.add_edge(a, b, EdgeStyle::default());
        graph.add_edge(c, a, EdgeStyle::default());
        graph.add_edge(b, c, EdgeStyle::default());

        assert!(graph.remove_node(a));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge_between(b, c));
        assert!(graph.get_node_by_title("A").is_none());
    }

    #[test]
    fn test_remove_nonexistent_node() {
        let mut graph = Graph::new();
        assert!(!graph.remove_node(Uuid::new_v4()));
    }

    #[test]
    fn test_removed_title_can_be_reinserted() {
        let mut graph = Graph::new();
        let a = graph.add_node(article("A"), Point2D::origin()).unwrap();
        graph.remove_node(a);
        assert!(graph.add_node(article("A"), Point2D::origin()).is_ok());
    }

    #[test]
    fn test_commit_positions_only_touches_positions() {
        let mut graph = Graph::new();
        let a = graph.add_node(article("A"), Point2D::origin()).unwrap();
        let mut laid_out = graph.nodes().to_vec();
        laid_out[0].position = Point2D::new(42.0, 7.0);
        laid_out[0].data.title = "mutated".to_string();

        graph.commit_positions(&laid_out);

        let node = graph.get_node(a).unwrap();
        assert_eq!(node.position, Point2D::new(42.0, 7.0));
        assert_eq!(node.data.title, "A");
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut graph = Graph::new();
        let a = graph
            .add_node(article("A"), Point2D::new(10.0, 20.0))
            .unwrap();
        let b = graph
            .add_node(article("B"), Point2D::new(30.0, 40.0))
            .unwrap();
        graph.add_edge(a, b, EdgeStyle::default());

        let snapshot = graph.to_snapshot(crate::layout::LayoutMode::Radial, &FilterState::default());
        let restored = Graph::from_snapshot(&snapshot);

        assert_eq!(restored.node_count(), 2);
        assert_eq!(restored.edge_count(), 1);
        let ra = restored.get_node(a).unwrap();
        assert_eq!(ra.data.title, "A");
        assert_eq!(ra.position, Point2D::new(10.0, 20.0));
        assert!(restored.has_edge_between(a, b));
    }

    #[test]
    fn test_snapshot_edge_with_missing_endpoint_is_dropped() {
        let mut graph = Graph::new();
        let a = graph.add_node(article("A"), Point2D::origin()).unwrap();
        let mut snapshot = graph.to_snapshot(
            crate::layout::LayoutMode::default(),
            &FilterState::default(),
        );
        snapshot.edges.push(PersistedEdge {
            id: Uuid::new_v4(),
            source: a,
            target: Uuid::new_v4(),
            style: EdgeStyle::default(),
        });

        let restored = Graph::from_snapshot(&snapshot);
        assert_eq!(restored.node_count(), 1);
        assert_eq!(restored.edge_count(), 0);
    }

    #[test]
    fn test_snapshot_duplicate_title_node_is_dropped() {
        let mut graph = Graph::new();
        graph.add_node(article("A"), Point2D::origin()).unwrap();
        let mut snapshot =
            graph.to_snapshot(crate::layout::LayoutMode::default(), &FilterState::default());
        let mut dup = snapshot.nodes[0].clone();
        dup.id = Uuid::new_v4();
        snapshot.nodes.push(dup);

        let restored = Graph::from_snapshot(&snapshot);
        assert_eq!(restored.node_count(), 1);
    }
}
