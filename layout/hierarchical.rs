/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Hierarchical (layered) layout strategy.
//!
//! Sugiyama-style layered drawing: rank assignment by longest path from
//! sources, in-layer ordering by barycenter sweeps, then coordinate
//! assignment with half-`spacing` node and rank separation. Output positions
//! are the computed centers shifted by `(-width/2, -height/2)` so nodes are
//! top-left anchored.
//!
//! The adjacency index is a fresh local `DiGraph` per invocation; nothing is
//! retained between calls, so equal inputs always yield equal positions.

use std::collections::{HashMap, HashSet};

use euclid::default::Point2D;
use petgraph::Direction as PetDirection;
use petgraph::graph::{DiGraph, NodeIndex};
use uuid::Uuid;

use crate::graph::{Edge, Node};
use crate::layout::{Direction, LayoutOptions};

pub(crate) const DEFAULT_NODE_WIDTH: f32 = 200.0;
pub(crate) const DEFAULT_NODE_HEIGHT: f32 = 150.0;
pub(crate) const DEFAULT_SPACING: f32 = 100.0;

/// Ordering sweeps; alternating down/up passes settle quickly on the small
/// graphs this explorer targets.
const BARYCENTER_SWEEPS: usize = 4;

/// Lay out the full node set in layers.
pub(crate) fn apply(nodes: &[Node], edges: &[Edge], options: &LayoutOptions) -> Vec<Node> {
    let node_width = options.node_width.unwrap_or(DEFAULT_NODE_WIDTH);
    let node_height = options.node_height.unwrap_or(DEFAULT_NODE_HEIGHT);
    let spacing = options.spacing.unwrap_or(DEFAULT_SPACING);

    if nodes.is_empty() {
        return Vec::new();
    }

    let index = build_index(nodes, edges);
    let layers = assign_layers(&index);
    let mut rows = group_rows(&index, &layers);
    order_rows(&mut rows, &index);

    let node_sep = spacing / 2.0;
    let rank_sep = spacing / 2.0;

    // Layered-frame footprint: rows spread along `across`, ranks advance
    // along `along`. Horizontal directions transpose the frame onto the
    // screen, so they swap the node footprint too.
    let horizontal = matches!(options.direction, Direction::Lr | Direction::Rl);
    let (across, along) = if horizontal {
        (node_height, node_width)
    } else {
        (node_width, node_height)
    };

    // Row widths in the layered frame, centered against the widest row.
    let row_width = |row: &[NodeIndex]| -> f32 {
        row.len() as f32 * across + row.len().saturating_sub(1) as f32 * node_sep
    };
    let max_width = rows.iter().map(|row| row_width(row)).fold(0.0, f32::max);
    let max_rank = rows.len().saturating_sub(1) as f32;

    let mut centers: HashMap<Uuid, Point2D<f32>> = HashMap::with_capacity(nodes.len());
    for (rank, row) in rows.iter().enumerate() {
        let start = (max_width - row_width(row)) / 2.0;
        for (slot, key) in row.iter().enumerate() {
            let cx = start + slot as f32 * (across + node_sep) + across / 2.0;
            let cy = rank as f32 * (along + rank_sep) + along / 2.0;
            let max_cy = max_rank * (along + rank_sep) + along / 2.0;
            let mirrored = max_cy - cy + along / 2.0;
            let center = match options.direction {
                Direction::Tb => Point2D::new(cx, cy),
                Direction::Bt => Point2D::new(cx, mirrored),
                Direction::Lr => Point2D::new(cy, cx),
                Direction::Rl => Point2D::new(mirrored, cx),
            };
            centers.insert(index[*key], center);
        }
    }

    nodes
        .iter()
        .map(|node| {
            let center = centers
                .get(&node.id)
                .copied()
                .unwrap_or_else(Point2D::origin);
            Node {
                position: Point2D::new(center.x - node_width / 2.0, center.y - node_height / 2.0),
                ..node.clone()
            }
        })
        .collect()
}

/// Build the per-invocation adjacency index.
///
/// Edges referencing ids outside the node set are skipped; self-loops carry
/// no ranking information and are skipped too.
fn build_index(nodes: &[Node], edges: &[Edge]) -> DiGraph<Uuid, ()> {
    let mut index = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut keys = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let key = index.add_node(node.id);
        keys.insert(node.id, key);
    }
    for edge in edges {
        if edge.source == edge.target {
            continue;
        }
        if let (Some(&source), Some(&target)) = (keys.get(&edge.source), keys.get(&edge.target)) {
            index.add_edge(source, target, ());
        }
    }
    index
}

/// Longest-path rank per node: sources (and isolated nodes) sit at rank 0,
/// every other node one past its deepest predecessor. Cycles are tolerated
/// by ignoring back-references to nodes currently on the walk stack.
fn assign_layers(index: &DiGraph<Uuid, ()>) -> HashMap<NodeIndex, usize> {
    fn rank_of(
        key: NodeIndex,
        index: &DiGraph<Uuid, ()>,
        ranks: &mut HashMap<NodeIndex, usize>,
        visiting: &mut HashSet<NodeIndex>,
    ) -> usize {
        if let Some(&rank) = ranks.get(&key) {
            return rank;
        }
        if !visiting.insert(key) {
            return 0;
        }

        let predecessors: Vec<NodeIndex> = index
            .neighbors_directed(key, PetDirection::Incoming)
            .collect();
        let rank = predecessors
            .into_iter()
            .map(|pred| rank_of(pred, index, ranks, visiting) + 1)
            .max()
            .unwrap_or(0);

        visiting.remove(&key);
        ranks.insert(key, rank);
        rank
    }

    let mut ranks = HashMap::with_capacity(index.node_count());
    let mut visiting = HashSet::new();
    for key in index.node_indices() {
        rank_of(key, index, &mut ranks, &mut visiting);
    }
    ranks
}

/// Group node keys into rows by rank, preserving input order within a row.
fn group_rows(
    index: &DiGraph<Uuid, ()>,
    layers: &HashMap<NodeIndex, usize>,
) -> Vec<Vec<NodeIndex>> {
    let max_rank = layers.values().copied().max().unwrap_or(0);
    let mut rows: Vec<Vec<NodeIndex>> = vec![Vec::new(); max_rank + 1];
    for key in index.node_indices() {
        let rank = layers.get(&key).copied().unwrap_or(0);
        rows[rank].push(key);
    }
    rows
}

/// Reduce crossings with alternating barycenter sweeps.
///
/// A node's barycenter is the mean slot of its neighbors in the fixed
/// adjacent row; rows re-sort by it with a stable sort, so ties keep their
/// previous relative order and the result is deterministic.
fn order_rows(rows: &mut [Vec<NodeIndex>], index: &DiGraph<Uuid, ()>) {
    let mut slots: HashMap<NodeIndex, f64> = HashMap::new();
    for row in rows.iter() {
        for (slot, key) in row.iter().enumerate() {
            slots.insert(*key, slot as f64);
        }
    }

    for sweep in 0..BARYCENTER_SWEEPS {
        let downward = sweep % 2 == 0;
        let row_order: Vec<usize> = if downward {
            (1..rows.len()).collect()
        } else {
            (0..rows.len().saturating_sub(1)).rev().collect()
        };

        for row_idx in row_order {
            let toward = if downward {
                PetDirection::Incoming
            } else {
                PetDirection::Outgoing
            };

            let mut keyed: Vec<(f64, NodeIndex)> = rows[row_idx]
                .iter()
                .map(|&key| {
                    let neighbor_slots: Vec<f64> = index
                        .neighbors_directed(key, toward)
                        .filter_map(|neighbor| slots.get(&neighbor).copied())
                        .collect();
                    let barycenter = if neighbor_slots.is_empty() {
                        slots.get(&key).copied().unwrap_or(0.0)
                    } else {
                        neighbor_slots.iter().sum::<f64>() / neighbor_slots.len() as f64
                    };
                    (barycenter, key)
                })
                .collect();

            keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            rows[row_idx] = keyed.iter().map(|(_, key)| *key).collect();
            for (slot, (_, key)) in keyed.iter().enumerate() {
                slots.insert(*key, slot as f64);
            }
        }
    }
}
