/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Breadth-first radial layout.
//!
//! The first node of the input sequence is the root, anchored at the origin.
//! A breadth-first walk over the undirected adjacency places each newly
//! discovered node on a circle around its parent; the circle radius grows
//! with the parent's depth, so each generation fans further out. Siblings
//! share a per-parent random start angle and are spread at a fixed angular
//! step. Nodes unreachable from the root stay at the origin.

use std::collections::{HashMap, VecDeque};
use std::f32::consts::TAU;

use euclid::default::Point2D;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;
use uuid::Uuid;

use super::LayoutOptions;
use crate::graph::{Edge, Node};

pub(crate) const DEFAULT_SPACING: f32 = 150.0;

/// Eight-way fan around each parent.
const ANGLE_STEP: f32 = TAU / 8.0;

pub(crate) fn apply<R: Rng>(
    nodes: &[Node],
    edges: &[Edge],
    options: &LayoutOptions,
    rng: &mut R,
) -> Vec<Node> {
    if nodes.is_empty() {
        return Vec::new();
    }
    let spacing = options.spacing.unwrap_or(DEFAULT_SPACING);

    let mut adjacency = UnGraph::<Uuid, ()>::with_capacity(nodes.len(), edges.len());
    let mut keys: HashMap<Uuid, NodeIndex> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let key = adjacency.add_node(node.id);
        keys.insert(node.id, key);
    }
    for edge in edges {
        if let (Some(&source), Some(&target)) = (keys.get(&edge.source), keys.get(&edge.target)) {
            adjacency.add_edge(source, target, ());
        }
    }

    let mut positions: HashMap<Uuid, Point2D<f32>> = HashMap::with_capacity(nodes.len());
    let mut visited = vec![false; adjacency.node_count()];
    let mut queue: VecDeque<(NodeIndex, u32, Point2D<f32>)> = VecDeque::new();

    let root = keys[&nodes[0].id];
    visited[root.index()] = true;
    positions.insert(nodes[0].id, Point2D::origin());
    queue.push_back((root, 0, Point2D::origin()));

    while let Some((parent, level, center)) = queue.pop_front() {
        let radius = spacing * (level + 1) as f32;
        let start_angle = rng.gen_range(0.0..TAU);
        let mut placed = 0u32;
        for neighbor in adjacency.neighbors(parent) {
            if visited[neighbor.index()] {
                continue;
            }
            visited[neighbor.index()] = true;
            let angle = start_angle + placed as f32 * ANGLE_STEP;
            let position =
                Point2D::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
            positions.insert(adjacency[neighbor], position);
            queue.push_back((neighbor, level + 1, position));
            placed += 1;
        }
    }

    nodes
        .iter()
        .map(|node| {
            let position = positions
                .get(&node.id)
                .copied()
                .unwrap_or_else(Point2D::origin);
            Node {
                id: node.id,
                position,
                data: node.data.clone(),
            }
        })
        .collect()
}
