/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layout strategies for the article graph.
//!
//! A layout strategy is a pure function from a node/edge set to a new node
//! sequence with updated positions. Strategies never mutate their inputs and
//! never touch node identity, edges, or article data.
//!
//! [`apply_layout`] dispatches by [`LayoutMode`]: `Radial` routes to the
//! breadth-first radial strategy, everything else (including `Manual`, which
//! is deliberately not special-cased) falls through to the hierarchical
//! strategy.

pub mod hierarchical;
pub mod radial;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Node};

/// Layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Alias for the hierarchical strategy.
    #[default]
    Force,
    Radial,
    /// Falls through to the hierarchical strategy (historical behavior).
    Manual,
}

/// Rank direction for the hierarchical strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Tb,
    /// Left to right.
    Lr,
    /// Bottom to top.
    Bt,
    /// Right to left.
    Rl,
}

/// Options passed to [`apply_layout`].
///
/// Unset fields take per-strategy defaults: the hierarchical strategy uses a
/// 200x150 footprint with spacing 100, the radial strategy uses spacing 150.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub mode: LayoutMode,
    pub direction: Direction,
    pub node_width: Option<f32>,
    pub node_height: Option<f32>,
    pub spacing: Option<f32>,
}

impl LayoutOptions {
    pub fn for_mode(mode: LayoutMode) -> Self {
        Self {
            mode,
            direction: Direction::default(),
            node_width: None,
            node_height: None,
            spacing: None,
        }
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::for_mode(LayoutMode::default())
    }
}

/// Compute positions for the whole node set.
///
/// Returns a new node sequence; the edge set is never modified. The RNG only
/// feeds the radial strategy's per-branch start angles, so a seeded generator
/// makes the whole dispatch deterministic.
pub fn apply_layout<R: Rng>(
    nodes: &[Node],
    edges: &[Edge],
    options: &LayoutOptions,
    rng: &mut R,
) -> Vec<Node> {
    match options.mode {
        LayoutMode::Radial => radial::apply(nodes, edges, options, rng),
        LayoutMode::Force | LayoutMode::Manual => hierarchical::apply(nodes, edges, options),
    }
}
