/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Core library for the WikiGraph explorer.
//!
//! WikiGraph turns Wikipedia into an explorable knowledge graph: an article
//! becomes a node, following a related link from an article spawns a
//! connected neighbor, and the whole graph can be re-laid-out with
//! interchangeable strategies.
//!
//! Module map:
//! - [`graph`]: node/edge store with title de-duplication and snapshots
//! - [`layout`]: layout strategies (hierarchical, radial) and the dispatcher
//! - [`app`]: mutation/expansion controller consumed by the UI layer
//! - [`persistence`]: best-effort local snapshot cache
//! - [`services`]: article fetcher and the Wikipedia REST passthrough proxy

pub mod app;
pub mod graph;
pub mod layout;
pub mod persistence;
pub mod prefs;
pub mod services;
