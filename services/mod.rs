/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Network-facing services: the Wikipedia article fetcher and the local
//! CORS-stripping API proxy.

pub mod proxy;
pub mod wikipedia;
