// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene reconstruction and transition merging for compositor traces.
//!
//! `strata_core` turns already-decoded compositor and window-manager trace
//! records into queryable, immutable snapshots. It is `no_std` compatible
//! (with `alloc`) and stores each frame's layers in struct-of-arrays form with
//! index handles, so parent and relative-z links never own anything.
//!
//! # Architecture
//!
//! ```text
//!   LayerRecord* + Display* ──► EntryBuilder::build() ──► TraceEntry
//!                                     │                       │
//!                                     ▼                       ▼
//!                            LayerStore::compute_occlusion   LayersTrace
//!
//!   Transition* ──► TransitionsTrace::as_compressed() ──► merged, sorted Transition*
//! ```
//!
//! **[`layer`]**: Layer records, the struct-of-arrays [`LayerStore`], paint
//! order traversal, visibility rules and the occlusion pass.
//!
//! **[`entry`]**: The trace entry assembler and the ordered [`LayersTrace`].
//!
//! **[`transition`]**: Window-manager and shell transition payloads, the
//! merge engine, and [`TransitionsTrace`] compression.
//!
//! **[`transform`]** / **[`region`]**: Classified 2-D transforms and
//! rectangle/region helpers over `kurbo`.
//!
//! **[`display`]**: Displays and layer-stack ids.
//!
//! **[`time`]**: Trace timestamps and time-range slicing.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//!
//! [`LayerStore`]: layer::LayerStore
//! [`LayersTrace`]: entry::LayersTrace
//! [`TransitionsTrace`]: transition::TransitionsTrace

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod display;
pub mod entry;
pub mod error;
pub mod layer;
pub mod region;
pub mod time;
pub mod transform;
pub mod transition;
