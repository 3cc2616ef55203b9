// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and Chrome trace export for strata traces.
//!
//! - [`pretty::write_entry`]: an indented paint-order tree of one snapshot
//!   with visibility and occlusion annotations.
//! - [`pretty::summarize_entry`]: a one-line snapshot summary, suitable for
//!   [`WaitConditionBuilder::with_summary`](https://docs.rs/strata_wait).
//! - [`chrome::export_transitions`] and [`chrome::export_layers`]: Chrome
//!   Trace Event Format JSON.

pub mod chrome;
pub mod pretty;
