// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shell transitions.
//!
//! A [`Transition`] aggregates the window manager's and the shell's partial
//! reports of one logical state change, keyed by an integer id. Two merge
//! operations exist:
//!
//! - [`merge_partial`] combines two reports of the *same* transition
//!   field by field.
//! - [`merge`] folds a transition that declared itself merged into another
//!   into its target.
//!
//! [`TransitionsTrace::as_compressed`] applies [`merge_partial`] across a
//! whole trace. Id 0 is never valid and is rejected when a trace is built.

mod data;
mod merge;
mod trace;

pub use data::{ShellTransitionData, TransitionChange, TransitionType, WmTransitionData};
pub use merge::{Transition, merge, merge_partial, union_of_changes};
pub use trace::TransitionsTrace;
