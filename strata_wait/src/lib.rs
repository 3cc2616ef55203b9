// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Condition polling for synchronizing tests with asynchronous UI state.
//!
//! A [`WaitCondition`] repeatedly pulls a snapshot of some state from a
//! supplier and checks it against a list of named [`Condition`]s until all
//! of them hold or the retry limit runs out:
//!
//! ```text
//!  supplier() ──► snapshot ──► conditions[0] ──► conditions[1] ──► … ──► success
//!                                  │ fails           │ fails
//!                                  ▼                 ▼
//!                           on_failure, on_retry, sleep(retry_interval)
//!                                  │
//!                                  └──► next attempt (until retry_limit)
//! ```
//!
//! Snapshots are usually [`TraceEntry`](strata_core::entry::TraceEntry)
//! values, and [`conditions`] provides the common checks over them, but any
//! `'static` type works.
//!
//! Waits are blocking and single-threaded. Starting a wait from inside
//! another wait on the same thread (for example from a hook) panics.

mod condition;
mod config;
mod error;
mod wait;

pub mod conditions;

pub use condition::Condition;
pub use config::WaitConfig;
pub use error::WaitError;
pub use wait::{WaitCondition, WaitConditionBuilder, WaitStatus};
