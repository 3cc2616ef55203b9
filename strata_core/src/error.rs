// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for trace reconstruction.

use thiserror::Error;

use crate::time::Timestamp;

/// Errors produced while assembling a [`TraceEntry`](crate::entry::TraceEntry)
/// from decoded layer records.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// Two records in the same frame share a layer id.
    #[error("duplicate layer id {id} in frame at {timestamp}")]
    DuplicateLayer {
        /// The repeated id.
        id: i32,
        /// Timestamp of the frame being assembled.
        timestamp: Timestamp,
    },
    /// A record names a parent that is not present in the frame.
    #[error("layer {id} references missing parent {parent_id}")]
    Orphan {
        /// The orphaned layer.
        id: i32,
        /// The parent id it references.
        parent_id: i32,
    },
    /// The frame has layers but none of them is a root.
    #[error("frame at {timestamp} has {layer_count} layers but no root layer")]
    NoRootLayers {
        /// Timestamp of the frame being assembled.
        timestamp: Timestamp,
        /// Number of records in the frame.
        layer_count: usize,
    },
    /// Following parent links from a layer never reaches a root.
    #[error("parent links form a cycle through layer {id}")]
    Cycle {
        /// A layer that is part of (or hangs below) the cycle.
        id: i32,
    },
}

/// Errors produced while constructing or merging transitions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Transition id 0 is reserved and never valid.
    #[error("transition id 0 is not valid")]
    InvalidId,
    /// Neither payload carries any recognized timestamp.
    #[error("transition {id} has no timestamp in either payload")]
    NoTimestamp {
        /// The transition id.
        id: i32,
    },
    /// A merged transition does not declare the accumulated one as its target.
    #[error("transition {incoming} merges into {merge_target:?}, not {accumulated}")]
    MergeTargetMismatch {
        /// Id of the accumulated transition.
        accumulated: i32,
        /// Id of the incoming transition.
        incoming: i32,
        /// The merge target the incoming transition declares.
        merge_target: Option<i32>,
    },
    /// Partial records of different transitions cannot be combined.
    #[error("cannot combine partial records of transitions {a} and {b}")]
    IdMismatch {
        /// First id.
        a: i32,
        /// Second id.
        b: i32,
    },
}

/// Errors produced while building a timestamp-ordered trace.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TraceError {
    /// An entry's timestamp is not strictly after its predecessor's.
    #[error("entry {index} at {timestamp} does not follow {previous}")]
    NonIncreasingTimestamp {
        /// Index of the offending entry.
        index: usize,
        /// Its timestamp.
        timestamp: Timestamp,
        /// The preceding entry's timestamp.
        previous: Timestamp,
    },
}
