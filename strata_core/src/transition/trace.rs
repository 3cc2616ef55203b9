// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered collections of transitions.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::TransitionError;
use crate::time::Timestamp;

use super::merge::{Transition, combine};

/// All transition records observed in a trace.
///
/// Raw traces hold one record per report, so a transition may appear several
/// times. [`as_compressed`](Self::as_compressed) folds those into one record
/// per id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionsTrace {
    transitions: Vec<Transition>,
}

impl TransitionsTrace {
    /// Creates a trace from records in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidId`] if any record has id 0.
    pub fn new(transitions: Vec<Transition>) -> Result<Self, TransitionError> {
        if transitions.iter().any(|t| t.id() == 0) {
            return Err(TransitionError::InvalidId);
        }
        Ok(Self { transitions })
    }

    /// Folds records sharing an id, in arrival order, and sorts the result
    /// by [`Transition::timestamp`]. Ties keep first-arrival order.
    #[must_use]
    pub fn as_compressed(&self) -> Self {
        let mut slot_of: HashMap<i32, usize> = HashMap::new();
        let mut compressed: Vec<Transition> = Vec::new();
        for transition in &self.transitions {
            match slot_of.get(&transition.id()) {
                Some(&slot) => {
                    compressed[slot] = combine(&compressed[slot], transition);
                }
                None => {
                    slot_of.insert(transition.id(), compressed.len());
                    compressed.push(transition.clone());
                }
            }
        }
        compressed.sort_by_key(Transition::timestamp);
        log::debug!(
            "compressed {} transition records into {}",
            self.transitions.len(),
            compressed.len()
        );
        Self {
            transitions: compressed,
        }
    }

    /// All records.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Records whose timestamp lies in `from..=to`.
    pub fn slice(&self, from: Timestamp, to: Timestamp) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions
            .iter()
            .filter(move |t| (from..=to).contains(&t.timestamp()))
    }

    /// The first record with the given id.
    #[must_use]
    pub fn get(&self, id: i32) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id() == id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether the trace holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Iterates records in order.
    pub fn iter(&self) -> core::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }
}

impl<'a> IntoIterator for &'a TransitionsTrace {
    type Item = &'a Transition;
    type IntoIter = core::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}
