// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transitions and the merge engine.

use alloc::vec::Vec;

use crate::error::TransitionError;
use crate::time::{Timestamp, Timestamped};

use super::data::{ShellTransitionData, TransitionChange, TransitionType, WmTransitionData};

/// One logical transition, combining whatever both sides have reported.
///
/// Transitions are immutable: merging produces a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    id: i32,
    wm_data: WmTransitionData,
    shell_data: ShellTransitionData,
}

impl Transition {
    /// Creates a transition from its two partial payloads.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NoTimestamp`] if neither payload carries
    /// any timestamp.
    pub fn new(
        id: i32,
        wm_data: WmTransitionData,
        shell_data: ShellTransitionData,
    ) -> Result<Self, TransitionError> {
        let transition = Self {
            id,
            wm_data,
            shell_data,
        };
        if transition.timestamps().iter().all(Option::is_none) {
            return Err(TransitionError::NoTimestamp { id });
        }
        Ok(transition)
    }

    /// Creates a transition known only to the window manager.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_wm(id: i32, wm_data: WmTransitionData) -> Result<Self, TransitionError> {
        Self::new(id, wm_data, ShellTransitionData::default())
    }

    /// Creates a transition known only to the shell.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_shell(id: i32, shell_data: ShellTransitionData) -> Result<Self, TransitionError> {
        Self::new(id, WmTransitionData::default(), shell_data)
    }

    /// Every recognized timestamp, in priority order.
    fn timestamps(&self) -> [Option<Timestamp>; 9] {
        [
            self.wm_data.create_time,
            self.wm_data.send_time,
            self.shell_data.dispatch_time,
            self.shell_data.merge_request_time,
            self.shell_data.merge_time,
            self.shell_data.abort_time,
            self.wm_data.finish_time,
            self.wm_data.abort_time,
            self.wm_data.starting_window_remove_time,
        ]
    }

    /// Transition id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The window manager's payload.
    #[must_use]
    pub fn wm_data(&self) -> &WmTransitionData {
        &self.wm_data
    }

    /// The shell's payload.
    #[must_use]
    pub fn shell_data(&self) -> &ShellTransitionData {
        &self.shell_data
    }

    /// The first reported time, by priority: create, send, dispatch, merge
    /// request, merge, shell abort, finish, window-manager abort, starting
    /// window removal.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamps()
            .into_iter()
            .flatten()
            .next()
            .unwrap_or(Timestamp::MIN)
    }

    /// When the window manager created the transition.
    #[must_use]
    pub fn create_time(&self) -> Option<Timestamp> {
        self.wm_data.create_time
    }

    /// When the window manager sent it to the shell.
    #[must_use]
    pub fn send_time(&self) -> Option<Timestamp> {
        self.wm_data.send_time
    }

    /// When the shell dispatched it.
    #[must_use]
    pub fn dispatch_time(&self) -> Option<Timestamp> {
        self.shell_data.dispatch_time
    }

    /// When the transition ended.
    ///
    /// Falls back to the abort time, then to [`Timestamp::MAX`] for
    /// transitions that never ended within the trace.
    #[must_use]
    pub fn finish_time(&self) -> Timestamp {
        self.wm_data
            .finish_time
            .or(self.wm_data.abort_time)
            .or(self.shell_data.abort_time)
            .unwrap_or(Timestamp::MAX)
    }

    /// Whether the transition finished playing.
    #[must_use]
    pub fn played(&self) -> bool {
        self.wm_data.finish_time.is_some()
    }

    /// Whether either side aborted it.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.wm_data.abort_time.is_some() || self.shell_data.abort_time.is_some()
    }

    /// Whether it was merged into another transition.
    #[must_use]
    pub fn merged(&self) -> bool {
        self.shell_data.merge_time.is_some()
    }

    /// Whether the trace ended before the transition reached a terminal
    /// state.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        !(self.played() || self.aborted() || self.merged())
    }

    /// Affected windows.
    #[must_use]
    pub fn changes(&self) -> &[TransitionChange] {
        &self.wm_data.changes
    }

    /// Id of the transition this one was merged into.
    #[must_use]
    pub fn merge_target(&self) -> Option<i32> {
        self.shell_data.merge_target
    }

    /// Name of the shell handler that played it.
    #[must_use]
    pub fn handler(&self) -> Option<&str> {
        self.shell_data.handler.as_deref()
    }

    /// Kind of transition, [`TransitionType::Undefined`] if not reported.
    #[must_use]
    pub fn transition_type(&self) -> TransitionType {
        self.wm_data.transition_type.unwrap_or_default()
    }
}

impl Timestamped for Transition {
    fn timestamp(&self) -> Timestamp {
        Self::timestamp(self)
    }
}

/// Folds `incoming`, which declared itself merged into `accumulated`, into
/// `accumulated`.
///
/// The result keeps `accumulated`'s identity and shell payload. Its finish
/// data comes from whichever of the two finished later, and its changes are
/// the union of both.
///
/// # Errors
///
/// Returns [`TransitionError::MergeTargetMismatch`] if `incoming`'s merge
/// target is not `accumulated`.
pub fn merge(accumulated: &Transition, incoming: &Transition) -> Result<Transition, TransitionError> {
    if incoming.merge_target() != Some(accumulated.id) {
        return Err(TransitionError::MergeTargetMismatch {
            accumulated: accumulated.id,
            incoming: incoming.id,
            merge_target: incoming.merge_target(),
        });
    }

    let mut wm_data = accumulated.wm_data.clone();
    let incoming_finishes_later = match (wm_data.finish_time, incoming.wm_data.finish_time) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(ours), Some(theirs)) => theirs > ours,
    };
    if incoming_finishes_later {
        wm_data.finish_time = incoming.wm_data.finish_time;
        wm_data.finish_transaction_id = incoming.wm_data.finish_transaction_id;
    }
    wm_data.add_changes(&incoming.wm_data.changes);

    log::trace!(
        "merged transition {} into {}",
        incoming.id,
        accumulated.id
    );
    Ok(Transition {
        id: accumulated.id,
        wm_data,
        shell_data: accumulated.shell_data.clone(),
    })
}

/// Combines two partial reports of the same transition.
///
/// Fields are merged field by field and set values in `b` win over `a`.
/// When the two reports do not disagree on any field the result does not
/// depend on argument order (up to the order of changes).
///
/// # Errors
///
/// Returns [`TransitionError::IdMismatch`] if the ids differ.
pub fn merge_partial(a: &Transition, b: &Transition) -> Result<Transition, TransitionError> {
    if a.id != b.id {
        return Err(TransitionError::IdMismatch { a: a.id, b: b.id });
    }
    Ok(combine(a, b))
}

pub(crate) fn combine(a: &Transition, b: &Transition) -> Transition {
    log::trace!("combining partial records of transition {}", a.id);
    Transition {
        id: a.id,
        wm_data: a.wm_data.merge(&b.wm_data),
        shell_data: a.shell_data.merge(&b.shell_data),
    }
}

/// Collects the changes of several transitions without duplicates.
#[must_use]
pub fn union_of_changes<'a>(
    transitions: impl IntoIterator<Item = &'a Transition>,
) -> Vec<TransitionChange> {
    let mut data = WmTransitionData::default();
    for transition in transitions {
        data.add_changes(transition.changes());
    }
    data.changes
}
