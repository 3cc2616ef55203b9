// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Partial transition payloads.
//!
//! A transition is reported by two cooperating components. The window
//! manager reports its lifecycle ([`WmTransitionData`]) and the shell reports
//! how it was played ([`ShellTransitionData`]). Either side may arrive first,
//! and each may arrive in several fragments.

use alloc::string::String;
use alloc::vec::Vec;

use crate::time::Timestamp;

/// The kind of state change a transition performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TransitionType {
    /// Not reported.
    #[default]
    Undefined,
    /// No change.
    None,
    /// A window opens.
    Open,
    /// A window closes.
    Close,
    /// A task moves to the front.
    ToFront,
    /// A task moves to the back.
    ToBack,
    /// An activity relaunches.
    Relaunch,
    /// A window changes bounds or mode.
    Change,
    /// The keyguard is dismissed.
    KeyguardGoingAway,
    /// An activity occludes the keyguard.
    KeyguardOcclude,
    /// An activity stops occluding the keyguard.
    KeyguardUnocclude,
    /// Picture-in-picture entry.
    Pip,
    /// The device wakes.
    Wake,
    /// The device sleeps.
    Sleep,
    /// The first value reserved for custom transitions.
    FirstCustom,
    /// Any other custom or unknown value.
    Custom(i32),
}

impl TransitionType {
    const FIRST_CUSTOM: i32 = 1000;

    /// Decodes a raw trace value.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => Self::Undefined,
            0 => Self::None,
            1 => Self::Open,
            2 => Self::Close,
            3 => Self::ToFront,
            4 => Self::ToBack,
            5 => Self::Relaunch,
            6 => Self::Change,
            7 => Self::KeyguardGoingAway,
            8 => Self::KeyguardOcclude,
            9 => Self::KeyguardUnocclude,
            10 => Self::Pip,
            11 => Self::Wake,
            12 => Self::Sleep,
            Self::FIRST_CUSTOM => Self::FirstCustom,
            other => Self::Custom(other),
        }
    }

    /// Encodes back to the raw trace value.
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Undefined => -1,
            Self::None => 0,
            Self::Open => 1,
            Self::Close => 2,
            Self::ToFront => 3,
            Self::ToBack => 4,
            Self::Relaunch => 5,
            Self::Change => 6,
            Self::KeyguardGoingAway => 7,
            Self::KeyguardOcclude => 8,
            Self::KeyguardUnocclude => 9,
            Self::Pip => 10,
            Self::Wake => 11,
            Self::Sleep => 12,
            Self::FirstCustom => Self::FIRST_CUSTOM,
            Self::Custom(raw) => raw,
        }
    }
}

/// One window or layer affected by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionChange {
    /// What happens to the target.
    pub mode: TransitionType,
    /// The target's layer id.
    pub layer_id: i32,
    /// The target's window id.
    pub window_id: i32,
}

/// Appends the entries of `incoming` that `into` does not already contain.
fn union_changes(into: &mut Vec<TransitionChange>, incoming: &[TransitionChange]) {
    for change in incoming {
        if !into.contains(change) {
            into.push(*change);
        }
    }
}

/// The window manager's side of a transition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WmTransitionData {
    /// When the transition was created.
    pub create_time: Option<Timestamp>,
    /// When it was sent to the shell.
    pub send_time: Option<Timestamp>,
    /// When the window manager aborted it.
    pub abort_time: Option<Timestamp>,
    /// When it finished.
    pub finish_time: Option<Timestamp>,
    /// When the starting window was removed.
    pub starting_window_remove_time: Option<Timestamp>,
    /// Transaction applied at start.
    pub start_transaction_id: Option<u64>,
    /// Transaction applied at finish.
    pub finish_transaction_id: Option<u64>,
    /// Kind of transition.
    pub transition_type: Option<TransitionType>,
    /// Affected windows, without duplicates.
    pub changes: Vec<TransitionChange>,
}

impl WmTransitionData {
    /// Merges two fragments. Fields set in `incoming` win; changes are
    /// unioned.
    #[must_use]
    pub fn merge(&self, incoming: &Self) -> Self {
        let mut changes = self.changes.clone();
        union_changes(&mut changes, &incoming.changes);
        Self {
            create_time: incoming.create_time.or(self.create_time),
            send_time: incoming.send_time.or(self.send_time),
            abort_time: incoming.abort_time.or(self.abort_time),
            finish_time: incoming.finish_time.or(self.finish_time),
            starting_window_remove_time: incoming
                .starting_window_remove_time
                .or(self.starting_window_remove_time),
            start_transaction_id: incoming.start_transaction_id.or(self.start_transaction_id),
            finish_transaction_id: incoming
                .finish_transaction_id
                .or(self.finish_transaction_id),
            transition_type: incoming.transition_type.or(self.transition_type),
            changes,
        }
    }

    /// Adds changes, skipping ones already present.
    pub fn add_changes(&mut self, changes: &[TransitionChange]) {
        union_changes(&mut self.changes, changes);
    }
}

/// The shell's side of a transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShellTransitionData {
    /// When the shell dispatched it to a handler.
    pub dispatch_time: Option<Timestamp>,
    /// When the shell asked to merge it into another transition.
    pub merge_request_time: Option<Timestamp>,
    /// When it was merged.
    pub merge_time: Option<Timestamp>,
    /// When the shell aborted it.
    pub abort_time: Option<Timestamp>,
    /// Name of the handler that played it.
    pub handler: Option<String>,
    /// Id of the transition it was merged into.
    pub merge_target: Option<i32>,
}

impl ShellTransitionData {
    /// Merges two fragments. Fields set in `incoming` win.
    #[must_use]
    pub fn merge(&self, incoming: &Self) -> Self {
        Self {
            dispatch_time: incoming.dispatch_time.or(self.dispatch_time),
            merge_request_time: incoming.merge_request_time.or(self.merge_request_time),
            merge_time: incoming.merge_time.or(self.merge_time),
            abort_time: incoming.abort_time.or(self.abort_time),
            handler: incoming.handler.clone().or_else(|| self.handler.clone()),
            merge_target: incoming.merge_target.or(self.merge_target),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn ts(nanos: u64) -> Option<Timestamp> {
        Some(Timestamp::from_elapsed_nanos(nanos))
    }

    fn change(layer_id: i32) -> TransitionChange {
        TransitionChange {
            mode: TransitionType::Open,
            layer_id,
            window_id: layer_id * 10,
        }
    }

    #[test]
    fn raw_values() {
        assert_eq!(TransitionType::from_raw(1), TransitionType::Open);
        assert_eq!(TransitionType::from_raw(-1), TransitionType::Undefined);
        assert_eq!(TransitionType::from_raw(1000), TransitionType::FirstCustom);
        assert_eq!(TransitionType::from_raw(1003), TransitionType::Custom(1003));
        assert_eq!(TransitionType::Custom(1003).to_raw(), 1003);
        assert_eq!(TransitionType::Sleep.to_raw(), 12);
    }

    #[test]
    fn wm_merge_prefers_incoming_and_unions_changes() {
        let a = WmTransitionData {
            create_time: ts(1),
            finish_time: ts(9),
            changes: vec![change(1), change(2)],
            ..WmTransitionData::default()
        };
        let b = WmTransitionData {
            finish_time: ts(12),
            send_time: ts(3),
            changes: vec![change(2), change(3)],
            ..WmTransitionData::default()
        };
        let merged = a.merge(&b);
        assert_eq!(merged.create_time, ts(1));
        assert_eq!(merged.send_time, ts(3));
        assert_eq!(merged.finish_time, ts(12), "incoming wins");
        assert_eq!(merged.changes, [change(1), change(2), change(3)]);
    }

    #[test]
    fn shell_merge_keeps_unset_fields() {
        let a = ShellTransitionData {
            dispatch_time: ts(5),
            handler: Some("DefaultTransitionHandler".into()),
            ..ShellTransitionData::default()
        };
        let b = ShellTransitionData {
            merge_target: Some(7),
            ..ShellTransitionData::default()
        };
        let merged = a.merge(&b);
        assert_eq!(merged.dispatch_time, ts(5));
        assert_eq!(merged.handler.as_deref(), Some("DefaultTransitionHandler"));
        assert_eq!(merged.merge_target, Some(7));
    }

    #[test]
    fn add_changes_skips_duplicates() {
        let mut data = WmTransitionData::default();
        data.add_changes(&[change(1), change(1)]);
        assert_eq!(data.changes.len(), 1);
    }
}
