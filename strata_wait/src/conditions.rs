// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ready-made [`Condition`]s over composition snapshots.
//!
//! Layers are matched by name; a condition about "a layer named X" holds if
//! any layer with that name satisfies it.

use strata_core::display::DisplayId;
use strata_core::entry::TraceEntry;
use strata_core::time::Timestamp;

use crate::Condition;

/// Some layer named `name` is visible.
#[must_use]
pub fn layer_visible(name: &str) -> Condition<TraceEntry> {
    let target = name.to_owned();
    Condition::new(format!("{name} is visible"), move |entry: &TraceEntry| {
        entry.is_visible(&target)
    })
}

/// No layer named `name` is visible. Holds when no such layer exists.
#[must_use]
pub fn layer_invisible(name: &str) -> Condition<TraceEntry> {
    let target = name.to_owned();
    Condition::new(format!("{name} is invisible"), move |entry: &TraceEntry| {
        !entry.is_visible(&target)
    })
}

/// Some layer named `name` exists and is fully occluded by another layer.
#[must_use]
pub fn layer_fully_occluded(name: &str) -> Condition<TraceEntry> {
    let target = name.to_owned();
    Condition::new(
        format!("{name} is fully occluded"),
        move |entry: &TraceEntry| {
            entry
                .layers_named(&target)
                .any(|layer| layer.occluded_by().next().is_some())
        },
    )
}

/// Some layer named `name` is present in the hierarchy.
#[must_use]
pub fn layer_exists(name: &str) -> Condition<TraceEntry> {
    let target = name.to_owned();
    Condition::new(format!("{name} exists"), move |entry: &TraceEntry| {
        entry.layers_named(&target).next().is_some()
    })
}

/// No layer named `name` is present in the hierarchy.
#[must_use]
pub fn layer_gone(name: &str) -> Condition<TraceEntry> {
    (!layer_exists(name)).named(format!("{name} is gone"))
}

/// The display with `id` exists and is powered on.
#[must_use]
pub fn display_on(id: DisplayId) -> Condition<TraceEntry> {
    Condition::new(format!("display {id:?} is on"), move |entry: &TraceEntry| {
        entry.display(id).is_some_and(|display| display.is_on)
    })
}

/// No visible layer is even partly covered by a translucent layer above it.
#[must_use]
pub fn no_covered_layers() -> Condition<TraceEntry> {
    Condition::new("no layer is covered", |entry: &TraceEntry| {
        entry
            .visible_layers()
            .all(|layer| layer.covered_by().next().is_none())
    })
}

/// The snapshot was taken at or after `timestamp`.
#[must_use]
pub fn entry_at_or_after(timestamp: Timestamp) -> Condition<TraceEntry> {
    Condition::new(
        format!("snapshot at or after {timestamp}"),
        move |entry: &TraceEntry| entry.timestamp() >= timestamp,
    )
}

/// At least `count` layers are visible.
#[must_use]
pub fn visible_layer_count_at_least(count: usize) -> Condition<TraceEntry> {
    Condition::new(
        format!("at least {count} visible layers"),
        move |entry: &TraceEntry| entry.visible_layers().count() >= count,
    )
}
