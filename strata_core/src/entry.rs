// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace entry assembly.
//!
//! An [`EntryBuilder`] takes one frame's decoded [`LayerRecord`]s and
//! [`Display`]s and produces an immutable [`TraceEntry`]:
//!
//! 1. Duplicate ids and dangling parent ids are handled per
//!    [`AssemblyConfig`].
//! 2. The forest is flattened breadth-first from its roots (roots ordered by
//!    `z`) into a [`LayerStore`].
//! 3. Relative z-order, inherited hidden state and paint order are resolved.
//! 4. The occlusion pass runs against the frame's displays.
//!
//! Entries are collected into a [`LayersTrace`], which enforces strictly
//! increasing timestamps.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::display::{Display, DisplayId};
use crate::error::{AssemblyError, TraceError};
use crate::layer::{LayerHandle, LayerRecord, LayerRef, LayerStore};
use crate::time::{Timestamp, Timestamped, slice_by_time};

/// What to do with a layer whose parent is not in the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrphanPolicy {
    /// Fail assembly with [`AssemblyError::Orphan`].
    Reject,
    /// Treat the layer as a root.
    PromoteToRoot,
}

/// What to do with records that repeat a layer id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DuplicatePolicy {
    /// Fail assembly with [`AssemblyError::DuplicateLayer`].
    Reject,
    /// Keep the first record with the id and drop the rest.
    KeepFirst,
}

/// Configuration for [`EntryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssemblyConfig {
    /// Handling of dangling parent ids.
    pub orphan_policy: OrphanPolicy,
    /// Handling of repeated layer ids.
    pub duplicate_policy: DuplicatePolicy,
}

impl AssemblyConfig {
    /// Rejects malformed frames.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            orphan_policy: OrphanPolicy::Reject,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }

    /// Repairs malformed frames where possible: orphans become roots and
    /// only the first record of a repeated id is kept.
    ///
    /// Useful for traces captured mid-transaction.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            orphan_policy: OrphanPolicy::PromoteToRoot,
            duplicate_policy: DuplicatePolicy::KeepFirst,
        }
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self::strict()
    }
}

/// Builds a [`TraceEntry`] from one frame's decoded records.
#[derive(Debug)]
pub struct EntryBuilder {
    timestamp: Timestamp,
    vsync_id: Option<i64>,
    displays: Vec<Display>,
    records: Vec<LayerRecord>,
    config: AssemblyConfig,
}

impl EntryBuilder {
    /// Starts an entry at `timestamp` with no displays or layers.
    #[must_use]
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            vsync_id: None,
            displays: Vec::new(),
            records: Vec::new(),
            config: AssemblyConfig::default(),
        }
    }

    /// Sets the vsync id the frame was composed for.
    #[must_use]
    pub fn vsync_id(mut self, vsync_id: i64) -> Self {
        self.vsync_id = Some(vsync_id);
        self
    }

    /// Adds displays.
    #[must_use]
    pub fn displays(mut self, displays: impl IntoIterator<Item = Display>) -> Self {
        self.displays.extend(displays);
        self
    }

    /// Adds layer records.
    #[must_use]
    pub fn layers(mut self, records: impl IntoIterator<Item = LayerRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Sets the assembly configuration.
    #[must_use]
    pub fn config(mut self, config: AssemblyConfig) -> Self {
        self.config = config;
        self
    }

    /// Assembles the entry.
    ///
    /// A frame with no records yields a valid, empty entry.
    ///
    /// # Errors
    ///
    /// - [`AssemblyError::DuplicateLayer`] under [`DuplicatePolicy::Reject`].
    /// - [`AssemblyError::Orphan`] under [`OrphanPolicy::Reject`].
    /// - [`AssemblyError::NoRootLayers`] if the frame has records but none
    ///   of them is a root.
    /// - [`AssemblyError::Cycle`] if parent links loop.
    pub fn build(self) -> Result<TraceEntry, AssemblyError> {
        let Self {
            timestamp,
            vsync_id,
            displays,
            records,
            config,
        } = self;

        let records = dedup(records, config.duplicate_policy, timestamp)?;
        let position: HashMap<i32, usize> = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id, pos))
            .collect();

        // Resolve parents to positions; `None` marks a root.
        let mut parent_pos: Vec<Option<usize>> = Vec::with_capacity(records.len());
        for record in &records {
            let resolved = match record.parent_id {
                None => None,
                Some(parent_id) if parent_id == record.id => {
                    return Err(AssemblyError::Cycle { id: record.id });
                }
                Some(parent_id) => match position.get(&parent_id) {
                    Some(&pos) => Some(pos),
                    None => match config.orphan_policy {
                        OrphanPolicy::Reject => {
                            return Err(AssemblyError::Orphan {
                                id: record.id,
                                parent_id,
                            });
                        }
                        OrphanPolicy::PromoteToRoot => {
                            log::warn!(
                                "promoting layer {} to root: parent {parent_id} is missing",
                                record.id
                            );
                            None
                        }
                    },
                },
            };
            parent_pos.push(resolved);
        }

        let mut roots: Vec<usize> = (0..records.len())
            .filter(|&pos| parent_pos[pos].is_none())
            .collect();
        if roots.is_empty() && !records.is_empty() {
            return Err(AssemblyError::NoRootLayers {
                timestamp,
                layer_count: records.len(),
            });
        }
        roots.sort_by_key(|&pos| records[pos].z);

        let mut children: Vec<Vec<usize>> = (0..records.len()).map(|_| Vec::new()).collect();
        for (pos, parent) in parent_pos.iter().enumerate() {
            if let Some(parent) = *parent {
                children[parent].push(pos);
            }
        }

        let layer_count = records.len();
        let mut pending: Vec<Option<LayerRecord>> = records.into_iter().map(Some).collect();
        let mut handles: Vec<Option<LayerHandle>> = (0..layer_count).map(|_| None).collect();
        let mut store = LayerStore::new();
        let mut queue: VecDeque<usize> = roots.into_iter().collect();
        while let Some(pos) = queue.pop_front() {
            let Some(record) = pending[pos].take() else {
                continue;
            };
            let handle = store.push(record);
            handles[pos] = Some(handle);
            if let Some(parent) = parent_pos[pos].and_then(|p| handles[p]) {
                store.add_child(parent, handle);
            }
            queue.extend(children[pos].iter().copied());
        }

        if let Some(stuck) = pending.iter().flatten().next() {
            return Err(AssemblyError::Cycle { id: stuck.id });
        }

        store.resolve_hierarchy();
        store.compute_occlusion(&displays);

        let entry = TraceEntry {
            timestamp,
            vsync_id,
            displays,
            layers: store,
        };
        log::debug!(
            "assembled entry at {timestamp}: {layer_count} layers, {} visible",
            entry.visible_layers().count()
        );
        Ok(entry)
    }
}

fn dedup(
    records: Vec<LayerRecord>,
    policy: DuplicatePolicy,
    timestamp: Timestamp,
) -> Result<Vec<LayerRecord>, AssemblyError> {
    let mut seen: HashSet<i32> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.id) {
            kept.push(record);
            continue;
        }
        match policy {
            DuplicatePolicy::Reject => {
                return Err(AssemblyError::DuplicateLayer {
                    id: record.id,
                    timestamp,
                });
            }
            DuplicatePolicy::KeepFirst => {
                log::warn!("dropping duplicate record for layer {}", record.id);
            }
        }
    }
    Ok(kept)
}

/// An immutable snapshot of the compositor at one point in time.
#[derive(Debug)]
pub struct TraceEntry {
    timestamp: Timestamp,
    vsync_id: Option<i64>,
    displays: Vec<Display>,
    layers: LayerStore,
}

impl TraceEntry {
    /// When the snapshot was taken.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The vsync id the frame was composed for, if reported.
    #[inline]
    #[must_use]
    pub fn vsync_id(&self) -> Option<i64> {
        self.vsync_id
    }

    /// All displays.
    #[must_use]
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// The display with the given id.
    #[must_use]
    pub fn display(&self, id: DisplayId) -> Option<&Display> {
        self.displays.iter().find(|display| display.id == id)
    }

    /// The layer store, in breadth-first storage order.
    #[must_use]
    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    /// The layer with the given id.
    #[must_use]
    pub fn layer_by_id(&self, id: i32) -> Option<LayerRef<'_>> {
        self.layers.by_id(id)
    }

    /// Layers whose name is exactly `name`.
    pub fn layers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = LayerRef<'a>> + 'a {
        self.layers.iter().filter(move |layer| layer.name() == name)
    }

    /// Layers without a parent.
    pub fn root_layers(&self) -> impl Iterator<Item = LayerRef<'_>> + '_ {
        self.layers.iter().filter(|layer| layer.is_root())
    }

    /// Visible layers, in storage order.
    pub fn visible_layers(&self) -> impl Iterator<Item = LayerRef<'_>> + '_ {
        self.layers.iter().filter(|layer| layer.is_visible())
    }

    /// All layers back to front.
    pub fn paint_order(&self) -> impl Iterator<Item = LayerRef<'_>> + '_ {
        self.layers
            .traversal_order()
            .iter()
            .map(|&idx| self.layers.get(LayerHandle(idx)))
    }

    /// Whether any layer named `name` is visible.
    #[must_use]
    pub fn is_visible(&self, name: &str) -> bool {
        self.layers_named(name).any(|layer| layer.is_visible())
    }
}

impl Timestamped for TraceEntry {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// A sequence of [`TraceEntry`]s with strictly increasing timestamps.
#[derive(Debug, Default)]
pub struct LayersTrace {
    entries: Vec<TraceEntry>,
}

impl LayersTrace {
    /// Creates a trace from entries already in time order.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::NonIncreasingTimestamp`] at the first entry
    /// that does not come strictly after its predecessor.
    pub fn new(entries: Vec<TraceEntry>) -> Result<Self, TraceError> {
        for (index, pair) in entries.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(TraceError::NonIncreasingTimestamp {
                    index: index + 1,
                    timestamp: pair[1].timestamp,
                    previous: pair[0].timestamp,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::NonIncreasingTimestamp`] if `entry` is not
    /// strictly after the current last entry.
    pub fn push(&mut self, entry: TraceEntry) -> Result<(), TraceError> {
        if let Some(last) = self.entries.last()
            && entry.timestamp <= last.timestamp
        {
            return Err(TraceError::NonIncreasingTimestamp {
                index: self.entries.len(),
                timestamp: entry.timestamp,
                previous: last.timestamp,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Entries with timestamps in `from..=to`.
    #[must_use]
    pub fn slice(&self, from: Timestamp, to: Timestamp) -> &[TraceEntry] {
        slice_by_time(&self.entries, from, to)
    }

    /// The latest entry at or before `timestamp`.
    #[must_use]
    pub fn entry_at(&self, timestamp: Timestamp) -> Option<&TraceEntry> {
        let end = self.entries.partition_point(|e| e.timestamp <= timestamp);
        end.checked_sub(1).map(|idx| &self.entries[idx])
    }

    /// The earliest entry.
    #[must_use]
    pub fn first(&self) -> Option<&TraceEntry> {
        self.entries.first()
    }

    /// The latest entry.
    #[must_use]
    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trace has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in time order.
    pub fn iter(&self) -> core::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a LayersTrace {
    type Item = &'a TraceEntry;
    type IntoIter = core::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Rect, Size};

    use crate::layer::Color;

    use super::*;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 100.0, 200.0);

    fn ts(nanos: u64) -> Timestamp {
        Timestamp::from_elapsed_nanos(nanos)
    }

    fn surface(id: i32, parent: i32, name: &str) -> LayerRecord {
        LayerRecord::new(id, name)
            .with_parent(parent)
            .with_bounds(SCREEN)
            .with_buffer(100, 200)
    }

    fn entry_at(nanos: u64) -> TraceEntry {
        EntryBuilder::new(ts(nanos)).build().unwrap()
    }

    #[test]
    fn empty_frame_is_valid() {
        let entry = entry_at(5);
        assert!(entry.layers().is_empty());
        assert_eq!(entry.root_layers().count(), 0);
        assert_eq!(entry.timestamp(), ts(5));
    }

    #[test]
    fn assembles_breadth_first_and_occludes() {
        let entry = EntryBuilder::new(ts(10))
            .displays([Display::new(0, "main", 0, Size::new(100.0, 200.0))])
            .layers(vec![
                surface(3, 2, "Wallpaper").with_z(-1),
                surface(4, 2, "Launcher").with_z(1).opaque(),
                LayerRecord::new(1, "Display Root"),
                LayerRecord::new(2, "Tasks").with_parent(1),
            ])
            .vsync_id(77)
            .build()
            .unwrap();

        let order: Vec<_> = entry.layers().iter().map(|l| l.id()).collect();
        assert_eq!(order, [1, 2, 3, 4], "parents before children");
        assert_eq!(entry.vsync_id(), Some(77));
        assert!(entry.is_visible("Launcher"));
        assert!(!entry.is_visible("Wallpaper"));
        assert_eq!(
            entry
                .layer_by_id(3)
                .unwrap()
                .occluded_by()
                .map(|l| l.id())
                .collect::<Vec<_>>(),
            [4]
        );
        let paint: Vec<_> = entry.paint_order().map(|l| l.name()).collect();
        assert_eq!(paint, ["Display Root", "Tasks", "Wallpaper", "Launcher"]);
        assert!(entry.display(DisplayId(0)).is_some());
    }

    #[test]
    fn strict_rejects_duplicates_and_orphans() {
        let dup = EntryBuilder::new(ts(1))
            .layers([LayerRecord::new(1, "a"), LayerRecord::new(1, "b")])
            .build();
        assert_eq!(
            dup.unwrap_err(),
            AssemblyError::DuplicateLayer {
                id: 1,
                timestamp: ts(1)
            }
        );

        let orphan = EntryBuilder::new(ts(1))
            .layers([LayerRecord::new(1, "root"), surface(2, 9, "lost")])
            .build();
        assert_eq!(
            orphan.unwrap_err(),
            AssemblyError::Orphan {
                id: 2,
                parent_id: 9
            }
        );
    }

    #[test]
    fn lenient_repairs_frame() {
        let entry = EntryBuilder::new(ts(1))
            .config(AssemblyConfig::lenient())
            .layers([
                LayerRecord::new(1, "root"),
                surface(2, 9, "lost"),
                LayerRecord::new(1, "shadowed"),
            ])
            .build()
            .unwrap();
        assert_eq!(entry.layers().len(), 2);
        assert_eq!(entry.layer_by_id(1).unwrap().name(), "root");
        assert!(entry.layer_by_id(2).unwrap().is_root());
        assert!(entry.is_visible("lost"));
    }

    #[test]
    fn frame_without_roots_fails() {
        let err = EntryBuilder::new(ts(3))
            .layers([surface(1, 2, "a"), surface(2, 1, "b")])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AssemblyError::NoRootLayers {
                timestamp: ts(3),
                layer_count: 2
            }
        );
    }

    #[test]
    fn detached_cycle_fails() {
        let err = EntryBuilder::new(ts(3))
            .layers([
                LayerRecord::new(1, "root"),
                surface(2, 3, "a"),
                surface(3, 2, "b"),
            ])
            .build()
            .unwrap_err();
        assert_eq!(err, AssemblyError::Cycle { id: 2 });

        let err = EntryBuilder::new(ts(3))
            .layers([LayerRecord::new(1, "root"), surface(2, 2, "self")])
            .build()
            .unwrap_err();
        assert_eq!(err, AssemblyError::Cycle { id: 2 });
    }

    #[test]
    fn hidden_parent_hides_subtree() {
        let entry = EntryBuilder::new(ts(1))
            .layers([
                LayerRecord::new(1, "root").hidden(),
                surface(2, 1, "child").with_color(Color::new(0.0, 0.0, 0.0, 1.0)),
            ])
            .build()
            .unwrap();
        assert!(!entry.is_visible("child"));
    }

    #[test]
    fn trace_enforces_increasing_timestamps() {
        let err = LayersTrace::new(vec![entry_at(10), entry_at(10)]).unwrap_err();
        assert_eq!(
            err,
            TraceError::NonIncreasingTimestamp {
                index: 1,
                timestamp: ts(10),
                previous: ts(10)
            }
        );

        let mut trace = LayersTrace::new(vec![entry_at(10)]).unwrap();
        assert!(trace.push(entry_at(5)).is_err(), "earlier entry rejected");
        trace.push(entry_at(20)).unwrap();
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn trace_queries() {
        let trace = LayersTrace::new(vec![entry_at(10), entry_at(20), entry_at(30)]).unwrap();
        assert_eq!(trace.slice(ts(15), ts(30)).len(), 2);
        assert_eq!(trace.entry_at(ts(25)).map(TraceEntry::timestamp), Some(ts(20)));
        assert_eq!(trace.entry_at(ts(30)).map(TraceEntry::timestamp), Some(ts(30)));
        assert!(trace.entry_at(ts(9)).is_none());
        assert_eq!(trace.first().map(TraceEntry::timestamp), Some(ts(10)));
        assert_eq!(trace.last().map(TraceEntry::timestamp), Some(ts(30)));
        assert_eq!((&trace).into_iter().count(), 3);
    }
}
