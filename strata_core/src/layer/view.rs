// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Borrowed views of stored layers.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::id::{INVALID, LayerHandle};
use super::record::LayerRecord;
use super::store::LayerStore;
use super::visibility::InvisibleReason;

/// A borrowed view of one layer in a [`LayerStore`].
///
/// Gives access to the decoded record together with everything derived from
/// the frame: hierarchy, visibility and occlusion relations.
#[derive(Clone, Copy)]
pub struct LayerRef<'a> {
    store: &'a LayerStore,
    idx: u32,
}

impl<'a> LayerRef<'a> {
    pub(crate) fn new(store: &'a LayerStore, idx: u32) -> Self {
        Self { store, idx }
    }

    fn at(self, idx: u32) -> Option<Self> {
        (idx != INVALID).then(|| Self::new(self.store, idx))
    }

    fn relation(self, set: &'a [u32]) -> impl Iterator<Item = LayerRef<'a>> + 'a {
        let store = self.store;
        set.iter().map(move |&idx| LayerRef::new(store, idx))
    }

    /// The handle of this layer.
    #[inline]
    #[must_use]
    pub fn handle(self) -> LayerHandle {
        LayerHandle(self.idx)
    }

    /// The decoded record.
    #[inline]
    #[must_use]
    pub fn record(self) -> &'a LayerRecord {
        &self.store.records[self.idx as usize]
    }

    /// Layer id.
    #[inline]
    #[must_use]
    pub fn id(self) -> i32 {
        self.record().id
    }

    /// Layer name.
    #[inline]
    #[must_use]
    pub fn name(self) -> &'a str {
        &self.record().name
    }

    /// `"{id} {name}"`.
    #[must_use]
    pub fn stable_id(self) -> String {
        self.record().stable_id()
    }

    /// The real parent, `None` for roots.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.at(self.store.parent[self.idx as usize])
    }

    /// Whether this layer has no parent.
    #[must_use]
    pub fn is_root(self) -> bool {
        self.store.parent[self.idx as usize] == INVALID
    }

    /// Direct children in insertion order.
    pub fn children(self) -> impl Iterator<Item = LayerRef<'a>> + 'a {
        let store = self.store;
        store
            .children(self.handle())
            .map(move |handle| LayerRef::new(store, handle.0))
    }

    /// The layer this one is painted relative to, if it was found.
    #[must_use]
    pub fn z_parent(self) -> Option<Self> {
        self.at(self.store.relative_parent[self.idx as usize])
    }

    /// Whether the layer asked to be painted relative to a layer that is
    /// not in the frame.
    #[must_use]
    pub fn is_missing_z_parent(self) -> bool {
        self.store.missing_z_parent[self.idx as usize]
    }

    /// Whether an ancestor is hidden by policy.
    #[must_use]
    pub fn is_hidden_by_parent(self) -> bool {
        self.store.hidden_by_parent[self.idx as usize]
    }

    /// Whether the layer is visible on screen.
    #[must_use]
    pub fn is_visible(self) -> bool {
        self.store.visible[self.idx as usize]
    }

    /// Whether the layer is opaque.
    #[must_use]
    pub fn is_opaque(self) -> bool {
        self.record().is_opaque()
    }

    /// Opaque layers in front that fully hide this one.
    pub fn occluded_by(self) -> impl Iterator<Item = LayerRef<'a>> + 'a {
        self.relation(&self.store.occluded_by[self.idx as usize])
    }

    /// Opaque layers in front that hide part of this one.
    pub fn partially_occluded_by(self) -> impl Iterator<Item = LayerRef<'a>> + 'a {
        self.relation(&self.store.partially_occluded_by[self.idx as usize])
    }

    /// Translucent layers in front that overlap this one.
    pub fn covered_by(self) -> impl Iterator<Item = LayerRef<'a>> + 'a {
        self.relation(&self.store.covered_by[self.idx as usize])
    }

    /// Every reason the layer is invisible, empty when it is visible.
    #[must_use]
    pub fn invisibility_reasons(self) -> Vec<InvisibleReason> {
        self.store.invisibility_reasons_at(self.idx)
    }
}

impl PartialEq for LayerRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.store, other.store) && self.idx == other.idx
    }
}

impl Eq for LayerRef<'_> {}

impl fmt::Debug for LayerRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        f.debug_struct("LayerRef")
            .field("id", &record.id)
            .field("name", &record.name)
            .field("visible", &self.is_visible())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use crate::layer::LayerRecord;

    use super::*;

    #[test]
    fn view_navigates_hierarchy() {
        let mut store = LayerStore::new();
        let root = store.push(LayerRecord::new(1, "Display Root"));
        let task = store.push(LayerRecord::new(2, "Task"));
        let win = store.push(
            LayerRecord::new(3, "Window")
                .with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0))
                .with_buffer(10, 10),
        );
        store.add_child(root, task);
        store.add_child(task, win);
        store.resolve_hierarchy();
        store.compute_occlusion(&[]);

        let win = store.get(win);
        assert_eq!(win.name(), "Window");
        assert_eq!(win.stable_id(), "3 Window");
        assert_eq!(win.parent().map(LayerRef::id), Some(2));
        assert!(!win.is_root());
        assert!(win.is_visible());
        assert!(win.invisibility_reasons().is_empty());

        let root = store.get(root);
        assert!(root.is_root());
        assert_eq!(root.children().map(LayerRef::id).collect::<Vec<_>>(), [2]);
        assert_eq!(
            root.invisibility_reasons(),
            [
                InvisibleReason::NoBufferOrEffects,
                InvisibleReason::EmptyBounds,
                InvisibleReason::EmptyVisibleRegion,
            ]
        );
    }

    #[test]
    fn occluded_reason_is_reported() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut store = LayerStore::new();
        let back = store.push(LayerRecord::new(1, "back").with_bounds(bounds).with_buffer(1, 1));
        store.push(
            LayerRecord::new(2, "front")
                .with_z(1)
                .with_bounds(bounds)
                .with_buffer(1, 1)
                .opaque(),
        );
        store.resolve_hierarchy();
        store.compute_occlusion(&[]);

        assert_eq!(
            store.get(back).invisibility_reasons(),
            [InvisibleReason::Occluded]
        );
    }
}
