// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays storage for one frame's layers.

use alloc::vec::Vec;

use hashbrown::HashMap;

use super::id::{INVALID, LayerHandle};
use super::record::LayerRecord;
use super::traverse::Children;
use super::view::LayerRef;

/// Struct-of-arrays storage for the layers of a single frame.
///
/// Layers are addressed by [`LayerHandle`] slot indices. Decoded properties
/// live in [`LayerRecord`]s; hierarchy links and everything computed from
/// them live in parallel arrays indexed by slot, so no layer owns another.
///
/// A store is filled with [`push`](Self::push) and
/// [`add_child`](Self::add_child), then
/// [`resolve_hierarchy`](Self::resolve_hierarchy) derives relative z-order,
/// inherited hidden state and paint order, and
/// [`compute_occlusion`](Self::compute_occlusion) fills in visibility.
#[derive(Debug, Default)]
pub struct LayerStore {
    // -- Decoded properties --
    pub(crate) records: Vec<LayerRecord>,

    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) relative_parent: Vec<u32>,
    pub(crate) missing_z_parent: Vec<bool>,

    // -- Computed properties --
    pub(crate) hidden_by_parent: Vec<bool>,
    pub(crate) visible: Vec<bool>,
    pub(crate) occluded_by: Vec<Vec<u32>>,
    pub(crate) partially_occluded_by: Vec<Vec<u32>>,
    pub(crate) covered_by: Vec<Vec<u32>>,

    // -- Lookup --
    pub(crate) by_id: HashMap<i32, u32>,
    pub(crate) len: u32,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
}

impl LayerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Construction API --

    /// Adds a layer and returns its handle.
    ///
    /// The layer starts unlinked. Its `parent_id` is not interpreted here;
    /// link it with [`add_child`](Self::add_child).
    ///
    /// # Panics
    ///
    /// Panics if a layer with the same id is already stored.
    pub fn push(&mut self, record: LayerRecord) -> LayerHandle {
        assert!(
            !self.by_id.contains_key(&record.id),
            "duplicate layer id {}",
            record.id
        );
        let idx = self.len;
        self.len += 1;
        self.by_id.insert(record.id, idx);
        self.records.push(record);
        self.parent.push(INVALID);
        self.first_child.push(INVALID);
        self.next_sibling.push(INVALID);
        self.relative_parent.push(INVALID);
        self.missing_z_parent.push(false);
        self.hidden_by_parent.push(false);
        self.visible.push(false);
        self.occluded_by.push(Vec::new());
        self.partially_occluded_by.push(Vec::new());
        self.covered_by.push(Vec::new());
        LayerHandle(idx)
    }

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is out of range, if `child` already has a
    /// parent, or if `child == parent`.
    pub fn add_child(&mut self, parent: LayerHandle, child: LayerHandle) {
        self.validate(parent);
        self.validate(child);
        let p = parent.0;
        let c = child.0;
        assert!(p != c, "a layer cannot be its own parent");
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
        }
    }

    /// Derives relative z-order links, inherited hidden state and paint
    /// order from the current topology.
    ///
    /// Must be called after the last [`add_child`](Self::add_child) and
    /// before [`compute_occlusion`](Self::compute_occlusion).
    pub fn resolve_hierarchy(&mut self) {
        self.resolve_relative_z();
        self.compute_hidden_by_parent();
        self.rebuild_traversal_order();
    }

    // -- Query API --

    /// Returns the number of layers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no layers.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a view of the layer behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range.
    #[must_use]
    pub fn get(&self, handle: LayerHandle) -> LayerRef<'_> {
        self.validate(handle);
        LayerRef::new(self, handle.0)
    }

    /// Returns the handle of the layer with the given id.
    #[must_use]
    pub fn handle_of(&self, id: i32) -> Option<LayerHandle> {
        self.by_id.get(&id).map(|&idx| LayerHandle(idx))
    }

    /// Returns a view of the layer with the given id.
    #[must_use]
    pub fn by_id(&self, id: i32) -> Option<LayerRef<'_>> {
        self.by_id.get(&id).map(|&idx| LayerRef::new(self, idx))
    }

    /// Iterates all layers in storage order.
    pub fn iter(&self) -> impl Iterator<Item = LayerRef<'_>> + '_ {
        (0..self.len).map(move |idx| LayerRef::new(self, idx))
    }

    /// Returns the parent of a layer, or `None` for roots.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range.
    #[must_use]
    pub fn parent(&self, handle: LayerHandle) -> Option<LayerHandle> {
        self.validate(handle);
        let p = self.parent[handle.0 as usize];
        (p != INVALID).then_some(LayerHandle(p))
    }

    /// Iterates the direct children of a layer in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range.
    pub fn children(&self, handle: LayerHandle) -> Children<'_> {
        self.validate(handle);
        Children::new(self, self.first_child[handle.0 as usize])
    }

    /// Returns all layers without a parent, in storage order.
    #[must_use]
    pub fn roots(&self) -> Vec<LayerHandle> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID)
            .map(LayerHandle)
            .collect()
    }

    /// Returns the record of the layer behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range.
    #[must_use]
    pub fn record(&self, handle: LayerHandle) -> &LayerRecord {
        self.validate(handle);
        &self.records[handle.0 as usize]
    }

    // -- Internal --

    fn validate(&self, handle: LayerHandle) {
        assert!(handle.0 < self.len, "layer handle out of range");
    }

    /// Links layers to the layer they are painted relative to.
    ///
    /// A relative parent that is absent, or that would make paint order
    /// cyclic, is dropped and the layer is flagged as missing its z parent.
    fn resolve_relative_z(&mut self) {
        for idx in 0..self.len {
            self.relative_parent[idx as usize] = INVALID;
            self.missing_z_parent[idx as usize] = false;
        }
        for idx in 0..self.len {
            let Some(target_id) = self.records[idx as usize].z_order_relative_of else {
                continue;
            };
            match self.by_id.get(&target_id).copied() {
                Some(target) if !self.paints_under(target, idx) => {
                    self.relative_parent[idx as usize] = target;
                }
                Some(_) => {
                    log::warn!(
                        "layer {} relative to {target_id} would make paint order cyclic",
                        self.records[idx as usize].id
                    );
                    self.missing_z_parent[idx as usize] = true;
                }
                None => {
                    self.missing_z_parent[idx as usize] = true;
                }
            }
        }
    }

    /// Whether `ancestor` is reached by following paint parents from `idx`
    /// (including `idx` itself).
    fn paints_under(&self, idx: u32, ancestor: u32) -> bool {
        let mut current = idx;
        for _ in 0..=self.len {
            if current == ancestor {
                return true;
            }
            current = self.paint_parent(current);
            if current == INVALID {
                return false;
            }
        }
        true
    }

    /// The layer whose children `idx` is painted among.
    pub(crate) fn paint_parent(&self, idx: u32) -> u32 {
        let relative = self.relative_parent[idx as usize];
        if relative != INVALID {
            relative
        } else {
            self.parent[idx as usize]
        }
    }

    /// Propagates policy-hidden state down the real parent chain.
    fn compute_hidden_by_parent(&mut self) {
        let mut stack: Vec<u32> = (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID)
            .collect();
        for &root in &stack {
            self.hidden_by_parent[root as usize] = false;
        }
        while let Some(idx) = stack.pop() {
            let hides = self.hidden_by_parent[idx as usize]
                || self.records[idx as usize].is_hidden_by_policy();
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                self.hidden_by_parent[child as usize] = hides;
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
    }
}
