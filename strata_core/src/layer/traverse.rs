// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal and paint order.
//!
//! Paint order is a depth-first pre-order walk: parents before children, and
//! siblings sorted by ascending `z` (ties keep insertion order). A layer with
//! a resolved relative z parent is painted among that layer's children
//! instead of its own parent's. The first layer in the order is the farthest
//! from the viewer.

use alloc::vec;
use alloc::vec::Vec;

use super::id::{INVALID, LayerHandle};
use super::store::LayerStore;

/// An iterator over the direct children of a layer.
///
/// Created by [`LayerStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a LayerStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a LayerStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = LayerHandle;

    fn next(&mut self) -> Option<LayerHandle> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(LayerHandle(idx))
    }
}

impl LayerStore {
    /// Returns the paint order (back to front) as raw slot indices.
    ///
    /// Empty until [`resolve_hierarchy`](Self::resolve_hierarchy) runs.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Rebuilds the back-to-front paint order.
    pub(crate) fn rebuild_traversal_order(&mut self) {
        let mut relative_children = vec![Vec::new(); self.len as usize];
        for idx in 0..self.len {
            let target = self.relative_parent[idx as usize];
            if target != INVALID {
                relative_children[target as usize].push(idx);
            }
        }

        let mut roots: Vec<u32> = (0..self.len)
            .filter(|&idx| self.paint_parent(idx) == INVALID)
            .collect();
        roots.sort_by_key(|&idx| self.records[idx as usize].z);

        let mut order = Vec::with_capacity(self.len as usize);
        for root in roots {
            self.dfs_collect(root, &relative_children, &mut order);
        }
        self.traversal_order = order;
    }

    /// Depth-first pre-order collection starting from `idx`.
    fn dfs_collect(&self, idx: u32, relative_children: &[Vec<u32>], order: &mut Vec<u32>) {
        order.push(idx);
        let mut painted: Vec<u32> = Children::new(self, self.first_child[idx as usize])
            .map(LayerHandle::index)
            .filter(|&child| self.relative_parent[child as usize] == INVALID)
            .collect();
        painted.extend_from_slice(&relative_children[idx as usize]);
        painted.sort_by_key(|&child| self.records[child as usize].z);
        for child in painted {
            self.dfs_collect(child, relative_children, order);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::layer::LayerRecord;

    use super::*;

    fn names(store: &LayerStore) -> Vec<&str> {
        store
            .traversal_order()
            .iter()
            .map(|&idx| store.records[idx as usize].name.as_str())
            .collect()
    }

    #[test]
    fn siblings_sorted_by_z_parents_first() {
        let mut store = LayerStore::new();
        let root = store.push(LayerRecord::new(1, "root"));
        let top = store.push(LayerRecord::new(2, "top").with_z(5));
        let bottom = store.push(LayerRecord::new(3, "bottom").with_z(-1));
        let nested = store.push(LayerRecord::new(4, "nested"));
        store.add_child(root, top);
        store.add_child(root, bottom);
        store.add_child(bottom, nested);
        store.resolve_hierarchy();

        assert_eq!(names(&store), ["root", "bottom", "nested", "top"]);
    }

    #[test]
    fn roots_sorted_by_z_stably() {
        let mut store = LayerStore::new();
        store.push(LayerRecord::new(1, "b").with_z(1));
        store.push(LayerRecord::new(2, "a").with_z(0));
        store.push(LayerRecord::new(3, "c").with_z(1));
        store.resolve_hierarchy();

        assert_eq!(names(&store), ["a", "b", "c"]);
    }

    #[test]
    fn relative_layer_painted_among_target_children() {
        let mut store = LayerStore::new();
        let app = store.push(LayerRecord::new(1, "app").with_z(0));
        let app_child = store.push(LayerRecord::new(2, "app_child").with_z(1));
        store.push(LayerRecord::new(3, "ime").with_z(10));
        store.push(LayerRecord::new(4, "dim").with_relative_z(1, 0));
        store.add_child(app, app_child);
        store.resolve_hierarchy();

        assert_eq!(names(&store), ["app", "dim", "app_child", "ime"]);
    }

    #[test]
    fn missing_relative_parent_paints_under_real_parent() {
        let mut store = LayerStore::new();
        let root = store.push(LayerRecord::new(1, "root"));
        let lost = store.push(LayerRecord::new(2, "lost").with_relative_z(42, 2));
        let sibling = store.push(LayerRecord::new(3, "sibling").with_z(1));
        store.add_child(root, lost);
        store.add_child(root, sibling);
        store.resolve_hierarchy();

        assert_eq!(names(&store), ["root", "sibling", "lost"]);
    }
}
