// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Occlusion pass.
//!
//! The pass walks the paint order front to back, keeping the visible opaque
//! and visible translucent layers seen so far. For each layer that passes the
//! baseline visibility checks:
//!
//! 1. **occluded by**: opaque layers in front that fully contain it. An
//!    occluder with rounded corners only counts when its radius equals the
//!    layer's, since otherwise the layer leaks through at the corners.
//! 2. **partially occluded by**: opaque layers in front that overlap it
//!    without counting as a full occluder.
//! 3. **covered by**: translucent layers in front that overlap it.
//!
//! A layer that ends up visible joins the opaque or translucent set, so later
//! (farther) layers are tested against it. Invisible layers never occlude.
//! Layers on different layer stacks never interact.
//!
//! Rectangles are screen bounds, cropped to the layer-stack space of the
//! display showing that stack.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::display::{Display, LayerStackId};
use crate::region::{crop_rect, rect_contains_rect, rect_intersects};

use super::record::LayerRecord;
use super::store::LayerStore;

impl LayerStore {
    /// Computes visibility and the occlusion relations of every layer.
    ///
    /// Previous results are discarded first, so running the pass again on
    /// the same store gives the same result.
    ///
    /// Requires [`resolve_hierarchy`](Self::resolve_hierarchy) to have run.
    pub fn compute_occlusion(&mut self, displays: &[Display]) {
        self.clear_occlusion();

        let mut opaque: Vec<u32> = Vec::new();
        let mut translucent: Vec<u32> = Vec::new();

        for pos in (0..self.traversal_order.len()).rev() {
            let idx = self.traversal_order[pos];
            if !self.is_baseline_visible(idx) {
                continue;
            }
            let layer = &self.records[idx as usize];
            let crop = stack_crop(displays, layer.layer_stack);

            let mut occluded_by = Vec::new();
            let mut partially_occluded_by = Vec::new();
            for &other_idx in &opaque {
                let other = &self.records[other_idx as usize];
                if other.layer_stack != layer.layer_stack {
                    continue;
                }
                if contains(other, layer, crop) && corners_match(other, layer) {
                    occluded_by.push(other_idx);
                } else if overlaps(other, layer, crop) {
                    partially_occluded_by.push(other_idx);
                }
            }
            let covered_by: Vec<u32> = translucent
                .iter()
                .copied()
                .filter(|&other_idx| {
                    let other = &self.records[other_idx as usize];
                    other.layer_stack == layer.layer_stack && overlaps(other, layer, crop)
                })
                .collect();

            let visible = occluded_by.is_empty();
            if visible {
                if layer.is_opaque() {
                    opaque.push(idx);
                } else {
                    translucent.push(idx);
                }
            }

            self.visible[idx as usize] = visible;
            self.occluded_by[idx as usize] = occluded_by;
            self.partially_occluded_by[idx as usize] = partially_occluded_by;
            self.covered_by[idx as usize] = covered_by;
        }

        log::trace!(
            "occlusion: {} of {} layers visible",
            self.visible.iter().filter(|&&v| v).count(),
            self.len()
        );
    }

    fn clear_occlusion(&mut self) {
        self.visible.fill(false);
        for set in self
            .occluded_by
            .iter_mut()
            .chain(self.partially_occluded_by.iter_mut())
            .chain(self.covered_by.iter_mut())
        {
            set.clear();
        }
    }
}

/// The crop for layers on `stack`, from the display showing it.
fn stack_crop(displays: &[Display], stack: LayerStackId) -> Option<Rect> {
    displays
        .iter()
        .find(|display| display.layer_stack == stack)
        .map(|display| display.layer_stack_space)
}

/// Whether `outer` fully contains `inner` on screen.
///
/// Only provable when both transforms keep rectangles axis-aligned.
fn contains(outer: &LayerRecord, inner: &LayerRecord, crop: Option<Rect>) -> bool {
    outer.transform.is_simple_rotation()
        && inner.transform.is_simple_rotation()
        && rect_contains_rect(
            crop_rect(outer.screen_bounds, crop),
            crop_rect(inner.screen_bounds, crop),
        )
}

fn overlaps(a: &LayerRecord, b: &LayerRecord, crop: Option<Rect>) -> bool {
    rect_intersects(crop_rect(a.screen_bounds, crop), crop_rect(b.screen_bounds, crop))
}

/// Rounded-corner rule for full occluders. Radii are compared exactly.
///
/// The rounded corners tested are the occluder's, not the occluded
/// layer's: a square occluder fully hides a rounded layer, while a rounded
/// occluder only hides a layer with the same radius. This is the upstream
/// compositor heuristic and is kept as is.
fn corners_match(occluder: &LayerRecord, layer: &LayerRecord) -> bool {
    !occluder.has_rounded_corners() || occluder.corner_radius == layer.corner_radius
}
