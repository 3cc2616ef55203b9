// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer visibility rules.

use alloc::vec::Vec;
use core::fmt;

use crate::region::rect_is_empty;

use super::store::LayerStore;

/// Why a layer is not visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvisibleReason {
    /// The layer is flagged hidden.
    HiddenByPolicy,
    /// An ancestor is flagged hidden.
    HiddenByParent,
    /// The layer's alpha is zero.
    ZeroAlpha,
    /// The layer has no buffer and draws no color, shadow or blur.
    NoBufferOrEffects,
    /// The layer's bounds are empty.
    EmptyBounds,
    /// The layer's crop is empty.
    EmptyCrop,
    /// The layer's visible region is empty.
    EmptyVisibleRegion,
    /// An opaque layer in front fully covers it.
    Occluded,
}

impl fmt::Display for InvisibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HiddenByPolicy => "hidden by policy",
            Self::HiddenByParent => "hidden by parent",
            Self::ZeroAlpha => "alpha is 0",
            Self::NoBufferOrEffects => "buffer is empty and has no effects",
            Self::EmptyBounds => "bounds are empty",
            Self::EmptyCrop => "crop is empty",
            Self::EmptyVisibleRegion => "visible region is empty",
            Self::Occluded => "occluded",
        })
    }
}

impl LayerStore {
    /// Checks that do not depend on other layers' occlusion.
    fn baseline_checks(&self, idx: u32) -> [(InvisibleReason, bool); 7] {
        let record = &self.records[idx as usize];
        [
            (InvisibleReason::HiddenByPolicy, record.is_hidden_by_policy()),
            (
                InvisibleReason::HiddenByParent,
                self.hidden_by_parent[idx as usize],
            ),
            (InvisibleReason::ZeroAlpha, record.color.a == 0.0),
            (
                InvisibleReason::NoBufferOrEffects,
                record.is_active_buffer_empty() && !record.has_effects(),
            ),
            (InvisibleReason::EmptyBounds, rect_is_empty(record.bounds)),
            (InvisibleReason::EmptyCrop, record.has_empty_crop()),
            (
                InvisibleReason::EmptyVisibleRegion,
                record.has_empty_visible_region(),
            ),
        ]
    }

    /// Whether the layer passes every check except occlusion.
    pub(crate) fn is_baseline_visible(&self, idx: u32) -> bool {
        self.baseline_checks(idx).iter().all(|&(_, failed)| !failed)
    }

    /// Every reason the layer at `idx` is invisible, empty when visible.
    pub(crate) fn invisibility_reasons_at(&self, idx: u32) -> Vec<InvisibleReason> {
        let mut reasons: Vec<InvisibleReason> = self
            .baseline_checks(idx)
            .iter()
            .filter(|&&(_, failed)| failed)
            .map(|&(reason, _)| reason)
            .collect();
        if !self.occluded_by[idx as usize].is_empty() {
            reasons.push(InvisibleReason::Occluded);
        }
        reasons
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use crate::layer::{Color, LayerRecord};
    use crate::region::Region;

    use super::*;

    const BOUNDS: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    fn reasons_for(record: LayerRecord) -> Vec<InvisibleReason> {
        let mut store = LayerStore::new();
        let h = store.push(record);
        store.resolve_hierarchy();
        store.invisibility_reasons_at(h.index())
    }

    fn buffered(id: i32) -> LayerRecord {
        LayerRecord::new(id, "buffered")
            .with_bounds(BOUNDS)
            .with_buffer(100, 100)
    }

    #[test]
    fn buffered_layer_is_visible() {
        assert!(reasons_for(buffered(1)).is_empty());
    }

    #[test]
    fn color_fill_counts_as_content() {
        let fill = LayerRecord::new(1, "fill")
            .with_bounds(BOUNDS)
            .with_color(Color::new(0.0, 0.0, 0.0, 0.5));
        assert!(reasons_for(fill).is_empty());
    }

    #[test]
    fn each_baseline_reason() {
        assert_eq!(
            reasons_for(buffered(1).hidden()),
            [InvisibleReason::HiddenByPolicy]
        );
        assert_eq!(
            reasons_for(buffered(1).with_color(Color::new(1.0, 1.0, 1.0, 0.0))),
            [InvisibleReason::ZeroAlpha]
        );
        assert_eq!(
            reasons_for(LayerRecord::new(1, "empty").with_bounds(BOUNDS)),
            [InvisibleReason::NoBufferOrEffects]
        );
        assert_eq!(
            reasons_for(buffered(1).with_crop(Rect::ZERO)),
            [InvisibleReason::EmptyCrop]
        );
        assert_eq!(
            reasons_for(buffered(1).with_visible_region(Region::EMPTY)),
            [InvisibleReason::EmptyVisibleRegion]
        );
    }

    #[test]
    fn empty_bounds_is_invisible_regardless_of_effects() {
        let layer = LayerRecord::new(1, "zero")
            .with_buffer(10, 10)
            .with_color(Color::new(1.0, 0.0, 0.0, 1.0));
        let reasons = reasons_for(layer);
        assert!(reasons.contains(&InvisibleReason::EmptyBounds), "{reasons:?}");
    }

    #[test]
    fn excluded_composition_state_falls_back_to_bounds() {
        let layer = buffered(1)
            .with_visible_region(Region::EMPTY)
            .excluding_composition_state();
        assert!(reasons_for(layer).is_empty());
    }

    #[test]
    fn reason_display() {
        assert_eq!(
            alloc::format!("{}", InvisibleReason::NoBufferOrEffects),
            "buffer is empty and has no effects"
        );
    }
}
