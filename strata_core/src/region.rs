// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers and multi-rectangle regions.
//!
//! Compositor dumps describe areas either as single [`Rect`]s (bounds, crop,
//! screen bounds) or as a [`Region`], a list of rectangles such as a layer's
//! visible region.

use alloc::vec::Vec;

use kurbo::Rect;

/// Returns `true` if `rect` has no area (or is inverted).
#[inline]
#[must_use]
pub fn rect_is_empty(rect: Rect) -> bool {
    !(rect.x1 > rect.x0 && rect.y1 > rect.y0)
}

/// Returns `true` if `inner` lies entirely within `outer`.
///
/// An empty `inner` is never contained: an empty layer cannot be occluded.
#[inline]
#[must_use]
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    !rect_is_empty(outer)
        && !rect_is_empty(inner)
        && outer.x0 <= inner.x0
        && outer.y0 <= inner.y0
        && outer.x1 >= inner.x1
        && outer.y1 >= inner.y1
}

/// Returns `true` if `a` and `b` share a non-empty area.
#[inline]
#[must_use]
pub fn rect_intersects(a: Rect, b: Rect) -> bool {
    !rect_is_empty(a.intersect(b))
}

/// Intersects `rect` with `crop` when a crop is given.
#[inline]
#[must_use]
pub fn crop_rect(rect: Rect, crop: Option<Rect>) -> Rect {
    match crop {
        Some(crop) => rect.intersect(crop),
        None => rect,
    }
}

/// An area made of zero or more axis-aligned rectangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// The empty region.
    pub const EMPTY: Self = Self { rects: Vec::new() };

    /// Creates a region from a list of rectangles.
    ///
    /// Empty rectangles are dropped.
    #[must_use]
    pub fn new(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            rects: rects.into_iter().filter(|r| !rect_is_empty(*r)).collect(),
        }
    }

    /// Creates a region covering a single rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new([rect])
    }

    /// Returns `true` if the region covers no area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Returns the rectangles making up the region.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Returns the smallest rectangle enclosing the whole region, or
    /// [`Rect::ZERO`] if it is empty.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let mut rects = self.rects.iter();
        let Some(first) = rects.next() else {
            return Rect::ZERO;
        };
        rects.fold(*first, |acc, r| acc.union(*r))
    }

    /// Adds the rectangles of `other` to this region.
    pub fn union(&mut self, other: &Self) {
        self.rects.extend_from_slice(&other.rects);
    }

    /// Returns `true` if any rectangle of the region overlaps `rect`.
    #[must_use]
    pub fn intersects(&self, rect: Rect) -> bool {
        self.rects.iter().any(|r| rect_intersects(*r, rect))
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}
