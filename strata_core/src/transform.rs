// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classified 2-D affine transform.
//!
//! Compositor traces report each layer's transform as a 2×3 matrix. Occlusion
//! tests need to know what *kind* of transform it is (pure translation, a
//! 90° multiple rotation, a scale, or something skewed), so [`Transform`]
//! classifies its matrix once at construction into [`TransformFlags`].
//!
//! The matrix is stored as a [`kurbo::Affine`] with coefficients
//! `[a, b, c, d, e, f]`, mapping `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.

use bitflags::bitflags;
use kurbo::{Affine, Rect};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Tolerance used when classifying matrix coefficients.
const EPSILON: f64 = 0.001;

bitflags! {
    /// Classification bits for a [`Transform`].
    ///
    /// The low byte describes the transform category and the high byte its
    /// orientation, using the same bit positions compositor dumps report.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TransformFlags: u32 {
        /// Non-zero translation component.
        const TRANSLATE = 0x0001;
        /// Rotation by a multiple of 90°.
        const ROTATE = 0x0002;
        /// Scale other than ±1 on either axis, or a single-axis flip.
        const SCALE = 0x0004;
        /// The matrix could not be classified (skew or arbitrary rotation).
        const UNKNOWN = 0x0008;
        /// Horizontal flip.
        const FLIP_H = 0x0100;
        /// Vertical flip.
        const FLIP_V = 0x0200;
        /// Quarter-turn rotation.
        const ROT_90 = 0x0400;
        /// Skew or rotation that is not a multiple of 90°.
        const ROT_INVALID = 0x8000;
    }
}

/// An immutable 2-D affine transform with its classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: Affine,
    flags: TransformFlags,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        matrix: Affine::IDENTITY,
        flags: TransformFlags::empty(),
    };

    /// Creates a transform from a matrix, classifying it.
    #[must_use]
    pub fn new(matrix: Affine) -> Self {
        Self {
            matrix,
            flags: classify(matrix),
        }
    }

    /// Creates a transform from the six affine coefficients
    /// `[a, b, c, d, e, f]`.
    #[must_use]
    pub fn from_coeffs(coeffs: [f64; 6]) -> Self {
        Self::new(Affine::new(coeffs))
    }

    /// Creates a pure translation.
    #[must_use]
    pub fn from_translation(x: f64, y: f64) -> Self {
        Self::new(Affine::translate((x, y)))
    }

    /// Creates a non-uniform scale.
    #[must_use]
    pub fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(Affine::scale_non_uniform(sx, sy))
    }

    /// Creates a rotation about the origin (radians).
    #[must_use]
    pub fn from_rotation(radians: f64) -> Self {
        Self::new(Affine::rotate(radians))
    }

    /// Returns the underlying matrix.
    #[inline]
    #[must_use]
    pub const fn matrix(&self) -> Affine {
        self.matrix
    }

    /// Returns the classification bits.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> TransformFlags {
        self.flags
    }

    /// Whether the transform only rotates by multiples of 90° (possibly with
    /// flips, scale or translation), so axis-aligned rectangles stay
    /// axis-aligned.
    #[inline]
    #[must_use]
    pub const fn is_simple_rotation(&self) -> bool {
        !self.flags.contains(TransformFlags::ROT_INVALID)
    }

    /// Whether the transform is at most a translation plus a 90° multiple
    /// rotation, with no scale.
    #[inline]
    #[must_use]
    pub const fn is_simple_transform(&self) -> bool {
        !self
            .flags
            .intersects(TransformFlags::ROT_INVALID.union(TransformFlags::SCALE))
    }

    /// Whether the transform is the identity or a pure translation.
    #[inline]
    #[must_use]
    pub const fn is_translation_only(&self) -> bool {
        self.flags.difference(TransformFlags::TRANSLATE).is_empty()
    }

    /// Whether the transform scales (or flips a single axis).
    #[inline]
    #[must_use]
    pub const fn is_scaling(&self) -> bool {
        self.flags.contains(TransformFlags::SCALE)
    }

    /// Whether the transform rotates by a multiple of 90°.
    #[inline]
    #[must_use]
    pub const fn is_rotation(&self) -> bool {
        self.flags.contains(TransformFlags::ROTATE)
    }

    /// Maps `rect` through the transform and returns the bounding box of the
    /// result.
    #[must_use]
    pub fn apply_to_rect(&self, rect: Rect) -> Rect {
        self.matrix.transform_rect_bbox(rect)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.matrix.is_finite()
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine> for Transform {
    fn from(matrix: Affine) -> Self {
        Self::new(matrix)
    }
}

fn is_zero(v: f64) -> bool {
    v.abs() <= EPSILON
}

fn abs_is_one(v: f64) -> bool {
    is_zero(v.abs() - 1.0)
}

/// Classifies a matrix the way the compositor does.
fn classify(matrix: Affine) -> TransformFlags {
    let [a, b, c, d, e, f] = matrix.as_coeffs();
    // `c` is the x' contribution of y, `b` the y' contribution of x.
    let mut orientation = TransformFlags::empty();
    let mut scale = false;
    if is_zero(b) && is_zero(c) {
        if a < 0.0 {
            orientation |= TransformFlags::FLIP_H;
        }
        if d < 0.0 {
            orientation |= TransformFlags::FLIP_V;
        }
        scale = !abs_is_one(a) || !abs_is_one(d);
    } else if is_zero(a) && is_zero(d) {
        orientation |= TransformFlags::ROT_90;
        if c > 0.0 {
            orientation |= TransformFlags::FLIP_V;
        }
        if b < 0.0 {
            orientation |= TransformFlags::FLIP_H;
        }
        scale = !abs_is_one(b) || !abs_is_one(c);
    } else {
        orientation = TransformFlags::ROT_INVALID;
    }

    let mut flags = orientation;
    if orientation.contains(TransformFlags::ROT_INVALID) {
        flags |= TransformFlags::UNKNOWN;
    } else {
        let rot_180 = TransformFlags::FLIP_H | TransformFlags::FLIP_V;
        if orientation.contains(TransformFlags::ROT_90) || orientation.contains(rot_180) {
            flags |= TransformFlags::ROTATE;
        } else if orientation.intersects(rot_180) {
            flags |= TransformFlags::SCALE;
        }
    }
    if scale {
        flags |= TransformFlags::SCALE;
    }
    if !is_zero(e) || !is_zero(f) {
        flags |= TransformFlags::TRANSLATE;
    }
    flags
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::default(), Transform::IDENTITY);
        assert!(Transform::IDENTITY.flags().is_empty());
        assert!(Transform::IDENTITY.is_translation_only());
        assert!(Transform::IDENTITY.is_simple_transform());
    }

    #[test]
    fn translation_is_classified() {
        let t = Transform::from_translation(10.0, -4.0);
        assert_eq!(t.flags(), TransformFlags::TRANSLATE);
        assert!(t.is_translation_only());
        assert!(t.is_simple_rotation());
    }

    #[test]
    fn scale_is_classified() {
        let t = Transform::from_scale(2.0, 1.0);
        assert!(t.is_scaling());
        assert!(!t.is_simple_transform());
        assert!(t.is_simple_rotation(), "scale keeps rects axis-aligned");
    }

    #[test]
    fn quarter_turn_is_simple_rotation() {
        let t = Transform::from_rotation(FRAC_PI_2);
        assert!(t.is_rotation());
        assert!(t.flags().contains(TransformFlags::ROT_90));
        assert!(t.is_simple_rotation());
        assert!(t.is_simple_transform());
        assert!(!t.is_scaling());
    }

    #[test]
    fn half_turn_is_double_flip() {
        let t = Transform::from_rotation(PI);
        assert!(t.is_rotation());
        assert!(t.flags().contains(TransformFlags::FLIP_H | TransformFlags::FLIP_V));
        assert!(!t.flags().contains(TransformFlags::ROT_90));
    }

    #[test]
    fn single_flip_counts_as_scale() {
        let t = Transform::from_scale(-1.0, 1.0);
        assert!(t.flags().contains(TransformFlags::FLIP_H));
        assert!(t.is_scaling());
        assert!(!t.is_rotation());
    }

    #[test]
    fn skew_is_invalid_rotation() {
        let t = Transform::from_rotation(FRAC_PI_4);
        assert!(!t.is_simple_rotation());
        assert!(t.flags().contains(TransformFlags::UNKNOWN));
    }

    #[test]
    fn apply_to_rect_maps_bounding_box() {
        let t = Transform::from_translation(5.0, 5.0);
        let r = t.apply_to_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(r, Rect::new(5.0, 5.0, 15.0, 25.0));

        let s = Transform::from_scale(2.0, 0.5).apply_to_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(s, Rect::new(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn nan_is_not_finite() {
        let t = Transform::from_coeffs([f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(!t.is_finite());
    }
}
