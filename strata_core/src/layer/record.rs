// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoded per-frame layer properties.

use alloc::format;
use alloc::string::String;

use bitflags::bitflags;
use kurbo::Rect;

use crate::display::LayerStackId;
use crate::region::{Region, rect_is_empty};
use crate::transform::Transform;

bitflags! {
    /// Layer state flags as reported by the compositor.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayerFlags: u32 {
        /// Hidden by the window policy. Hides the whole subtree.
        const HIDDEN = 0x01;
        /// Declared opaque by its owner.
        const OPAQUE = 0x02;
        /// Excluded from screenshots.
        const SKIP_SCREENSHOT = 0x40;
        /// Contains secure content.
        const SECURE = 0x80;
        /// Applies back-pressure to its producer.
        const ENABLE_BACKPRESSURE = 0x100;
        /// Display decoration (rounded display corners, cutouts).
        const DISPLAY_DECORATION = 0x200;
        /// Ignores the destination frame when positioning its buffer.
        const IGNORE_DESTINATION_FRAME = 0x400;
    }
}

/// An RGBA color with channels in `0.0..=1.0`.
///
/// Layers that do not fill with a color report negative channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// The color reported by layers with no fill and full alpha.
    pub const NO_FILL: Self = Self::new(-1.0, -1.0, -1.0, 1.0);

    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `true` if the color paints nothing: zero alpha or any
    /// negative channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.a == 0.0 || self.r < 0.0 || self.g < 0.0 || self.b < 0.0
    }

    /// Returns `true` if alpha is exactly one.
    #[must_use]
    pub fn is_opaque_alpha(&self) -> bool {
        self.a == 1.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::NO_FILL
    }
}

/// Dimensions of a layer's active buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BufferSize {
    /// Returns `true` if the buffer has no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One surface of one frame, as decoded from a compositor trace.
///
/// Records are plain data. Hierarchy is expressed by `parent_id` and resolved
/// when the frame is assembled into a [`LayerStore`](super::LayerStore).
#[derive(Clone, Debug, PartialEq)]
pub struct LayerRecord {
    /// Layer id, unique within a frame.
    pub id: i32,
    /// Layer name.
    pub name: String,
    /// Parent layer id, `None` for roots.
    pub parent_id: Option<i32>,
    /// Z order among siblings. Higher is closer to the viewer.
    pub z: i32,
    /// Layer whose children this layer is painted among, if any.
    pub z_order_relative_of: Option<i32>,
    /// Layer stack (display group) the layer is composed onto.
    pub layer_stack: LayerStackId,
    /// Compositor flags.
    pub flags: LayerFlags,
    /// Bounds in layer space.
    pub bounds: Rect,
    /// Crop in layer space.
    pub crop: Option<Rect>,
    /// Bounds in screen space.
    pub screen_bounds: Rect,
    /// Visible region, when the composition engine reported one.
    pub visible_region: Option<Region>,
    /// Fill color and alpha.
    pub color: Color,
    /// Corner radius in pixels.
    pub corner_radius: f32,
    /// Background blur radius in pixels.
    pub background_blur_radius: i32,
    /// Shadow radius in pixels.
    pub shadow_radius: f32,
    /// Active buffer, if one is latched.
    pub active_buffer: Option<BufferSize>,
    /// Layer-to-screen transform.
    pub transform: Transform,
    /// Whether the layer's content is opaque.
    pub is_opaque: bool,
    /// Visible-region data was not captured for this frame.
    pub excludes_composition_state: bool,
}

impl LayerRecord {
    /// Creates a root record with empty bounds and no content.
    #[must_use]
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            z: 0,
            z_order_relative_of: None,
            layer_stack: LayerStackId(0),
            flags: LayerFlags::empty(),
            bounds: Rect::ZERO,
            crop: None,
            screen_bounds: Rect::ZERO,
            visible_region: None,
            color: Color::NO_FILL,
            corner_radius: 0.0,
            background_blur_radius: 0,
            shadow_radius: 0.0,
            active_buffer: None,
            transform: Transform::IDENTITY,
            is_opaque: false,
            excludes_composition_state: false,
        }
    }

    /// Sets the parent id.
    #[must_use]
    pub fn with_parent(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets the z order.
    #[must_use]
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Paints this layer among the children of `target`.
    #[must_use]
    pub fn with_relative_z(mut self, target: i32, z: i32) -> Self {
        self.z_order_relative_of = Some(target);
        self.z = z;
        self
    }

    /// Sets the layer stack.
    #[must_use]
    pub fn with_layer_stack(mut self, layer_stack: u32) -> Self {
        self.layer_stack = LayerStackId(layer_stack);
        self
    }

    /// Sets the layer-space bounds and derives screen bounds through the
    /// current transform.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self.screen_bounds = self.transform.apply_to_rect(bounds);
        self
    }

    /// Overrides the screen-space bounds.
    #[must_use]
    pub fn with_screen_bounds(mut self, screen_bounds: Rect) -> Self {
        self.screen_bounds = screen_bounds;
        self
    }

    /// Sets the crop.
    #[must_use]
    pub fn with_crop(mut self, crop: Rect) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Sets the transform and re-derives screen bounds.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self.screen_bounds = transform.apply_to_rect(self.bounds);
        self
    }

    /// Sets the reported visible region.
    #[must_use]
    pub fn with_visible_region(mut self, region: Region) -> Self {
        self.visible_region = Some(region);
        self
    }

    /// Sets the fill color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Latches an active buffer of the given size.
    #[must_use]
    pub fn with_buffer(mut self, width: u32, height: u32) -> Self {
        self.active_buffer = Some(BufferSize { width, height });
        self
    }

    /// Sets the corner radius.
    #[must_use]
    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Sets the background blur radius.
    #[must_use]
    pub fn with_blur(mut self, radius: i32) -> Self {
        self.background_blur_radius = radius;
        self
    }

    /// Sets the shadow radius.
    #[must_use]
    pub fn with_shadow(mut self, radius: f32) -> Self {
        self.shadow_radius = radius;
        self
    }

    /// Adds compositor flags.
    #[must_use]
    pub fn with_flags(mut self, flags: LayerFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Marks the layer opaque.
    #[must_use]
    pub fn opaque(mut self) -> Self {
        self.is_opaque = true;
        self.flags |= LayerFlags::OPAQUE;
        self
    }

    /// Marks the layer hidden by policy.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.flags |= LayerFlags::HIDDEN;
        self
    }

    /// Flags that visible-region data was not captured for this frame.
    #[must_use]
    pub fn excluding_composition_state(mut self) -> Self {
        self.excludes_composition_state = true;
        self
    }

    /// Returns `"{id} {name}"`, unique within a frame.
    #[must_use]
    pub fn stable_id(&self) -> String {
        format!("{} {}", self.id, self.name)
    }

    /// Whether the layer itself is flagged hidden.
    #[inline]
    #[must_use]
    pub fn is_hidden_by_policy(&self) -> bool {
        self.flags.contains(LayerFlags::HIDDEN)
    }

    /// Whether the layer paints a solid color.
    #[must_use]
    pub fn fills_color(&self) -> bool {
        !self.color.is_empty()
    }

    /// Whether the layer draws a shadow.
    #[must_use]
    pub fn draws_shadows(&self) -> bool {
        self.shadow_radius > 0.0
    }

    /// Whether the layer blurs what is behind it.
    #[must_use]
    pub fn has_blur(&self) -> bool {
        self.background_blur_radius > 0
    }

    /// Whether the layer draws anything besides its buffer.
    #[must_use]
    pub fn has_effects(&self) -> bool {
        self.fills_color() || self.draws_shadows() || self.has_blur()
    }

    /// Whether the layer has rounded corners.
    #[must_use]
    pub fn has_rounded_corners(&self) -> bool {
        self.corner_radius > 0.0
    }

    /// Whether the layer has no active buffer, or an empty one.
    #[must_use]
    pub fn is_active_buffer_empty(&self) -> bool {
        self.active_buffer.is_none_or(|b| b.is_empty())
    }

    /// Whether the layer is opaque: declared opaque with alpha exactly one.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.is_opaque && self.color.is_opaque_alpha()
    }

    /// Whether the crop is present and empty.
    #[must_use]
    pub fn has_empty_crop(&self) -> bool {
        self.crop.is_some_and(rect_is_empty)
    }

    /// The region used to decide visibility.
    ///
    /// Uses the reported visible region. Falls back to the screen bounds when
    /// composition state was excluded for this frame or no region was
    /// reported.
    #[must_use]
    pub fn effective_visible_region(&self) -> Region {
        match &self.visible_region {
            Some(region) if !self.excludes_composition_state => region.clone(),
            _ => Region::from_rect(self.screen_bounds),
        }
    }

    /// Whether [`effective_visible_region`](Self::effective_visible_region)
    /// is empty, without building it.
    #[must_use]
    pub fn has_empty_visible_region(&self) -> bool {
        match &self.visible_region {
            Some(region) if !self.excludes_composition_state => region.is_empty(),
            _ => rect_is_empty(self.screen_bounds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_emptiness() {
        assert!(Color::TRANSPARENT.is_empty());
        assert!(Color::NO_FILL.is_empty(), "negative channels paint nothing");
        assert!(!Color::new(1.0, 0.0, 0.0, 0.5).is_empty());
        assert!(Color::NO_FILL.is_opaque_alpha());
    }

    #[test]
    fn stable_id_joins_id_and_name() {
        assert_eq!(LayerRecord::new(42, "StatusBar").stable_id(), "42 StatusBar");
    }

    #[test]
    fn effects() {
        let plain = LayerRecord::new(1, "plain");
        assert!(!plain.has_effects());
        assert!(plain.is_active_buffer_empty());
        assert!(LayerRecord::new(2, "dim").with_color(Color::new(0.0, 0.0, 0.0, 0.3)).has_effects());
        assert!(LayerRecord::new(3, "shadow").with_shadow(4.0).has_effects());
        assert!(LayerRecord::new(4, "blur").with_blur(10).has_effects());
        assert!(LayerRecord::new(5, "buf").with_buffer(0, 10).is_active_buffer_empty());
        assert!(!LayerRecord::new(6, "buf").with_buffer(8, 10).is_active_buffer_empty());
    }

    #[test]
    fn opacity_requires_full_alpha() {
        let layer = LayerRecord::new(1, "win").opaque();
        assert!(layer.is_opaque());
        assert!(layer.flags.contains(LayerFlags::OPAQUE));
        let faded = layer.with_color(Color::new(-1.0, -1.0, -1.0, 0.5));
        assert!(!faded.is_opaque());
    }

    #[test]
    fn bounds_follow_transform() {
        let layer = LayerRecord::new(1, "moved")
            .with_transform(Transform::from_translation(10.0, 20.0))
            .with_bounds(Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(layer.screen_bounds, Rect::new(10.0, 20.0, 15.0, 25.0));
        assert_eq!(layer.bounds, Rect::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn visible_region_fallback() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let reported = LayerRecord::new(1, "l")
            .with_bounds(bounds)
            .with_visible_region(Region::EMPTY);
        assert!(reported.effective_visible_region().is_empty());

        let excluded = reported.clone().excluding_composition_state();
        assert_eq!(excluded.effective_visible_region().bounds(), bounds);

        let unreported = LayerRecord::new(2, "m").with_bounds(bounds);
        assert_eq!(unreported.effective_visible_region().bounds(), bounds);
    }

    #[test]
    fn empty_crop() {
        assert!(LayerRecord::new(1, "c").with_crop(Rect::ZERO).has_empty_crop());
        assert!(!LayerRecord::new(1, "c").has_empty_crop());
    }
}
