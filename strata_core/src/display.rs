// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display descriptions.
//!
//! Every trace entry lists the displays known to the compositor. Layers are
//! associated with a display through a shared *layer stack* id; the display's
//! [`layer_stack_space`](Display::layer_stack_space) is the crop applied to
//! those layers when testing occlusion.

use alloc::string::String;
use core::fmt;

use kurbo::{Rect, Size};

use crate::transform::Transform;

/// Identifies a display within a trace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DisplayId(pub u64);

impl fmt::Debug for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayId({})", self.0)
    }
}

/// Identifies the group of layers composed onto one display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LayerStackId(pub u32);

impl LayerStackId {
    /// The layer stack reported for layers that are not on any display.
    pub const NONE: Self = Self(u32::MAX);
}

impl fmt::Debug for LayerStackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            f.write_str("LayerStackId(none)")
        } else {
            write!(f, "LayerStackId({})", self.0)
        }
    }
}

/// One display as reported in a trace entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Display {
    /// Display id.
    pub id: DisplayId,
    /// Human-readable name.
    pub name: String,
    /// Layer stack composed onto this display.
    pub layer_stack: LayerStackId,
    /// Physical size in pixels.
    pub size: Size,
    /// Area of layer-stack space shown on the display.
    pub layer_stack_space: Rect,
    /// Whether the display is powered on.
    pub is_on: bool,
    /// Whether the display is virtual (mirroring, recording, ...).
    pub is_virtual: bool,
    /// Display orientation transform.
    pub transform: Transform,
}

impl Display {
    /// Creates an on, physical display whose layer-stack space matches its
    /// size.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, layer_stack: u32, size: Size) -> Self {
        Self {
            id: DisplayId(id),
            name: name.into(),
            layer_stack: LayerStackId(layer_stack),
            size,
            layer_stack_space: size.to_rect(),
            is_on: true,
            is_virtual: false,
            transform: Transform::IDENTITY,
        }
    }

    /// Marks the display as powered off.
    #[must_use]
    pub fn off(mut self) -> Self {
        self.is_on = false;
        self
    }

    /// Marks the display as virtual.
    #[must_use]
    pub fn virtual_display(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Overrides the layer-stack space.
    #[must_use]
    pub fn with_layer_stack_space(mut self, space: Rect) -> Self {
        self.layer_stack_space = space;
        self
    }

    /// Sets the orientation transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Returns `true` if the display is rotated a quarter turn, so its
    /// logical width and height are swapped.
    #[must_use]
    pub fn is_rotated(&self) -> bool {
        self.transform
            .flags()
            .contains(crate::transform::TransformFlags::ROT_90)
    }
}
