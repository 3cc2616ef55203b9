// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame layer model.
//!
//! A *layer* is one drawable surface in the compositor's scene for a single
//! frame. Each layer has:
//!
//! - **Decoded properties** from the trace, held in a [`LayerRecord`]:
//!   bounds, crop, color, buffer, transform, corner radius, flags.
//! - **Topology**: a real parent and ordered children, plus an optional
//!   *relative z parent* whose children it is painted among.
//! - **Computed properties** produced once per frame: inherited hidden state,
//!   paint order, visibility and occlusion relations.
//!
//! Layers are stored in struct-of-arrays layout in a [`LayerStore`] and
//! addressed by [`LayerHandle`] slot indices, so hierarchy links never own.

mod id;
mod occlusion;
mod record;
mod store;
mod traverse;
mod view;
mod visibility;

pub use id::{INVALID, LayerHandle};
pub use record::{BufferSize, Color, LayerFlags, LayerRecord};
pub use store::LayerStore;
pub use traverse::Children;
pub use view::LayerRef;
pub use visibility::InvisibleReason;
