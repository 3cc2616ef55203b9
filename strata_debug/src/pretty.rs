// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable snapshot output.
//!
//! [`write_entry`] prints one line per display and one line per layer, in
//! paint order, indented under the layer each one is painted on top of.
//! [`summarize_entry`] produces the one-line form used in wait failure
//! reports.

use std::io::{self, Write};

use hashbrown::HashMap;

use strata_core::entry::TraceEntry;
use strata_core::layer::LayerRef;

/// Writes a paint-order tree of `entry` with visibility annotations.
///
/// ```text
/// entry 0s000ms010us vsync=77 displays=1 layers=4
///   display 0 "main" stack=0 100x200 on
///   #1 Display Root z=0 invisible (buffer is empty and has no effects, bounds are empty, visible region is empty)
///     #2 Tasks z=0 invisible (buffer is empty and has no effects, bounds are empty, visible region is empty)
///       #3 Wallpaper z=-1 opaque invisible (occluded) occluded_by=[#4]
///       #4 Launcher z=1 opaque visible
/// ```
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn write_entry(entry: &TraceEntry, writer: &mut impl Write) -> io::Result<()> {
    write!(writer, "entry {}", entry.timestamp())?;
    if let Some(vsync) = entry.vsync_id() {
        write!(writer, " vsync={vsync}")?;
    }
    writeln!(
        writer,
        " displays={} layers={}",
        entry.displays().len(),
        entry.layers().len()
    )?;

    for display in entry.displays() {
        writeln!(
            writer,
            "  display {} {:?} stack={} {}x{} {}{}",
            display.id.0,
            display.name,
            display.layer_stack.0,
            display.size.width,
            display.size.height,
            if display.is_on { "on" } else { "off" },
            if display.is_virtual { " virtual" } else { "" },
        )?;
    }

    // Paint order is depth first, so a paint parent is always seen before
    // the layers drawn on top of it.
    let mut depths: HashMap<i32, usize> = HashMap::new();
    for layer in entry.paint_order() {
        let depth = layer
            .z_parent()
            .or_else(|| layer.parent())
            .and_then(|parent| depths.get(&parent.id()))
            .map_or(0, |d| d + 1);
        depths.insert(layer.id(), depth);
        write_layer(writer, layer, depth)?;
    }
    Ok(())
}

fn write_layer(writer: &mut impl Write, layer: LayerRef<'_>, depth: usize) -> io::Result<()> {
    let record = layer.record();
    write!(
        writer,
        "{:indent$}#{} {} z={}",
        "",
        record.id,
        record.name,
        record.z,
        indent = 2 + depth * 2
    )?;
    if let Some(target) = record.z_order_relative_of {
        write!(writer, " rel=#{target}")?;
        if layer.is_missing_z_parent() {
            write!(writer, "(missing)")?;
        }
    }
    if layer.is_opaque() {
        write!(writer, " opaque")?;
    }

    if layer.is_visible() {
        write!(writer, " visible")?;
    } else {
        let reasons: Vec<String> = layer
            .invisibility_reasons()
            .iter()
            .map(ToString::to_string)
            .collect();
        write!(writer, " invisible ({})", reasons.join(", "))?;
    }

    write_relation(writer, "occluded_by", layer.occluded_by())?;
    write_relation(writer, "partially_occluded_by", layer.partially_occluded_by())?;
    write_relation(writer, "covered_by", layer.covered_by())?;
    writeln!(writer)
}

fn write_relation<'a>(
    writer: &mut impl Write,
    label: &str,
    layers: impl Iterator<Item = LayerRef<'a>>,
) -> io::Result<()> {
    let ids: Vec<String> = layers.map(|l| format!("#{}", l.id())).collect();
    if ids.is_empty() {
        return Ok(());
    }
    write!(writer, " {label}=[{}]", ids.join(", "))
}

/// One-line summary: the timestamp, the number of displays that are on, and
/// the visible layer names in paint order.
#[must_use]
pub fn summarize_entry(entry: &TraceEntry) -> String {
    let displays_on = entry.displays().iter().filter(|d| d.is_on).count();
    let visible: Vec<&str> = entry
        .paint_order()
        .filter(|layer| layer.is_visible())
        .map(LayerRef::name)
        .collect();
    format!(
        "{} displays_on={displays_on} visible=[{}]",
        entry.timestamp(),
        visible.join(", ")
    )
}
