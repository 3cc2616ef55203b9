// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export_transitions`] writes one complete (`"X"`) event per transition,
//! spanning its start to its finish, plus instant events for merges and
//! aborts. [`export_layers`] writes a counter track of visible layers per
//! snapshot. Both produce [Chrome Trace Event Format][format] JSON that loads
//! into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::entry::LayersTrace;
use strata_core::time::Timestamp;
use strata_core::transition::{Transition, TransitionsTrace};

/// Exports transitions as Chrome Trace Event Format JSON.
///
/// Each transition gets its own thread row (`tid` is the transition id).
/// Transitions that never finished are written as instant events, since
/// they have no end to draw.
///
/// # Errors
///
/// Returns any error from `writer` or from serialization.
pub fn export_transitions(trace: &TransitionsTrace, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for transition in trace {
        events.push(span_event(transition));

        let shell = transition.shell_data();
        if let Some(merge_time) = shell.merge_time {
            events.push(json!({
                "ph": "i",
                "name": "Merged",
                "cat": "Transition",
                "ts": to_us(merge_time),
                "pid": 0,
                "tid": transition.id(),
                "s": "t",
                "args": {
                    "into": shell.merge_target,
                }
            }));
        }
        let abort = transition.wm_data().abort_time.or(shell.abort_time);
        if let Some(abort_time) = abort {
            events.push(json!({
                "ph": "i",
                "name": "Aborted",
                "cat": "Transition",
                "ts": to_us(abort_time),
                "pid": 0,
                "tid": transition.id(),
                "s": "t",
                "args": {
                    "by_shell": transition.wm_data().abort_time.is_none(),
                }
            }));
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// The span runs from the earlier to the later of the transition's
/// timestamp and finish time. The timestamp prefers shell merge and abort
/// times over the window manager's finish, so it can come after the finish.
fn span_event(transition: &Transition) -> Value {
    let timestamp = transition.timestamp();
    let finish = transition.finish_time();
    let args = json!({
        "type": format!("{:?}", transition.transition_type()),
        "handler": transition.handler(),
        "played": transition.played(),
        "aborted": transition.aborted(),
        "merged": transition.merged(),
        "changes": transition.changes().len(),
    });
    let name = format!("#{} {:?}", transition.id(), transition.transition_type());
    if finish == Timestamp::MAX {
        return json!({
            "ph": "i",
            "name": format!("{name} (incomplete)"),
            "cat": "Transition",
            "ts": to_us(timestamp),
            "pid": 0,
            "tid": transition.id(),
            "s": "t",
            "args": args,
        });
    }
    let (start, end) = (timestamp.min(finish), timestamp.max(finish));
    json!({
        "ph": "X",
        "name": name,
        "cat": "Transition",
        "ts": to_us(start),
        "dur": to_us(end) - to_us(start),
        "pid": 0,
        "tid": transition.id(),
        "args": args,
    })
}

/// Exports a counter of visible layers per snapshot as Chrome Trace Event
/// Format JSON.
///
/// # Errors
///
/// Returns any error from `writer` or from serialization.
pub fn export_layers(trace: &LayersTrace, writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = trace
        .iter()
        .map(|entry| {
            json!({
                "ph": "C",
                "name": "Layers",
                "cat": "Composition",
                "ts": to_us(entry.timestamp()),
                "pid": 1,
                "tid": 0,
                "args": {
                    "visible": entry.visible_layers().count(),
                    "total": entry.layers().len(),
                }
            })
        })
        .collect();

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_us(timestamp: Timestamp) -> f64 {
    timestamp.elapsed_nanos() as f64 / 1000.0
}
