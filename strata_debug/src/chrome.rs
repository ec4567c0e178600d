// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Frames are duration events on thread 0. Each pass depth gets its own
//! thread, so nested subpasses stack up below the root pass.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::kurbo::Rect;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = nanos_to_us(record.elapsed_nanos);
        match record.event {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "width": e.target_size.width,
                        "height": e.target_size.height,
                        "double_buffered": e.double_buffered,
                        "framebuffer_fetch": e.capabilities.supports_framebuffer_fetch,
                        "offscreen_msaa": e.capabilities.supports_offscreen_msaa,
                    }
                }));
            }
            RecordedEvent::FrameEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "ok": e.ok,
                    }
                }));
            }
            RecordedEvent::PassBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Pass",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": 0,
                    "tid": pass_tid(e.pass_depth),
                    "args": {
                        "frame_index": e.frame_index,
                        "pass_count": e.pass_count,
                        "load_action": format!("{:?}", e.load_action),
                        "width": e.size.width,
                        "height": e.size.height,
                        "backdrop_restored": e.backdrop_restored,
                    }
                }));
            }
            RecordedEvent::PassEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Pass",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": 0,
                    "tid": pass_tid(e.pass_depth),
                    "args": {
                        "frame_index": e.frame_index,
                        "pass_count": e.pass_count,
                        "mipmaps": e.mipmaps,
                    }
                }));
            }
            RecordedEvent::Subpass(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.disposition),
                    "cat": "Subpass",
                    "ts": ts,
                    "pid": 0,
                    "tid": pass_tid(e.pass_depth),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "coverage": coverage(e.coverage),
                    }
                }));
            }
            RecordedEvent::AdvancedBlend(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "AdvancedBlend",
                    "cat": "Blend",
                    "ts": ts,
                    "pid": 0,
                    "tid": pass_tid(e.pass_depth),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "mode": format!("{:?}", e.mode),
                        "strategy": format!("{:?}", e.strategy),
                    }
                }));
            }
            RecordedEvent::Validation {
                frame_index,
                message,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "Validation",
                    "cat": "Validation",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": frame_index,
                        "message": message,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": "FrameWork",
                    "cat": "Summary",
                    "ts": ts,
                    "pid": 0,
                    "args": {
                        "passes": s.passes_opened,
                        "offscreen": s.offscreen_targets,
                        "draws": s.draws,
                        "clip_replays": s.clip_replays,
                        "skipped": s.elements_skipped,
                        "flushes": s.pass_flushes,
                    }
                }));
            }
            RecordedEvent::Clip(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.transition),
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": pass_tid(e.pass_depth),
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "clip_depth": e.clip_depth,
                        "coverage": coverage(e.coverage),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

fn pass_tid(pass_depth: u32) -> u64 {
    u64::from(pass_depth) + 1
}

fn coverage(rect: Option<Rect>) -> Option<[f64; 4]> {
    rect.map(|r| [r.x0, r.y0, r.x1, r.y1])
}
