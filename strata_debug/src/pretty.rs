// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::geometry::PixelSize;
use strata_core::kurbo::Rect;
use strata_core::trace::{
    AdvancedBlendEvent, ClipEvent, FrameBeginEvent, FrameEndEvent, FrameSummary, PassBeginEvent,
    PassEndEvent, SubpassEvent, TraceSink, ValidationEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

struct Size(PixelSize);

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.0.width, self.0.height)
    }
}

struct Coverage(Option<Rect>);

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(r) => write!(f, "({:.1},{:.1})-({:.1},{:.1})", r.x0, r.y0, r.x1, r.y1),
            None => f.write_str("none"),
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let caps = e.capabilities;
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} size={} double_buffered={} fetch={} msaa={} blit={} resolve={}",
            e.frame_index,
            Size(e.target_size),
            e.double_buffered,
            caps.supports_framebuffer_fetch,
            caps.supports_offscreen_msaa,
            caps.supports_texture_to_texture_blit,
            caps.supports_read_from_resolve,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} {}",
            e.frame_index,
            if e.ok { "ok" } else { "aborted" },
        );
    }

    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] frame={} depth={} pass={} load={:?} size={}{}",
            e.frame_index,
            e.pass_depth,
            e.pass_count,
            e.load_action,
            Size(e.size),
            if e.backdrop_restored {
                " backdrop"
            } else {
                ""
            },
        );
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:end] frame={} depth={} passes={}{}",
            e.frame_index,
            e.pass_depth,
            e.pass_count,
            if e.mipmaps { " mipmaps" } else { "" },
        );
    }

    fn on_subpass(&mut self, e: &SubpassEvent) {
        let _ = writeln!(
            self.writer,
            "[subpass] frame={} depth={} {:?} coverage={}",
            e.frame_index,
            e.pass_depth,
            e.disposition,
            Coverage(e.coverage),
        );
    }

    fn on_advanced_blend(&mut self, e: &AdvancedBlendEvent) {
        let _ = writeln!(
            self.writer,
            "[blend] frame={} depth={} {:?} via {:?}",
            e.frame_index, e.pass_depth, e.mode, e.strategy,
        );
    }

    fn on_validation(&mut self, e: &ValidationEvent) {
        let _ = writeln!(
            self.writer,
            "[validation] frame={} {}",
            e.frame_index, e.message,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} passes={} offscreen={} draws={} replays={} skipped={} flushes={}",
            s.frame_index,
            s.passes_opened,
            s.offscreen_targets,
            s.draws,
            s.clip_replays,
            s.elements_skipped,
            s.pass_flushes,
        );
    }

    fn on_clip(&mut self, e: &ClipEvent) {
        let _ = writeln!(
            self.writer,
            "[clip] frame={} depth={} {:?} clip_depth={} coverage={}",
            e.frame_index,
            e.pass_depth,
            e.transition,
            e.clip_depth,
            Coverage(e.coverage),
        );
    }
}
