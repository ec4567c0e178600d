// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each stamped with the time elapsed
//! since the recorder was created. [`decode`] reads them back as an iterator
//! of [`Record`].

use std::time::Instant;

use strata_core::BlendMode;
use strata_core::backend::Capabilities;
use strata_core::geometry::PixelSize;
use strata_core::kurbo::Rect;
use strata_core::resource::LoadAction;
use strata_core::trace::{
    AdvancedBlendEvent, BlendStrategy, ClipEvent, ClipTransition, FrameBeginEvent, FrameEndEvent,
    FrameSummary, PassBeginEvent, PassEndEvent, SubpassDisposition, SubpassEvent, TraceSink,
    ValidationEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_FRAME_END: u8 = 2;
const TAG_PASS_BEGIN: u8 = 3;
const TAG_PASS_END: u8 = 4;
const TAG_SUBPASS: u8 = 5;
const TAG_ADVANCED_BLEND: u8 = 6;
const TAG_VALIDATION: u8 = 7;
const TAG_FRAME_SUMMARY: u8 = 8;
const TAG_CLIP: u8 = 9;

const CAP_FRAMEBUFFER_FETCH: u8 = 1 << 0;
const CAP_OFFSCREEN_MSAA: u8 = 1 << 1;
const CAP_BLIT: u8 = 1 << 2;
const CAP_READ_FROM_RESOLVE: u8 = 1 << 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    start: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Timestamps count from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn begin(&mut self, tag: u8, frame_index: u64) {
        let elapsed = u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.write_u8(tag);
        self.write_u64(elapsed);
        self.write_u64(frame_index);
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_size(&mut self, size: PixelSize) {
        self.write_u32(size.width);
        self.write_u32(size.height);
    }

    fn write_option_rect(&mut self, rect: Option<Rect>) {
        let rect = match rect {
            Some(rect) => {
                self.write_u8(1);
                rect
            }
            None => {
                self.write_u8(0);
                Rect::ZERO
            }
        };
        self.write_f64(rect.x0);
        self.write_f64(rect.y0);
        self.write_f64(rect.x1);
        self.write_f64(rect.y1);
    }

    fn write_capabilities(&mut self, c: Capabilities) {
        let mut bits = 0;
        if c.supports_framebuffer_fetch {
            bits |= CAP_FRAMEBUFFER_FETCH;
        }
        if c.supports_offscreen_msaa {
            bits |= CAP_OFFSCREEN_MSAA;
        }
        if c.supports_texture_to_texture_blit {
            bits |= CAP_BLIT;
        }
        if c.supports_read_from_resolve {
            bits |= CAP_READ_FROM_RESOLVE;
        }
        self.write_u8(bits);
    }

    fn write_load_action(&mut self, action: LoadAction) {
        self.write_u8(match action {
            LoadAction::DontCare => 0,
            LoadAction::Load => 1,
            LoadAction::Clear => 2,
        });
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "validation messages are short static strings"
        )]
        self.write_u32(s.len().min(u32::MAX as usize) as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.begin(TAG_FRAME_BEGIN, e.frame_index);
        self.write_size(e.target_size);
        self.write_capabilities(e.capabilities);
        self.write_bool(e.double_buffered);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.begin(TAG_FRAME_END, e.frame_index);
        self.write_bool(e.ok);
    }

    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.begin(TAG_PASS_BEGIN, e.frame_index);
        self.write_u32(e.pass_depth);
        self.write_u32(e.pass_count);
        self.write_load_action(e.load_action);
        self.write_size(e.size);
        self.write_bool(e.backdrop_restored);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.begin(TAG_PASS_END, e.frame_index);
        self.write_u32(e.pass_depth);
        self.write_u32(e.pass_count);
        self.write_bool(e.mipmaps);
    }

    fn on_subpass(&mut self, e: &SubpassEvent) {
        self.begin(TAG_SUBPASS, e.frame_index);
        self.write_u32(e.pass_depth);
        self.write_u8(match e.disposition {
            SubpassDisposition::Collapsed => 0,
            SubpassDisposition::Offscreen => 1,
            SubpassDisposition::Elided => 2,
            SubpassDisposition::EmptyClip => 3,
            SubpassDisposition::EmptyCoverage => 4,
        });
        self.write_option_rect(e.coverage);
    }

    fn on_advanced_blend(&mut self, e: &AdvancedBlendEvent) {
        self.begin(TAG_ADVANCED_BLEND, e.frame_index);
        self.write_u32(e.pass_depth);
        self.write_u8(e.mode as u8);
        self.write_u8(match e.strategy {
            BlendStrategy::FramebufferFetch => 0,
            BlendStrategy::PassFlush => 1,
        });
    }

    fn on_validation(&mut self, e: &ValidationEvent) {
        self.begin(TAG_VALIDATION, e.frame_index);
        self.write_str(e.message);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.begin(TAG_FRAME_SUMMARY, s.frame_index);
        self.write_u32(s.passes_opened);
        self.write_u32(s.offscreen_targets);
        self.write_u32(s.draws);
        self.write_u32(s.clip_replays);
        self.write_u32(s.elements_skipped);
        self.write_u32(s.pass_flushes);
    }

    fn on_clip(&mut self, e: &ClipEvent) {
        self.begin(TAG_CLIP, e.frame_index);
        self.write_u32(e.pass_depth);
        self.write_u8(match e.transition {
            ClipTransition::Append => 0,
            ClipTransition::SkippedAppend => 1,
            ClipTransition::Restore => 2,
            ClipTransition::NoopRestore => 3,
        });
        self.write_u32(e.clip_depth);
        self.write_option_rect(e.coverage);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PassEndEvent`].
    PassEnd(PassEndEvent),
    /// A [`SubpassEvent`].
    Subpass(SubpassEvent),
    /// An [`AdvancedBlendEvent`].
    AdvancedBlend(AdvancedBlendEvent),
    /// A [`ValidationEvent`], with its message copied out.
    Validation {
        /// Frame counter.
        frame_index: u64,
        /// Description of the failure.
        message: String,
    },
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// A [`ClipEvent`].
    Clip(ClipEvent),
}

impl RecordedEvent {
    /// Returns the event's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FrameBegin(_) => "FrameBegin",
            Self::FrameEnd(_) => "FrameEnd",
            Self::PassBegin(_) => "PassBegin",
            Self::PassEnd(_) => "PassEnd",
            Self::Subpass(_) => "Subpass",
            Self::AdvancedBlend(_) => "AdvancedBlend",
            Self::Validation { .. } => "Validation",
            Self::FrameSummary(_) => "FrameSummary",
            Self::Clip(_) => "Clip",
        }
    }

    /// Returns the frame the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::FrameBegin(e) => e.frame_index,
            Self::FrameEnd(e) => e.frame_index,
            Self::PassBegin(e) => e.frame_index,
            Self::PassEnd(e) => e.frame_index,
            Self::Subpass(e) => e.frame_index,
            Self::AdvancedBlend(e) => e.frame_index,
            Self::Validation { frame_index, .. } => *frame_index,
            Self::FrameSummary(s) => s.frame_index,
            Self::Clip(e) => e.frame_index,
        }
    }
}

/// A decoded event and when it was recorded.
#[derive(Clone, Debug)]
pub struct Record {
    /// Nanoseconds since the recorder was created.
    pub elapsed_nanos: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
///
/// Iteration stops at the first truncated or unknown record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.take(1)?[0])
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_size(&mut self) -> Option<PixelSize> {
        Some(PixelSize::new(self.read_u32()?, self.read_u32()?))
    }

    fn read_option_rect(&mut self) -> Option<Option<Rect>> {
        let present = self.read_u8()?;
        let rect = Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        );
        Some((present != 0).then_some(rect))
    }

    fn read_capabilities(&mut self) -> Option<Capabilities> {
        let bits = self.read_u8()?;
        Some(Capabilities {
            supports_framebuffer_fetch: bits & CAP_FRAMEBUFFER_FETCH != 0,
            supports_offscreen_msaa: bits & CAP_OFFSCREEN_MSAA != 0,
            supports_texture_to_texture_blit: bits & CAP_BLIT != 0,
            supports_read_from_resolve: bits & CAP_READ_FROM_RESOLVE != 0,
        })
    }

    fn read_load_action(&mut self) -> Option<LoadAction> {
        Some(match self.read_u8()? {
            0 => LoadAction::DontCare,
            1 => LoadAction::Load,
            _ => LoadAction::Clear,
        })
    }

    fn read_disposition(&mut self) -> Option<SubpassDisposition> {
        Some(match self.read_u8()? {
            0 => SubpassDisposition::Collapsed,
            1 => SubpassDisposition::Offscreen,
            2 => SubpassDisposition::Elided,
            3 => SubpassDisposition::EmptyClip,
            _ => SubpassDisposition::EmptyCoverage,
        })
    }

    fn read_strategy(&mut self) -> Option<BlendStrategy> {
        Some(match self.read_u8()? {
            0 => BlendStrategy::FramebufferFetch,
            _ => BlendStrategy::PassFlush,
        })
    }

    fn read_transition(&mut self) -> Option<ClipTransition> {
        Some(match self.read_u8()? {
            0 => ClipTransition::Append,
            1 => ClipTransition::SkippedAppend,
            2 => ClipTransition::Restore,
            _ => ClipTransition::NoopRestore,
        })
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        Some(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    fn decode_frame_begin(&mut self, frame_index: u64) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index,
            target_size: self.read_size()?,
            capabilities: self.read_capabilities()?,
            double_buffered: self.read_bool()?,
        }))
    }

    fn decode_pass_begin(&mut self, frame_index: u64) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            frame_index,
            pass_depth: self.read_u32()?,
            pass_count: self.read_u32()?,
            load_action: self.read_load_action()?,
            size: self.read_size()?,
            backdrop_restored: self.read_bool()?,
        }))
    }

    fn decode_pass_end(&mut self, frame_index: u64) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassEnd(PassEndEvent {
            frame_index,
            pass_depth: self.read_u32()?,
            pass_count: self.read_u32()?,
            mipmaps: self.read_bool()?,
        }))
    }

    fn decode_subpass(&mut self, frame_index: u64) -> Option<RecordedEvent> {
        Some(RecordedEvent::Subpass(SubpassEvent {
            frame_index,
            pass_depth: self.read_u32()?,
            disposition: self.read_disposition()?,
            coverage: self.read_option_rect()?,
        }))
    }

    fn decode_advanced_blend(&mut self, frame_index: u64) -> Option<RecordedEvent> {
        Some(RecordedEvent::AdvancedBlend(AdvancedBlendEvent {
            frame_index,
            pass_depth: self.read_u32()?,
            mode: BlendMode::from_index(self.read_u8()?)?,
            strategy: self.read_strategy()?,
        }))
    }

    fn decode_frame_summary(&mut self, frame_index: u64) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index,
            passes_opened: self.read_u32()?,
            offscreen_targets: self.read_u32()?,
            draws: self.read_u32()?,
            clip_replays: self.read_u32()?,
            elements_skipped: self.read_u32()?,
            pass_flushes: self.read_u32()?,
        }))
    }

    fn decode_clip(&mut self, frame_index: u64) -> Option<RecordedEvent> {
        Some(RecordedEvent::Clip(ClipEvent {
            frame_index,
            pass_depth: self.read_u32()?,
            transition: self.read_transition()?,
            clip_depth: self.read_u32()?,
            coverage: self.read_option_rect()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let elapsed_nanos = self.read_u64()?;
        let frame_index = self.read_u64()?;
        let event = match tag {
            TAG_FRAME_BEGIN => self.decode_frame_begin(frame_index),
            TAG_FRAME_END => Some(RecordedEvent::FrameEnd(FrameEndEvent {
                frame_index,
                ok: self.read_bool()?,
            })),
            TAG_PASS_BEGIN => self.decode_pass_begin(frame_index),
            TAG_PASS_END => self.decode_pass_end(frame_index),
            TAG_SUBPASS => self.decode_subpass(frame_index),
            TAG_ADVANCED_BLEND => self.decode_advanced_blend(frame_index),
            TAG_VALIDATION => Some(RecordedEvent::Validation {
                frame_index,
                message: self.read_string()?,
            }),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(frame_index),
            TAG_CLIP => self.decode_clip(frame_index),
            _ => None,
        }?;
        Some(Record {
            elapsed_nanos,
            event,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn events(rec: &RecorderSink) -> Vec<RecordedEvent> {
        decode(rec.as_bytes()).map(|r| r.event).collect()
    }

    #[test]
    fn round_trip_frame_begin() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 7,
            target_size: PixelSize::new(800, 600),
            capabilities: Capabilities {
                supports_offscreen_msaa: true,
                supports_read_from_resolve: true,
                ..Capabilities::MINIMAL
            },
            double_buffered: true,
        });

        let events = events(&rec);
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::FrameBegin(e) => {
                assert_eq!(e.frame_index, 7);
                assert_eq!(e.target_size, PixelSize::new(800, 600));
                assert!(e.capabilities.supports_offscreen_msaa);
                assert!(e.capabilities.supports_read_from_resolve);
                assert!(!e.capabilities.supports_framebuffer_fetch);
                assert!(e.double_buffered);
            }
            other => panic!("expected FrameBegin, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_pass_events() {
        let mut rec = RecorderSink::new();
        rec.on_pass_begin(&PassBeginEvent {
            frame_index: 3,
            pass_depth: 1,
            pass_count: 2,
            load_action: LoadAction::DontCare,
            size: PixelSize::new(16, 8),
            backdrop_restored: true,
        });
        rec.on_pass_end(&PassEndEvent {
            frame_index: 3,
            pass_depth: 1,
            pass_count: 3,
            mipmaps: true,
        });

        let events = events(&rec);
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::PassBegin(e) => {
                assert_eq!(e.pass_depth, 1);
                assert_eq!(e.pass_count, 2);
                assert_eq!(e.load_action, LoadAction::DontCare);
                assert_eq!(e.size, PixelSize::new(16, 8));
                assert!(e.backdrop_restored);
            }
            other => panic!("expected PassBegin, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::PassEnd(e) => {
                assert_eq!(e.pass_count, 3);
                assert!(e.mipmaps);
            }
            other => panic!("expected PassEnd, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_subpass_coverage() {
        let mut rec = RecorderSink::new();
        let coverage = Rect::new(1.5, 2.0, 30.25, 40.0);
        rec.on_subpass(&SubpassEvent {
            frame_index: 1,
            pass_depth: 0,
            disposition: SubpassDisposition::Offscreen,
            coverage: Some(coverage),
        });
        rec.on_subpass(&SubpassEvent {
            frame_index: 1,
            pass_depth: 0,
            disposition: SubpassDisposition::Elided,
            coverage: None,
        });

        let events = events(&rec);
        match (&events[0], &events[1]) {
            (RecordedEvent::Subpass(a), RecordedEvent::Subpass(b)) => {
                assert_eq!(a.disposition, SubpassDisposition::Offscreen);
                assert_eq!(a.coverage, Some(coverage));
                assert_eq!(b.disposition, SubpassDisposition::Elided);
                assert_eq!(b.coverage, None);
            }
            other => panic!("expected two Subpass events, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_blend_and_validation() {
        let mut rec = RecorderSink::new();
        rec.on_advanced_blend(&AdvancedBlendEvent {
            frame_index: 2,
            pass_depth: 1,
            mode: BlendMode::ColorDodge,
            strategy: BlendStrategy::PassFlush,
        });
        rec.on_validation(&ValidationEvent {
            frame_index: 2,
            message: "failed to create render pass",
        });

        let events = events(&rec);
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::AdvancedBlend(e) => {
                assert_eq!(e.mode, BlendMode::ColorDodge);
                assert_eq!(e.strategy, BlendStrategy::PassFlush);
            }
            other => panic!("expected AdvancedBlend, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::Validation {
                frame_index,
                message,
            } => {
                assert_eq!(*frame_index, 2);
                assert_eq!(message, "failed to create render pass");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_summary_and_clip() {
        let mut rec = RecorderSink::new();
        let summary = FrameSummary {
            frame_index: 4,
            passes_opened: 3,
            offscreen_targets: 1,
            draws: 12,
            clip_replays: 2,
            elements_skipped: 5,
            pass_flushes: 1,
        };
        rec.on_frame_summary(&summary);
        rec.on_clip(&ClipEvent {
            frame_index: 4,
            pass_depth: 0,
            transition: ClipTransition::SkippedAppend,
            clip_depth: 2,
            coverage: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
        });

        let events = events(&rec);
        match &events[0] {
            RecordedEvent::FrameSummary(s) => assert_eq!(*s, summary),
            other => panic!("expected FrameSummary, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::Clip(e) => {
                assert_eq!(e.transition, ClipTransition::SkippedAppend);
                assert_eq!(e.clip_depth, 2);
            }
            other => panic!("expected Clip, got {other:?}"),
        }
    }

    #[test]
    fn timestamps_do_not_go_backwards() {
        let mut rec = RecorderSink::new();
        for frame_index in 0..4 {
            rec.on_frame_end(&FrameEndEvent {
                frame_index,
                ok: true,
            });
        }
        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 4);
        assert!(
            records
                .windows(2)
                .all(|w| w[0].elapsed_nanos <= w[1].elapsed_nanos),
            "timestamps are monotonic"
        );
        assert_eq!(records[3].event.frame_index(), 3);
    }

    #[test]
    fn truncated_records_stop_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_frame_end(&FrameEndEvent {
            frame_index: 1,
            ok: true,
        });
        rec.on_frame_end(&FrameEndEvent {
            frame_index: 2,
            ok: false,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }

    #[test]
    fn records_a_rendered_frame() {
        use std::sync::Arc;
        use strata_core::geometry::Shape;
        use strata_core::resource::RenderTarget;
        use strata_core::trace::Tracer;
        use strata_core::{Capabilities, Color};
        use strata_harness::RecordingDevice;
        use strata_render::contents::{ClipContents, SolidColorContents};
        use strata_render::{DrawItem, Group, OpacityDelegate, RenderConfig, Renderer};

        let mut root = Group::new();
        root.add_item(DrawItem::new(Arc::new(ClipContents::intersect(Shape::Rect(
            Rect::new(0.0, 0.0, 32.0, 32.0),
        )))));
        root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.5))))
            .add_item(DrawItem::new(Arc::new(SolidColorContents::new(
                Shape::Rect(Rect::new(4.0, 4.0, 12.0, 12.0)),
                Color::RED,
            ))));

        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = RenderTarget::new(PixelSize::new(64, 64), device.external_texture());
        let mut rec = RecorderSink::new();
        Renderer::new(&mut device, RenderConfig::DEFAULT)
            .with_tracer(Tracer::new(&mut rec))
            .render(&root, &target)
            .unwrap();

        let names: Vec<_> = decode(rec.as_bytes()).map(|r| r.event.name()).collect();
        assert_eq!(
            names,
            [
                "FrameBegin",
                "PassBegin",
                "Clip",
                "Subpass",
                "PassBegin",
                "PassEnd",
                "PassEnd",
                "FrameSummary",
                "FrameEnd",
            ]
        );
        let offscreen = decode(rec.as_bytes()).find_map(|r| match r.event {
            RecordedEvent::Subpass(e) => e.coverage,
            _ => None,
        });
        assert_eq!(offscreen, Some(Rect::new(4.0, 4.0, 12.0, 12.0)));
    }
}
