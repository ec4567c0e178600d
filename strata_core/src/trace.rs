// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for frame rendering.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! renderer calls as it opens passes, allocates subpasses, and resolves
//! advanced blends. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] is a convenience helper that counts work during a
//! frame and produces a [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ClipEvent`] and the
//!   corresponding `TraceSink` method.

use kurbo::Rect;

use crate::backend::Capabilities;
use crate::blend::BlendMode;
use crate::geometry::PixelSize;
use crate::resource::LoadAction;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What the renderer decided to do with a child group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubpassDisposition {
    /// Flattened into the parent pass.
    Collapsed,
    /// Rendered into its own offscreen target.
    Offscreen,
    /// Skipped because the delegate elided it.
    Elided,
    /// Skipped because the current clip excludes everything.
    EmptyClip,
    /// Skipped because its coverage has no area.
    EmptyCoverage,
}

/// How an advanced blend was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendStrategy {
    /// The destination was read in-shader.
    FramebufferFetch,
    /// The pass was ended and its texture sampled by a new pass.
    PassFlush,
}

/// Which clip-stack transition happened.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipTransition {
    /// A clip was rasterised into the stencil.
    Append,
    /// A clip was recorded for bookkeeping only.
    SkippedAppend,
    /// The stencil was restored to a shallower depth.
    Restore,
    /// A restore found nothing to undo.
    NoopRestore,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a root group starts rendering.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Size of the caller's target.
    pub target_size: PixelSize,
    /// Device capabilities for this frame.
    pub capabilities: Capabilities,
    /// Whether the root is rendered offscreen and copied back.
    pub double_buffered: bool,
}

/// Emitted when a root group finishes rendering, successfully or not.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// `true` if the frame completed.
    pub ok: bool,
}

/// Emitted when a render pass is opened.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Offscreen nesting depth (0 for the root).
    pub pass_depth: u32,
    /// Number of passes opened on this target before this one.
    pub pass_count: u32,
    /// Color load action.
    pub load_action: LoadAction,
    /// Target size.
    pub size: PixelSize,
    /// Whether the previous contents are redrawn from a flipped MSAA target.
    pub backdrop_restored: bool,
}

/// Emitted when a render pass is ended and submitted.
#[derive(Clone, Copy, Debug)]
pub struct PassEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Offscreen nesting depth.
    pub pass_depth: u32,
    /// Number of passes opened on this target so far.
    pub pass_count: u32,
    /// Whether mipmaps were generated.
    pub mipmaps: bool,
}

/// Emitted when a child group is resolved.
#[derive(Clone, Copy, Debug)]
pub struct SubpassEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Depth of the parent pass.
    pub pass_depth: u32,
    /// What happened to the group.
    pub disposition: SubpassDisposition,
    /// Coverage of the offscreen target in root space, when allocated.
    pub coverage: Option<Rect>,
}

/// Emitted when an element with an advanced blend mode is drawn.
#[derive(Clone, Copy, Debug)]
pub struct AdvancedBlendEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Depth of the pass the element is drawn into.
    pub pass_depth: u32,
    /// Blend mode.
    pub mode: BlendMode,
    /// How the destination was read.
    pub strategy: BlendStrategy,
}

/// Emitted when rendering fails, just before the error propagates.
#[derive(Clone, Copy, Debug)]
pub struct ValidationEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Description of the failure.
    pub message: &'static str,
}

/// A clip-stack transition.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ClipEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Depth of the pass whose stack changed.
    pub pass_depth: u32,
    /// What happened.
    pub transition: ClipTransition,
    /// Clip depth of the top layer afterwards.
    pub clip_depth: u32,
    /// Coverage of the top layer afterwards, in root space.
    pub coverage: Option<Rect>,
}

/// Per-frame work summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Render passes opened, across all targets.
    pub passes_opened: u32,
    /// Offscreen targets allocated for subpasses.
    pub offscreen_targets: u32,
    /// Draw commands emitted.
    pub draws: u32,
    /// Clip draws re-issued after a pass was reopened.
    pub clip_replays: u32,
    /// Elements and groups skipped without drawing.
    pub elements_skipped: u32,
    /// Passes ended early to read back the destination.
    pub pass_flushes: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the renderer.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a root group starts rendering.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a root group finishes rendering.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called when a render pass is opened.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called when a render pass is ended.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }

    /// Called when a child group is resolved.
    fn on_subpass(&mut self, e: &SubpassEvent) {
        _ = e;
    }

    /// Called when an advanced blend is resolved.
    fn on_advanced_blend(&mut self, e: &AdvancedBlendEvent) {
        _ = e;
    }

    /// Called when rendering fails.
    fn on_validation(&mut self, e: &ValidationEvent) {
        _ = e;
    }

    /// Called with a per-frame work summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called on every clip-stack transition (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_clip(&mut self, e: &ClipEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$meta:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`FrameBeginEvent`].
        frame_begin => on_frame_begin(FrameBeginEvent)
    );
    dispatch!(
        /// Emits a [`FrameEndEvent`].
        frame_end => on_frame_end(FrameEndEvent)
    );
    dispatch!(
        /// Emits a [`PassBeginEvent`].
        pass_begin => on_pass_begin(PassBeginEvent)
    );
    dispatch!(
        /// Emits a [`PassEndEvent`].
        pass_end => on_pass_end(PassEndEvent)
    );
    dispatch!(
        /// Emits a [`SubpassEvent`].
        subpass => on_subpass(SubpassEvent)
    );
    dispatch!(
        /// Emits an [`AdvancedBlendEvent`].
        advanced_blend => on_advanced_blend(AdvancedBlendEvent)
    );
    dispatch!(
        /// Emits a [`ValidationEvent`].
        validation => on_validation(ValidationEvent)
    );
    dispatch!(
        /// Emits a [`FrameSummary`].
        frame_summary => on_frame_summary(FrameSummary)
    );

    /// Emits a [`ClipEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn clip(&mut self, e: &ClipEvent) {
        if let Some(s) = &mut self.sink {
            s.on_clip(e);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Counts work during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    summary: FrameSummary,
}

impl FrameSummaryBuilder {
    /// Starts counting for the given frame.
    #[must_use]
    pub fn new(frame_index: u64) -> Self {
        Self {
            summary: FrameSummary {
                frame_index,
                ..FrameSummary::default()
            },
        }
    }

    /// Records an opened render pass.
    pub fn pass_opened(&mut self) {
        self.summary.passes_opened += 1;
    }

    /// Records an allocated offscreen target.
    pub fn offscreen_target(&mut self) {
        self.summary.offscreen_targets += 1;
    }

    /// Records an emitted draw.
    pub fn draw(&mut self) {
        self.summary.draws += 1;
    }

    /// Records `count` replayed clip draws.
    pub fn clip_replays(&mut self, count: u32) {
        self.summary.clip_replays += count;
    }

    /// Records a skipped element or group.
    pub fn skipped(&mut self) {
        self.summary.elements_skipped += 1;
    }

    /// Records a pass ended early for a destination read.
    pub fn pass_flush(&mut self) {
        self.summary.pass_flushes += 1;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        self.summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
