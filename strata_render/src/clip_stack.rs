// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip coverage tracking across nested passes.
//!
//! The stack mirrors the stencil buffer of each pass. Every offscreen pass
//! gets its own *frame*; collapsed groups share their parent's frame. A frame
//! is a list of [`ClipCoverageLayer`]s whose clip depths are contiguous,
//! starting from the depth the pass was opened at.
//!
//! Coverage is tracked in root space. Clip appends that provably change no
//! pixels are recorded for depth bookkeeping but not rasterised, so each
//! layer also remembers the stencil value that marks it: the number of
//! rasterised appends below it in the frame.
//!
//! Rasterised appends are kept in a replay log so that a freshly opened pass,
//! whose stencil attachment starts cleared, can be brought back to the
//! current clip state.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Rect, Vec2};
use strata_core::geometry::contains_rect;

use crate::drawable::{ClipCoverage, ClipCoverageKind};
use crate::element::DrawItem;

/// One level of clipping within a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipCoverageLayer {
    /// Area still drawable at this level, in root space. `None` when
    /// everything is clipped out.
    pub coverage: Option<Rect>,
    /// Clip depth of this level.
    pub clip_depth: u32,
    /// Stencil value inside the clip at this level.
    pub stencil_value: u32,
}

/// A rasterised clip append, kept for replay.
#[derive(Clone, Debug)]
pub struct ReplayEntity {
    /// Private copy of the clip item, in pass space.
    pub item: DrawItem,
    /// Clip coverage the append produced, in root space.
    pub clip_coverage: Option<Rect>,
    /// Clip depth of the layer the append produced.
    pub clip_depth: u32,
    /// Stencil reference the append was drawn with.
    pub stencil_reference: u32,
}

/// Outcome of [`ClipCoverageStack::apply_clip_state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipStateResult {
    /// The item has to be drawn.
    pub should_render: bool,
    /// The current clip coverage changed, so the scissor must be updated.
    pub clip_did_change: bool,
    /// Stencil reference to draw the item with.
    pub stencil_reference: u32,
}

#[derive(Clone, Debug)]
struct Frame {
    layers: Vec<ClipCoverageLayer>,
    replay: Vec<ReplayEntity>,
}

impl Frame {
    fn new(coverage: Option<Rect>, clip_depth: u32) -> Self {
        Self {
            layers: vec![ClipCoverageLayer {
                coverage,
                clip_depth,
                stencil_value: 0,
            }],
            replay: Vec::new(),
        }
    }

    fn top(&self) -> &ClipCoverageLayer {
        // A frame is created with one layer and never truncated below it.
        &self.layers[self.layers.len() - 1]
    }
}

/// Stack of per-pass clip frames for one render.
#[derive(Clone, Debug)]
pub struct ClipCoverageStack {
    frames: Vec<Frame>,
}

impl ClipCoverageStack {
    /// Creates a stack whose root frame starts at depth 0 with `coverage`.
    #[must_use]
    pub fn new(coverage: Option<Rect>) -> Self {
        Self {
            frames: vec![Frame::new(coverage, 0)],
        }
    }

    /// Opens a frame for an offscreen pass covering `coverage`, whose
    /// elements start at `clip_depth`.
    pub fn push_subpass(&mut self, coverage: Option<Rect>, clip_depth: u32) {
        self.frames.push(Frame::new(coverage, clip_depth));
    }

    /// Closes the current frame.
    ///
    /// # Panics
    ///
    /// Panics if only the root frame is left.
    pub fn pop_subpass(&mut self) {
        assert!(self.frames.len() > 1, "pop_subpass called on the root clip frame");
        self.frames.pop();
    }

    /// Returns the number of open frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns the drawable area of the current clip, in root space.
    #[must_use]
    pub fn current_clip_coverage(&self) -> Option<Rect> {
        self.frame().top().coverage
    }

    /// Returns `false` if the current clip excludes everything.
    #[must_use]
    pub fn has_coverage(&self) -> bool {
        self.current_clip_coverage().is_some()
    }

    /// Returns the clip depth of the current clip.
    #[must_use]
    pub fn current_clip_depth(&self) -> u32 {
        self.frame().top().clip_depth
    }

    /// Returns the stencil reference that marks the current clip.
    #[must_use]
    pub fn current_stencil_reference(&self) -> u32 {
        self.frame().top().stencil_value
    }

    /// Returns the layers of the current frame, bottom first.
    #[must_use]
    pub fn layers(&self) -> &[ClipCoverageLayer] {
        &self.frame().layers
    }

    /// Returns the rasterised appends of the current frame, oldest first.
    #[must_use]
    pub fn replay_entities(&self) -> &[ReplayEntity] {
        &self.frame().replay
    }

    /// Applies a draw's clip effect to the current frame.
    ///
    /// `clip` is in root space; `item` is in the pass space of a pass placed
    /// at `global_pass_position`. A restore annotates `item.coverage_hint`
    /// with the pass-space area it has to repaint.
    pub fn apply_clip_state(
        &mut self,
        clip: ClipCoverage,
        item: &mut DrawItem,
        global_pass_position: Vec2,
    ) -> ClipStateResult {
        match clip.kind {
            ClipCoverageKind::NoChange => ClipStateResult {
                should_render: true,
                clip_did_change: false,
                stencil_reference: self.current_stencil_reference(),
            },
            ClipCoverageKind::Append => self.append(clip, item),
            ClipCoverageKind::Restore => self.restore(item, global_pass_position),
        }
    }

    fn append(&mut self, clip: ClipCoverage, item: &DrawItem) -> ClipStateResult {
        let frame = self.frame_mut();
        let top = *frame.top();
        let clip_depth = top.clip_depth + 1;

        let Some(current) = top.coverage else {
            // Everything is already clipped out; nothing this append does is
            // visible.
            frame.layers.push(ClipCoverageLayer {
                coverage: None,
                clip_depth,
                stencil_value: top.stencil_value,
            });
            return ClipStateResult {
                should_render: false,
                clip_did_change: false,
                stencil_reference: top.stencil_value,
            };
        };

        let is_superset = !clip.is_difference_or_non_square
            && clip
                .coverage
                .is_some_and(|coverage| contains_rect(coverage, current));
        if is_superset {
            frame.layers.push(ClipCoverageLayer {
                coverage: Some(current),
                clip_depth,
                stencil_value: top.stencil_value,
            });
            return ClipStateResult {
                should_render: false,
                clip_did_change: false,
                stencil_reference: top.stencil_value,
            };
        }

        frame.layers.push(ClipCoverageLayer {
            coverage: clip.coverage,
            clip_depth,
            stencil_value: top.stencil_value + 1,
        });
        frame.replay.push(ReplayEntity {
            item: item.deep_clone(),
            clip_coverage: clip.coverage,
            clip_depth,
            stencil_reference: top.stencil_value,
        });
        ClipStateResult {
            should_render: true,
            clip_did_change: true,
            stencil_reference: top.stencil_value,
        }
    }

    fn restore(&mut self, item: &mut DrawItem, global_pass_position: Vec2) -> ClipStateResult {
        let frame = self.frame_mut();
        let top = *frame.top();
        let target = item.clip_depth;
        let noop = ClipStateResult {
            should_render: false,
            clip_did_change: false,
            stencil_reference: top.stencil_value,
        };
        if top.clip_depth <= target {
            return noop;
        }

        let index = target.saturating_sub(frame.layers[0].clip_depth) as usize;
        // A restore below the depth the frame was opened at has nothing of
        // this frame's to peel back.
        let Some(peeled) = frame.layers.get(index + 1) else {
            return noop;
        };
        let restore_coverage = peeled.coverage.map(|c| c - global_pass_position);
        frame.layers.truncate(index + 1);
        frame.replay.retain(|entry| entry.clip_depth <= target);

        let new_top = *frame.top();
        item.coverage_hint = restore_coverage;
        ClipStateResult {
            // Nothing to repaint when every popped layer was a skipped append,
            // or when nothing is drawable afterwards.
            should_render: new_top.stencil_value != top.stencil_value
                && new_top.coverage.is_some(),
            clip_did_change: true,
            stencil_reference: new_top.stencil_value,
        }
    }

    fn frame(&self) -> &Frame {
        // The root frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}
