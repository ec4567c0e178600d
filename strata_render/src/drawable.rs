// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Drawable`] trait and the context drawables render into.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Affine, Rect};
use strata_core::command::DrawCommand;
use strata_core::geometry::{self, PixelSize};
use strata_core::resource::{RenderPassId, TextureId};
use strata_core::{Color, Device};

use crate::element::DrawItem;
use crate::error::RenderError;
use crate::pass_context::{TargetSpec, create_render_target};

/// The live render pass a drawable emits commands into.
pub struct RenderContext<'a> {
    /// Device that owns the pass.
    pub device: &'a mut dyn Device,
    /// Pass being recorded.
    pub pass: RenderPassId,
    /// Size of the pass's target.
    pub target_size: PixelSize,
    /// Stencil value that marks the current clip.
    pub stencil_reference: u32,
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("pass", &self.pass)
            .field("target_size", &self.target_size)
            .field("stencil_reference", &self.stencil_reference)
            .finish_non_exhaustive()
    }
}

impl RenderContext<'_> {
    /// Records `command` into the pass.
    pub fn draw(&mut self, command: DrawCommand) {
        self.device.draw(self.pass, command);
    }
}

/// How a draw affects the clip stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipCoverageKind {
    /// Draws color; the clip is unchanged.
    NoChange,
    /// Narrows the clip.
    Append,
    /// Returns to a shallower clip.
    Restore,
}

/// A draw's effect on clipping, in the coordinate space of the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipCoverage {
    /// Kind of effect.
    pub kind: ClipCoverageKind,
    /// Clip coverage after the draw.
    pub coverage: Option<Rect>,
    /// `true` for difference clips and clips that are not an axis-aligned
    /// rectangle. Such clips can never be skipped as supersets.
    pub is_difference_or_non_square: bool,
}

impl ClipCoverage {
    /// A draw that leaves the clip at `current`.
    #[must_use]
    pub const fn no_change(current: Option<Rect>) -> Self {
        Self {
            kind: ClipCoverageKind::NoChange,
            coverage: current,
            is_difference_or_non_square: false,
        }
    }

    /// Returns `self` translated by `offset`.
    #[must_use]
    pub fn translated(self, offset: kurbo::Vec2) -> Self {
        Self {
            coverage: self.coverage.map(|c| c + offset),
            ..self
        }
    }
}

/// The result of rendering a drawable into its own texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    /// Rendered texture.
    pub texture: TextureId,
    /// Texture size.
    pub size: PixelSize,
    /// Texture space to the space the drawable was rendered in.
    pub transform: Affine,
}

/// A polymorphic unit of paintable content.
///
/// Drawables own no GPU resources. They answer coverage questions, which
/// must be free of side effects, and emit commands into the pass they are
/// handed.
pub trait Drawable: fmt::Debug {
    /// Returns the area this drawable paints under `transform`, or `None` if
    /// it paints nothing.
    fn coverage(&self, transform: Affine) -> Option<Rect>;

    /// Emits the commands for `item` into the current pass.
    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError>;

    /// Renders `item` into a new texture sized to its coverage.
    ///
    /// Returns `Ok(None)` when there is nothing to render or the coverage is
    /// unbounded. The texture is complete once this returns: the commands
    /// are recorded on a separate command buffer that has been submitted.
    fn render_to_snapshot(
        &self,
        device: &mut dyn Device,
        item: &DrawItem,
        label: &'static str,
    ) -> Result<Option<Snapshot>, RenderError> {
        let Some(coverage) = self.coverage(item.transform) else {
            return Ok(None);
        };
        let coverage = match item.coverage_hint {
            Some(hint) => geometry::intersection(coverage, hint),
            None => Some(coverage),
        };
        let Some(coverage) = coverage.map(|c| c.expand()) else {
            return Ok(None);
        };
        let size = PixelSize::from_rect_ceil(coverage);
        if size.is_empty() || !coverage.x0.is_finite() || !coverage.y0.is_finite() {
            return Ok(None);
        }

        let target = create_render_target(
            device,
            &TargetSpec {
                size,
                mip_count: 1,
                clear_color: Color::TRANSPARENT,
                sample_count: 1,
                stencil: false,
                label,
            },
        )?;
        let cmd = device.create_command_buffer(label)?;
        let pass = device.create_render_pass(cmd, &target, label)?;

        let origin = coverage.origin().to_vec2();
        let mut shifted = item.clone();
        shifted.transform = Affine::translate(-origin) * item.transform;
        shifted.coverage_hint = None;
        let mut ctx = RenderContext {
            device: &mut *device,
            pass,
            target_size: size,
            stencil_reference: 0,
        };
        self.render(&mut ctx, &shifted)?;

        device.encode_render_pass(pass)?;
        device.submit(cmd)?;
        Ok(Some(Snapshot {
            texture: target.render_target_texture(),
            size,
            transform: Affine::translate(origin),
        }))
    }

    /// Returns `true` if a group opacity can be pushed into this drawable.
    fn can_inherit_opacity(&self) -> bool {
        false
    }

    /// Multiplies this drawable's opacity by `opacity`.
    ///
    /// # Panics
    ///
    /// Panics unless [`can_inherit_opacity`](Self::can_inherit_opacity)
    /// returned `true`.
    fn set_inherited_opacity(&mut self, opacity: f32) {
        _ = opacity;
        panic!("set_inherited_opacity called on contents that cannot inherit opacity");
    }

    /// Folds a color filter into this drawable's parameters.
    ///
    /// Returns `false` without mutating anything when the filter cannot be
    /// folded.
    fn apply_color_filter(&mut self, filter: &dyn Fn(Color) -> Color) -> bool {
        _ = filter;
        false
    }

    /// Classifies this draw's effect on the clip, given the `current` clip
    /// coverage in the same space as `item`.
    fn clip_coverage(&self, item: &DrawItem, current: Option<Rect>) -> ClipCoverage {
        _ = item;
        ClipCoverage::no_change(current)
    }

    /// Returns `true` if drawing `item` can change pixels inside `clip`.
    fn should_render(&self, item: &DrawItem, clip: Option<Rect>) -> bool {
        geometry::intersect_coverage(self.coverage(item.transform), clip).is_some()
    }

    /// Returns the color this draw leaves everywhere on a target of
    /// `target_size`, if it is equivalent to clearing it.
    fn as_background_color(&self, item: &DrawItem, target_size: PixelSize) -> Option<Color> {
        _ = (item, target_size);
        None
    }

    /// Returns `false` if this drawable may paint outside the coverage limit
    /// it is rendered under, like a blur.
    fn clips_to_coverage_limit(&self) -> bool {
        true
    }

    /// Returns an owned copy of this drawable.
    fn clone_boxed(&self) -> Box<dyn Drawable>;
}

/// Returns the conservative bounds of a draw from its coverage and hint.
pub(crate) fn draw_bounds(coverage: Option<Rect>, hint: Option<Rect>) -> Option<Rect> {
    match (coverage, hint) {
        (Some(c), Some(h)) => geometry::intersection(c, h).or(Some(h)),
        (c, h) => c.or(h),
    }
}
