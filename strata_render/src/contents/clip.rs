// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;

use kurbo::{Affine, Rect};
use strata_core::Color;
use strata_core::command::{DrawCommand, DrawKind, StencilMode};
use strata_core::geometry::{self, Shape};

use crate::drawable::{ClipCoverage, ClipCoverageKind, Drawable, RenderContext};
use crate::element::DrawItem;
use crate::error::RenderError;

/// Narrows the clip by a shape.
///
/// Clips paint no color, so they have no coverage of their own. Their effect
/// is reported through [`Drawable::clip_coverage`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClipContents {
    shape: Shape,
    difference: bool,
}

impl ClipContents {
    /// Keeps only what lies inside `shape`.
    #[must_use]
    pub fn intersect(shape: Shape) -> Self {
        Self {
            shape,
            difference: false,
        }
    }

    /// Removes what lies inside `shape`.
    #[must_use]
    pub fn difference(shape: Shape) -> Self {
        Self {
            shape,
            difference: true,
        }
    }

    /// Returns the clip shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns `true` for a difference clip.
    #[must_use]
    pub fn is_difference(&self) -> bool {
        self.difference
    }
}

impl Drawable for ClipContents {
    fn coverage(&self, _transform: Affine) -> Option<Rect> {
        None
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        let command = DrawCommand::new(
            DrawKind::ClipAppend {
                shape: self.shape,
                difference: self.difference,
            },
            item.transform,
            ctx.stencil_reference,
        )
        .with_stencil(StencilMode::ClipAppend {
            reference: ctx.stencil_reference,
            difference: self.difference,
        })
        .with_bounds(self.shape.coverage(item.transform))
        .with_label("clip");
        ctx.draw(command);
        Ok(())
    }

    fn can_inherit_opacity(&self) -> bool {
        true
    }

    fn set_inherited_opacity(&mut self, _opacity: f32) {}

    fn apply_color_filter(&mut self, _filter: &dyn Fn(Color) -> Color) -> bool {
        true
    }

    fn clip_coverage(&self, item: &DrawItem, current: Option<Rect>) -> ClipCoverage {
        if self.difference {
            // A difference can only shrink the clip, and a rectangle is too
            // coarse to say by how much.
            return ClipCoverage {
                kind: ClipCoverageKind::Append,
                coverage: current,
                is_difference_or_non_square: true,
            };
        }
        ClipCoverage {
            kind: ClipCoverageKind::Append,
            coverage: geometry::intersect_coverage(self.shape.coverage(item.transform), current),
            is_difference_or_non_square: !self.shape.is_axis_aligned_rect(item.transform),
        }
    }

    fn should_render(&self, _item: &DrawItem, _clip: Option<Rect>) -> bool {
        true
    }

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(self.clone())
    }
}

/// Returns the clip to the depth recorded on its draw item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipRestoreContents;

impl ClipRestoreContents {
    /// Creates a restore.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Drawable for ClipRestoreContents {
    fn coverage(&self, _transform: Affine) -> Option<Rect> {
        None
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        let command = DrawCommand::new(
            DrawKind::ClipRestore {
                area: item.coverage_hint,
            },
            Affine::IDENTITY,
            ctx.stencil_reference,
        )
        .with_stencil(StencilMode::ClipRestore {
            reference: ctx.stencil_reference,
        })
        .with_bounds(item.coverage_hint)
        .with_label("clip restore");
        ctx.draw(command);
        Ok(())
    }

    fn can_inherit_opacity(&self) -> bool {
        true
    }

    fn set_inherited_opacity(&mut self, _opacity: f32) {}

    fn apply_color_filter(&mut self, _filter: &dyn Fn(Color) -> Color) -> bool {
        true
    }

    fn clip_coverage(&self, _item: &DrawItem, current: Option<Rect>) -> ClipCoverage {
        ClipCoverage {
            kind: ClipCoverageKind::Restore,
            coverage: current,
            is_difference_or_non_square: false,
        }
    }

    fn should_render(&self, _item: &DrawItem, _clip: Option<Rect>) -> bool {
        true
    }

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(*self)
    }
}
