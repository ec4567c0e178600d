// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect};
use strata_core::Color;
use strata_core::command::{DrawCommand, DrawKind, GradientStop};
use strata_core::geometry::Shape;

use crate::drawable::{Drawable, RenderContext, draw_bounds};
use crate::element::DrawItem;
use crate::error::RenderError;

/// Fills a shape with a linear gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradientContents {
    shape: Shape,
    start: Point,
    end: Point,
    stops: Vec<GradientStop>,
    opacity: f32,
}

impl LinearGradientContents {
    /// Creates a gradient from `start` to `end`, both in local space.
    #[must_use]
    pub fn new(shape: Shape, start: Point, end: Point, stops: Vec<GradientStop>) -> Self {
        Self {
            shape,
            start,
            end,
            stops,
            opacity: 1.0,
        }
    }

    /// Returns the stops.
    #[must_use]
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Returns the opacity multiplier.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    fn is_invisible(&self) -> bool {
        self.opacity <= 0.0 || self.stops.iter().all(|stop| stop.color.is_transparent())
    }
}

impl Drawable for LinearGradientContents {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        if self.is_invisible() {
            return None;
        }
        self.shape.coverage(transform)
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        let stops = self
            .stops
            .iter()
            .map(|stop| GradientStop {
                offset: stop.offset,
                color: stop.color.multiply_alpha(self.opacity),
            })
            .collect();
        let command = DrawCommand::new(
            DrawKind::LinearGradient {
                shape: self.shape,
                start: self.start,
                end: self.end,
                stops,
            },
            item.transform,
            ctx.stencil_reference,
        )
        .with_blend_mode(item.blend_mode)
        .with_bounds(draw_bounds(self.coverage(item.transform), item.coverage_hint))
        .with_label("linear gradient");
        ctx.draw(command);
        Ok(())
    }

    fn can_inherit_opacity(&self) -> bool {
        true
    }

    fn set_inherited_opacity(&mut self, opacity: f32) {
        self.opacity *= opacity;
    }

    fn apply_color_filter(&mut self, filter: &dyn Fn(Color) -> Color) -> bool {
        for stop in &mut self.stops {
            stop.color = filter(stop.color);
        }
        true
    }

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(self.clone())
    }
}
