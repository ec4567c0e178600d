// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;

use kurbo::{Affine, Rect};
use strata_core::Color;
use strata_core::command::{DrawCommand, DrawKind};
use strata_core::geometry::{PixelSize, Shape};

use crate::drawable::{Drawable, RenderContext, draw_bounds};
use crate::element::DrawItem;
use crate::error::RenderError;

/// Fills a shape with one color.
#[derive(Clone, Debug, PartialEq)]
pub struct SolidColorContents {
    shape: Shape,
    color: Color,
}

impl SolidColorContents {
    /// Creates a fill of `shape` with a straight-alpha `color`.
    #[must_use]
    pub fn new(shape: Shape, color: Color) -> Self {
        Self { shape, color }
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }
}

impl Drawable for SolidColorContents {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        if self.color.is_transparent() {
            return None;
        }
        self.shape.coverage(transform)
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        let command = DrawCommand::new(
            DrawKind::SolidFill {
                shape: self.shape,
                color: self.color,
            },
            item.transform,
            ctx.stencil_reference,
        )
        .with_blend_mode(item.blend_mode)
        .with_bounds(draw_bounds(self.coverage(item.transform), item.coverage_hint))
        .with_label("solid fill");
        ctx.draw(command);
        Ok(())
    }

    fn can_inherit_opacity(&self) -> bool {
        true
    }

    fn set_inherited_opacity(&mut self, opacity: f32) {
        self.color = self.color.multiply_alpha(opacity);
    }

    fn apply_color_filter(&mut self, filter: &dyn Fn(Color) -> Color) -> bool {
        self.color = filter(self.color);
        true
    }

    fn as_background_color(&self, item: &DrawItem, target_size: PixelSize) -> Option<Color> {
        if item.blend_mode.is_advanced() {
            return None;
        }
        self.shape
            .covers_area(item.transform, target_size.to_rect())
            .then_some(self.color)
    }

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(self.clone())
    }
}
