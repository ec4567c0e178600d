// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Affine, Rect};
use strata_core::Color;
use strata_core::command::{DrawCommand, DrawKind, FontId, GlyphInstance};

use crate::drawable::{Drawable, RenderContext, draw_bounds};
use crate::element::DrawItem;
use crate::error::RenderError;

/// A run of glyphs drawn from an external atlas.
#[derive(Clone, Debug, PartialEq)]
pub struct TextContents {
    font: FontId,
    glyphs: Vec<GlyphInstance>,
    color: Color,
}

impl TextContents {
    /// Creates a glyph run.
    #[must_use]
    pub fn new(font: FontId, glyphs: Vec<GlyphInstance>, color: Color) -> Self {
        Self {
            font,
            glyphs,
            color,
        }
    }

    /// Returns the color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }
}

impl Drawable for TextContents {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        if self.color.is_transparent() {
            return None;
        }
        self.glyphs
            .iter()
            .map(|glyph| transform.transform_rect_bbox(glyph.bounds))
            .reduce(|a, b| a.union(b))
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        if self.glyphs.is_empty() {
            return Ok(());
        }
        let command = DrawCommand::new(
            DrawKind::Glyphs {
                font: self.font,
                glyphs: self.glyphs.clone(),
                color: self.color,
            },
            item.transform,
            ctx.stencil_reference,
        )
        .with_blend_mode(item.blend_mode)
        .with_bounds(draw_bounds(self.coverage(item.transform), item.coverage_hint))
        .with_label("text");
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

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(self.clone())
    }
}
