// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;

use kurbo::{Affine, Rect};
use strata_core::command::{DrawCommand, DrawKind};
use strata_core::geometry::PixelSize;
use strata_core::resource::TextureId;

use crate::drawable::{Drawable, RenderContext, draw_bounds};
use crate::element::DrawItem;
use crate::error::RenderError;

/// Draws a region of a texture into a rectangle.
///
/// This is what a subpass texture is composited into its parent with.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureContents {
    texture: TextureId,
    size: PixelSize,
    source_rect: Rect,
    dest_rect: Rect,
    opacity: f32,
}

impl TextureContents {
    /// Draws all of `texture` at its natural size with its origin at the
    /// local origin.
    #[must_use]
    pub fn new(texture: TextureId, size: PixelSize) -> Self {
        Self {
            texture,
            size,
            source_rect: size.to_rect(),
            dest_rect: size.to_rect(),
            opacity: 1.0,
        }
    }

    /// Sets the region of the texture to sample, in texels.
    #[must_use]
    pub fn with_source_rect(mut self, source_rect: Rect) -> Self {
        self.source_rect = source_rect;
        self
    }

    /// Sets the local-space rectangle to draw into.
    #[must_use]
    pub fn with_dest_rect(mut self, dest_rect: Rect) -> Self {
        self.dest_rect = dest_rect;
        self
    }

    /// Sets the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Returns the texture.
    #[must_use]
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Returns the texture size.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Returns the opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

impl Drawable for TextureContents {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        if self.opacity <= 0.0 || self.size.is_empty() {
            return None;
        }
        Some(transform.transform_rect_bbox(self.dest_rect))
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        let command = DrawCommand::new(
            DrawKind::Texture {
                texture: self.texture,
                source_rect: self.source_rect,
                dest_rect: self.dest_rect,
                opacity: self.opacity,
            },
            item.transform,
            ctx.stencil_reference,
        )
        .with_blend_mode(item.blend_mode)
        .with_bounds(draw_bounds(self.coverage(item.transform), item.coverage_hint))
        .with_label("texture");
        ctx.draw(command);
        Ok(())
    }

    fn can_inherit_opacity(&self) -> bool {
        true
    }

    fn set_inherited_opacity(&mut self, opacity: f32) {
        self.opacity *= opacity;
    }

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(self.clone())
    }
}
