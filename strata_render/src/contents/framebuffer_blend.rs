// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::sync::Arc;

use kurbo::{Affine, Rect};
use strata_core::BlendMode;
use strata_core::command::{DrawCommand, DrawKind, TextureInput};

use crate::drawable::{Drawable, RenderContext, draw_bounds};
use crate::element::DrawItem;
use crate::error::RenderError;

/// Blends a child against the destination read in the fragment shader.
///
/// Only valid on devices with framebuffer fetch. The child is rendered to a
/// snapshot and sampled as the source.
#[derive(Clone, Debug)]
pub struct FramebufferBlendContents {
    child: Arc<dyn Drawable>,
    mode: BlendMode,
}

impl FramebufferBlendContents {
    /// Wraps `child` for blending with an advanced `mode`.
    #[must_use]
    pub fn new(child: Arc<dyn Drawable>, mode: BlendMode) -> Self {
        Self { child, mode }
    }

    /// Returns the blend mode.
    #[must_use]
    pub fn mode(&self) -> BlendMode {
        self.mode
    }
}

impl Drawable for FramebufferBlendContents {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        self.child.coverage(transform)
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        let source = DrawItem::new(self.child.clone()).with_transform(item.transform);
        let Some(snapshot) =
            self.child
                .render_to_snapshot(&mut *ctx.device, &source, "framebuffer blend source")?
        else {
            return Ok(());
        };
        let command = DrawCommand::new(
            DrawKind::FramebufferBlend {
                mode: self.mode,
                source: TextureInput {
                    texture: snapshot.texture,
                    transform: snapshot.transform,
                },
            },
            Affine::IDENTITY,
            ctx.stencil_reference,
        )
        .with_blend_mode(BlendMode::Source)
        .with_bounds(draw_bounds(self.coverage(item.transform), item.coverage_hint))
        .with_label("framebuffer blend");
        ctx.draw(command);
        Ok(())
    }

    fn clips_to_coverage_limit(&self) -> bool {
        self.child.clips_to_coverage_limit()
    }

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(self.clone())
    }
}
