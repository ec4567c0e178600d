// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque GPU handles, texture descriptors, and render targets.
//!
//! Handles are assigned by the [`Device`](crate::backend::Device) and passed
//! through the renderer without interpretation.

use core::fmt;

use crate::color::Color;
use crate::geometry::PixelSize;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

handle!(
    /// A device-owned texture.
    TextureId
);
handle!(
    /// A device-owned command buffer that has not been submitted yet.
    CommandBufferId
);
handle!(
    /// A render pass being recorded into a command buffer.
    RenderPassId
);

/// Pixel format of a texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA color.
    #[default]
    Rgba8,
    /// 8-bit stencil.
    Stencil8,
}

/// How a texture will be used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureUsage {
    /// Bound as a render-pass attachment.
    pub render_target: bool,
    /// Sampled from shaders.
    pub shader_read: bool,
    /// Contents only live for the duration of one pass.
    pub transient: bool,
}

impl TextureUsage {
    /// Attachment that is later sampled (offscreen color, resolve targets).
    pub const RENDER_TARGET_READ: Self = Self {
        render_target: true,
        shader_read: true,
        transient: false,
    };

    /// Attachment whose contents are discarded after the pass (MSAA color,
    /// stencil).
    pub const TRANSIENT_ATTACHMENT: Self = Self {
        render_target: true,
        shader_read: false,
        transient: true,
    };
}

/// Parameters for [`Device::create_texture`](crate::backend::Device::create_texture).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Extent in pixels.
    pub size: PixelSize,
    /// Pixel format.
    pub format: TextureFormat,
    /// Intended usage.
    pub usage: TextureUsage,
    /// MSAA sample count (1 for single-sampled).
    pub sample_count: u8,
    /// Number of mip levels (at least 1).
    pub mip_count: u32,
    /// Debug label.
    pub label: &'static str,
}

/// What a pass does with an attachment's previous contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoadAction {
    /// Previous contents are undefined.
    #[default]
    DontCare,
    /// Previous contents are preserved.
    Load,
    /// The attachment is cleared to its clear value.
    Clear,
}

/// What a pass does with an attachment's contents when it ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StoreAction {
    /// Contents may be discarded.
    #[default]
    DontCare,
    /// Contents are written back.
    Store,
    /// Multisampled contents are resolved into the resolve texture.
    MultisampleResolve,
}

/// The color attachment of a render target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorAttachment {
    /// Texture rendered into (multisampled when `sample_count > 1`).
    pub texture: TextureId,
    /// Single-sampled texture that receives the resolved result.
    pub resolve_texture: Option<TextureId>,
    /// Load action for the next pass.
    pub load_action: LoadAction,
    /// Store action for the next pass.
    pub store_action: StoreAction,
    /// Premultiplied clear color used with [`LoadAction::Clear`].
    pub clear_color: Color,
    /// MSAA sample count of `texture`.
    pub sample_count: u8,
}

/// The stencil attachment of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StencilAttachment {
    /// Stencil texture.
    pub texture: TextureId,
    /// Load action for the next pass.
    pub load_action: LoadAction,
    /// Store action for the next pass.
    pub store_action: StoreAction,
    /// Value written by [`LoadAction::Clear`].
    pub clear_value: u32,
}

/// A color attachment with an optional stencil attachment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTarget {
    /// Extent shared by all attachments.
    pub size: PixelSize,
    /// Color attachment.
    pub color: ColorAttachment,
    /// Stencil attachment used for clipping.
    pub stencil: Option<StencilAttachment>,
    /// Mip levels of the render-target texture.
    pub mip_count: u32,
}

impl RenderTarget {
    /// Creates a single-sampled target that clears to transparent and has no
    /// stencil attachment.
    #[must_use]
    pub const fn new(size: PixelSize, texture: TextureId) -> Self {
        Self {
            size,
            color: ColorAttachment {
                texture,
                resolve_texture: None,
                load_action: LoadAction::Clear,
                store_action: StoreAction::Store,
                clear_color: Color::TRANSPARENT,
                sample_count: 1,
            },
            stencil: None,
            mip_count: 1,
        }
    }

    /// Attaches a stencil texture that is cleared to zero on load.
    #[must_use]
    pub const fn with_stencil(mut self, texture: TextureId) -> Self {
        self.stencil = Some(StencilAttachment {
            texture,
            load_action: LoadAction::Clear,
            store_action: StoreAction::DontCare,
            clear_value: 0,
        });
        self
    }

    /// Returns the texture holding the final rendered result.
    #[inline]
    #[must_use]
    pub fn render_target_texture(&self) -> TextureId {
        self.color.resolve_texture.unwrap_or(self.color.texture)
    }

    /// Returns `true` if the color attachment is multisampled.
    #[inline]
    #[must_use]
    pub const fn is_msaa(&self) -> bool {
        self.color.sample_count > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_texture_is_the_render_target_texture() {
        let mut target = RenderTarget::new(PixelSize::new(4, 4), TextureId(1));
        assert_eq!(target.render_target_texture(), TextureId(1));
        target.color.resolve_texture = Some(TextureId(2));
        target.color.sample_count = 4;
        assert_eq!(target.render_target_texture(), TextureId(2));
        assert!(target.is_msaa());
    }

    #[test]
    fn handle_debug_names_the_kind() {
        assert_eq!(alloc::format!("{:?}", TextureId(7)), "TextureId(7)");
    }
}
