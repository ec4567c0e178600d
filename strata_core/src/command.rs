// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw commands submitted to a render pass.
//!
//! A [`DrawCommand`] is the unit of work the renderer hands to
//! [`Device::draw`](crate::backend::Device::draw). Commands name *what* to
//! draw and how it interacts with the stencil buffer; mapping them onto
//! pipelines and shaders is the device's business.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Point, Rect};

use crate::blend::BlendMode;
use crate::color::Color;
use crate::geometry::Shape;
use crate::resource::TextureId;

/// A font owned by an external glyph atlas.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

impl fmt::Debug for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FontId({})", self.0)
    }
}

/// A glyph index within a font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphId(pub u16);

/// One positioned glyph of a text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInstance {
    /// Glyph index.
    pub glyph: GlyphId,
    /// Baseline origin in run space.
    pub position: Point,
    /// Ink bounds in run space.
    pub bounds: Rect,
}

/// A color stop of a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `0..=1`.
    pub offset: f32,
    /// Straight-alpha color at this stop.
    pub color: Color,
}

/// A texture sampled by a draw, with the transform that maps it into the
/// draw's space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureInput {
    /// Sampled texture.
    pub texture: TextureId,
    /// Texture space to pass space.
    pub transform: Affine,
}

/// A filter graph operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOp {
    /// Blends the inputs in order with the given mode. The first input is
    /// the destination.
    Blend(BlendMode),
    /// Separable gaussian blur.
    GaussianBlur {
        /// Standard deviation in pixels.
        sigma: f64,
    },
    /// 4x5 row-major color matrix applied to straight-alpha colors.
    ColorMatrix([f32; 20]),
}

/// What a [`DrawCommand`] draws.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawKind {
    /// Fills a shape with a solid color.
    SolidFill {
        /// Geometry.
        shape: Shape,
        /// Straight-alpha color.
        color: Color,
    },
    /// Fills a shape with a linear gradient.
    LinearGradient {
        /// Geometry.
        shape: Shape,
        /// Gradient start in local space.
        start: Point,
        /// Gradient end in local space.
        end: Point,
        /// Color stops.
        stops: Vec<GradientStop>,
    },
    /// Draws a region of a texture.
    Texture {
        /// Sampled texture.
        texture: TextureId,
        /// Region of the texture, in texels.
        source_rect: Rect,
        /// Destination rectangle in local space.
        dest_rect: Rect,
        /// Opacity multiplier.
        opacity: f32,
    },
    /// Draws a run of glyphs from an atlas.
    Glyphs {
        /// Font of the run.
        font: FontId,
        /// Positioned glyphs.
        glyphs: Vec<GlyphInstance>,
        /// Straight-alpha color.
        color: Color,
    },
    /// Writes a clip shape into the stencil buffer.
    ClipAppend {
        /// Clip geometry.
        shape: Shape,
        /// `true` for a difference clip.
        difference: bool,
    },
    /// Lowers stencil values above the reference back to it.
    ClipRestore {
        /// Area to reset in pass space, or `None` for the whole pass.
        area: Option<Rect>,
    },
    /// Runs a filter over texture inputs and draws the result.
    Filter {
        /// Operation.
        filter: FilterOp,
        /// Input textures.
        inputs: Vec<TextureInput>,
    },
    /// Blends a texture against the destination read in-shader.
    FramebufferBlend {
        /// Advanced blend mode.
        mode: BlendMode,
        /// Source texture.
        source: TextureInput,
    },
}

/// How a draw interacts with the stencil buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StencilMode {
    /// Draw only where the stencil equals `reference`.
    Test {
        /// Stencil reference.
        reference: u32,
    },
    /// Increment the stencil inside an intersect clip (or outside a
    /// difference clip) where it equals `reference`.
    ClipAppend {
        /// Stencil reference before the append.
        reference: u32,
        /// `true` for a difference clip.
        difference: bool,
    },
    /// Write `reference` wherever the stencil is greater than it.
    ClipRestore {
        /// Stencil value to restore to.
        reference: u32,
    },
    /// Ignore the stencil buffer.
    Ignore,
}

/// A single draw submitted to a render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    /// What to draw.
    pub kind: DrawKind,
    /// Local space to pass space.
    pub transform: Affine,
    /// Blend mode. Advanced modes are only valid for
    /// [`DrawKind::FramebufferBlend`].
    pub blend_mode: BlendMode,
    /// Stencil behaviour.
    pub stencil: StencilMode,
    /// Conservative pass-space bounds, if known.
    pub bounds: Option<Rect>,
    /// Debug label.
    pub label: &'static str,
}

impl DrawCommand {
    /// Creates a command with source-over blending that tests against
    /// `stencil_reference`.
    #[must_use]
    pub fn new(kind: DrawKind, transform: Affine, stencil_reference: u32) -> Self {
        Self {
            kind,
            transform,
            blend_mode: BlendMode::SourceOver,
            stencil: StencilMode::Test {
                reference: stencil_reference,
            },
            bounds: None,
            label: "",
        }
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Sets the stencil behaviour.
    #[must_use]
    pub fn with_stencil(mut self, stencil: StencilMode) -> Self {
        self.stencil = stencil;
        self
    }

    /// Sets the conservative bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Option<Rect>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the debug label.
    #[must_use]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Returns `true` if this command modifies the stencil buffer.
    #[must_use]
    pub fn writes_stencil(&self) -> bool {
        matches!(
            self.stencil,
            StencilMode::ClipAppend { .. } | StencilMode::ClipRestore { .. }
        )
    }
}
