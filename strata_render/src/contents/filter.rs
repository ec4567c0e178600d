// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Rect};
use strata_core::BlendMode;
use strata_core::command::{DrawCommand, DrawKind, FilterOp, TextureInput};
use strata_core::geometry::{self, PixelSize};
use strata_core::resource::TextureId;

use crate::drawable::{Drawable, RenderContext, draw_bounds};
use crate::element::DrawItem;
use crate::error::RenderError;

/// Builds the contents drawn behind a group from its parent's pass.
///
/// Called with [`FilterInput::Texture`] holding the parent's pass texture
/// when the group is rendered, and with [`FilterInput::Coverage`] when only
/// the filter's reach is needed. Returning `None` for a texture input is a
/// failure.
pub type BackdropFilterProc = Arc<dyn Fn(FilterInput) -> Option<Arc<dyn Drawable>>>;

/// An input to a filter.
#[derive(Clone)]
pub enum FilterInput {
    /// A rendered texture.
    Texture {
        /// Texture.
        texture: TextureId,
        /// Texture size.
        size: PixelSize,
        /// Texture space to the filter's local space.
        transform: Affine,
    },
    /// Contents rendered into a snapshot on demand.
    Contents {
        /// Contents.
        contents: Arc<dyn Drawable>,
        /// Contents space to the filter's local space.
        transform: Affine,
    },
    /// An area standing in for an input that is not rendered yet.
    Coverage(Rect),
}

impl fmt::Debug for FilterInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Texture {
                texture,
                size,
                transform,
            } => f
                .debug_struct("Texture")
                .field("texture", texture)
                .field("size", size)
                .field("transform", transform)
                .finish(),
            Self::Contents {
                contents,
                transform,
            } => f
                .debug_struct("Contents")
                .field("contents", contents)
                .field("transform", transform)
                .finish(),
            Self::Coverage(rect) => f.debug_tuple("Coverage").field(rect).finish(),
        }
    }
}

impl FilterInput {
    /// Returns the area this input occupies under `transform`.
    #[must_use]
    pub fn coverage(&self, transform: Affine) -> Option<Rect> {
        match self {
            Self::Texture {
                size,
                transform: local,
                ..
            } => (!size.is_empty())
                .then(|| (transform * *local).transform_rect_bbox(size.to_rect())),
            Self::Contents {
                contents,
                transform: local,
            } => contents.coverage(transform * *local),
            Self::Coverage(rect) => Some(transform.transform_rect_bbox(*rect)),
        }
    }

    fn resolve(
        &self,
        ctx: &mut RenderContext<'_>,
        item: &DrawItem,
    ) -> Result<Option<TextureInput>, RenderError> {
        match self {
            Self::Texture {
                texture,
                transform,
                ..
            } => Ok(Some(TextureInput {
                texture: *texture,
                transform: item.transform * *transform,
            })),
            Self::Contents {
                contents,
                transform,
            } => {
                let input =
                    DrawItem::new(contents.clone()).with_transform(item.transform * *transform);
                let snapshot =
                    contents.render_to_snapshot(&mut *ctx.device, &input, "filter input")?;
                Ok(snapshot.map(|s| TextureInput {
                    texture: s.texture,
                    transform: s.transform,
                }))
            }
            Self::Coverage(_) => Ok(None),
        }
    }
}

/// A filter graph node applied to one or more inputs.
#[derive(Clone, Debug)]
pub struct FilterContents {
    op: FilterOp,
    inputs: Vec<FilterInput>,
    coverage_limit: Option<Rect>,
}

impl FilterContents {
    /// Blends `inputs` in order with `mode`. The first input is the
    /// destination.
    #[must_use]
    pub fn blend(mode: BlendMode, inputs: Vec<FilterInput>) -> Self {
        Self {
            op: FilterOp::Blend(mode),
            inputs,
            coverage_limit: None,
        }
    }

    /// Blurs `input` with a gaussian of standard deviation `sigma`.
    #[must_use]
    pub fn gaussian_blur(input: FilterInput, sigma: f64) -> Self {
        Self {
            op: FilterOp::GaussianBlur {
                sigma: sigma.max(0.0),
            },
            inputs: vec![input],
            coverage_limit: None,
        }
    }

    /// Applies a 4x5 row-major color matrix to `input`.
    #[must_use]
    pub fn color_matrix(input: FilterInput, matrix: [f32; 20]) -> Self {
        Self {
            op: FilterOp::ColorMatrix(matrix),
            inputs: vec![input],
            coverage_limit: None,
        }
    }

    /// Limits the output to `limit`, in the space the filter is drawn in.
    #[must_use]
    pub fn with_coverage_limit(mut self, limit: Option<Rect>) -> Self {
        self.coverage_limit = limit;
        self
    }

    /// Returns the operation.
    #[must_use]
    pub fn op(&self) -> FilterOp {
        self.op
    }

    /// Returns the inputs.
    #[must_use]
    pub fn inputs(&self) -> &[FilterInput] {
        &self.inputs
    }
}

impl Drawable for FilterContents {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        let coverage = self
            .inputs
            .iter()
            .filter_map(|input| input.coverage(transform))
            .reduce(|a, b| a.union(b))?;
        let coverage = match self.op {
            FilterOp::GaussianBlur { sigma } => coverage.inflate(3.0 * sigma, 3.0 * sigma),
            FilterOp::Blend(_) | FilterOp::ColorMatrix(_) => coverage,
        };
        match self.coverage_limit {
            Some(limit) => geometry::intersection(coverage, limit),
            None => Some(coverage),
        }
    }

    fn render(&self, ctx: &mut RenderContext<'_>, item: &DrawItem) -> Result<(), RenderError> {
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if let Some(resolved) = input.resolve(ctx, item)? {
                inputs.push(resolved);
            }
        }
        if inputs.is_empty() {
            return Ok(());
        }
        let command = DrawCommand::new(
            DrawKind::Filter {
                filter: self.op,
                inputs,
            },
            Affine::IDENTITY,
            ctx.stencil_reference,
        )
        .with_blend_mode(item.blend_mode)
        .with_bounds(draw_bounds(self.coverage(item.transform), item.coverage_hint))
        .with_label("filter");
        ctx.draw(command);
        Ok(())
    }

    fn clips_to_coverage_limit(&self) -> bool {
        !matches!(self.op, FilterOp::GaussianBlur { .. })
    }

    fn clone_boxed(&self) -> Box<dyn Drawable> {
        Box::new(self.clone())
    }
}
