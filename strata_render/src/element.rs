// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw items and the elements of a group.

use alloc::boxed::Box;
use alloc::sync::Arc;

use kurbo::{Affine, Rect, Vec2};
use strata_core::BlendMode;

use crate::drawable::{Drawable, RenderContext};
use crate::error::RenderError;
use crate::group::Group;

/// A drawable placed in a pass.
///
/// Cloning a `DrawItem` shares its contents. Use
/// [`deep_clone`](Self::deep_clone) for a copy that owns its own contents.
#[derive(Clone, Debug)]
pub struct DrawItem {
    /// Local space to pass space.
    pub transform: Affine,
    /// Blend mode.
    pub blend_mode: BlendMode,
    /// Number of clips active when the item was recorded.
    pub clip_depth: u32,
    /// Contents to draw.
    pub contents: Arc<dyn Drawable>,
    /// Pass-space area the draw may be limited to, if known.
    pub coverage_hint: Option<Rect>,
}

impl DrawItem {
    /// Creates an untransformed source-over item at clip depth 0.
    #[must_use]
    pub fn new(contents: Arc<dyn Drawable>) -> Self {
        Self {
            transform: Affine::IDENTITY,
            blend_mode: BlendMode::SourceOver,
            clip_depth: 0,
            contents,
            coverage_hint: None,
        }
    }

    /// Sets the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Sets the clip depth.
    #[must_use]
    pub fn with_clip_depth(mut self, clip_depth: u32) -> Self {
        self.clip_depth = clip_depth;
        self
    }

    /// Returns the area the item paints.
    #[must_use]
    pub fn coverage(&self) -> Option<Rect> {
        self.contents.coverage(self.transform)
    }

    /// Emits the item into the current pass.
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.contents.render(ctx, self)
    }

    /// Returns a copy that owns a private clone of the contents.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            contents: Arc::from(self.contents.clone_boxed()),
            ..self.clone()
        }
    }

    /// Returns a copy moved by `offset` in pass space.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            transform: Affine::translate(offset) * self.transform,
            ..self.clone()
        }
    }

    /// Returns a copy whose contents carry `opacity`.
    ///
    /// # Panics
    ///
    /// Panics if the contents cannot inherit opacity.
    #[must_use]
    pub fn with_inherited_opacity(&self, opacity: f32) -> Self {
        let mut contents = self.contents.clone_boxed();
        contents.set_inherited_opacity(opacity);
        Self {
            contents: Arc::from(contents),
            ..self.clone()
        }
    }
}

/// One entry of a [`Group`].
#[derive(Debug)]
pub enum Element {
    /// A draw item.
    Item(DrawItem),
    /// A nested group.
    Group(Box<Group>),
}

impl From<DrawItem> for Element {
    fn from(item: DrawItem) -> Self {
        Self::Item(item)
    }
}

impl From<Group> for Element {
    fn from(group: Group) -> Self {
        Self::Group(Box::new(group))
    }
}
