// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group delegates.
//!
//! A delegate decides what happens to a [`Group`] when its parent renders
//! it: skip it, flatten it into the parent pass, or render it offscreen and
//! composite the result with contents the delegate builds.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Rect};
use strata_core::geometry::{self, PixelSize};
use strata_core::resource::TextureId;

use crate::contents::TextureContents;
use crate::drawable::Drawable;
use crate::element::Element;
use crate::group::Group;

/// Policy a group follows when rendered into its parent.
pub trait GroupDelegate: fmt::Debug {
    /// Returns `true` if the group can be skipped entirely.
    fn can_elide(&self) -> bool;

    /// Returns `true` if `group`'s elements can be drawn straight into the
    /// parent pass.
    fn can_collapse_into_parent_pass(&self, group: &Group) -> bool;

    /// Opacity pushed into every item when the group is collapsed.
    ///
    /// A delegate returning less than `1.0` must only collapse groups whose
    /// items can all inherit opacity.
    fn inherited_opacity(&self) -> f32 {
        1.0
    }

    /// Builds the contents that composite the group's offscreen `texture`
    /// into the parent pass.
    ///
    /// `transform` is the group's transform in the parent pass. The renderer
    /// positions the contents at the texture's origin, so contents that only
    /// draw the texture can ignore it. Returning `None` fails the frame.
    fn create_contents_for_subpass_target(
        &self,
        texture: TextureId,
        size: PixelSize,
        transform: Affine,
    ) -> Option<Arc<dyn Drawable>>;
}

/// Always collapses; composites subpass textures unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultDelegate;

impl GroupDelegate for DefaultDelegate {
    fn can_elide(&self) -> bool {
        false
    }

    fn can_collapse_into_parent_pass(&self, _group: &Group) -> bool {
        true
    }

    fn create_contents_for_subpass_target(
        &self,
        texture: TextureId,
        size: PixelSize,
        _transform: Affine,
    ) -> Option<Arc<dyn Drawable>> {
        Some(Arc::new(TextureContents::new(texture, size)))
    }
}

/// Renders the group offscreen and composites it at an opacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityDelegate {
    opacity: f32,
}

impl OpacityDelegate {
    /// Creates a delegate compositing at `opacity`, clamped to `0..=1`.
    #[must_use]
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Returns the opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

impl GroupDelegate for OpacityDelegate {
    fn can_elide(&self) -> bool {
        self.opacity <= 0.0
    }

    fn can_collapse_into_parent_pass(&self, _group: &Group) -> bool {
        false
    }

    fn create_contents_for_subpass_target(
        &self,
        texture: TextureId,
        size: PixelSize,
        _transform: Affine,
    ) -> Option<Arc<dyn Drawable>> {
        Some(Arc::new(
            TextureContents::new(texture, size).with_opacity(self.opacity),
        ))
    }
}

/// Pushes a group opacity into its items when that gives the same result.
///
/// Distributing an opacity over draws is only exact when no two draws
/// overlap, so the group collapses only when every element is an item whose
/// contents can inherit opacity and no two item coverages intersect.
/// Otherwise it behaves like [`OpacityDelegate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityPeepholeDelegate {
    inner: OpacityDelegate,
}

impl OpacityPeepholeDelegate {
    /// Creates a delegate for a group drawn at `opacity`.
    #[must_use]
    pub fn new(opacity: f32) -> Self {
        Self {
            inner: OpacityDelegate::new(opacity),
        }
    }
}

impl GroupDelegate for OpacityPeepholeDelegate {
    fn can_elide(&self) -> bool {
        self.inner.can_elide()
    }

    fn can_collapse_into_parent_pass(&self, group: &Group) -> bool {
        if group.backdrop_filter().is_some() {
            return false;
        }
        let mut seen: Vec<Rect> = Vec::new();
        for element in group.elements() {
            let Element::Item(item) = element else {
                return false;
            };
            if !item.contents.can_inherit_opacity() || item.blend_mode.is_advanced() {
                return false;
            }
            let Some(coverage) = item.coverage() else {
                continue;
            };
            if seen.iter().any(|other| geometry::overlaps(*other, coverage)) {
                return false;
            }
            seen.push(coverage);
        }
        true
    }

    fn inherited_opacity(&self) -> f32 {
        self.inner.opacity()
    }

    fn create_contents_for_subpass_target(
        &self,
        texture: TextureId,
        size: PixelSize,
        transform: Affine,
    ) -> Option<Arc<dyn Drawable>> {
        self.inner
            .create_contents_for_subpass_target(texture, size, transform)
    }
}
