// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Groups: ordered lists of draw items and nested groups.
//!
//! A [`Group`] is built once per frame by the canvas layer and consumed by
//! [`Renderer::render`](crate::Renderer::render). Item transforms map into
//! root space; the renderer shifts them into whichever pass they land in.
//!
//! Building a group through [`Group::add_item`] and [`Group::add_group`]
//! keeps count of the elements that will need to read back the pass they are
//! drawn into. The root uses those counts to decide whether it has to render
//! offscreen first.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Rect, Vec2};
use strata_core::geometry::{self, PixelSize};
use strata_core::{BlendMode, Capabilities, Color};

use crate::contents::{BackdropFilterProc, FilterInput};
use crate::delegate::{DefaultDelegate, GroupDelegate};
use crate::drawable::Drawable;
use crate::element::{DrawItem, Element};

/// How much a group's bounds limit says about its contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentBoundsPromise {
    /// Nothing is known.
    #[default]
    Unknown,
    /// The limit may cut off some contents.
    MayClipContents,
    /// The limit contains all contents, so it can stand in for their
    /// coverage.
    ContainsContents,
}

/// A nestable ordered list of draw items and groups.
pub struct Group {
    elements: Vec<Element>,
    transform: Affine,
    clip_depth: u32,
    blend_mode: BlendMode,
    delegate: Arc<dyn GroupDelegate>,
    bounds_limit: Option<Rect>,
    bounds_promise: ContentBoundsPromise,
    flood_clip: bool,
    backdrop_filter: Option<BackdropFilterProc>,
    advanced_blend_reads: u32,
    backdrop_filter_reads: u32,
    required_mip_count: u32,
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("elements", &self.elements.len())
            .field("transform", &self.transform)
            .field("clip_depth", &self.clip_depth)
            .field("blend_mode", &self.blend_mode)
            .field("delegate", &self.delegate)
            .field("bounds_limit", &self.bounds_limit)
            .field("bounds_promise", &self.bounds_promise)
            .field("flood_clip", &self.flood_clip)
            .field("backdrop_filter", &self.backdrop_filter.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Group {
    /// Creates an empty source-over group with the [`DefaultDelegate`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            transform: Affine::IDENTITY,
            clip_depth: 0,
            blend_mode: BlendMode::SourceOver,
            delegate: Arc::new(DefaultDelegate),
            bounds_limit: None,
            bounds_promise: ContentBoundsPromise::Unknown,
            flood_clip: false,
            backdrop_filter: None,
            advanced_blend_reads: 0,
            backdrop_filter_reads: 0,
            required_mip_count: 1,
        }
    }

    /// Sets the delegate.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn GroupDelegate>) -> Self {
        self.delegate = delegate;
        self
    }

    /// Sets the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the clip depth the group is composited at.
    #[must_use]
    pub fn with_clip_depth(mut self, clip_depth: u32) -> Self {
        self.clip_depth = clip_depth;
        self
    }

    /// Sets the blend mode the group is composited with.
    ///
    /// Modes that can change pixels outside the group's own contents make
    /// the group flood its whole clip.
    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
        self.flood_clip = blend_mode.is_destructive();
    }

    /// Sets a user-declared bound on the group's coverage.
    pub fn set_bounds_limit(&mut self, limit: Option<Rect>, promise: ContentBoundsPromise) {
        self.bounds_limit = limit;
        self.bounds_promise = promise;
    }

    /// Sets the filter applied to the parent's contents behind this group.
    ///
    /// # Panics
    ///
    /// Panics if the group already has elements. The filter has to be known
    /// before anything is added to the group.
    pub fn set_backdrop_filter(&mut self, proc: BackdropFilterProc) {
        assert!(
            self.elements.is_empty(),
            "backdrop filter must be set before elements are added"
        );
        self.backdrop_filter = Some(proc);
    }

    /// Sets how many mip levels the group's offscreen target needs.
    pub fn set_required_mip_count(&mut self, mip_count: u32) {
        self.required_mip_count = mip_count.max(1);
    }

    /// Returns the transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Returns the clip depth.
    #[must_use]
    pub fn clip_depth(&self) -> u32 {
        self.clip_depth
    }

    /// Returns the blend mode.
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Returns the delegate.
    #[must_use]
    pub fn delegate(&self) -> &dyn GroupDelegate {
        &*self.delegate
    }

    /// Returns the bounds limit.
    #[must_use]
    pub fn bounds_limit(&self) -> Option<Rect> {
        self.bounds_limit
    }

    /// Returns what the bounds limit promises.
    #[must_use]
    pub fn bounds_promise(&self) -> ContentBoundsPromise {
        self.bounds_promise
    }

    /// Returns `true` if the group fills its whole clip.
    #[must_use]
    pub fn flood_clip(&self) -> bool {
        self.flood_clip
    }

    /// Returns the backdrop filter.
    #[must_use]
    pub fn backdrop_filter(&self) -> Option<&BackdropFilterProc> {
        self.backdrop_filter.as_ref()
    }

    /// Returns the mip count of the group's offscreen target.
    #[must_use]
    pub fn required_mip_count(&self) -> u32 {
        self.required_mip_count
    }

    /// Returns the elements.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Returns the number of direct elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Returns how many elements read back this group's pass through
    /// advanced blends.
    #[must_use]
    pub fn advanced_blend_reads(&self) -> u32 {
        self.advanced_blend_reads
    }

    /// Returns how many child groups read back this group's pass through
    /// backdrop filters.
    #[must_use]
    pub fn backdrop_filter_reads(&self) -> u32 {
        self.backdrop_filter_reads
    }

    /// Appends a draw item.
    pub fn add_item(&mut self, item: DrawItem) {
        if item.blend_mode.is_advanced() {
            self.advanced_blend_reads += 1;
        }
        self.elements.push(Element::Item(item));
    }

    /// Appends a child group and returns it for further building.
    pub fn add_group(&mut self, group: Group) -> &mut Group {
        self.count_reads(&group);
        self.elements.push(Element::Group(Box::new(group)));
        match self.elements.last_mut() {
            Some(Element::Group(group)) => group,
            _ => unreachable!("a group was just pushed"),
        }
    }

    /// Replaces all elements and recomputes the read counters.
    pub fn set_elements(&mut self, elements: Vec<Element>) {
        self.advanced_blend_reads = 0;
        self.backdrop_filter_reads = 0;
        for element in &elements {
            match element {
                Element::Item(item) => {
                    if item.blend_mode.is_advanced() {
                        self.advanced_blend_reads += 1;
                    }
                }
                Element::Group(group) => self.count_reads(group),
            }
        }
        self.elements = elements;
    }

    fn count_reads(&mut self, child: &Self) {
        if child.backdrop_filter.is_some() {
            self.backdrop_filter_reads += 1;
        }
        if child.blend_mode.is_advanced() {
            self.advanced_blend_reads += 1;
        }
    }

    /// Returns `true` if this group draws straight into its parent's pass.
    ///
    /// Groups with a backdrop filter always need their own pass.
    pub(crate) fn collapses_into_parent_pass(&self) -> bool {
        self.backdrop_filter.is_none() && self.delegate.can_collapse_into_parent_pass(self)
    }

    /// Returns how many times rendering this group reads back its own pass
    /// on a device with `capabilities`.
    ///
    /// Advanced blends read the pass only without framebuffer fetch. Reads
    /// from children that collapse into this pass count as this group's
    /// own, at any depth.
    #[must_use]
    pub fn total_pass_reads(&self, capabilities: Capabilities) -> u32 {
        let advanced = if capabilities.supports_framebuffer_fetch {
            0
        } else {
            self.advanced_blend_reads
        };
        let collapsed: u32 = self
            .elements
            .iter()
            .filter_map(|element| match element {
                Element::Group(child)
                    if !child.delegate.can_elide() && child.collapses_into_parent_pass() =>
                {
                    Some(child.total_pass_reads(capabilities))
                }
                _ => None,
            })
            .sum();
        self.backdrop_filter_reads + advanced + collapsed
    }

    /// Calls `f` on every draw item in the tree, depth first, until it
    /// returns `false`.
    ///
    /// Returns `false` if the walk was stopped.
    pub fn iterate_all_items(&self, f: &mut dyn FnMut(&DrawItem) -> bool) -> bool {
        for element in &self.elements {
            let keep_going = match element {
                Element::Item(item) => f(item),
                Element::Group(group) => group.iterate_all_items(f),
            };
            if !keep_going {
                return false;
            }
        }
        true
    }

    /// Calls `f` on the leading draw items, stopping at the first group or
    /// when `f` returns `false`.
    ///
    /// Returns the number of items `f` accepted.
    pub fn iterate_until_group(&self, f: &mut dyn FnMut(&DrawItem) -> bool) -> usize {
        let mut count = 0;
        for element in &self.elements {
            let Element::Item(item) = element else {
                break;
            };
            if !f(item) {
                break;
            }
            count += 1;
        }
        count
    }

    fn for_each_item_mut(&mut self, f: &mut dyn FnMut(&mut DrawItem)) {
        for element in &mut self.elements {
            match element {
                Element::Item(item) => f(item),
                Element::Group(group) => group.for_each_item_mut(f),
            }
        }
    }

    /// Folds `filter` into the contents of every item in the tree.
    ///
    /// Either every item takes the filter or nothing changes. Returns
    /// `false` in the latter case; the caller must then apply the filter as
    /// a separate stage.
    pub fn apply_color_filter(&mut self, filter: &dyn Fn(Color) -> Color) -> bool {
        let mut filtered: Vec<Box<dyn Drawable>> = Vec::new();
        let accepted = self.iterate_all_items(&mut |item| {
            let mut contents = item.contents.clone_boxed();
            let ok = contents.apply_color_filter(filter);
            filtered.push(contents);
            ok
        });
        if !accepted {
            return false;
        }
        let mut filtered = filtered.into_iter();
        self.for_each_item_mut(&mut |item| {
            if let Some(contents) = filtered.next() {
                item.contents = Arc::from(contents);
            }
        });
        true
    }

    /// Returns the union of the elements' coverage in root space, each
    /// clamped to `limit` where that is exact.
    #[must_use]
    pub fn elements_coverage(&self, limit: Option<Rect>) -> Option<Rect> {
        let mut accumulated: Option<Rect> = None;
        for element in &self.elements {
            let coverage = match element {
                Element::Item(item) => {
                    let coverage = item.coverage();
                    if item.contents.clips_to_coverage_limit() && limit.is_some() {
                        geometry::intersect_coverage(coverage, limit)
                    } else {
                        coverage
                    }
                }
                Element::Group(group) => {
                    let mut coverage = Self::subpass_coverage(group, None);
                    if let (Some(proc), Some(behind)) = (&group.backdrop_filter, accumulated) {
                        // The filter can paint anywhere it reads from.
                        let reach = proc(FilterInput::Coverage(behind))
                            .and_then(|filter| filter.coverage(Affine::IDENTITY));
                        coverage = geometry::union_coverage(coverage, reach);
                    }
                    match limit {
                        Some(_) => geometry::intersect_coverage(coverage, limit),
                        None => coverage,
                    }
                }
            };
            accumulated = geometry::union_coverage(accumulated, coverage);
        }
        accumulated
    }

    /// Returns the root-space area `child` needs for its offscreen target,
    /// at most `limit`.
    #[must_use]
    pub fn subpass_coverage(child: &Self, limit: Option<Rect>) -> Option<Rect> {
        if child.bounds_promise == ContentBoundsPromise::ContainsContents
            && let Some(bounds) = child.bounds_limit
        {
            let bounds = child.transform.transform_rect_bbox(bounds);
            return match limit {
                Some(limit) => geometry::intersection(bounds, limit),
                None => Some(bounds),
            };
        }
        let coverage = child.elements_coverage(limit)?;
        match child.bounds_limit {
            Some(bounds) => {
                geometry::intersection(coverage, child.transform.transform_rect_bbox(bounds))
            }
            None => Some(coverage),
        }
    }

    /// Returns how many leading items fold into the clear color of a pass
    /// of `target_size` placed at `global`, and the premultiplied color they
    /// produce.
    pub(crate) fn clear_color_prefix(
        &self,
        target_size: PixelSize,
        global: Vec2,
    ) -> (usize, Option<Color>) {
        if self.backdrop_filter.is_some() {
            return (0, None);
        }
        let mut color: Option<Color> = None;
        let count = self.iterate_until_group(&mut |item| {
            let local = item.translated(-global);
            let Some(background) = local.contents.as_background_color(&local, target_size) else {
                return false;
            };
            match color.unwrap_or(Color::TRANSPARENT).blend(background, item.blend_mode) {
                Some(blended) => {
                    color = Some(blended);
                    true
                }
                None => false,
            }
        });
        (count, color.map(Color::premultiply))
    }

    /// Returns the premultiplied color the leading items leave on a pass of
    /// `target_size` placed at `global`, or `None` if they cannot be folded
    /// into a clear.
    #[must_use]
    pub fn clear_color(&self, target_size: PixelSize, global: Vec2) -> Option<Color> {
        self.clear_color_prefix(target_size, global).1
    }

    /// Like [`clear_color`](Self::clear_color), falling back to transparent.
    #[must_use]
    pub fn clear_color_or_default(&self, target_size: PixelSize, global: Vec2) -> Color {
        self.clear_color(target_size, global)
            .unwrap_or(Color::TRANSPARENT)
    }
}
