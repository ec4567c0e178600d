// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel sizes, scissor rectangles, shapes, and rectangle helpers.
//!
//! All floating-point geometry is expressed with [`kurbo`] types. Coverage is
//! an `Option<Rect>` throughout the workspace, where `None` means "affects
//! nothing". Rectangles are assumed to be well ordered (`x0 <= x1`,
//! `y0 <= y1`).

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Rect, RoundedRect, Vec2};

/// A rectangle that covers every representable point.
///
/// Used as the coverage of geometry that floods the whole pass (for example a
/// full-surface paint). Never transform it; compare against it instead.
pub const MAXIMUM: Rect = Rect {
    x0: f64::MIN,
    y0: f64::MIN,
    x1: f64::MAX,
    y1: f64::MAX,
};

/// Integer size of a texture or render target, in pixels.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// A zero-sized extent.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a size from its dimensions.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns the rectangle `[0, 0, width, height]`.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Returns the rectangle of this size placed at `origin`.
    #[must_use]
    pub fn to_rect_at(self, origin: Point) -> Rect {
        Rect::from_origin_size(origin, (f64::from(self.width), f64::from(self.height)))
    }

    /// Returns the smallest pixel size that fits `rect`.
    ///
    /// Non-finite or negative extents produce a zero dimension.
    #[must_use]
    pub fn from_rect_ceil(rect: Rect) -> Self {
        Self {
            width: ceil_to_u32(rect.width()),
            height: ceil_to_u32(rect.height()),
        }
    }
}

impl fmt::Debug for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelSize({}x{})", self.width, self.height)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to the u32 range before the cast"
)]
fn ceil_to_u32(v: f64) -> u32 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    v.ceil().min(f64::from(u32::MAX)) as u32
}

/// An integer scissor rectangle in render-target pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl ScissorRect {
    /// Rounds `rect` outwards to whole pixels and clamps it to `target`.
    ///
    /// A rectangle that misses the target entirely yields a zero-sized
    /// scissor at the clamped corner, which rejects every fragment.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "coordinates are clamped to the target extent before the cast"
    )]
    pub fn from_rect(rect: Rect, target: PixelSize) -> Self {
        let max_x = f64::from(target.width);
        let max_y = f64::from(target.height);
        let x0 = rect.x0.floor().clamp(0.0, max_x) as u32;
        let y0 = rect.y0.floor().clamp(0.0, max_y) as u32;
        let x1 = rect.x1.ceil().clamp(0.0, max_x) as u32;
        let y1 = rect.y1.ceil().clamp(0.0, max_y) as u32;
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }
}

/// An opaque reference to a path whose tessellation is owned elsewhere.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(pub u32);

impl fmt::Debug for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathId({})", self.0)
    }
}

/// Geometry referenced by fills and clips.
///
/// Tessellation happens outside this workspace; a shape only has to answer
/// coverage questions and travel inside draw commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// An axis-aligned rectangle in local space.
    Rect(Rect),
    /// A rectangle with rounded corners in local space.
    RoundedRect(RoundedRect),
    /// An arbitrary path with precomputed local bounds.
    Path {
        /// Handle of the tessellated path.
        path: PathId,
        /// Local-space bounds of the path.
        bounds: Rect,
    },
    /// Covers the whole render target regardless of transform.
    Cover,
}

impl Shape {
    /// Returns the shape's coverage after applying `transform`.
    ///
    /// [`Shape::Cover`] reports [`MAXIMUM`].
    #[must_use]
    pub fn coverage(&self, transform: Affine) -> Option<Rect> {
        let local = match self {
            Self::Rect(r) => *r,
            Self::RoundedRect(rr) => rr.rect(),
            Self::Path { bounds, .. } => *bounds,
            Self::Cover => return Some(MAXIMUM),
        };
        let r = transform.transform_rect_bbox(local);
        (r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite())
            .then_some(r)
    }

    /// Returns `true` if the transformed shape is exactly an axis-aligned
    /// rectangle.
    #[must_use]
    pub fn is_axis_aligned_rect(&self, transform: Affine) -> bool {
        match self {
            Self::Rect(_) => is_axis_aligned(transform),
            Self::RoundedRect(rr) => {
                let radii = rr.radii();
                radii.top_left == 0.0
                    && radii.top_right == 0.0
                    && radii.bottom_right == 0.0
                    && radii.bottom_left == 0.0
                    && is_axis_aligned(transform)
            }
            Self::Path { .. } => false,
            Self::Cover => true,
        }
    }

    /// Returns `true` if the transformed shape fills every point of `area`.
    ///
    /// Conservative: only rectangles (and [`Shape::Cover`]) can answer yes.
    #[must_use]
    pub fn covers_area(&self, transform: Affine, area: Rect) -> bool {
        if matches!(self, Self::Cover) {
            return true;
        }
        if !self.is_axis_aligned_rect(transform) {
            return false;
        }
        self.coverage(transform)
            .is_some_and(|coverage| contains_rect(coverage, area))
    }
}

/// Returns the overlap of two rectangles, or `None` if it has no area.
#[must_use]
pub fn intersection(a: Rect, b: Rect) -> Option<Rect> {
    let r = Rect::new(
        a.x0.max(b.x0),
        a.y0.max(b.y0),
        a.x1.min(b.x1),
        a.y1.min(b.y1),
    );
    (r.x1 > r.x0 && r.y1 > r.y0).then_some(r)
}

/// Intersects two coverages where `None` means "nothing".
#[must_use]
pub fn intersect_coverage(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    intersection(a?, b?)
}

/// Unions two coverages where `None` means "nothing".
#[must_use]
pub fn union_coverage(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (Some(r), None) | (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

/// Returns `true` if `inner` lies entirely inside `outer` (edges inclusive).
#[must_use]
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

/// Returns `true` if the two rectangles share an area.
#[must_use]
pub fn overlaps(a: Rect, b: Rect) -> bool {
    intersection(a, b).is_some()
}

/// Translates `rect` by `-offset`, moving it into a pass placed at `offset`.
#[inline]
#[must_use]
pub fn to_pass_space(rect: Rect, offset: Vec2) -> Rect {
    rect - offset
}

/// Returns `true` if `transform` maps axis-aligned rectangles to
/// axis-aligned rectangles (scale, translation and quarter-turn rotations).
#[must_use]
pub fn is_axis_aligned(transform: Affine) -> bool {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    (b == 0.0 && c == 0.0) || (a == 0.0 && d == 0.0)
}

/// Returns `true` if `transform` is a pure translation.
#[must_use]
pub fn is_translation_only(transform: Affine) -> bool {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_without_area_is_none() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(intersection(a, touching), None);
        assert_eq!(
            intersection(a, Rect::new(5.0, 5.0, 20.0, 20.0)),
            Some(Rect::new(5.0, 5.0, 10.0, 10.0))
        );
    }

    #[test]
    fn maximum_intersects_to_other_rect() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(intersection(MAXIMUM, r), Some(r));
    }

    #[test]
    fn union_treats_none_as_nothing() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(union_coverage(None, Some(r)), Some(r));
        assert_eq!(union_coverage(None, None), None);
        assert_eq!(
            union_coverage(Some(r), Some(Rect::new(2.0, 2.0, 3.0, 3.0))),
            Some(Rect::new(0.0, 0.0, 3.0, 3.0))
        );
    }

    #[test]
    fn pixel_size_rounds_up() {
        let size = PixelSize::from_rect_ceil(Rect::new(0.5, 0.5, 10.7, 3.0));
        assert_eq!(size, PixelSize::new(11, 3));
        assert!(PixelSize::from_rect_ceil(Rect::new(4.0, 4.0, 4.0, 9.0)).is_empty());
    }

    #[test]
    fn scissor_is_clamped_to_target() {
        let scissor = ScissorRect::from_rect(
            Rect::new(-5.0, 2.4, 120.0, 50.2),
            PixelSize::new(100, 100),
        );
        assert_eq!(
            scissor,
            ScissorRect {
                x: 0,
                y: 2,
                width: 100,
                height: 49,
            }
        );
    }

    #[test]
    fn rect_shape_covers_area_only_when_axis_aligned() {
        let shape = Shape::Rect(Rect::new(0.0, 0.0, 200.0, 200.0));
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(shape.covers_area(Affine::IDENTITY, area));
        assert!(!shape.covers_area(Affine::rotate(0.3), area));
        assert!(Shape::Cover.covers_area(Affine::rotate(0.3), area));
    }

    #[test]
    fn cover_shape_reports_maximum() {
        assert_eq!(Shape::Cover.coverage(Affine::scale(3.0)), Some(MAXIMUM));
    }

    #[test]
    fn quarter_turn_is_axis_aligned() {
        assert!(is_axis_aligned(Affine::new([0.0, 1.0, -1.0, 0.0, 4.0, 0.0])));
        assert!(!is_axis_aligned(Affine::rotate(0.25)));
    }
}
