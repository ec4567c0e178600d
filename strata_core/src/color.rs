// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Straight-alpha RGBA colors and CPU-side Porter-Duff blending.
//!
//! CPU blending is only used to fold leading full-target fills into a pass's
//! clear color, so it covers exactly the pipeline blend modes.

use crate::blend::BlendMode;

/// A straight (non-premultiplied) RGBA color with `f32` components in `0..=1`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Creates a color from straight-alpha components.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns this color with its alpha replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Returns this color with its alpha multiplied by `opacity`.
    #[inline]
    #[must_use]
    pub fn multiply_alpha(self, opacity: f32) -> Self {
        self.with_alpha(self.a * opacity)
    }

    /// Returns `true` if alpha is `1.0`.
    #[inline]
    #[must_use]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    /// Returns `true` if alpha is `0.0`.
    #[inline]
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    /// Returns the premultiplied form of this color.
    #[must_use]
    pub fn premultiply(self) -> Self {
        Self::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Converts a premultiplied color back to straight alpha.
    #[must_use]
    pub fn unpremultiply(self) -> Self {
        if self.a <= 0.0 {
            return Self::TRANSPARENT;
        }
        Self::new(self.r / self.a, self.g / self.a, self.b / self.a, self.a)
    }

    /// Composites `src` onto `self` with a pipeline blend mode.
    ///
    /// Returns `None` for advanced modes, which are never folded on the CPU.
    #[must_use]
    pub fn blend(self, src: Self, mode: BlendMode) -> Option<Self> {
        let d = self.premultiply();
        let s = src.premultiply();
        let (sa, da) = (s.a, d.a);
        let mix = |fs: f32, fd: f32| {
            Self::new(
                s.r * fs + d.r * fd,
                s.g * fs + d.g * fd,
                s.b * fs + d.b * fd,
                s.a * fs + d.a * fd,
            )
        };
        let out = match mode {
            BlendMode::Clear => Self::TRANSPARENT,
            BlendMode::Source => s,
            BlendMode::Destination => d,
            BlendMode::SourceOver => mix(1.0, 1.0 - sa),
            BlendMode::DestinationOver => mix(1.0 - da, 1.0),
            BlendMode::SourceIn => mix(da, 0.0),
            BlendMode::DestinationIn => mix(0.0, sa),
            BlendMode::SourceOut => mix(1.0 - da, 0.0),
            BlendMode::DestinationOut => mix(0.0, 1.0 - sa),
            BlendMode::SourceATop => mix(da, 1.0 - sa),
            BlendMode::DestinationATop => mix(1.0 - da, sa),
            BlendMode::Xor => mix(1.0 - da, 1.0 - sa),
            BlendMode::Plus => Self::new(
                (s.r + d.r).min(1.0),
                (s.g + d.g).min(1.0),
                (s.b + d.b).min(1.0),
                (s.a + d.a).min(1.0),
            ),
            BlendMode::Modulate => Self::new(s.r * d.r, s.g * d.g, s.b * d.b, s.a * d.a),
            _ => return None,
        };
        Some(out.unpremultiply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        a - b < 1e-6 && b - a < 1e-6
    }

    #[test]
    fn source_over_opaque_replaces() {
        let out = Color::WHITE.blend(Color::RED, BlendMode::SourceOver);
        assert_eq!(out, Some(Color::RED));
    }

    #[test]
    fn source_over_translucent_mixes() {
        let out = Color::BLACK
            .blend(Color::WHITE.with_alpha(0.5), BlendMode::SourceOver)
            .unwrap();
        assert!(approx(out.r, 0.5), "expected half grey, got {out:?}");
        assert!(approx(out.a, 1.0), "expected opaque, got {out:?}");
    }

    #[test]
    fn clear_produces_transparent() {
        assert_eq!(
            Color::BLUE.blend(Color::RED, BlendMode::Clear),
            Some(Color::TRANSPARENT)
        );
    }

    #[test]
    fn advanced_modes_are_not_folded() {
        assert_eq!(Color::BLUE.blend(Color::RED, BlendMode::Screen), None);
    }

    #[test]
    fn premultiply_round_trips_opaque() {
        let c = Color::new(0.2, 0.4, 0.6, 1.0);
        assert_eq!(c.premultiply().unpremultiply(), c);
    }
}
