// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blend modes.
//!
//! The first fourteen modes are Porter-Duff operators that a fixed-function
//! blend state can express. Everything after [`BlendMode::LAST_PIPELINE`] is
//! an *advanced* mode: it needs the destination color as a shader input,
//! either through framebuffer fetch or by flushing the pass and sampling its
//! texture.

/// Blend mode for compositing a draw onto its pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum BlendMode {
    /// Clears the destination.
    Clear,
    /// Replaces the destination with the source.
    Source,
    /// Keeps the destination.
    Destination,
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Destination over source.
    DestinationOver,
    /// Source where the destination is opaque.
    SourceIn,
    /// Destination where the source is opaque.
    DestinationIn,
    /// Source where the destination is transparent.
    SourceOut,
    /// Destination where the source is transparent.
    DestinationOut,
    /// Source atop destination.
    SourceATop,
    /// Destination atop source.
    DestinationATop,
    /// Exclusive or.
    Xor,
    /// Saturating addition.
    Plus,
    /// Component-wise multiplication.
    Modulate,
    /// Screen blend.
    Screen,
    /// Overlay blend.
    Overlay,
    /// Darken blend.
    Darken,
    /// Lighten blend.
    Lighten,
    /// Color dodge blend.
    ColorDodge,
    /// Color burn blend.
    ColorBurn,
    /// Hard light blend.
    HardLight,
    /// Soft light blend.
    SoftLight,
    /// Difference blend.
    Difference,
    /// Exclusion blend.
    Exclusion,
    /// Multiply blend.
    Multiply,
    /// Hue blend.
    Hue,
    /// Saturation blend.
    Saturation,
    /// Color blend.
    Color,
    /// Luminosity blend.
    Luminosity,
}

impl BlendMode {
    /// The last mode a fixed-function blend state can express.
    pub const LAST_PIPELINE: Self = Self::Modulate;

    /// Every mode, indexed by discriminant.
    pub const ALL: [Self; 29] = [
        Self::Clear,
        Self::Source,
        Self::Destination,
        Self::SourceOver,
        Self::DestinationOver,
        Self::SourceIn,
        Self::DestinationIn,
        Self::SourceOut,
        Self::DestinationOut,
        Self::SourceATop,
        Self::DestinationATop,
        Self::Xor,
        Self::Plus,
        Self::Modulate,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Multiply,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    /// Returns the mode with discriminant `index`.
    #[inline]
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Returns `true` if this mode has to read the destination color.
    #[inline]
    #[must_use]
    pub const fn is_advanced(self) -> bool {
        self as u8 > Self::LAST_PIPELINE as u8
    }

    /// Returns `true` if a fully transparent source changes the destination.
    ///
    /// Groups with a destructive blend mode affect pixels outside their
    /// children's coverage, so they have to flood their coverage limit.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(
            self,
            Self::Clear
                | Self::Source
                | Self::SourceIn
                | Self::DestinationIn
                | Self::SourceOut
                | Self::DestinationATop
                | Self::Modulate
        )
    }
}
