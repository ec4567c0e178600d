// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render failures.

use strata_core::DeviceError;
use thiserror::Error;

/// Why a frame could not be rendered.
///
/// Every variant aborts the whole frame. Work that is merely empty (elided
/// groups, zero-area coverage, clipped-out draws) is never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The device failed to allocate or submit something.
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// A backdrop filter returned no contents.
    #[error("backdrop filter produced no contents")]
    MissingBackdropContents,
    /// An offscreen target could not be described for a subpass.
    #[error("subpass target has no pixels")]
    InvalidSubpassTarget,
    /// A group refused to collapse into its parent yet supplied no contents
    /// for its subpass texture.
    #[error("group delegate refused to collapse but produced no subpass contents")]
    DelegateContract,
    /// A pass texture was requested before anything was rendered.
    #[error("pass texture is unavailable")]
    MissingPassTexture,
}

impl RenderError {
    /// Returns a static description suitable for a validation trace event.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Device(DeviceError::TextureAllocation(_)) => "failed to allocate texture",
            Self::Device(DeviceError::CommandBufferCreation) => "failed to create command buffer",
            Self::Device(DeviceError::RenderPassCreation) => "failed to create render pass",
            Self::Device(DeviceError::Encode) => "failed to encode render pass",
            Self::Device(DeviceError::Submit) => "failed to submit command buffer",
            Self::Device(DeviceError::Blit) => "failed to copy texture",
            Self::Device(DeviceError::Mipmaps) => "failed to generate mipmaps",
            Self::MissingBackdropContents => "backdrop filter produced no contents",
            Self::InvalidSubpassTarget => "subpass target has no pixels",
            Self::DelegateContract => {
                "group delegate refused to collapse but produced no subpass contents"
            }
            Self::MissingPassTexture => "pass texture is unavailable",
        }
    }
}
