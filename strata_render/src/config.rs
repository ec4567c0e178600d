// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer configuration.

use strata_core::Capabilities;

/// Configuration for a [`Renderer`](crate::Renderer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Sample count for offscreen targets when the device supports MSAA
    /// offscreens. Values of 0 or 1 disable MSAA.
    pub msaa_sample_count: u8,
    /// Fold leading full-target solid fills into the clear color.
    pub collapse_clear_colors: bool,
    /// Attach debug labels to command buffers, passes, and textures.
    pub label_passes: bool,
}

impl RenderConfig {
    /// 4x MSAA offscreens, clear-color collapsing, and labels.
    pub const DEFAULT: Self = Self {
        msaa_sample_count: 4,
        collapse_clear_colors: true,
        label_passes: true,
    };

    /// Single-sampled offscreens without labels.
    #[must_use]
    pub const fn low_memory() -> Self {
        Self {
            msaa_sample_count: 1,
            collapse_clear_colors: true,
            label_passes: false,
        }
    }

    /// Returns the sample count to use for offscreen targets on a device.
    #[must_use]
    pub const fn offscreen_sample_count(&self, capabilities: Capabilities) -> u8 {
        if capabilities.supports_offscreen_msaa && self.msaa_sample_count > 1 {
            self.msaa_sample_count
        } else {
            1
        }
    }

    /// Returns `label`, or an empty label when labels are disabled.
    #[must_use]
    pub const fn label(&self, label: &'static str) -> &'static str {
        if self.label_passes { label } else { "" }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
