// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device contract for GPU integrations.
//!
//! Strata never touches pixels or shader code. Everything it needs from the
//! GPU goes through the [`Device`] trait:
//!
//! - **Capabilities**: [`Capabilities`] is queried once per frame and
//!   decides between the framebuffer-fetch and pass-flush paths for advanced
//!   blends, whether offscreens may be multisampled, and how the root is
//!   copied back when it has to be double-buffered.
//!
//! - **Resources**: textures are allocated by descriptor. The device is free
//!   to serve them from a cache; [`Device::begin_frame`] and
//!   [`Device::end_frame`] bracket one frame so a cache can recycle them.
//!
//! - **Recording**: command buffers hold render passes, blits, and mipmap
//!   generation. Render passes receive [`DrawCommand`]s and an optional
//!   scissor. Nothing is visible to a texture read until the producing pass
//!   has been encoded and its command buffer submitted.
//!
//! # Crate boundaries
//!
//! `strata_core` owns this contract. `strata_render` drives it, and device
//! crates (or the in-memory `strata_harness::RecordingDevice`) implement it.

use thiserror::Error;

use crate::command::DrawCommand;
use crate::geometry::ScissorRect;
use crate::resource::{CommandBufferId, RenderPassId, RenderTarget, TextureDescriptor, TextureId};

/// Features a device may or may not support.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Shaders can read the destination color of the pass being rendered.
    pub supports_framebuffer_fetch: bool,
    /// Offscreen render targets may be multisampled.
    pub supports_offscreen_msaa: bool,
    /// Textures can be copied with a blit instead of a draw.
    pub supports_texture_to_texture_blit: bool,
    /// A resolve texture can be sampled while it is also being resolved into.
    pub supports_read_from_resolve: bool,
}

impl Capabilities {
    /// A desktop-class device with every feature.
    pub const FULL: Self = Self {
        supports_framebuffer_fetch: true,
        supports_offscreen_msaa: true,
        supports_texture_to_texture_blit: true,
        supports_read_from_resolve: true,
    };

    /// A device with none of the optional features.
    pub const MINIMAL: Self = Self {
        supports_framebuffer_fetch: false,
        supports_offscreen_msaa: false,
        supports_texture_to_texture_blit: false,
        supports_read_from_resolve: false,
    };
}

/// A resource or submission failure reported by a [`Device`].
///
/// Every variant is fatal to the frame being rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Texture allocation failed.
    #[error("failed to allocate texture `{0}`")]
    TextureAllocation(&'static str),
    /// Command buffer creation failed.
    #[error("failed to create command buffer")]
    CommandBufferCreation,
    /// Render pass creation failed.
    #[error("failed to create render pass")]
    RenderPassCreation,
    /// Encoding a render pass into its command buffer failed.
    #[error("failed to encode render pass")]
    Encode,
    /// Command buffer submission failed.
    #[error("failed to submit command buffer")]
    Submit,
    /// A texture-to-texture copy failed.
    #[error("failed to copy texture")]
    Blit,
    /// Mipmap generation failed.
    #[error("failed to generate mipmaps")]
    Mipmaps,
}

/// A GPU device that Strata records commands into.
///
/// All methods are synchronous; submission is fire-and-forget. Ordering is
/// the only synchronization the renderer relies on: a texture produced by a
/// submitted command buffer may be sampled by any later one.
pub trait Device {
    /// Returns the device's capabilities.
    fn capabilities(&self) -> Capabilities;

    /// Called before the first resource of a frame is requested.
    fn begin_frame(&mut self) {}

    /// Called after the last command buffer of a frame was submitted.
    fn end_frame(&mut self) {}

    /// Allocates a texture.
    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<TextureId, DeviceError>;

    /// Creates an empty command buffer.
    fn create_command_buffer(&mut self, label: &str) -> Result<CommandBufferId, DeviceError>;

    /// Begins a render pass on `target` within `cmd`.
    fn create_render_pass(
        &mut self,
        cmd: CommandBufferId,
        target: &RenderTarget,
        label: &str,
    ) -> Result<RenderPassId, DeviceError>;

    /// Restricts subsequent draws in `pass` to `scissor`, or removes the
    /// restriction.
    fn set_scissor(&mut self, pass: RenderPassId, scissor: Option<ScissorRect>);

    /// Records a draw into `pass`.
    fn draw(&mut self, pass: RenderPassId, command: DrawCommand);

    /// Finishes recording `pass` into its command buffer.
    fn encode_render_pass(&mut self, pass: RenderPassId) -> Result<(), DeviceError>;

    /// Records a copy of `src` into `dst`. Both textures have the same size.
    fn blit_copy(
        &mut self,
        cmd: CommandBufferId,
        src: TextureId,
        dst: TextureId,
    ) -> Result<(), DeviceError>;

    /// Records mipmap generation for `texture`.
    fn generate_mipmaps(&mut self, cmd: CommandBufferId, texture: TextureId)
    -> Result<(), DeviceError>;

    /// Submits `cmd`. The handle is invalid afterwards.
    fn submit(&mut self, cmd: CommandBufferId) -> Result<(), DeviceError>;
}
