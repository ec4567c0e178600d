// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render targets for passes and the lifetime of the passes drawn into them.

use core::fmt;

use strata_core::Device;
use strata_core::color::Color;
use strata_core::geometry::PixelSize;
use strata_core::resource::{
    ColorAttachment, CommandBufferId, LoadAction, RenderPassId, RenderTarget, StencilAttachment,
    StoreAction, TextureDescriptor, TextureFormat, TextureId, TextureUsage,
};

use crate::error::RenderError;

/// Parameters for allocating a render target.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TargetSpec {
    pub(crate) size: PixelSize,
    pub(crate) mip_count: u32,
    /// Premultiplied.
    pub(crate) clear_color: Color,
    pub(crate) sample_count: u8,
    pub(crate) stencil: bool,
    pub(crate) label: &'static str,
}

/// Allocates the textures of a render target.
///
/// Multisampled targets get a transient MSAA color texture that resolves into
/// a sampleable texture; single-sampled targets render straight into the
/// sampleable texture.
pub(crate) fn create_render_target(
    device: &mut dyn Device,
    spec: &TargetSpec,
) -> Result<RenderTarget, RenderError> {
    let mip_count = spec.mip_count.max(1);
    let resolved = TextureDescriptor {
        size: spec.size,
        format: TextureFormat::Rgba8,
        usage: TextureUsage::RENDER_TARGET_READ,
        sample_count: 1,
        mip_count,
        label: spec.label,
    };

    let color = if spec.sample_count > 1 {
        let msaa = device.create_texture(&TextureDescriptor {
            usage: TextureUsage::TRANSIENT_ATTACHMENT,
            sample_count: spec.sample_count,
            mip_count: 1,
            ..resolved
        })?;
        let resolve = device.create_texture(&resolved)?;
        ColorAttachment {
            texture: msaa,
            resolve_texture: Some(resolve),
            load_action: LoadAction::Clear,
            store_action: StoreAction::MultisampleResolve,
            clear_color: spec.clear_color,
            sample_count: spec.sample_count,
        }
    } else {
        ColorAttachment {
            texture: device.create_texture(&resolved)?,
            resolve_texture: None,
            load_action: LoadAction::Clear,
            store_action: StoreAction::Store,
            clear_color: spec.clear_color,
            sample_count: 1,
        }
    };

    let stencil = if spec.stencil {
        Some(StencilAttachment {
            texture: create_stencil_texture(device, spec.size, spec.sample_count)?,
            load_action: LoadAction::Clear,
            store_action: StoreAction::DontCare,
            clear_value: 0,
        })
    } else {
        None
    };

    Ok(RenderTarget {
        size: spec.size,
        color,
        stencil,
        mip_count,
    })
}

/// Allocates a transient stencil texture.
pub(crate) fn create_stencil_texture(
    device: &mut dyn Device,
    size: PixelSize,
    sample_count: u8,
) -> Result<TextureId, RenderError> {
    Ok(device.create_texture(&TextureDescriptor {
        size,
        format: TextureFormat::Stencil8,
        usage: TextureUsage::TRANSIENT_ATTACHMENT,
        sample_count: sample_count.max(1),
        mip_count: 1,
        label: "stencil",
    })?)
}

/// A render target that can be drawn into by several passes in a row.
///
/// A multisampled target loses its MSAA contents between passes. Reopening
/// it means redrawing the previous result from the resolve texture, which
/// must not also be the texture being resolved into unless the device allows
/// reading from it. [`flip`](Self::flip) handles that by swapping in a
/// secondary resolve texture.
#[derive(Clone, Copy, Debug)]
pub struct PassTarget {
    target: RenderTarget,
    secondary_resolve: Option<TextureId>,
    supports_read_from_resolve: bool,
}

impl PassTarget {
    /// Wraps a render target.
    #[must_use]
    pub fn new(target: RenderTarget, supports_read_from_resolve: bool) -> Self {
        Self {
            target,
            secondary_resolve: None,
            supports_read_from_resolve,
        }
    }

    /// Returns the render target passes are opened on.
    #[must_use]
    pub fn render_target(&self) -> &RenderTarget {
        &self.target
    }

    /// Returns the texture holding the rendered result.
    #[must_use]
    pub fn texture(&self) -> TextureId {
        self.target.render_target_texture()
    }

    /// Prepares the target for another pass and returns the texture that
    /// holds the previous result.
    ///
    /// Single-sampled targets keep their contents and return the color
    /// texture itself.
    pub fn flip(&mut self, device: &mut dyn Device) -> Result<TextureId, RenderError> {
        let Some(resolve) = self.target.color.resolve_texture else {
            return Ok(self.target.color.texture);
        };
        if self.supports_read_from_resolve {
            return Ok(resolve);
        }
        let secondary = match self.secondary_resolve {
            Some(texture) => texture,
            None => device.create_texture(&TextureDescriptor {
                size: self.target.size,
                format: TextureFormat::Rgba8,
                usage: TextureUsage::RENDER_TARGET_READ,
                sample_count: 1,
                mip_count: self.target.mip_count,
                label: "secondary resolve",
            })?,
        };
        self.target.color.resolve_texture = Some(secondary);
        self.secondary_resolve = Some(resolve);
        Ok(resolve)
    }
}

/// Lifecycle of the pass a [`PassContext`] records into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassState {
    /// No pass has been opened yet.
    Unopened,
    /// A pass is being recorded.
    Active {
        /// Command buffer holding the pass.
        cmd: CommandBufferId,
        /// The pass.
        pass: RenderPassId,
    },
    /// The last pass was submitted and its texture is readable.
    Ended,
}

/// The pass returned by [`PassContext::render_pass`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderPassResult {
    /// The active pass.
    pub pass: RenderPassId,
    /// `true` if the pass was opened by this call.
    pub just_created: bool,
    /// `true` if an earlier pass on the same target was ended first.
    pub reopened: bool,
    /// Previous contents that must be redrawn before anything else.
    pub backdrop_texture: Option<TextureId>,
    /// Color load action the pass was opened with.
    pub load_action: LoadAction,
}

/// Owns the sequence of passes drawn into one [`PassTarget`].
///
/// Passes are opened lazily and can be ended early so their texture can be
/// sampled; the next request opens a fresh pass that loads the previous
/// contents.
pub struct PassContext {
    target: PassTarget,
    state: PassState,
    pass_count: u32,
    label: &'static str,
}

impl fmt::Debug for PassContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassContext")
            .field("state", &self.state)
            .field("pass_count", &self.pass_count)
            .field("size", &self.target.target.size)
            .finish_non_exhaustive()
    }
}

impl PassContext {
    /// Creates a context for `target`. No pass is opened yet.
    #[must_use]
    pub fn new(target: PassTarget, label: &'static str) -> Self {
        Self {
            target,
            state: PassState::Unopened,
            pass_count: 0,
            label,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PassState {
        self.state
    }

    /// Returns `true` if a pass is being recorded.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, PassState::Active { .. })
    }

    /// Returns how many passes have been opened.
    #[must_use]
    pub fn pass_count(&self) -> u32 {
        self.pass_count
    }

    /// Returns the target.
    #[must_use]
    pub fn target(&self) -> &PassTarget {
        &self.target
    }

    /// Returns the size of the target.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.target.target.size
    }

    /// Returns the active pass, opening one if needed.
    ///
    /// The first pass clears the target. Later passes load the previous
    /// contents, except on multisampled targets, where the previous result
    /// comes back as [`RenderPassResult::backdrop_texture`] and the caller
    /// redraws it.
    pub fn render_pass(
        &mut self,
        device: &mut dyn Device,
    ) -> Result<RenderPassResult, RenderError> {
        if let PassState::Active { pass, .. } = self.state {
            return Ok(RenderPassResult {
                pass,
                just_created: false,
                reopened: false,
                backdrop_texture: None,
                load_action: LoadAction::Load,
            });
        }

        let reopened = self.pass_count > 0;
        let is_msaa = self.target.target.is_msaa();
        let backdrop_texture = if reopened && is_msaa {
            Some(self.target.flip(device)?)
        } else {
            None
        };

        let cmd = device.create_command_buffer(self.label)?;
        let mut target = self.target.target;
        target.color.load_action = match (reopened, is_msaa) {
            (false, _) => LoadAction::Clear,
            (true, true) => LoadAction::DontCare,
            (true, false) => LoadAction::Load,
        };
        target.color.store_action = if is_msaa {
            StoreAction::MultisampleResolve
        } else {
            StoreAction::Store
        };
        if let Some(stencil) = &mut target.stencil {
            stencil.load_action = LoadAction::Clear;
            stencil.store_action = StoreAction::DontCare;
        }

        let pass = device.create_render_pass(cmd, &target, self.label)?;
        self.state = PassState::Active { cmd, pass };
        self.pass_count += 1;
        Ok(RenderPassResult {
            pass,
            just_created: true,
            reopened,
            backdrop_texture,
            load_action: target.color.load_action,
        })
    }

    /// Encodes and submits the active pass.
    ///
    /// Returns `Ok(false)` if there was no active pass. Calling this more than
    /// once is fine.
    pub fn end_pass(&mut self, device: &mut dyn Device) -> Result<bool, RenderError> {
        let PassState::Active { cmd, pass } = self.state else {
            return Ok(false);
        };
        self.state = PassState::Ended;
        device.encode_render_pass(pass)?;
        if self.target.target.mip_count > 1 {
            device.generate_mipmaps(cmd, self.target.texture())?;
        }
        device.submit(cmd)?;
        Ok(true)
    }

    /// Ends the active pass, if any, and returns the rendered texture.
    pub fn texture(&mut self, device: &mut dyn Device) -> Result<TextureId, RenderError> {
        if self.pass_count == 0 {
            return Err(RenderError::MissingPassTexture);
        }
        self.end_pass(device)?;
        Ok(self.target.texture())
    }

    /// Ends the active pass, if any, and returns the target.
    pub fn finish(mut self, device: &mut dyn Device) -> Result<PassTarget, RenderError> {
        self.end_pass(device)?;
        Ok(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Capabilities;
    use strata_harness::{DeviceCall, FailurePlan, RecordingDevice};

    fn spec(sample_count: u8) -> TargetSpec {
        TargetSpec {
            size: PixelSize::new(16, 16),
            mip_count: 1,
            clear_color: Color::TRANSPARENT,
            sample_count,
            stencil: true,
            label: "test",
        }
    }

    fn context(
        device: &mut RecordingDevice,
        sample_count: u8,
        read_from_resolve: bool,
    ) -> PassContext {
        let target = create_render_target(device, &spec(sample_count)).unwrap();
        PassContext::new(PassTarget::new(target, read_from_resolve), "test")
    }

    #[test]
    fn msaa_targets_resolve_into_a_readable_texture() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = create_render_target(&mut device, &spec(4)).unwrap();
        assert!(target.is_msaa());
        assert_eq!(target.color.store_action, StoreAction::MultisampleResolve);
        let created = device.textures_created();
        assert_eq!(created.len(), 3);
        assert_eq!(created[0].sample_count, 4);
        assert!(created[1].usage.shader_read);
        assert_eq!(created[2].format, TextureFormat::Stencil8);
        assert_eq!(created[2].sample_count, 4);
    }

    #[test]
    fn first_pass_clears_and_later_passes_load() {
        let mut device = RecordingDevice::default();
        let mut ctx = context(&mut device, 1, false);
        assert_eq!(ctx.state(), PassState::Unopened);

        let first = ctx.render_pass(&mut device).unwrap();
        assert!(first.just_created);
        assert!(!first.reopened);
        assert_eq!(first.load_action, LoadAction::Clear);

        let again = ctx.render_pass(&mut device).unwrap();
        assert!(!again.just_created);
        assert_eq!(again.pass, first.pass);

        ctx.texture(&mut device).unwrap();
        assert_eq!(ctx.state(), PassState::Ended);

        let second = ctx.render_pass(&mut device).unwrap();
        assert!(second.just_created);
        assert!(second.reopened);
        assert_eq!(second.load_action, LoadAction::Load);
        assert_eq!(second.backdrop_texture, None);
        assert_eq!(ctx.pass_count(), 2);

        let targets = device.passes_begun();
        assert_eq!(targets[1].color.load_action, LoadAction::Load);
        assert_eq!(
            targets[1].stencil.map(|s| s.load_action),
            Some(LoadAction::Clear)
        );
    }

    #[test]
    fn end_pass_is_idempotent() {
        let mut device = RecordingDevice::default();
        let mut ctx = context(&mut device, 1, false);
        assert!(!ctx.end_pass(&mut device).unwrap());
        ctx.render_pass(&mut device).unwrap();
        assert!(ctx.end_pass(&mut device).unwrap());
        assert!(!ctx.end_pass(&mut device).unwrap());
        assert_eq!(
            device.count(|c| matches!(c, DeviceCall::Submit { .. })),
            1
        );
        assert!(device.is_idle());
    }

    #[test]
    fn texture_before_any_pass_is_an_error() {
        let mut device = RecordingDevice::default();
        let mut ctx = context(&mut device, 1, false);
        assert_eq!(ctx.texture(&mut device), Err(RenderError::MissingPassTexture));
    }

    #[test]
    fn reopened_msaa_pass_flips_and_redraws() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let mut ctx = context(&mut device, 4, false);
        ctx.render_pass(&mut device).unwrap();
        let first_texture = ctx.texture(&mut device).unwrap();

        let reopened = ctx.render_pass(&mut device).unwrap();
        assert_eq!(reopened.load_action, LoadAction::DontCare);
        assert_eq!(reopened.backdrop_texture, Some(first_texture));
        assert_ne!(ctx.target().texture(), first_texture);

        // Flipping again swaps back to the original resolve texture.
        ctx.texture(&mut device).unwrap();
        let third = ctx.render_pass(&mut device).unwrap();
        assert_eq!(ctx.target().texture(), first_texture);
        assert_ne!(third.backdrop_texture, Some(first_texture));
        // Only one secondary resolve texture is ever allocated.
        assert_eq!(device.textures_created().len(), 4);
    }

    #[test]
    fn read_from_resolve_skips_the_flip() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let mut ctx = context(&mut device, 4, true);
        ctx.render_pass(&mut device).unwrap();
        let texture = ctx.texture(&mut device).unwrap();
        let reopened = ctx.render_pass(&mut device).unwrap();
        assert_eq!(reopened.backdrop_texture, Some(texture));
        assert_eq!(ctx.target().texture(), texture);
        assert_eq!(device.textures_created().len(), 3);
    }

    #[test]
    fn mipmaps_are_generated_on_end() {
        let mut device = RecordingDevice::default();
        let target = create_render_target(
            &mut device,
            &TargetSpec {
                mip_count: 4,
                ..spec(1)
            },
        )
        .unwrap();
        let mut ctx = PassContext::new(PassTarget::new(target, false), "mips");
        ctx.render_pass(&mut device).unwrap();
        ctx.finish(&mut device).unwrap();
        assert_eq!(
            device.count(|c| matches!(c, DeviceCall::GenerateMipmaps { .. })),
            1
        );
    }

    #[test]
    fn pass_creation_failure_propagates() {
        let mut device = RecordingDevice::default();
        let mut ctx = context(&mut device, 1, false);
        device.set_failures(FailurePlan {
            render_pass: Some(0),
            ..FailurePlan::default()
        });
        assert_eq!(
            ctx.render_pass(&mut device),
            Err(RenderError::Device(strata_core::DeviceError::RenderPassCreation))
        );
        assert_eq!(ctx.state(), PassState::Unopened);
    }
}
