// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Device`] for exercising renderers without a GPU.
//!
//! [`RecordingDevice`] hands out sequential handles, logs every call as a
//! [`DeviceCall`], and checks that passes and command buffers are used in a
//! valid order. Tests can choose the [`Capabilities`] it reports and make the
//! n-th texture, command buffer, or render pass creation fail.

#![no_std]

extern crate alloc;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use strata_core::command::DrawCommand;
use strata_core::geometry::ScissorRect;
use strata_core::resource::{
    CommandBufferId, RenderPassId, RenderTarget, TextureDescriptor, TextureId,
};
use strata_core::{Capabilities, Device, DeviceError};

/// One call made on a [`RecordingDevice`].
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCall {
    /// [`Device::begin_frame`].
    BeginFrame,
    /// [`Device::end_frame`].
    EndFrame,
    /// A texture was allocated.
    CreateTexture {
        /// Assigned handle.
        id: TextureId,
        /// Requested descriptor.
        desc: TextureDescriptor,
    },
    /// A command buffer was created.
    CreateCommandBuffer {
        /// Assigned handle.
        id: CommandBufferId,
        /// Debug label.
        label: String,
    },
    /// A render pass was begun.
    BeginPass {
        /// Assigned handle.
        pass: RenderPassId,
        /// Owning command buffer.
        cmd: CommandBufferId,
        /// Target as passed by the renderer.
        target: RenderTarget,
        /// Debug label.
        label: String,
    },
    /// The scissor of a pass changed.
    SetScissor {
        /// Pass.
        pass: RenderPassId,
        /// New scissor.
        scissor: Option<ScissorRect>,
    },
    /// A draw was recorded.
    Draw {
        /// Pass.
        pass: RenderPassId,
        /// The command.
        command: DrawCommand,
    },
    /// A pass was encoded.
    EncodePass {
        /// Pass.
        pass: RenderPassId,
    },
    /// A texture copy was recorded.
    Blit {
        /// Command buffer.
        cmd: CommandBufferId,
        /// Source texture.
        src: TextureId,
        /// Destination texture.
        dst: TextureId,
    },
    /// Mipmap generation was recorded.
    GenerateMipmaps {
        /// Command buffer.
        cmd: CommandBufferId,
        /// Texture.
        texture: TextureId,
    },
    /// A command buffer was submitted.
    Submit {
        /// Command buffer.
        cmd: CommandBufferId,
    },
}

/// Zero-based creation attempts that should fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailurePlan {
    /// Fail this texture allocation.
    pub texture: Option<usize>,
    /// Fail this command buffer creation.
    pub command_buffer: Option<usize>,
    /// Fail this render pass creation.
    pub render_pass: Option<usize>,
}

/// A [`Device`] that records calls instead of executing them.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    capabilities: Capabilities,
    failures: FailurePlan,
    calls: Vec<DeviceCall>,
    next_id: u64,
    texture_attempts: usize,
    command_buffer_attempts: usize,
    render_pass_attempts: usize,
    open_buffers: BTreeSet<CommandBufferId>,
    open_passes: BTreeMap<RenderPassId, CommandBufferId>,
}

impl RecordingDevice {
    /// Creates a device reporting `capabilities`.
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Changes the capabilities reported from now on.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    /// Sets which creation attempts fail.
    pub fn set_failures(&mut self, failures: FailurePlan) {
        self.failures = failures;
    }

    /// Allocates a caller-owned texture, such as the root render target,
    /// without logging it.
    pub fn external_texture(&mut self) -> TextureId {
        TextureId(self.next())
    }

    /// Returns every call in order.
    #[must_use]
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forgets all recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Returns the targets of every pass begun, in order.
    #[must_use]
    pub fn passes_begun(&self) -> Vec<&RenderTarget> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::BeginPass { target, .. } => Some(target),
                _ => None,
            })
            .collect()
    }

    /// Returns every draw command, in order.
    #[must_use]
    pub fn draws(&self) -> Vec<&DrawCommand> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Draw { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Returns the draw commands recorded into `pass`.
    #[must_use]
    pub fn draws_in(&self, pass: RenderPassId) -> Vec<&DrawCommand> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Draw { pass: p, command } if *p == pass => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Returns the descriptors of every texture allocated, in order.
    #[must_use]
    pub fn textures_created(&self) -> Vec<&TextureDescriptor> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::CreateTexture { desc, .. } => Some(desc),
                _ => None,
            })
            .collect()
    }

    /// Returns how many recorded calls satisfy `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    /// Returns `true` if every command buffer was submitted and every pass
    /// encoded.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.open_buffers.is_empty() && self.open_passes.is_empty()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn assert_pass_open(&self, pass: RenderPassId, op: &str) {
        assert!(
            self.open_passes.contains_key(&pass),
            "{op} on {pass:?}, which is not an open render pass"
        );
    }
}

impl Device for RecordingDevice {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn begin_frame(&mut self) {
        self.calls.push(DeviceCall::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.calls.push(DeviceCall::EndFrame);
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<TextureId, DeviceError> {
        let attempt = self.texture_attempts;
        self.texture_attempts += 1;
        if self.failures.texture == Some(attempt) {
            return Err(DeviceError::TextureAllocation(desc.label));
        }
        assert!(
            !desc.size.is_empty(),
            "texture `{}` requested with empty size {:?}",
            desc.label,
            desc.size
        );
        let id = TextureId(self.next());
        self.calls.push(DeviceCall::CreateTexture { id, desc: *desc });
        Ok(id)
    }

    fn create_command_buffer(&mut self, label: &str) -> Result<CommandBufferId, DeviceError> {
        let attempt = self.command_buffer_attempts;
        self.command_buffer_attempts += 1;
        if self.failures.command_buffer == Some(attempt) {
            return Err(DeviceError::CommandBufferCreation);
        }
        let id = CommandBufferId(self.next());
        self.open_buffers.insert(id);
        self.calls.push(DeviceCall::CreateCommandBuffer {
            id,
            label: label.to_string(),
        });
        Ok(id)
    }

    fn create_render_pass(
        &mut self,
        cmd: CommandBufferId,
        target: &RenderTarget,
        label: &str,
    ) -> Result<RenderPassId, DeviceError> {
        assert!(
            self.open_buffers.contains(&cmd),
            "render pass requested on {cmd:?}, which is not an open command buffer"
        );
        let attempt = self.render_pass_attempts;
        self.render_pass_attempts += 1;
        if self.failures.render_pass == Some(attempt) {
            return Err(DeviceError::RenderPassCreation);
        }
        let pass = RenderPassId(self.next());
        self.open_passes.insert(pass, cmd);
        self.calls.push(DeviceCall::BeginPass {
            pass,
            cmd,
            target: *target,
            label: label.to_string(),
        });
        Ok(pass)
    }

    fn set_scissor(&mut self, pass: RenderPassId, scissor: Option<ScissorRect>) {
        self.assert_pass_open(pass, "set_scissor");
        self.calls.push(DeviceCall::SetScissor { pass, scissor });
    }

    fn draw(&mut self, pass: RenderPassId, command: DrawCommand) {
        self.assert_pass_open(pass, "draw");
        self.calls.push(DeviceCall::Draw { pass, command });
    }

    fn encode_render_pass(&mut self, pass: RenderPassId) -> Result<(), DeviceError> {
        self.assert_pass_open(pass, "encode");
        self.open_passes.remove(&pass);
        self.calls.push(DeviceCall::EncodePass { pass });
        Ok(())
    }

    fn blit_copy(
        &mut self,
        cmd: CommandBufferId,
        src: TextureId,
        dst: TextureId,
    ) -> Result<(), DeviceError> {
        assert!(
            self.open_buffers.contains(&cmd),
            "blit recorded on {cmd:?}, which is not an open command buffer"
        );
        self.calls.push(DeviceCall::Blit { cmd, src, dst });
        Ok(())
    }

    fn generate_mipmaps(
        &mut self,
        cmd: CommandBufferId,
        texture: TextureId,
    ) -> Result<(), DeviceError> {
        assert!(
            self.open_buffers.contains(&cmd),
            "mipmaps recorded on {cmd:?}, which is not an open command buffer"
        );
        self.calls.push(DeviceCall::GenerateMipmaps { cmd, texture });
        Ok(())
    }

    fn submit(&mut self, cmd: CommandBufferId) -> Result<(), DeviceError> {
        assert!(
            self.open_buffers.remove(&cmd),
            "submit of {cmd:?}, which is not an open command buffer"
        );
        assert!(
            !self.open_passes.values().any(|c| *c == cmd),
            "submit of {cmd:?} while one of its render passes is still open"
        );
        self.calls.push(DeviceCall::Submit { cmd });
        Ok(())
    }
}
