// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete [`Drawable`](crate::Drawable) implementations.
//!
//! Each type maps onto one [`DrawKind`](strata_core::command::DrawKind).
//! Tessellation and shading happen behind the device; contents only answer
//! coverage and clip questions and emit commands.

mod clip;
mod filter;
mod framebuffer_blend;
mod gradient;
mod solid;
mod text;
mod texture;

pub use clip::{ClipContents, ClipRestoreContents};
pub use filter::{BackdropFilterProc, FilterContents, FilterInput};
pub use framebuffer_blend::FramebufferBlendContents;
pub use gradient::LinearGradientContents;
pub use solid::SolidColorContents;
pub use text::TextContents;
pub use texture::TextureContents;
