// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types and the GPU device contract for pass-composing renderers.
//!
//! `strata_core` provides the vocabulary shared by the renderer, its devices,
//! and its diagnostics. It is `no_std` compatible (with `alloc`) and uses
//! [`kurbo`] for all floating-point geometry.
//!
//! # Architecture
//!
//! A frame flows from a group tree, through the renderer, into a device:
//!
//! ```text
//!   Group tree (strata_render)
//!       │
//!       ▼
//!   Renderer ──► Device::create_render_pass() ──► RenderPassId
//!       │                                             │
//!       ├──► Device::draw(DrawCommand) ◄──────────────┘
//!       │
//!       ▼
//!   Device::encode_render_pass() ──► Device::submit()
//!       │
//!       ▼
//!   TraceSink (strata_debug)
//! ```
//!
//! **[`geometry`]**: Pixel sizes, scissors, shapes, and `Option<Rect>`
//! coverage helpers.
//!
//! **[`color`]**: Straight-alpha colors with CPU Porter-Duff blending.
//!
//! **[`blend`]**: Pipeline and advanced blend modes.
//!
//! **[`resource`]**: Opaque GPU handles, texture descriptors, attachments,
//! and render targets.
//!
//! **[`command`]**: Draw commands and stencil modes.
//!
//! **[`backend`]**: The [`Device`](backend::Device) trait, its
//! [`Capabilities`](backend::Capabilities), and
//! [`DeviceError`](backend::DeviceError).
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! render instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-transition
//!   clip events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod blend;
pub mod color;
pub mod command;
pub mod geometry;
pub mod resource;
pub mod trace;

pub use kurbo;

pub use backend::{Capabilities, Device, DeviceError};
pub use blend::BlendMode;
pub use color::Color;
