// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pass composition and clip coverage tracking.
//!
//! `strata_render` turns a tree of [`Group`]s and [`DrawItem`]s into render
//! passes and draw commands on a [`Device`](strata_core::Device). It decides
//! which groups need an offscreen target and which can be flattened into
//! their parent, keeps the stencil buffer of every pass in step with the
//! logical clip depth, and falls back to extra passes for advanced blend
//! modes on devices that cannot read the destination in-shader.
//!
//! # Overview
//!
//! ```text
//!   Group ─┬─ Element::Item(DrawItem { contents: Arc<dyn Drawable>, .. })
//!          └─ Element::Group(Group { delegate, .. })
//!                       │
//!                       ▼
//!   Renderer::render ──► PassContext (one per target) ──► Device
//!                       │
//!                       └─► ClipCoverageStack (one frame per target)
//! ```
//!
//! - [`drawable`]: the [`Drawable`] trait and the context it renders into.
//! - [`contents`]: solid fills, gradients, textures, text, clips, filters.
//! - [`element`] and [`group`]: the tree.
//! - [`delegate`]: per-group elide/collapse/composite policy.
//! - [`clip_stack`]: clip coverage bookkeeping and replay.
//! - [`pass_context`]: render targets and the passes drawn into them.
//! - [`Renderer`]: the traversal.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use strata_core::geometry::Shape;
//! use strata_core::kurbo::Rect;
//! use strata_core::resource::RenderTarget;
//! use strata_core::{Capabilities, Color};
//! use strata_harness::RecordingDevice;
//! use strata_render::contents::SolidColorContents;
//! use strata_render::{DrawItem, Group, RenderConfig, Renderer};
//!
//! let mut root = Group::new();
//! root.add_item(DrawItem::new(Arc::new(SolidColorContents::new(
//!     Shape::Rect(Rect::new(10.0, 10.0, 50.0, 50.0)),
//!     Color::RED,
//! ))));
//!
//! let mut device = RecordingDevice::new(Capabilities::FULL);
//! let texture = device.external_texture();
//! let target = RenderTarget::new(strata_core::geometry::PixelSize::new(64, 64), texture);
//!
//! let mut renderer = Renderer::new(&mut device, RenderConfig::DEFAULT);
//! renderer.render(&root, &target).unwrap();
//! assert_eq!(renderer.last_summary().unwrap().draws, 1);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Forwards rendering events to the
//!   renderer's [`Tracer`](strata_core::trace::Tracer).
//! - `trace-rich` (disabled by default, implies `trace`): Also reports every
//!   clip stack transition.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clip_stack;
pub mod contents;
pub mod delegate;
pub mod drawable;
pub mod element;
pub mod group;
pub mod pass_context;

mod config;
mod error;
mod render;

pub use clip_stack::{ClipCoverageStack, ClipStateResult};
pub use config::RenderConfig;
pub use delegate::{DefaultDelegate, GroupDelegate, OpacityDelegate, OpacityPeepholeDelegate};
pub use drawable::{ClipCoverage, ClipCoverageKind, Drawable, RenderContext, Snapshot};
pub use element::{DrawItem, Element};
pub use error::RenderError;
pub use group::{ContentBoundsPromise, Group};
pub use render::Renderer;
