// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering a group tree into a render target.
//!
//! The [`Renderer`] walks a [`Group`] depth first. Draw items go straight
//! into the current pass after the clip stack has had its say. Child groups
//! are elided, collapsed into the current pass, or rendered into an
//! offscreen target that is then composited like any other item.
//!
//! Advanced blend modes need the destination. With framebuffer fetch the
//! shader reads it directly. Without it the current pass is ended so its
//! texture is complete, and the blend is drawn into a fresh pass that samples
//! it. Reading the texture before the pass ends would see stale contents.

use alloc::sync::Arc;
use alloc::vec;
use core::fmt;

use kurbo::{Affine, Rect, Vec2};
use strata_core::command::{DrawCommand, DrawKind, StencilMode};
use strata_core::geometry::{self, PixelSize, ScissorRect};
use strata_core::resource::{LoadAction, RenderPassId, RenderTarget, TextureId};
use strata_core::trace::{
    AdvancedBlendEvent, BlendStrategy, FrameBeginEvent, FrameEndEvent, FrameSummary,
    FrameSummaryBuilder, PassBeginEvent, PassEndEvent, SubpassDisposition, SubpassEvent, Tracer,
    ValidationEvent,
};
use strata_core::{BlendMode, Capabilities, Color, Device};

use crate::clip_stack::{ClipCoverageStack, ClipStateResult};
use crate::config::RenderConfig;
use crate::contents::{FilterContents, FilterInput, FramebufferBlendContents};
use crate::drawable::{ClipCoverage, Drawable, RenderContext};
use crate::element::{DrawItem, Element};
use crate::error::RenderError;
use crate::group::Group;
use crate::pass_context::{
    PassContext, PassTarget, TargetSpec, create_render_target, create_stencil_texture,
};

/// Where a pass sits: its root-space origin and offscreen nesting depth.
#[derive(Clone, Copy, Debug)]
struct PassPosition {
    global: Vec2,
    depth: u32,
}

/// What an element turned into.
enum Resolved {
    /// A pass-space item to draw.
    Item(DrawItem),
    /// Nothing to draw.
    Skip,
    /// A group whose elements were already drawn into the current pass.
    Collapsed,
}

/// State that lives for one frame.
#[derive(Debug)]
struct FrameState {
    capabilities: Capabilities,
    root_size: PixelSize,
    summary: FrameSummaryBuilder,
}

/// Renders group trees through a [`Device`].
///
/// Device capabilities are queried at the start of every frame; nothing is
/// carried over between frames except the frame counter.
pub struct Renderer<'a> {
    device: &'a mut dyn Device,
    tracer: Tracer<'a>,
    config: RenderConfig,
    frame_index: u64,
    frame: FrameState,
    last_summary: Option<FrameSummary>,
}

impl fmt::Debug for Renderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("frame_index", &self.frame_index)
            .field("last_summary", &self.last_summary)
            .finish_non_exhaustive()
    }
}

impl<'a> Renderer<'a> {
    /// Creates a renderer that draws through `device`.
    #[must_use]
    pub fn new(device: &'a mut dyn Device, config: RenderConfig) -> Self {
        Self {
            device,
            tracer: Tracer::none(),
            config,
            frame_index: 0,
            frame: FrameState {
                capabilities: Capabilities::MINIMAL,
                root_size: PixelSize::ZERO,
                summary: FrameSummaryBuilder::new(0),
            },
            last_summary: None,
        }
    }

    /// Reports rendering events to `tracer`.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer<'a>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Returns the index of the last frame started.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns the work summary of the last finished frame.
    #[must_use]
    pub fn last_summary(&self) -> Option<&FrameSummary> {
        self.last_summary.as_ref()
    }

    /// Renders `root` into `target`.
    ///
    /// Any failure aborts the frame. Whatever was submitted before the
    /// failure stays submitted; nothing else is drawn.
    pub fn render(&mut self, root: &Group, target: &RenderTarget) -> Result<(), RenderError> {
        self.frame_index += 1;
        let capabilities = self.device.capabilities();
        self.frame = FrameState {
            capabilities,
            root_size: target.size,
            summary: FrameSummaryBuilder::new(self.frame_index),
        };
        self.device.begin_frame();

        let double_buffered = root.total_pass_reads(capabilities) > 0;
        self.tracer.frame_begin(&FrameBeginEvent {
            frame_index: self.frame_index,
            target_size: target.size,
            capabilities,
            double_buffered,
        });

        let result = if double_buffered {
            self.render_double_buffered(root, target)
        } else {
            self.render_direct(root, target)
        };
        if let Err(err) = &result {
            self.tracer.validation(&ValidationEvent {
                frame_index: self.frame_index,
                message: err.message(),
            });
        }

        self.device.end_frame();
        let summary = core::mem::replace(&mut self.frame.summary, FrameSummaryBuilder::new(0))
            .finish();
        self.tracer.frame_summary(&summary);
        self.last_summary = Some(summary);
        self.tracer.frame_end(&FrameEndEvent {
            frame_index: self.frame_index,
            ok: result.is_ok(),
        });
        result
    }

    fn root_clear_color(&self, root: &Group, target: &RenderTarget) -> Color {
        if self.config.collapse_clear_colors {
            root.clear_color_or_default(target.size, Vec2::ZERO)
        } else {
            target.color.clear_color
        }
    }

    fn render_direct(&mut self, root: &Group, target: &RenderTarget) -> Result<(), RenderError> {
        let mut target = *target;
        target.color.clear_color = self.root_clear_color(root, &target);
        if target.stencil.is_none() {
            let stencil =
                create_stencil_texture(&mut *self.device, target.size, target.color.sample_count)?;
            target = target.with_stencil(stencil);
        }

        let mut clip_stack = ClipCoverageStack::new(Some(target.size.to_rect()));
        let pass_target =
            PassTarget::new(target, self.frame.capabilities.supports_read_from_resolve);
        self.render_into_target(
            root,
            pass_target,
            PassPosition {
                global: Vec2::ZERO,
                depth: 0,
            },
            &mut clip_stack,
            None,
        )?;
        Ok(())
    }

    /// Renders the root offscreen, then copies the result into `target`.
    ///
    /// Needed when the root reads back its own pass, which the caller's
    /// target may not allow.
    fn render_double_buffered(
        &mut self,
        root: &Group,
        target: &RenderTarget,
    ) -> Result<(), RenderError> {
        let capabilities = self.frame.capabilities;
        let clear_color = self.root_clear_color(root, target);
        let offscreen = create_render_target(
            &mut *self.device,
            &TargetSpec {
                size: target.size,
                mip_count: root.required_mip_count(),
                clear_color,
                sample_count: self.config.offscreen_sample_count(capabilities),
                stencil: true,
                label: self.config.label("root offscreen"),
            },
        )?;
        self.frame.summary.offscreen_target();

        let mut clip_stack = ClipCoverageStack::new(Some(target.size.to_rect()));
        let rendered = self.render_into_target(
            root,
            PassTarget::new(offscreen, capabilities.supports_read_from_resolve),
            PassPosition {
                global: Vec2::ZERO,
                depth: 0,
            },
            &mut clip_stack,
            None,
        )?;

        let label = self.config.label("root copy");
        let cmd = self.device.create_command_buffer(label)?;
        if capabilities.supports_texture_to_texture_blit {
            self.device
                .blit_copy(cmd, rendered.texture(), target.render_target_texture())?;
        } else {
            let mut copy_target = *target;
            copy_target.color.load_action = LoadAction::DontCare;
            let pass = self.device.create_render_pass(cmd, &copy_target, label)?;
            self.frame.summary.pass_opened();
            self.tracer.pass_begin(&PassBeginEvent {
                frame_index: self.frame_index,
                pass_depth: 0,
                pass_count: 0,
                load_action: LoadAction::DontCare,
                size: target.size,
                backdrop_restored: false,
            });
            self.draw_full_target(pass, rendered.texture(), target.size, label);
            self.device.encode_render_pass(pass)?;
            self.tracer.pass_end(&PassEndEvent {
                frame_index: self.frame_index,
                pass_depth: 0,
                pass_count: 1,
                mipmaps: false,
            });
        }
        self.device.submit(cmd)?;
        Ok(())
    }

    /// Draws `texture` over the whole pass, replacing what is there.
    fn draw_full_target(
        &mut self,
        pass: RenderPassId,
        texture: TextureId,
        size: PixelSize,
        label: &'static str,
    ) {
        let full = size.to_rect();
        self.device.draw(
            pass,
            DrawCommand::new(
                DrawKind::Texture {
                    texture,
                    source_rect: full,
                    dest_rect: full,
                    opacity: 1.0,
                },
                Affine::IDENTITY,
                0,
            )
            .with_blend_mode(BlendMode::Source)
            .with_stencil(StencilMode::Ignore)
            .with_bounds(Some(full))
            .with_label(label),
        );
        self.frame.summary.draw();
    }

    /// Renders `group` into its own target and returns the target once the
    /// last pass on it has been submitted.
    ///
    /// `backdrop` is drawn first, translated from the parent pass by the
    /// given offset.
    fn render_into_target(
        &mut self,
        group: &Group,
        target: PassTarget,
        position: PassPosition,
        clip_stack: &mut ClipCoverageStack,
        backdrop: Option<(Arc<dyn Drawable>, Vec2)>,
    ) -> Result<PassTarget, RenderError> {
        let label = self
            .config
            .label(if position.depth == 0 { "root" } else { "subpass" });
        let mut ctx = PassContext::new(target, label);
        // Open the pass even if nothing is drawn so the target is cleared.
        let pass = self.active_pass(&mut ctx, clip_stack, position)?;

        if let Some((contents, local_position)) = backdrop {
            let item = DrawItem::new(contents).with_transform(Affine::translate(-local_position));
            let mut render_ctx = RenderContext {
                device: &mut *self.device,
                pass,
                target_size: ctx.size(),
                stencil_reference: clip_stack.current_stencil_reference(),
            };
            item.render(&mut render_ctx)?;
            self.frame.summary.draw();
        }

        self.render_elements(group, &mut ctx, clip_stack, position, 1.0, false)?;
        self.end_pass(&mut ctx, position)?;
        ctx.finish(&mut *self.device)
    }

    fn render_elements(
        &mut self,
        group: &Group,
        ctx: &mut PassContext,
        clip_stack: &mut ClipCoverageStack,
        position: PassPosition,
        opacity: f32,
        collapsed: bool,
    ) -> Result<(), RenderError> {
        // Leading full-target fills were folded into the clear color when
        // the target was created.
        let skip = if !collapsed && self.config.collapse_clear_colors {
            group.clear_color_prefix(ctx.size(), position.global).0
        } else {
            0
        };

        for element in group.elements().iter().skip(skip) {
            let item = match self.resolve_element(element, ctx, clip_stack, position, opacity)? {
                Resolved::Item(item) => item,
                Resolved::Skip => {
                    self.frame.summary.skipped();
                    continue;
                }
                Resolved::Collapsed => continue,
            };
            let item = if item.blend_mode.is_advanced() {
                self.resolve_advanced_blend(item, ctx, position)?
            } else {
                item
            };
            self.render_element(item, ctx, clip_stack, position)?;
        }
        Ok(())
    }

    fn resolve_element(
        &mut self,
        element: &Element,
        ctx: &mut PassContext,
        clip_stack: &mut ClipCoverageStack,
        position: PassPosition,
        opacity: f32,
    ) -> Result<Resolved, RenderError> {
        let child = match element {
            Element::Item(item) => {
                let item = if opacity < 1.0 {
                    item.with_inherited_opacity(opacity)
                } else {
                    item.clone()
                };
                return Ok(Resolved::Item(item.translated(-position.global)));
            }
            Element::Group(child) => child,
        };

        let delegate = child.delegate();
        if delegate.can_elide() {
            self.trace_subpass(position, SubpassDisposition::Elided, None);
            return Ok(Resolved::Skip);
        }

        if child.collapses_into_parent_pass() {
            self.trace_subpass(position, SubpassDisposition::Collapsed, None);
            self.render_elements(
                child,
                ctx,
                clip_stack,
                position,
                opacity * delegate.inherited_opacity(),
                true,
            )?;
            return Ok(Resolved::Collapsed);
        }

        let backdrop = match child.backdrop_filter() {
            Some(proc) => {
                // The parent pass must exist, so its texture is at least
                // cleared, and must end before the texture is read.
                self.active_pass(ctx, clip_stack, position)?;
                self.end_pass(ctx, position)?;
                let texture = ctx.texture(&mut *self.device)?;
                self.frame.summary.pass_flush();
                let contents = proc(FilterInput::Texture {
                    texture,
                    size: ctx.size(),
                    transform: Affine::IDENTITY,
                })
                .ok_or(RenderError::MissingBackdropContents)?;
                Some(contents)
            }
            None => None,
        };

        if !clip_stack.has_coverage() {
            self.trace_subpass(position, SubpassDisposition::EmptyClip, None);
            return Ok(Resolved::Skip);
        }

        let pass_rect = ctx.size().to_rect() + position.global;
        let limit =
            geometry::intersect_coverage(Some(pass_rect), clip_stack.current_clip_coverage());
        let limit = geometry::intersect_coverage(limit, Some(self.frame.root_size.to_rect()));
        let coverage = if child.flood_clip() || backdrop.is_some() {
            limit
        } else {
            geometry::intersect_coverage(Group::subpass_coverage(child, limit), limit)
        };
        let Some(coverage) = coverage.map(Rect::expand) else {
            self.trace_subpass(position, SubpassDisposition::EmptyCoverage, None);
            return Ok(Resolved::Skip);
        };
        if !coverage.is_finite() {
            return Err(RenderError::InvalidSubpassTarget);
        }
        let size = PixelSize::from_rect_ceil(coverage);
        if size.is_empty() {
            self.trace_subpass(position, SubpassDisposition::EmptyCoverage, None);
            return Ok(Resolved::Skip);
        }

        let child_global = coverage.origin().to_vec2();
        let clear_color = if self.config.collapse_clear_colors {
            child.clear_color_or_default(size, child_global)
        } else {
            Color::TRANSPARENT
        };
        let capabilities = self.frame.capabilities;
        let target = create_render_target(
            &mut *self.device,
            &TargetSpec {
                size,
                mip_count: child.required_mip_count(),
                clear_color,
                sample_count: self.config.offscreen_sample_count(capabilities),
                stencil: true,
                label: self.config.label("subpass"),
            },
        )?;
        self.frame.summary.offscreen_target();
        self.trace_subpass(position, SubpassDisposition::Offscreen, Some(coverage));

        clip_stack.push_subpass(Some(coverage), child.clip_depth());
        let rendered = self.render_into_target(
            child,
            PassTarget::new(target, capabilities.supports_read_from_resolve),
            PassPosition {
                global: child_global,
                depth: position.depth + 1,
            },
            clip_stack,
            backdrop.map(|contents| (contents, child_global - position.global)),
        );
        clip_stack.pop_subpass();
        let rendered = rendered?;

        let contents = delegate
            .create_contents_for_subpass_target(
                rendered.texture(),
                size,
                Affine::translate(-position.global) * child.transform(),
            )
            .ok_or(RenderError::DelegateContract)?;
        Ok(Resolved::Item(DrawItem {
            transform: Affine::translate(child_global - position.global),
            blend_mode: child.blend_mode(),
            clip_depth: child.clip_depth(),
            contents,
            coverage_hint: None,
        }))
    }

    /// Rewrites an advanced-blend item into something the device can draw.
    fn resolve_advanced_blend(
        &mut self,
        mut item: DrawItem,
        ctx: &mut PassContext,
        position: PassPosition,
    ) -> Result<DrawItem, RenderError> {
        let mode = item.blend_mode;
        let strategy = if self.frame.capabilities.supports_framebuffer_fetch {
            item.contents = Arc::new(FramebufferBlendContents::new(item.contents, mode));
            BlendStrategy::FramebufferFetch
        } else {
            // Everything drawn so far has to land in the texture before the
            // blend samples it.
            self.end_pass(ctx, position)?;
            let texture = ctx.texture(&mut *self.device)?;
            self.frame.summary.pass_flush();
            let coverage = item.coverage();
            let filter = FilterContents::blend(
                mode,
                vec![
                    FilterInput::Texture {
                        texture,
                        size: ctx.size(),
                        transform: item.transform.inverse(),
                    },
                    FilterInput::Contents {
                        contents: item.contents.clone(),
                        transform: Affine::IDENTITY,
                    },
                ],
            )
            .with_coverage_limit(coverage);
            item.contents = Arc::new(filter);
            BlendStrategy::PassFlush
        };
        item.blend_mode = BlendMode::Source;
        self.tracer.advanced_blend(&AdvancedBlendEvent {
            frame_index: self.frame_index,
            pass_depth: position.depth,
            mode,
            strategy,
        });
        Ok(item)
    }

    fn render_element(
        &mut self,
        mut item: DrawItem,
        ctx: &mut PassContext,
        clip_stack: &mut ClipCoverageStack,
        position: PassPosition,
    ) -> Result<(), RenderError> {
        let pass = self.active_pass(ctx, clip_stack, position)?;
        let size = ctx.size();

        let current = clip_stack
            .current_clip_coverage()
            .map(|c| geometry::to_pass_space(c, position.global));
        if !item.contents.should_render(&item, current) {
            self.frame.summary.skipped();
            return Ok(());
        }

        let clip = item
            .contents
            .clip_coverage(&item, current)
            .translated(position.global);
        item.coverage_hint = match (item.coverage_hint, current) {
            (Some(hint), Some(current)) => geometry::intersection(hint, current).or(Some(hint)),
            (hint, current) => hint.or(current),
        };
        let state = clip_stack.apply_clip_state(clip, &mut item, position.global);
        self.trace_clip(clip, state, clip_stack, position);

        if state.clip_did_change {
            let scissor = pass_scissor(clip_stack.current_clip_coverage(), position.global, size);
            self.device.set_scissor(pass, Some(scissor));
        }
        if !state.should_render {
            self.frame.summary.skipped();
            return Ok(());
        }

        let mut render_ctx = RenderContext {
            device: &mut *self.device,
            pass,
            target_size: size,
            stencil_reference: state.stencil_reference,
        };
        item.render(&mut render_ctx)?;
        self.frame.summary.draw();
        Ok(())
    }

    /// Returns the active pass of `ctx`, opening one if needed.
    ///
    /// A pass opened after an earlier one ended starts with a cleared
    /// stencil, so the clips still in effect are drawn again first.
    fn active_pass(
        &mut self,
        ctx: &mut PassContext,
        clip_stack: &ClipCoverageStack,
        position: PassPosition,
    ) -> Result<RenderPassId, RenderError> {
        let result = ctx.render_pass(&mut *self.device)?;
        if !result.just_created {
            return Ok(result.pass);
        }
        let size = ctx.size();
        self.frame.summary.pass_opened();
        self.tracer.pass_begin(&PassBeginEvent {
            frame_index: self.frame_index,
            pass_depth: position.depth,
            pass_count: ctx.pass_count() - 1,
            load_action: result.load_action,
            size,
            backdrop_restored: result.backdrop_texture.is_some(),
        });

        if let Some(backdrop) = result.backdrop_texture {
            self.draw_full_target(result.pass, backdrop, size, "backdrop");
        }

        if result.reopened && !clip_stack.replay_entities().is_empty() {
            let mut replayed = 0;
            for entry in clip_stack.replay_entities() {
                let scissor = pass_scissor(entry.clip_coverage, position.global, size);
                self.device.set_scissor(result.pass, Some(scissor));
                let mut render_ctx = RenderContext {
                    device: &mut *self.device,
                    pass: result.pass,
                    target_size: size,
                    stencil_reference: entry.stencil_reference,
                };
                entry.item.render(&mut render_ctx)?;
                replayed += 1;
            }
            self.frame.summary.clip_replays(replayed);
            let scissor = pass_scissor(clip_stack.current_clip_coverage(), position.global, size);
            self.device.set_scissor(result.pass, Some(scissor));
        }
        Ok(result.pass)
    }

    fn end_pass(
        &mut self,
        ctx: &mut PassContext,
        position: PassPosition,
    ) -> Result<(), RenderError> {
        if ctx.end_pass(&mut *self.device)? {
            self.tracer.pass_end(&PassEndEvent {
                frame_index: self.frame_index,
                pass_depth: position.depth,
                pass_count: ctx.pass_count(),
                mipmaps: ctx.target().render_target().mip_count > 1,
            });
        }
        Ok(())
    }

    fn trace_subpass(
        &mut self,
        position: PassPosition,
        disposition: SubpassDisposition,
        coverage: Option<Rect>,
    ) {
        self.tracer.subpass(&SubpassEvent {
            frame_index: self.frame_index,
            pass_depth: position.depth,
            disposition,
            coverage,
        });
    }

    #[cfg(feature = "trace-rich")]
    fn trace_clip(
        &mut self,
        clip: ClipCoverage,
        state: ClipStateResult,
        clip_stack: &ClipCoverageStack,
        position: PassPosition,
    ) {
        use crate::drawable::ClipCoverageKind;
        use strata_core::trace::{ClipEvent, ClipTransition};

        let transition = match clip.kind {
            ClipCoverageKind::NoChange => return,
            ClipCoverageKind::Append if state.should_render => ClipTransition::Append,
            ClipCoverageKind::Append => ClipTransition::SkippedAppend,
            ClipCoverageKind::Restore if state.clip_did_change => ClipTransition::Restore,
            ClipCoverageKind::Restore => ClipTransition::NoopRestore,
        };
        self.tracer.clip(&ClipEvent {
            frame_index: self.frame_index,
            pass_depth: position.depth,
            transition,
            clip_depth: clip_stack.current_clip_depth(),
            coverage: clip_stack.current_clip_coverage(),
        });
    }

    #[cfg(not(feature = "trace-rich"))]
    fn trace_clip(
        &mut self,
        clip: ClipCoverage,
        state: ClipStateResult,
        clip_stack: &ClipCoverageStack,
        position: PassPosition,
    ) {
        _ = (clip, state, clip_stack, position);
    }
}

/// Returns the scissor for a root-space clip `coverage` in a pass placed at
/// `global`. No coverage scissors out the whole pass.
fn pass_scissor(coverage: Option<Rect>, global: Vec2, size: PixelSize) -> ScissorRect {
    coverage.map_or(ScissorRect::default(), |c| {
        ScissorRect::from_rect(geometry::to_pass_space(c, global), size)
    })
}

impl Group {
    /// Renders this group as the root of a frame.
    ///
    /// Equivalent to [`Renderer::render`].
    pub fn render(
        &self,
        renderer: &mut Renderer<'_>,
        target: &RenderTarget,
    ) -> Result<(), RenderError> {
        renderer.render(self, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use strata_core::DeviceError;
    use strata_core::command::FilterOp;
    use strata_core::geometry::Shape;
    use strata_harness::{DeviceCall, FailurePlan, RecordingDevice};

    use crate::contents::{
        BackdropFilterProc, ClipContents, ClipRestoreContents, SolidColorContents,
    };
    use crate::delegate::{GroupDelegate, OpacityDelegate, OpacityPeepholeDelegate};

    const SIZE: PixelSize = PixelSize::new(64, 64);

    fn fill(rect: Rect, color: Color) -> DrawItem {
        DrawItem::new(Arc::new(SolidColorContents::new(Shape::Rect(rect), color)))
    }

    fn root_target(device: &mut RecordingDevice) -> RenderTarget {
        RenderTarget::new(SIZE, device.external_texture())
    }

    fn render(
        device: &mut RecordingDevice,
        config: RenderConfig,
        root: &Group,
        target: &RenderTarget,
    ) -> (Result<(), RenderError>, FrameSummary) {
        let mut renderer = Renderer::new(device, config);
        let result = renderer.render(root, target);
        let summary = *renderer.last_summary().unwrap();
        (result, summary)
    }

    fn passes(device: &RecordingDevice) -> Vec<(RenderPassId, RenderTarget)> {
        device
            .calls()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::BeginPass { pass, target, .. } => Some((*pass, *target)),
                _ => None,
            })
            .collect()
    }

    fn blur_backdrop() -> BackdropFilterProc {
        Arc::new(|input: FilterInput| {
            Some(Arc::new(FilterContents::gaussian_blur(input, 2.0)) as Arc<dyn Drawable>)
        })
    }

    #[derive(Debug)]
    struct NoContentsDelegate;

    impl GroupDelegate for NoContentsDelegate {
        fn can_elide(&self) -> bool {
            false
        }

        fn can_collapse_into_parent_pass(&self, _group: &Group) -> bool {
            false
        }

        fn create_contents_for_subpass_target(
            &self,
            _texture: TextureId,
            _size: PixelSize,
            _transform: Affine,
        ) -> Option<Arc<dyn Drawable>> {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    #[test]
    fn flat_tree_renders_in_one_pass() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(fill(Rect::new(10.0, 10.0, 50.0, 50.0), Color::RED));

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.frame_index, 1);
        assert_eq!(summary.passes_opened, 1);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.offscreen_targets, 0);

        let passes = passes(&device);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].1.color.texture, target.color.texture);
        assert_eq!(passes[0].1.color.load_action, LoadAction::Clear);
        assert!(
            passes[0].1.stencil.is_some(),
            "a transient stencil is attached to a target without one"
        );
        assert_eq!(device.draws()[0].stencil, StencilMode::Test { reference: 0 });
        assert_eq!(device.calls().first(), Some(&DeviceCall::BeginFrame));
        assert_eq!(device.calls().last(), Some(&DeviceCall::EndFrame));
        assert!(device.is_idle(), "every pass is submitted");
    }

    #[test]
    fn empty_root_still_clears_the_target() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &Group::new(), &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.passes_opened, 1);
        assert!(device.draws().is_empty(), "nothing to draw");
    }

    #[test]
    fn frames_are_counted() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let root = Group::new();
        let mut renderer = Renderer::new(&mut device, RenderConfig::DEFAULT);
        renderer.render(&root, &target).unwrap();
        root.render(&mut renderer, &target).unwrap();
        assert_eq!(renderer.frame_index(), 2);
        assert_eq!(renderer.last_summary().unwrap().frame_index, 2);
    }

    #[test]
    fn leading_full_target_fills_become_the_clear_color() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(DrawItem::new(Arc::new(SolidColorContents::new(
            Shape::Cover,
            Color::BLUE,
        ))));
        root.add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));

        let (_, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(summary.draws, 1);
        assert_eq!(passes(&device)[0].1.color.clear_color, Color::BLUE);

        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let config = RenderConfig {
            collapse_clear_colors: false,
            ..RenderConfig::DEFAULT
        };
        let (_, summary) = render(&mut device, config, &root, &target);
        assert_eq!(summary.draws, 2);
        assert_eq!(passes(&device)[0].1.color.clear_color, Color::TRANSPARENT);
    }

    // -----------------------------------------------------------------------
    // Child groups
    // -----------------------------------------------------------------------

    #[test]
    fn collapsible_children_draw_into_the_parent_pass() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_group(Group::new())
            .add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));
        root.add_group(Group::new().with_delegate(Arc::new(OpacityPeepholeDelegate::new(0.5))))
            .add_item(fill(Rect::new(8.0, 8.0, 16.0, 16.0), Color::GREEN));

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.passes_opened, 1);
        assert_eq!(summary.offscreen_targets, 0);

        let draws = device.draws();
        assert_eq!(draws.len(), 2);
        let DrawKind::SolidFill { color, .. } = draws[1].kind else {
            panic!("expected a solid fill, got {:?}", draws[1].kind);
        };
        assert_eq!(color, Color::GREEN.with_alpha(0.5));
    }

    #[test]
    fn transparent_groups_are_elided() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.0))))
            .add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));

        let (_, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(summary.elements_skipped, 1);
        assert_eq!(summary.offscreen_targets, 0);
        assert!(device.draws().is_empty(), "elided groups draw nothing");
    }

    #[test]
    fn opaque_groups_render_offscreen_and_composite() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        let child = root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.5))));
        child.add_item(fill(Rect::new(8.0, 8.0, 16.0, 16.0), Color::RED));
        child.add_item(fill(Rect::new(16.0, 16.0, 24.0, 24.0), Color::RED));

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.offscreen_targets, 1);
        assert_eq!(summary.passes_opened, 2);
        assert_eq!(summary.draws, 3);

        let passes = passes(&device);
        let (root_pass, _) = passes[0];
        let (subpass, subpass_target) = passes[1];
        assert_eq!(subpass_target.size, PixelSize::new(16, 16));
        assert_eq!(subpass_target.color.clear_color, Color::TRANSPARENT);

        let inner = device.draws_in(subpass);
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[0].transform, Affine::translate((-8.0, -8.0)));

        let outer = device.draws_in(root_pass);
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].transform, Affine::translate((8.0, 8.0)));
        assert_eq!(
            outer[0].kind,
            DrawKind::Texture {
                texture: subpass_target.color.texture,
                source_rect: Rect::new(0.0, 0.0, 16.0, 16.0),
                dest_rect: Rect::new(0.0, 0.0, 16.0, 16.0),
                opacity: 0.5,
            }
        );
        assert!(device.is_idle(), "every pass is submitted");
    }

    #[test]
    fn subpass_clear_color_folds_its_leading_fill() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.5))))
            .add_item(fill(Rect::new(8.0, 8.0, 24.0, 24.0), Color::RED));

        let (_, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        let passes = passes(&device);
        assert_eq!(passes[1].1.color.clear_color, Color::RED);
        assert!(device.draws_in(passes[1].0).is_empty(), "the fill became the clear");
        assert_eq!(summary.draws, 1);
    }

    #[test]
    fn delegates_must_supply_subpass_contents() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_group(Group::new().with_delegate(Arc::new(NoContentsDelegate)))
            .add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));

        let (result, _) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Err(RenderError::DelegateContract));
        assert_eq!(device.calls().last(), Some(&DeviceCall::EndFrame));
    }

    // -----------------------------------------------------------------------
    // Failures
    // -----------------------------------------------------------------------

    #[test]
    fn device_failures_abort_the_frame() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        device.set_failures(FailurePlan {
            render_pass: Some(0),
            ..FailurePlan::default()
        });
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(
            result,
            Err(RenderError::Device(DeviceError::RenderPassCreation))
        );
        assert_eq!(summary.draws, 0);
        assert_eq!(device.calls().last(), Some(&DeviceCall::EndFrame));
    }

    #[test]
    fn subpass_allocation_failure_names_the_target() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        // Texture 0 is the root stencil; texture 1 is the subpass color.
        device.set_failures(FailurePlan {
            texture: Some(1),
            ..FailurePlan::default()
        });
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.5))))
            .add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));

        let (result, _) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(
            result,
            Err(RenderError::Device(DeviceError::TextureAllocation("subpass")))
        );
    }

    // -----------------------------------------------------------------------
    // Clips
    // -----------------------------------------------------------------------

    #[test]
    fn clips_append_and_restore_the_stencil() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let clip = Rect::new(0.0, 0.0, 32.0, 32.0);
        let mut root = Group::new();
        root.add_item(DrawItem::new(Arc::new(ClipContents::intersect(Shape::Rect(clip)))));
        root.add_item(fill(Rect::new(0.0, 0.0, 48.0, 48.0), Color::RED).with_clip_depth(1));
        root.add_item(DrawItem::new(Arc::new(ClipRestoreContents::new())));
        root.add_item(fill(Rect::new(0.0, 0.0, 48.0, 48.0), Color::GREEN));

        let (result, _) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));

        let draws = device.draws();
        assert_eq!(draws.len(), 4);
        assert_eq!(
            draws[0].stencil,
            StencilMode::ClipAppend {
                reference: 0,
                difference: false
            }
        );
        assert_eq!(draws[1].stencil, StencilMode::Test { reference: 1 });
        assert_eq!(draws[2].stencil, StencilMode::ClipRestore { reference: 0 });
        assert_eq!(draws[2].kind, DrawKind::ClipRestore { area: Some(clip) });
        assert_eq!(draws[3].stencil, StencilMode::Test { reference: 0 });

        let scissors: Vec<_> = device
            .calls()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::SetScissor { scissor, .. } => Some(*scissor),
                _ => None,
            })
            .collect();
        assert_eq!(
            scissors,
            [
                Some(ScissorRect::from_rect(clip, SIZE)),
                Some(ScissorRect::from_rect(SIZE.to_rect(), SIZE)),
            ]
        );
    }

    #[test]
    fn empty_clips_skip_groups_and_draws() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(DrawItem::new(Arc::new(ClipContents::intersect(Shape::Rect(
            Rect::new(100.0, 100.0, 120.0, 120.0),
        )))));
        root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.5))))
            .add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));
        root.add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.offscreen_targets, 0);
        assert_eq!(summary.elements_skipped, 2);
        assert_eq!(summary.draws, 1);
        assert!(
            device.calls().contains(&DeviceCall::SetScissor {
                pass: passes(&device)[0].0,
                scissor: Some(ScissorRect::default()),
            }),
            "an empty clip scissors out the pass"
        );
    }

    // -----------------------------------------------------------------------
    // Advanced blends and backdrops
    // -----------------------------------------------------------------------

    #[test]
    fn framebuffer_fetch_blends_in_place() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(fill(Rect::new(0.0, 0.0, 32.0, 32.0), Color::RED));
        root.add_item(
            fill(Rect::new(16.0, 16.0, 48.0, 48.0), Color::BLUE).with_blend_mode(BlendMode::Screen),
        );

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.passes_opened, 1);
        assert_eq!(summary.pass_flushes, 0);

        let root_pass = passes(&device)[0].0;
        let draws = device.draws_in(root_pass);
        assert_eq!(draws.len(), 2);
        assert!(
            matches!(
                draws[1].kind,
                DrawKind::FramebufferBlend {
                    mode: BlendMode::Screen,
                    ..
                }
            ),
            "expected a framebuffer blend, got {:?}",
            draws[1].kind
        );
        assert_eq!(draws[1].blend_mode, BlendMode::Source);
    }

    #[test]
    fn advanced_blends_without_fetch_flush_the_pass_once() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(fill(Rect::new(0.0, 0.0, 32.0, 32.0), Color::RED));
        root.add_item(
            fill(Rect::new(16.0, 16.0, 48.0, 48.0), Color::BLUE).with_blend_mode(BlendMode::Screen),
        );

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.pass_flushes, 1);
        assert_eq!(summary.offscreen_targets, 1);

        let passes = passes(&device);
        let offscreen = passes[0].1.color.texture;
        assert_ne!(offscreen, target.color.texture);
        let root_passes: Vec<_> = passes
            .iter()
            .filter(|(_, t)| t.color.texture == offscreen)
            .collect();
        assert_eq!(root_passes.len(), 2);
        assert_eq!(root_passes[0].1.color.load_action, LoadAction::Clear);
        assert_eq!(root_passes[1].1.color.load_action, LoadAction::Load);
        let first = root_passes[0].0;
        assert_eq!(
            device.count(|call| matches!(call, DeviceCall::EncodePass { pass } if *pass == first)),
            1
        );

        let blended = device.draws_in(root_passes[1].0);
        assert_eq!(blended.len(), 1);
        let DrawKind::Filter { filter, inputs } = &blended[0].kind else {
            panic!("expected a filter draw, got {:?}", blended[0].kind);
        };
        assert_eq!(*filter, FilterOp::Blend(BlendMode::Screen));
        assert_eq!(inputs[0].texture, offscreen);
        assert_eq!(blended[0].blend_mode, BlendMode::Source);

        // No blit: the result is drawn into the caller's target.
        let (copy_pass, copy_target) = passes[passes.len() - 1];
        assert_eq!(copy_target.color.texture, target.color.texture);
        assert_eq!(copy_target.color.load_action, LoadAction::DontCare);
        let copy = device.draws_in(copy_pass);
        assert_eq!(copy.len(), 1);
        assert_eq!(copy[0].blend_mode, BlendMode::Source);
        assert_eq!(copy[0].stencil, StencilMode::Ignore);
        assert!(device.is_idle(), "every pass is submitted");
    }

    #[test]
    fn double_buffered_roots_blit_when_possible() {
        let mut device = RecordingDevice::new(Capabilities {
            supports_texture_to_texture_blit: true,
            ..Capabilities::MINIMAL
        });
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(
            fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::BLUE).with_blend_mode(BlendMode::Multiply),
        );

        let (result, _) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        let offscreen = passes(&device)[0].1.color.texture;
        assert_eq!(
            device.count(|call| matches!(
                call,
                DeviceCall::Blit { src, dst, .. }
                    if *src == offscreen && *dst == target.color.texture
            )),
            1
        );
        assert!(
            passes(&device)
                .iter()
                .all(|(_, t)| t.color.texture != target.color.texture),
            "the caller's target is only written by the blit"
        );
    }

    #[test]
    fn backdrop_filters_read_the_parent_pass() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(fill(Rect::new(0.0, 0.0, 32.0, 32.0), Color::RED));
        let mut child = Group::new();
        child.set_backdrop_filter(blur_backdrop());
        child.add_item(fill(Rect::new(16.0, 16.0, 48.0, 48.0), Color::GREEN));
        root.add_group(child);

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.pass_flushes, 1);
        assert_eq!(summary.offscreen_targets, 2);

        let passes = passes(&device);
        let root_resolve = passes[0].1.color.resolve_texture.unwrap();
        let subpass = passes
            .iter()
            .find(|(_, t)| t.color.texture != passes[0].1.color.texture)
            .unwrap();
        assert_eq!(subpass.1.size, SIZE);

        let backdrop = device.draws_in(subpass.0);
        let DrawKind::Filter { filter, inputs } = &backdrop[0].kind else {
            panic!("expected the backdrop first, got {:?}", backdrop[0].kind);
        };
        assert_eq!(*filter, FilterOp::GaussianBlur { sigma: 2.0 });
        assert_eq!(inputs[0].texture, root_resolve);

        assert_eq!(
            device.count(|call| matches!(
                call,
                DeviceCall::Blit { dst, .. } if *dst == target.color.texture
            )),
            1
        );
    }

    fn filters_sample(device: &RecordingDevice, texture: TextureId) -> bool {
        device.draws().iter().any(|draw| match &draw.kind {
            DrawKind::Filter { inputs, .. } => inputs.iter().any(|i| i.texture == texture),
            _ => false,
        })
    }

    #[test]
    fn advanced_blends_in_collapsed_children_double_buffer_the_root() {
        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(fill(Rect::new(0.0, 0.0, 32.0, 32.0), Color::RED));
        root.add_group(Group::new()).add_item(
            fill(Rect::new(16.0, 16.0, 48.0, 48.0), Color::BLUE).with_blend_mode(BlendMode::Screen),
        );

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.offscreen_targets, 1);
        assert_eq!(summary.pass_flushes, 1);

        let passes = passes(&device);
        assert_ne!(passes[0].1.color.texture, target.color.texture);
        assert!(filters_sample(&device, passes[0].1.color.texture));
        assert!(
            !filters_sample(&device, target.color.texture),
            "the caller's target is never read back"
        );
        assert!(device.is_idle(), "every pass is submitted");
    }

    #[test]
    fn backdrop_filters_in_collapsed_children_double_buffer_the_root() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(fill(Rect::new(0.0, 0.0, 32.0, 32.0), Color::RED));
        let mut child = Group::new();
        child.set_backdrop_filter(blur_backdrop());
        child.add_item(fill(Rect::new(16.0, 16.0, 48.0, 48.0), Color::GREEN));
        root.add_group(Group::new()).add_group(child);

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.offscreen_targets, 2);
        assert_eq!(summary.pass_flushes, 1);

        let passes = passes(&device);
        assert_ne!(passes[0].1.color.texture, target.color.texture);
        assert!(
            !filters_sample(&device, target.color.texture),
            "the caller's target is never read back"
        );
        assert_eq!(
            device.count(|call| matches!(
                call,
                DeviceCall::Blit { dst, .. } if *dst == target.color.texture
            )),
            1
        );
    }

    #[test]
    fn backdrop_filters_must_produce_contents() {
        let mut device = RecordingDevice::new(Capabilities::FULL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        let mut child = Group::new();
        child.set_backdrop_filter(Arc::new(|_: FilterInput| -> Option<Arc<dyn Drawable>> {
            None
        }));
        root.add_group(child);

        let (result, _) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Err(RenderError::MissingBackdropContents));
    }

    #[test]
    fn reopened_msaa_passes_restore_backdrop_and_clips() {
        let mut device = RecordingDevice::new(Capabilities {
            supports_offscreen_msaa: true,
            supports_texture_to_texture_blit: true,
            ..Capabilities::MINIMAL
        });
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_item(DrawItem::new(Arc::new(ClipContents::intersect(Shape::Rect(
            Rect::new(8.0, 8.0, 40.0, 40.0),
        )))));
        root.add_item(fill(Rect::new(10.0, 10.0, 30.0, 30.0), Color::RED).with_clip_depth(1));
        root.add_item(
            fill(Rect::new(20.0, 20.0, 50.0, 50.0), Color::BLUE)
                .with_blend_mode(BlendMode::Screen)
                .with_clip_depth(1),
        );

        let (result, summary) = render(&mut device, RenderConfig::DEFAULT, &root, &target);
        assert_eq!(result, Ok(()));
        assert_eq!(summary.clip_replays, 1);
        assert_eq!(summary.pass_flushes, 1);

        let msaa: Vec<_> = passes(&device)
            .into_iter()
            .filter(|(_, t)| t.is_msaa())
            .collect();
        assert_eq!(msaa.len(), 2);
        assert_eq!(msaa[0].1.color.load_action, LoadAction::Clear);
        assert_eq!(msaa[1].1.color.load_action, LoadAction::DontCare);
        let first_resolve = msaa[0].1.color.resolve_texture.unwrap();
        let second_resolve = msaa[1].1.color.resolve_texture.unwrap();
        assert_ne!(first_resolve, second_resolve);

        let reopened = device.draws_in(msaa[1].0);
        assert_eq!(reopened.len(), 3);
        assert!(
            matches!(
                reopened[0].kind,
                DrawKind::Texture { texture, .. } if texture == first_resolve
            ),
            "the previous result is redrawn first, got {:?}",
            reopened[0].kind
        );
        assert_eq!(reopened[0].stencil, StencilMode::Ignore);
        assert_eq!(
            reopened[1].stencil,
            StencilMode::ClipAppend {
                reference: 0,
                difference: false
            }
        );
        assert!(matches!(reopened[2].kind, DrawKind::Filter { .. }));
        assert_eq!(reopened[2].stencil, StencilMode::Test { reference: 1 });

        assert_eq!(
            device.count(|call| matches!(
                call,
                DeviceCall::Blit { src, dst, .. }
                    if *src == second_resolve && *dst == target.color.texture
            )),
            1
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_sees_subpass_decisions() {
        use strata_core::trace::{SubpassEvent, TraceSink};

        #[derive(Default)]
        struct Dispositions {
            seen: Vec<SubpassDisposition>,
            strategies: Vec<BlendStrategy>,
            frames_ok: Vec<bool>,
        }

        impl TraceSink for Dispositions {
            fn on_subpass(&mut self, e: &SubpassEvent) {
                self.seen.push(e.disposition);
            }

            fn on_advanced_blend(&mut self, e: &AdvancedBlendEvent) {
                self.strategies.push(e.strategy);
            }

            fn on_frame_end(&mut self, e: &FrameEndEvent) {
                self.frames_ok.push(e.ok);
            }
        }

        let mut device = RecordingDevice::new(Capabilities::MINIMAL);
        let target = root_target(&mut device);
        let mut root = Group::new();
        root.add_group(Group::new())
            .add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));
        root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.0))));
        root.add_group(Group::new().with_delegate(Arc::new(OpacityDelegate::new(0.5))))
            .add_item(fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED));
        root.add_item(
            fill(Rect::new(0.0, 0.0, 8.0, 8.0), Color::BLUE).with_blend_mode(BlendMode::Screen),
        );

        let mut sink = Dispositions::default();
        let mut renderer =
            Renderer::new(&mut device, RenderConfig::DEFAULT).with_tracer(Tracer::new(&mut sink));
        renderer.render(&root, &target).unwrap();
        drop(renderer);

        assert_eq!(
            sink.seen,
            [
                SubpassDisposition::Collapsed,
                SubpassDisposition::Elided,
                SubpassDisposition::Offscreen,
            ]
        );
        assert_eq!(sink.strategies, [BlendStrategy::PassFlush]);
        assert_eq!(sink.frames_ok, [true]);
    }
}
