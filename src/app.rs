//! Headless frame driver.
//!
//! An [`App`] owns one render pipeline and the element tree feeding it, and
//! turns a root widget into a display list one frame at a time. Nothing here
//! sleeps or reads the clock; the caller's loop passes the frame delta.

use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::FrameError;
use crate::geometry::{Offset, Size};
use crate::hit_test::HitTestResult;
use crate::jobs::JobQueue;
use crate::layout::BoxConstraints;
use crate::layout_stats;
use crate::paint::DisplayList;
use crate::pipeline::{LayoutReport, PaintReport, PipelineOwner};
use crate::render::RenderId;
use crate::widgets::{BuildOwner, ElementId, IntoWidget, WidgetRef};

/// Called at the start of every frame, before building. Returning a widget
/// replaces the root widget for that frame.
pub type UpdateCallback = Box<dyn FnMut() -> Option<WidgetRef>>;

/// Everything one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub frame: u64,
    /// Jobs applied from the async queue.
    pub jobs: usize,
    /// Elements rebuilt, excluding fresh inflation.
    pub rebuilt: usize,
    pub layout: LayoutReport,
    pub paint: PaintReport,
    pub display_list: DisplayList,
    /// True while some render object still needs animation frames.
    pub animating: bool,
}

pub struct App {
    pipeline: PipelineOwner,
    elements: BuildOwner,
    pending_root: Option<WidgetRef>,
    on_update: Option<UpdateCallback>,
    frame: u64,
}

impl App {
    /// Creates the app and installs the `env_logger` backend unless a logger
    /// is already set.
    pub fn new(config: PipelineConfig) -> Self {
        crate::init_logging();
        Self {
            pipeline: PipelineOwner::new(config),
            elements: BuildOwner::new(),
            pending_root: None,
            on_update: None,
            frame: 0,
        }
    }

    /// Set a callback that runs at the start of every frame. Use it to drain
    /// external events, such as channel messages, into a new root widget.
    pub fn on_update<F: FnMut() -> Option<WidgetRef> + 'static>(mut self, callback: F) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Replaces the root widget. Takes effect on the next [`pump`](Self::pump).
    pub fn set_root_widget(&mut self, widget: impl IntoWidget) {
        self.pending_root = Some(widget.into_widget());
    }

    /// Resizes the window the root is laid out in.
    pub fn set_window_size(&mut self, width: f32, height: f32) {
        log::info!("window resized to {width}x{height}");
        self.set_root_constraints(BoxConstraints::tight(Size::new(width, height)));
    }

    pub fn set_root_constraints(&mut self, constraints: BoxConstraints) {
        self.pipeline.set_root_constraints(constraints);
    }

    pub fn root_constraints(&self) -> BoxConstraints {
        self.pipeline.config().root_constraints
    }

    pub fn pipeline(&self) -> &PipelineOwner {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut PipelineOwner {
        &mut self.pipeline
    }

    pub fn elements(&self) -> &BuildOwner {
        &self.elements
    }

    pub fn job_queue(&self) -> JobQueue {
        self.pipeline.job_queue()
    }

    pub fn root_render_object(&self) -> Option<RenderId> {
        self.pipeline.root()
    }

    /// The element that created `render`.
    pub fn element_of(&self, render: RenderId) -> Option<ElementId> {
        self.elements.element_of(&self.pipeline, render)
    }

    /// Schedules `element` to rebuild on the next frame.
    pub fn mark_needs_build(&mut self, element: ElementId) {
        self.elements.mark_needs_build(element);
    }

    /// True when a frame would do work.
    pub fn needs_frame(&self) -> bool {
        self.pending_root.is_some()
            || self.elements.has_dirty_elements()
            || self.pipeline.has_dirty_nodes()
            || self.pipeline.is_animating()
            || self.pipeline.job_queue().has_pending()
    }

    /// Runs one frame: async jobs, animations, build, layout, paint and
    /// composition, in that order.
    pub fn pump(&mut self, dt: Duration) -> Result<FrameOutput, FrameError> {
        if let Some(callback) = self.on_update.as_mut()
            && let Some(widget) = callback()
        {
            self.pending_root = Some(widget);
        }

        let jobs = self.pipeline.drain_jobs();
        self.pipeline.advance_animations(dt);

        if let Some(widget) = self.pending_root.take() {
            self.elements.update_root(&mut self.pipeline, widget)?;
        }
        let rebuilt = self.elements.flush_build(&mut self.pipeline)?;

        let layout = self.pipeline.flush_layout()?;
        let paint = self.pipeline.flush_paint()?;
        let display_list = self.pipeline.compose()?;
        layout_stats::end_frame();

        self.frame += 1;
        log::trace!(
            "frame {}: {} laid out, {} layers repainted, {} commands",
            self.frame,
            layout.laid_out.len(),
            paint.repainted.len(),
            display_list.len()
        );
        Ok(FrameOutput {
            frame: self.frame,
            jobs,
            rebuilt,
            layout,
            paint,
            display_list,
            animating: self.pipeline.is_animating(),
        })
    }

    pub fn hit_test(&self, position: Offset) -> HitTestResult {
        self.pipeline.hit_test(position)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
