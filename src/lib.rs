//! A retained-mode UI render pipeline.
//!
//! Widgets describe the UI, elements keep it alive across rebuilds, and
//! render objects lay it out and paint it. Two layout protocols share one
//! tree: boxes, sized from min/max constraints, and slivers, laid out in
//! scroll coordinates inside a viewport. A [`pipeline::PipelineOwner`]
//! tracks dirty nodes so each frame only redoes the work that changed.

pub mod animation;
pub mod app;
pub mod arena;
pub mod config;
pub mod error;
pub mod geometry;
pub mod jobs;
pub mod layout;
pub mod layout_stats;
pub mod objects;
pub mod paint;
pub mod pipeline;
pub mod render;
pub mod sliver;
pub mod widgets;

pub mod prelude {
    pub use crate::animation::Curve;
    pub use crate::app::{App, FrameOutput};
    pub use crate::config::{ErrorPolicy, PipelineConfig};
    pub use crate::error::{BuildError, FrameError, LayoutError, PipelineError};
    pub use crate::geometry::{Offset, Padding, Rect, Size};
    pub use crate::hit_test::{HitTestBehavior, HitTestResult};
    pub use crate::layout::{
        Axis, AxisDirection, BoxConstraints, CrossAxisAlignment, MainAxisAlignment,
        SliverConstraints, SliverGeometry,
    };
    pub use crate::paint::{Color, DisplayList, DrawCommand};
    pub use crate::pipeline::PipelineOwner;
    pub use crate::render::{RenderId, RenderKind};
    pub use crate::sliver::SliverChildBuilder;
    pub use crate::widgets::{
        Builder, ConstrainedBox, FixedSize, Flex, InkFeedback, IntoWidget, Key, Provider,
        RepaintBoundary, SliverBand, SliverFixedExtentList, SliverList, SliverPadding,
        SliverToBoxAdapter, Stack, Text, Viewport, Widget, WidgetRef, column, row, widgets,
    };
}

/// Initializes `env_logger` from `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}
