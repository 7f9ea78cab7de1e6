//! The viewport and the sliver widgets it hosts.

use crate::geometry::Padding;
use crate::layout::AxisDirection;
use crate::paint::Color;
use crate::pipeline::UpdateCtx;
use crate::render::RenderKind;
use crate::sliver::{
    RenderSliverBand, RenderSliverFixedExtentList, RenderSliverList, RenderSliverPadding,
    RenderSliverToBoxAdapter, RenderViewport, SliverChildBuilder,
};

use super::widget::{IntoWidget, Key, Widget, WidgetRef, with_render};
use super::{impl_with_key, widget_key};

/// Scrollable window onto a sequence of slivers.
///
/// The initial offset only applies when the viewport is first created; the
/// scroll position afterwards belongs to the render object and survives
/// rebuilds.
#[derive(Debug, Clone)]
pub struct Viewport {
    key: Option<Key>,
    axis_direction: AxisDirection,
    initial_offset: f32,
    cache_extent: Option<f32>,
    slivers: Vec<WidgetRef>,
}

impl Viewport {
    pub fn new(axis_direction: AxisDirection, slivers: Vec<WidgetRef>) -> Self {
        Self {
            key: None,
            axis_direction,
            initial_offset: 0.0,
            cache_extent: None,
            slivers,
        }
    }

    pub fn vertical(slivers: Vec<WidgetRef>) -> Self {
        Self::new(AxisDirection::Down, slivers)
    }

    pub fn initial_offset(mut self, pixels: f32) -> Self {
        self.initial_offset = pixels;
        self
    }

    pub fn cache_extent(mut self, extent: f32) -> Self {
        self.cache_extent = Some(extent.max(0.0));
        self
    }
}

impl Widget for Viewport {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        let mut viewport = RenderViewport::new(self.axis_direction).with_offset(self.initial_offset);
        viewport.set_cache_extent(self.cache_extent);
        Some(RenderKind::new_box(viewport))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderViewport>(object, |viewport| {
            let direction = viewport.set_axis_direction(self.axis_direction);
            let cache = viewport.set_cache_extent(self.cache_extent);
            if direction || cache {
                cx.mark_needs_layout();
            }
        });
    }

    fn children(&self) -> &[WidgetRef] {
        &self.slivers
    }
}

/// Childless sliver of a fixed extent.
#[derive(Debug, Clone)]
pub struct SliverBand {
    key: Option<Key>,
    config: RenderSliverBand,
}

impl SliverBand {
    pub fn new(extent: f32) -> Self {
        Self {
            key: None,
            config: RenderSliverBand::new(extent),
        }
    }

    /// Consumes only `layout_extent` of scroll space, letting the next sliver
    /// start underneath.
    pub fn reserved(mut self, layout_extent: f32) -> Self {
        self.config = self.config.reserved(layout_extent);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.config = self.config.with_color(color);
        self
    }
}

impl Widget for SliverBand {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_sliver(self.config.clone()))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderSliverBand>(object, |band| {
            if *band == self.config {
                return;
            }
            if band.configure(&self.config) {
                cx.mark_needs_layout();
            } else {
                cx.mark_needs_paint();
            }
        });
    }
}

/// Puts one box child into a sliver list.
#[derive(Debug, Clone)]
pub struct SliverToBoxAdapter {
    key: Option<Key>,
    child: Option<WidgetRef>,
}

impl SliverToBoxAdapter {
    pub fn new(child: impl IntoWidget) -> Self {
        Self {
            key: None,
            child: Some(child.into_widget()),
        }
    }
}

impl Widget for SliverToBoxAdapter {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_sliver(RenderSliverToBoxAdapter::new()))
    }

    fn children(&self) -> &[WidgetRef] {
        self.child.as_slice()
    }
}

/// Insets a sliver by empty space.
#[derive(Debug, Clone)]
pub struct SliverPadding {
    key: Option<Key>,
    padding: Padding,
    sliver: Option<WidgetRef>,
}

impl SliverPadding {
    pub fn new(padding: Padding, sliver: impl IntoWidget) -> Self {
        Self {
            key: None,
            padding,
            sliver: Some(sliver.into_widget()),
        }
    }
}

impl Widget for SliverPadding {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_sliver(RenderSliverPadding::new(self.padding)))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderSliverPadding>(object, |padding| {
            if padding.set_padding(self.padding) {
                cx.mark_needs_layout();
            }
        });
    }

    fn children(&self) -> &[WidgetRef] {
        self.sliver.as_slice()
    }
}

/// Lazily built list of equally sized items.
///
/// Items are render objects created on demand by the builder as they enter
/// the cache window; they are not part of the element tree.
#[derive(Debug, Clone)]
pub struct SliverFixedExtentList {
    key: Option<Key>,
    item_extent: f32,
    builder: SliverChildBuilder,
}

impl SliverFixedExtentList {
    pub fn new(item_extent: f32, builder: SliverChildBuilder) -> Self {
        Self {
            key: None,
            item_extent,
            builder,
        }
    }
}

impl Widget for SliverFixedExtentList {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_sliver(RenderSliverFixedExtentList::new(
            self.item_extent,
            self.builder.clone(),
        )))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderSliverFixedExtentList>(object, |list| {
            if list.set_item_extent(self.item_extent) {
                cx.mark_needs_layout();
            }
            list.set_builder(self.builder.clone(), cx);
        });
    }
}

/// Lazily built list of items that size themselves.
#[derive(Debug, Clone)]
pub struct SliverList {
    key: Option<Key>,
    builder: SliverChildBuilder,
}

impl SliverList {
    pub fn new(builder: SliverChildBuilder) -> Self {
        Self { key: None, builder }
    }
}

impl Widget for SliverList {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_sliver(RenderSliverList::new(self.builder.clone())))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderSliverList>(object, |list| {
            list.set_builder(self.builder.clone(), cx);
        });
    }
}

impl_with_key!(
    Viewport,
    SliverBand,
    SliverToBoxAdapter,
    SliverPadding,
    SliverFixedExtentList,
    SliverList,
);
