use crate::error::LayoutError;
use crate::geometry::{Offset, Rect};
use crate::hit_test::HitTestBehavior;
use crate::layout::{SliverConstraints, SliverGeometry, calculate_cache_offset, calculate_paint_offset};
use crate::paint::{Color, PaintContext};
use crate::pipeline::LayoutCtx;
use crate::render::{Constraints, Protocol, RenderObject, RenderSliver};

/// Childless sliver of a fixed extent, such as a header or a divider.
///
/// With a reserved extent smaller than its extent, the band paints more than
/// it consumes in the scroll sequence, so the following sliver starts
/// underneath it and receives the difference as `overlap`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSliverBand {
    extent: f32,
    reserved: Option<f32>,
    color: Option<Color>,
}

impl RenderSliverBand {
    pub fn new(extent: f32) -> Self {
        Self {
            extent: extent.max(0.0),
            reserved: None,
            color: None,
        }
    }

    /// Consumes only `layout_extent` of scroll space.
    pub fn reserved(mut self, layout_extent: f32) -> Self {
        self.reserved = Some(layout_extent);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    fn reserved_extent(&self) -> f32 {
        self.reserved.unwrap_or(self.extent).clamp(0.0, self.extent)
    }

    /// Copies the configuration of `other`, reporting whether layout is needed.
    pub fn configure(&mut self, other: &RenderSliverBand) -> bool {
        let relayout = self.extent != other.extent || self.reserved != other.reserved;
        *self = other.clone();
        relayout
    }
}

impl RenderObject for RenderSliverBand {
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        let (Some(color), Some(geometry), Some(Constraints::Sliver(constraints))) =
            (self.color, cx.sliver_geometry(), cx.constraints())
        else {
            return;
        };
        let size = constraints
            .axis()
            .size(geometry.paint_extent, constraints.cross_axis_extent);
        cx.draw_rect(Rect::from_size(size).translate(offset), color);
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        HitTestBehavior::Opaque
    }

    fn child_protocol(&self) -> Option<Protocol> {
        None
    }
}

impl RenderSliver for RenderSliverBand {
    fn perform_layout(
        &mut self,
        _cx: &mut LayoutCtx<'_>,
        constraints: SliverConstraints,
    ) -> Result<SliverGeometry, LayoutError> {
        let reserved = self.reserved_extent();
        let paint_extent = calculate_paint_offset(&constraints, 0.0, self.extent);
        let layout_extent = calculate_paint_offset(&constraints, 0.0, reserved).min(paint_extent);
        let cache_extent = calculate_cache_offset(&constraints, 0.0, self.extent);
        Ok(SliverGeometry::new(reserved, paint_extent, self.extent)
            .with_layout_extent(layout_extent)
            .with_cache_extent(cache_extent)
            .with_visual_overflow(self.extent > constraints.remaining_paint_extent))
    }
}
