use crate::error::LayoutError;
use crate::geometry::{Offset, Padding};
use crate::layout::{
    Axis, AxisDirection, SliverConstraints, SliverGeometry, calculate_cache_offset,
    calculate_paint_offset,
};
use crate::pipeline::LayoutCtx;
use crate::render::{ParentData, Protocol, RenderObject, RenderSliver, SliverParentData};

/// Insets a sliver child by empty space on every side.
///
/// The padding before and after the child takes part in scrolling like
/// content: it consumes scroll extent and, while on screen, paint extent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSliverPadding {
    padding: Padding,
}

impl RenderSliverPadding {
    pub fn new(padding: Padding) -> Self {
        Self { padding }
    }

    pub fn set_padding(&mut self, padding: Padding) -> bool {
        if self.padding == padding {
            return false;
        }
        self.padding = padding;
        true
    }

    /// Main-axis padding as (before, after) the child, in scroll order.
    fn main_axis_padding(&self, direction: AxisDirection) -> (f32, f32) {
        let p = self.padding;
        match direction {
            AxisDirection::Down => (p.top, p.bottom),
            AxisDirection::Up => (p.bottom, p.top),
            AxisDirection::Right => (p.left, p.right),
            AxisDirection::Left => (p.right, p.left),
        }
    }

    /// Leading cross-axis padding and the total.
    fn cross_axis_padding(&self, axis: Axis) -> (f32, f32) {
        match axis {
            Axis::Vertical => (self.padding.left, self.padding.horizontal()),
            Axis::Horizontal => (self.padding.top, self.padding.vertical()),
        }
    }
}

impl RenderObject for RenderSliverPadding {
    fn child_protocol(&self) -> Option<Protocol> {
        Some(Protocol::Sliver)
    }

    fn create_parent_data(&self) -> Box<dyn ParentData> {
        Box::new(SliverParentData::default())
    }
}

impl RenderSliver for RenderSliverPadding {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: SliverConstraints,
    ) -> Result<SliverGeometry, LayoutError> {
        let c = &constraints;
        let (before, after) = self.main_axis_padding(c.axis_direction);
        let (cross_before, cross_padding) = self.cross_axis_padding(c.axis());
        let main_padding = before + after;

        let Some(&child) = cx.children().first() else {
            let paint_extent = calculate_paint_offset(c, 0.0, main_padding);
            let cache_extent = calculate_cache_offset(c, 0.0, main_padding);
            return Ok(SliverGeometry::new(main_padding, paint_extent, main_padding)
                .with_cache_extent(cache_extent));
        };

        let before_paint = calculate_paint_offset(c, 0.0, before);
        let before_cache = calculate_cache_offset(c, 0.0, before);
        let child_constraints = SliverConstraints {
            scroll_offset: (c.scroll_offset - before).max(0.0),
            cache_origin: (c.cache_origin + before).min(0.0),
            overlap: (c.overlap - before).max(0.0),
            remaining_paint_extent: c.remaining_paint_extent - before_paint,
            remaining_cache_extent: c.remaining_cache_extent - before_cache,
            cross_axis_extent: (c.cross_axis_extent - cross_padding).max(0.0),
            preceding_scroll_extent: c.preceding_scroll_extent + before,
            ..constraints
        };
        let child_geometry = cx.layout_sliver_child(child, child_constraints);
        if child_geometry.scroll_offset_correction != 0.0 {
            return Ok(SliverGeometry::correction(
                child_geometry.scroll_offset_correction,
            ));
        }

        let child_end = before + child_geometry.scroll_extent;
        let after_paint = calculate_paint_offset(c, child_end, child_end + after);
        let after_cache = calculate_cache_offset(c, child_end, child_end + after);
        let padding_paint = before_paint + after_paint;
        let paint_extent = (before_paint
            + child_geometry
                .paint_extent
                .max(child_geometry.layout_extent + after_paint))
        .min(c.remaining_paint_extent);

        let geometry = SliverGeometry {
            scroll_extent: main_padding + child_geometry.scroll_extent,
            paint_extent,
            paint_origin: child_geometry.paint_origin,
            layout_extent: (padding_paint + child_geometry.layout_extent).min(paint_extent),
            max_paint_extent: main_padding + child_geometry.max_paint_extent,
            hit_test_extent: (padding_paint + child_geometry.paint_extent)
                .max(before_paint + child_geometry.hit_test_extent),
            cache_extent: (before_cache + after_cache + child_geometry.cache_extent)
                .min(c.remaining_cache_extent),
            visible: paint_extent > 0.0,
            has_visual_overflow: child_geometry.has_visual_overflow,
            scroll_offset_correction: 0.0,
        };

        let paint_offset = match c.axis_direction {
            AxisDirection::Down => Offset::new(cross_before, before_paint),
            AxisDirection::Right => Offset::new(before_paint, cross_before),
            AxisDirection::Up => Offset::new(cross_before, after_paint),
            AxisDirection::Left => Offset::new(after_paint, cross_before),
        };
        if let Some(data) = cx.parent_data_mut::<SliverParentData>(child) {
            data.layout_offset = before;
            data.paint_offset = paint_offset;
        }
        Ok(geometry)
    }
}
