use crate::error::LayoutError;
use crate::layout::{SliverConstraints, SliverGeometry, calculate_cache_offset, calculate_paint_offset};
use crate::pipeline::LayoutCtx;
use crate::render::{RenderObject, RenderSliver};

use super::physical_offset;

/// Hosts a single box child inside a viewport.
///
/// The child is laid out with the viewport's cross extent and an unbounded
/// main axis; its main-axis size becomes the sliver's scroll extent.
#[derive(Debug, Clone, Default)]
pub struct RenderSliverToBoxAdapter;

impl RenderSliverToBoxAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl RenderObject for RenderSliverToBoxAdapter {}

impl RenderSliver for RenderSliverToBoxAdapter {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: SliverConstraints,
    ) -> Result<SliverGeometry, LayoutError> {
        let Some(&child) = cx.children().first() else {
            return Ok(SliverGeometry::ZERO);
        };
        let size = cx.layout_child(child, constraints.as_box_constraints(0.0, f32::INFINITY, None));
        let extent = constraints.axis().main(size);

        let paint_extent = calculate_paint_offset(&constraints, 0.0, extent);
        let cache_extent = calculate_cache_offset(&constraints, 0.0, extent);
        let geometry = SliverGeometry::new(extent, paint_extent, extent)
            .with_cache_extent(cache_extent)
            .with_visual_overflow(
                extent > constraints.remaining_paint_extent || constraints.scroll_offset > 0.0,
            );

        cx.set_child_offset(
            child,
            physical_offset(
                constraints.axis_direction,
                -constraints.scroll_offset,
                0.0,
                paint_extent,
                extent,
            ),
        );
        Ok(geometry)
    }
}
