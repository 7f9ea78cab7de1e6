use std::time::Duration;

use crate::animation::Curve;
use crate::error::LayoutError;
use crate::geometry::{Offset, Rect, Size};
use crate::hit_test::HitTestBehavior;
use crate::layout::{AxisDirection, BoxConstraints, SliverConstraints};
use crate::paint::PaintContext;
use crate::pipeline::{LayoutCtx, UpdateCtx};
use crate::render::{
    ParentData, Protocol, RenderBox, RenderId, RenderObject, SliverParentData,
};

use super::{ScrollPosition, physical_offset};

/// Box that scrolls a run of sliver children.
///
/// The viewport takes the biggest size its constraints allow, which makes it
/// a relayout boundary: scrolling relays out the slivers but never the
/// viewport's ancestors. Each layout walks the slivers in scroll order,
/// handing each one the part of the scroll offset, paint budget and cache
/// window the previous ones left over.
#[derive(Debug, Clone)]
pub struct RenderViewport {
    axis_direction: AxisDirection,
    position: ScrollPosition,
    cache_extent: Option<f32>,
    max_scroll_extent: f32,
    has_visual_overflow: bool,
}

impl RenderViewport {
    pub fn new(axis_direction: AxisDirection) -> Self {
        Self {
            axis_direction,
            position: ScrollPosition::default(),
            cache_extent: None,
            max_scroll_extent: 0.0,
            has_visual_overflow: false,
        }
    }

    pub fn with_offset(mut self, pixels: f32) -> Self {
        self.position = ScrollPosition::new(pixels);
        self
    }

    /// Overrides the configured cache extent for this viewport.
    pub fn with_cache_extent(mut self, cache_extent: f32) -> Self {
        self.cache_extent = Some(cache_extent.max(0.0));
        self
    }

    pub fn axis_direction(&self) -> AxisDirection {
        self.axis_direction
    }

    pub fn set_axis_direction(&mut self, axis_direction: AxisDirection) -> bool {
        if self.axis_direction == axis_direction {
            return false;
        }
        self.axis_direction = axis_direction;
        true
    }

    pub fn set_cache_extent(&mut self, cache_extent: Option<f32>) -> bool {
        if self.cache_extent == cache_extent {
            return false;
        }
        self.cache_extent = cache_extent;
        true
    }

    pub fn position(&self) -> &ScrollPosition {
        &self.position
    }

    /// How far the content can scroll, as of the last layout.
    pub fn max_scroll_extent(&self) -> f32 {
        self.max_scroll_extent
    }

    pub fn jump_to(&mut self, pixels: f32, cx: &mut UpdateCtx<'_>) {
        if self.position.jump_to(pixels) {
            cx.mark_needs_layout();
        }
    }

    /// Animates toward `target`. A later call supersedes this one from
    /// wherever the scroll has got to.
    pub fn animate_to(
        &mut self,
        target: f32,
        duration: Duration,
        curve: Curve,
        cx: &mut UpdateCtx<'_>,
    ) {
        let target = target.clamp(
            self.position.min_scroll_extent(),
            self.position.max_scroll_extent(),
        );
        self.position.animate_to(target, duration, curve);
        if self.position.is_animating() {
            cx.request_animation_frame();
        } else {
            cx.mark_needs_layout();
        }
    }

    /// Lays the slivers out once. Returns the first scroll offset correction
    /// a sliver asked for, or zero.
    fn layout_children(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        main_extent: f32,
        cross_extent: f32,
        cache_extent: f32,
    ) -> f32 {
        let pixels = self.position.pixels().max(0.0);
        let direction = self.position.user_scroll_direction();

        let full_cache_extent = main_extent + 2.0 * cache_extent;
        let mut scroll_offset = pixels;
        let mut layout_offset = 0.0f32;
        let mut max_paint_offset = 0.0f32;
        let mut preceding_scroll_extent = 0.0f32;
        let mut cache_origin = (-pixels).max(-cache_extent);
        let mut remaining_cache_extent =
            (full_cache_extent - (cache_extent - pixels)).clamp(0.0, full_cache_extent);
        let mut total_scroll_extent = 0.0f32;
        let mut has_visual_overflow = false;

        for child in cx.children() {
            let sliver_scroll_offset = scroll_offset.max(0.0);
            let corrected_cache_origin = cache_origin.max(-sliver_scroll_offset);
            let cache_correction = cache_origin - corrected_cache_origin;
            let constraints = SliverConstraints {
                axis_direction: self.axis_direction,
                scroll_offset: sliver_scroll_offset,
                preceding_scroll_extent,
                overlap: max_paint_offset - layout_offset,
                remaining_paint_extent: (main_extent - layout_offset).max(0.0),
                cross_axis_extent: cross_extent,
                viewport_main_axis_extent: main_extent,
                remaining_cache_extent: (remaining_cache_extent + cache_correction).max(0.0),
                cache_origin: corrected_cache_origin,
                user_scroll_direction: direction,
            };
            let geometry = cx.layout_sliver_child(child, constraints);
            if geometry.scroll_offset_correction != 0.0 {
                return geometry.scroll_offset_correction;
            }

            let effective_offset = layout_offset + geometry.paint_origin;
            let child_layout_offset = if geometry.visible || scroll_offset > 0.0 {
                effective_offset
            } else {
                -scroll_offset
            };
            self.place_child(cx, child, child_layout_offset, main_extent, geometry.paint_extent);

            max_paint_offset = max_paint_offset.max(effective_offset + geometry.paint_extent);
            scroll_offset -= geometry.scroll_extent;
            preceding_scroll_extent += geometry.scroll_extent;
            layout_offset += geometry.layout_extent;
            if geometry.cache_extent != 0.0 {
                remaining_cache_extent -= geometry.cache_extent - cache_correction;
                cache_origin = (corrected_cache_origin + geometry.cache_extent).min(0.0);
            }
            total_scroll_extent += geometry.scroll_extent;
            has_visual_overflow |= geometry.has_visual_overflow;
        }

        self.max_scroll_extent = (total_scroll_extent - main_extent).max(0.0);
        self.has_visual_overflow = has_visual_overflow || total_scroll_extent > main_extent;
        0.0
    }

    fn place_child(
        &self,
        cx: &mut LayoutCtx<'_>,
        child: RenderId,
        layout_offset: f32,
        main_extent: f32,
        paint_extent: f32,
    ) {
        let paint_offset =
            physical_offset(self.axis_direction, layout_offset, 0.0, main_extent, paint_extent);
        if let Some(data) = cx.parent_data_mut::<SliverParentData>(child) {
            data.layout_offset = layout_offset;
            data.paint_offset = paint_offset;
        }
    }
}

impl RenderObject for RenderViewport {
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        let clip = self.has_visual_overflow;
        if clip {
            cx.push_clip(Rect::from_size(cx.size()).translate(offset));
        }
        for child in self.child_paint_order(&cx.children()) {
            let child_offset = cx.child_offset(child);
            cx.paint_child(child, offset + child_offset);
        }
        if clip {
            cx.pop_clip();
        }
    }

    /// Earlier slivers paint last, so a sliver that overlaps the next one
    /// stays on top of it.
    fn child_paint_order(&self, children: &[RenderId]) -> Vec<RenderId> {
        children.iter().rev().copied().collect()
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        HitTestBehavior::Opaque
    }

    fn sized_by_parent(&self) -> bool {
        true
    }

    fn child_protocol(&self) -> Option<Protocol> {
        Some(Protocol::Sliver)
    }

    fn create_parent_data(&self) -> Box<dyn ParentData> {
        Box::new(SliverParentData::default())
    }

    fn advance(&mut self, dt: Duration, cx: &mut UpdateCtx<'_>) -> bool {
        if self.position.advance(dt) {
            cx.mark_needs_layout();
        }
        self.position.is_animating()
    }
}

impl RenderBox for RenderViewport {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        let size = constraints.biggest();
        if !size.is_finite() {
            return Err(LayoutError::violation(
                cx.id(),
                format!("a viewport needs bounded constraints, got {constraints}"),
            ));
        }
        let axis = self.axis_direction.axis();
        let main_extent = axis.main(size);
        let cross_extent = axis.cross(size);
        let cache_extent = self.cache_extent.unwrap_or(cx.config().cache_extent);
        let max_corrections = cx.config().max_scroll_corrections;
        self.position.apply_viewport_dimension(main_extent);

        for attempt in 0..max_corrections {
            if attempt > 0 {
                cx.restart_children();
            }
            let correction = self.layout_children(cx, main_extent, cross_extent, cache_extent);
            if correction != 0.0 {
                log::debug!("viewport {:?} corrected its scroll offset by {correction}", cx.id());
                self.position.correct_by(correction);
                continue;
            }
            if self
                .position
                .apply_content_dimensions(0.0, self.max_scroll_extent)
            {
                continue;
            }
            return Ok(size);
        }
        Err(LayoutError::violation(
            cx.id(),
            format!("viewport did not settle after {max_corrections} layout attempts"),
        ))
    }
}
