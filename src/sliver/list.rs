use std::fmt;
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::error::LayoutError;
use crate::geometry::Offset;
use crate::layout::{SliverConstraints, SliverGeometry, calculate_cache_offset, calculate_paint_offset};
use crate::paint::PaintContext;
use crate::pipeline::{LayoutCtx, UpdateCtx};
use crate::render::{
    ParentData, RenderBox, RenderId, RenderKind, RenderObject, RenderSliver, SliverListParentData,
};

use super::{paint_visible_children, physical_offset};

type BuildFn = dyn Fn(usize) -> Option<Box<dyn RenderBox>>;

/// Builds the box children of a lazy list on demand.
///
/// `build(index)` returns `None` past the end of the list. The count, when
/// known up front, bounds the indices and lets the list report an exact or
/// extrapolated scroll extent.
#[derive(Clone)]
pub struct SliverChildBuilder {
    build: Rc<BuildFn>,
    count: Option<usize>,
}

impl SliverChildBuilder {
    pub fn new(build: impl Fn(usize) -> Option<Box<dyn RenderBox>> + 'static) -> Self {
        Self {
            build: Rc::new(build),
            count: None,
        }
    }

    pub fn with_count(
        count: usize,
        build: impl Fn(usize) -> Option<Box<dyn RenderBox>> + 'static,
    ) -> Self {
        Self {
            build: Rc::new(build),
            count: Some(count),
        }
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn build(&self, index: usize) -> Option<Box<dyn RenderBox>> {
        if self.count.is_some_and(|count| index >= count) {
            return None;
        }
        (self.build)(index)
    }

    pub fn ptr_eq(&self, other: &SliverChildBuilder) -> bool {
        Rc::ptr_eq(&self.build, &other.build) && self.count == other.count
    }
}

impl fmt::Debug for SliverChildBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliverChildBuilder")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

fn index_of(cx: &LayoutCtx<'_>, child: RenderId) -> Option<usize> {
    cx.parent_data::<SliverListParentData>(child)
        .map(|data| data.index)
}

fn layout_offset_of(cx: &LayoutCtx<'_>, child: RenderId) -> f32 {
    cx.parent_data::<SliverListParentData>(child)
        .map_or(0.0, |data| data.layout_offset)
}

fn set_layout_offset(cx: &mut LayoutCtx<'_>, child: RenderId, layout_offset: f32) {
    if let Some(data) = cx.parent_data_mut::<SliverListParentData>(child) {
        data.layout_offset = layout_offset;
    }
}

/// Returns the child for `index`, building it if it is not alive. Children
/// stay sorted by index. `None` means the builder has no such child.
fn obtain_child(
    cx: &mut LayoutCtx<'_>,
    builder: &SliverChildBuilder,
    index: usize,
) -> Result<Option<RenderId>, LayoutError> {
    let children = cx.children();
    let position =
        children.partition_point(|&child| index_of(cx, child).is_some_and(|i| i < index));
    if let Some(&child) = children.get(position)
        && index_of(cx, child) == Some(index)
    {
        return Ok(Some(child));
    }
    let Some(object) = builder.build(index) else {
        return Ok(None);
    };
    let parent_data = SliverListParentData {
        index,
        ..Default::default()
    };
    let child = cx.insert_child(position, RenderKind::Box(object), Box::new(parent_data))?;
    log::trace!("list {:?} built child {index} as {child:?}", cx.id());
    Ok(Some(child))
}

/// Disposes every child whose index falls outside `keep`.
fn collect_garbage(cx: &mut LayoutCtx<'_>, keep: Option<RangeInclusive<usize>>) {
    let mut removed = 0;
    for child in cx.children() {
        let alive = match (&keep, index_of(cx, child)) {
            (Some(keep), Some(index)) => keep.contains(&index),
            _ => false,
        };
        if !alive {
            cx.remove_child(child);
            removed += 1;
        }
    }
    if removed > 0 {
        log::trace!("list {:?} collected {removed} children", cx.id());
    }
}

/// Writes physical paint offsets for every child from its layout offset.
fn position_children(cx: &mut LayoutCtx<'_>, constraints: &SliverConstraints, paint_extent: f32) {
    let axis = constraints.axis();
    for child in cx.children() {
        let main = layout_offset_of(cx, child) - constraints.scroll_offset;
        let extent = cx.child_size(child).map_or(0.0, |size| axis.main(size));
        let offset = physical_offset(constraints.axis_direction, main, 0.0, paint_extent, extent);
        if let Some(data) = cx.parent_data_mut::<SliverListParentData>(child) {
            data.paint_offset = offset;
        }
    }
}

fn window_geometry(
    constraints: &SliverConstraints,
    leading: f32,
    trailing: f32,
    scroll_extent: f32,
) -> SliverGeometry {
    let paint_extent = calculate_paint_offset(constraints, leading, trailing);
    let cache_extent = calculate_cache_offset(constraints, leading, trailing);
    let end_of_paint = constraints.scroll_offset + constraints.remaining_paint_extent;
    SliverGeometry::new(scroll_extent, paint_extent, scroll_extent)
        .with_cache_extent(cache_extent)
        .with_visual_overflow(scroll_extent > end_of_paint || constraints.scroll_offset > 0.0)
}

/// Replaces the builder and drops the children built by the old one.
fn replace_builder(
    current: &mut SliverChildBuilder,
    builder: SliverChildBuilder,
    cx: &mut UpdateCtx<'_>,
) -> bool {
    if current.ptr_eq(&builder) {
        return false;
    }
    *current = builder;
    for child in cx.children() {
        cx.remove_child(child);
    }
    cx.mark_needs_layout();
    true
}

/// Lazy list whose children all have the same main-axis extent.
///
/// Indices in the cache window are computed directly from the scroll offset,
/// so jumping anywhere in the list builds only the children it lands on.
#[derive(Debug, Clone)]
pub struct RenderSliverFixedExtentList {
    item_extent: f32,
    builder: SliverChildBuilder,
    /// End of the list found while building, when the builder has no count.
    discovered_count: Option<usize>,
}

impl RenderSliverFixedExtentList {
    pub fn new(item_extent: f32, builder: SliverChildBuilder) -> Self {
        Self {
            item_extent,
            builder,
            discovered_count: None,
        }
    }

    pub fn item_extent(&self) -> f32 {
        self.item_extent
    }

    pub fn set_item_extent(&mut self, item_extent: f32) -> bool {
        if self.item_extent == item_extent {
            return false;
        }
        self.item_extent = item_extent;
        true
    }

    /// Returns true if the builder was replaced. Existing children are dropped
    /// and rebuilt on the next layout.
    pub fn set_builder(&mut self, builder: SliverChildBuilder, cx: &mut UpdateCtx<'_>) -> bool {
        let replaced = replace_builder(&mut self.builder, builder, cx);
        if replaced {
            self.discovered_count = None;
        }
        replaced
    }

    fn count(&self) -> Option<usize> {
        self.builder.count().or(self.discovered_count)
    }
}

impl RenderObject for RenderSliverFixedExtentList {
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        paint_visible_children(cx, offset);
    }

    fn create_parent_data(&self) -> Box<dyn ParentData> {
        Box::new(SliverListParentData::default())
    }
}

impl RenderSliver for RenderSliverFixedExtentList {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: SliverConstraints,
    ) -> Result<SliverGeometry, LayoutError> {
        let extent = self.item_extent;
        if !(extent > 0.0) {
            collect_garbage(cx, None);
            return Err(LayoutError::violation(
                cx.id(),
                format!("item extent {extent} must be positive"),
            ));
        }

        let window_start = constraints.scroll_offset + constraints.cache_origin;
        let window_end = window_start + constraints.remaining_cache_extent;
        let mut first = (window_start / extent).floor() as usize;
        let mut end = if constraints.remaining_cache_extent > 0.0 {
            if !window_end.is_finite() && self.count().is_none() {
                return Err(LayoutError::violation(
                    cx.id(),
                    "an unbounded list needs a finite cache window",
                ));
            }
            (window_end / extent).ceil() as usize
        } else {
            first
        };
        if let Some(count) = self.count() {
            first = first.min(count);
            end = end.min(count);
        }

        collect_garbage(cx, (first < end).then(|| first..=end - 1));

        let child_constraints = constraints.as_box_constraints(extent, extent, None);
        for index in first..end {
            let Some(child) = obtain_child(cx, &self.builder, index)? else {
                self.discovered_count = Some(index);
                end = index;
                break;
            };
            cx.layout_child(child, child_constraints);
            set_layout_offset(cx, child, index as f32 * extent);
        }

        let scroll_extent = self
            .count()
            .map_or(f32::INFINITY, |count| count as f32 * extent);
        let geometry = window_geometry(
            &constraints,
            first as f32 * extent,
            end as f32 * extent,
            scroll_extent,
        );
        position_children(cx, &constraints, geometry.paint_extent);
        Ok(geometry)
    }
}

/// Lazy list of children with independent main-axis extents.
///
/// Offsets are only known for children that have been laid out, so the list
/// grows its run of live children from the first one it still has. When
/// building backwards shows the earlier offsets were wrong, it asks the
/// viewport for a scroll offset correction instead of painting a gap.
#[derive(Debug, Clone)]
pub struct RenderSliverList {
    builder: SliverChildBuilder,
}

impl RenderSliverList {
    pub fn new(builder: SliverChildBuilder) -> Self {
        Self { builder }
    }

    pub fn set_builder(&mut self, builder: SliverChildBuilder, cx: &mut UpdateCtx<'_>) -> bool {
        replace_builder(&mut self.builder, builder, cx)
    }
}

impl RenderObject for RenderSliverList {
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        paint_visible_children(cx, offset);
    }

    fn create_parent_data(&self) -> Box<dyn ParentData> {
        Box::new(SliverListParentData::default())
    }
}

impl RenderSliver for RenderSliverList {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: SliverConstraints,
    ) -> Result<SliverGeometry, LayoutError> {
        let tolerance = cx.config().precision_tolerance;
        let axis = constraints.axis();
        let window_start = constraints.scroll_offset + constraints.cache_origin;
        let window_end = window_start + constraints.remaining_cache_extent;
        if !window_end.is_finite() {
            return Err(LayoutError::violation(
                cx.id(),
                "a variable extent list needs a finite cache window",
            ));
        }
        let child_constraints = constraints.as_box_constraints(0.0, f32::INFINITY, None);

        let mut first = match cx.children().first() {
            Some(&child) => child,
            None => match obtain_child(cx, &self.builder, 0)? {
                Some(child) => child,
                None => return Ok(SliverGeometry::ZERO),
            },
        };
        let mut first_index = index_of(cx, first).unwrap_or(0);
        let mut first_offset = layout_offset_of(cx, first);
        let mut first_extent = axis.main(cx.layout_child(first, child_constraints));

        // Build backwards until the leading edge of the window is covered.
        while first_offset > window_start && first_index > 0 {
            let index = first_index - 1;
            let Some(child) = obtain_child(cx, &self.builder, index)? else {
                break;
            };
            let extent = axis.main(cx.layout_child(child, child_constraints));
            let offset = first_offset - extent;
            if offset < -tolerance {
                set_layout_offset(cx, child, 0.0);
                log::debug!("list {:?} underflowed by {}; correcting", cx.id(), -offset);
                return Ok(SliverGeometry::correction(-offset));
            }
            set_layout_offset(cx, child, offset);
            first = child;
            first_index = index;
            first_offset = offset;
            first_extent = extent;
        }
        // At the top of the scroll range the children before the first one
        // have no room left. Build them from index 0 and shift the scroll
        // offset by their extent so the run starts at offset 0 again.
        if constraints.scroll_offset < tolerance && first_index > 0 {
            let mut offset = 0.0;
            let mut leading = None;
            for index in 0..first_index {
                let Some(child) = obtain_child(cx, &self.builder, index)? else {
                    break;
                };
                let extent = axis.main(cx.layout_child(child, child_constraints));
                set_layout_offset(cx, child, offset);
                leading.get_or_insert((child, extent));
                offset += extent;
            }
            let correction = offset - first_offset;
            if correction.abs() > tolerance {
                log::debug!(
                    "list {:?} rebuilt {first_index} leading children; correcting by {correction}",
                    cx.id()
                );
                return Ok(SliverGeometry::correction(correction));
            }
            if let Some((child, extent)) = leading {
                first = child;
                first_index = 0;
                first_offset = 0.0;
                first_extent = extent;
            }
        }
        if first_index == 0 && first_offset.abs() > tolerance {
            set_layout_offset(cx, first, 0.0);
            log::debug!("list {:?} first child was at {first_offset}; correcting", cx.id());
            return Ok(SliverGeometry::correction(-first_offset));
        }

        // Walk forward, laying out live children and building missing ones,
        // until the trailing edge of the window is covered.
        let mut leading = (first_index, first_offset);
        let mut last_index = first_index;
        let mut last_offset = first_offset;
        let mut end = first_offset + first_extent;
        if end <= window_start {
            leading = (first_index + 1, end);
        }
        let mut reached_end = false;
        while end < window_end {
            let index = last_index + 1;
            let Some(child) = obtain_child(cx, &self.builder, index)? else {
                reached_end = true;
                break;
            };
            let extent = axis.main(cx.layout_child(child, child_constraints));
            set_layout_offset(cx, child, end);
            last_index = index;
            last_offset = end;
            end += extent;
            if end <= window_start {
                leading = (index + 1, end);
            }
        }

        // Keep at least the last child so the run keeps an anchor offset.
        let (leading_index, leading_offset) = if leading.0 > last_index {
            (last_index, last_offset)
        } else {
            leading
        };
        collect_garbage(cx, Some(leading_index..=last_index));

        let scroll_extent = if reached_end {
            end
        } else {
            match self.builder.count() {
                Some(count) => {
                    let built = (last_index - leading_index + 1) as f32;
                    let average = (end - leading_offset) / built;
                    let remaining = count.saturating_sub(last_index + 1) as f32;
                    end + average * remaining
                }
                None => f32::INFINITY,
            }
        };
        let geometry = window_geometry(&constraints, leading_offset, end, scroll_extent);
        position_children(cx, &constraints, geometry.paint_extent);
        Ok(geometry)
    }
}
