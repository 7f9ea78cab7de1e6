//! Sliver-protocol render objects and the viewport that hosts them.
//!
//! Slivers lay out along the scroll axis in *scroll coordinates*: a sliver's
//! own content starts at 0 and the viewport tells it how much of that content
//! has scrolled off (`scroll_offset`) and how much room is left to paint.
//! Converting those into physical offsets, which flip for `Up` and `Left`,
//! happens in one place, [`physical_offset`].

mod adapter;
mod band;
mod list;
mod padding;
mod scroll;
mod viewport;

pub use adapter::RenderSliverToBoxAdapter;
pub use band::RenderSliverBand;
pub use list::{RenderSliverFixedExtentList, RenderSliverList, SliverChildBuilder};
pub use padding::RenderSliverPadding;
pub use scroll::ScrollPosition;
pub use viewport::RenderViewport;

use crate::geometry::{Offset, Rect};
use crate::layout::AxisDirection;
use crate::paint::PaintContext;
use crate::render::{Constraints, Geometry};

/// Physical offset of a child placed `main` along the scroll axis from the
/// leading edge of a container `container_extent` long.
pub(crate) fn physical_offset(
    direction: AxisDirection,
    main: f32,
    cross: f32,
    container_extent: f32,
    child_extent: f32,
) -> Offset {
    match direction {
        AxisDirection::Down => Offset::new(cross, main),
        AxisDirection::Right => Offset::new(main, cross),
        AxisDirection::Up => Offset::new(cross, container_extent - main - child_extent),
        AxisDirection::Left => Offset::new(container_extent - main - child_extent, cross),
    }
}

/// Paints the box children that intersect the painted part of the sliver.
/// Children kept alive only for the cache window are skipped.
pub(crate) fn paint_visible_children(cx: &mut PaintContext<'_>, offset: Offset) {
    let (Some(geometry), Some(Constraints::Sliver(constraints))) =
        (cx.sliver_geometry(), cx.constraints())
    else {
        return;
    };
    let visible = Rect::from_size(
        constraints
            .axis()
            .size(geometry.paint_extent, constraints.cross_axis_extent),
    );
    for child in cx.children() {
        let Some(Geometry::Box(size)) = cx.child_geometry(child) else {
            continue;
        };
        let child_offset = cx.child_offset(child);
        let bounds = Rect::from_size(size).translate(child_offset);
        if bounds.intersects(&visible) {
            cx.paint_child(child, offset + child_offset);
        }
    }
}
