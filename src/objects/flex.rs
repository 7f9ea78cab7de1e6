use crate::error::LayoutError;
use crate::geometry::Size;
use crate::layout::{Axis, BoxConstraints, CrossAxisAlignment, MainAxisAlignment};
use crate::pipeline::LayoutCtx;
use crate::render::{RenderBox, RenderObject};

/// Row or column of box children.
///
/// Children are laid out once, along `axis`, with the full main-axis range
/// and a loose cross axis (tight to the maximum when stretching into a bounded
/// cross axis). The flex then sizes itself and writes each child's offset
/// into its [`BoxParentData`](crate::render::BoxParentData).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFlex {
    axis: Axis,
    main_axis_alignment: MainAxisAlignment,
    cross_axis_alignment: CrossAxisAlignment,
    spacing: f32,
}

impl RenderFlex {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            main_axis_alignment: MainAxisAlignment::Start,
            cross_axis_alignment: CrossAxisAlignment::Start,
            spacing: 0.0,
        }
    }

    pub fn row() -> Self {
        Self::new(Axis::Horizontal)
    }

    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    pub fn with_main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.main_axis_alignment = alignment;
        self
    }

    pub fn with_cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Copies the configuration of `other`. Returns true if anything changed.
    pub fn configure(&mut self, other: &RenderFlex) -> bool {
        if self == other {
            return false;
        }
        *self = other.clone();
        true
    }

    fn child_constraints(&self, main_max: f32, cross_max: f32) -> BoxConstraints {
        let stretch =
            self.cross_axis_alignment == CrossAxisAlignment::Stretch && cross_max.is_finite();
        let cross_min = if stretch { cross_max } else { 0.0 };
        match self.axis {
            Axis::Horizontal => BoxConstraints::new(0.0, cross_min, main_max, cross_max),
            Axis::Vertical => BoxConstraints::new(cross_min, 0.0, cross_max, main_max),
        }
    }
}

impl RenderObject for RenderFlex {}

impl RenderBox for RenderFlex {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        let axis = self.axis;
        let main_min = axis.main(constraints.smallest());
        let main_max = axis.main(constraints.max_size());
        let cross_min = axis.cross(constraints.smallest());
        let cross_max = axis.cross(constraints.max_size());
        let child_constraints = self.child_constraints(main_max, cross_max);

        let children = cx.children();
        let mut child_sizes = Vec::with_capacity(children.len());
        let mut children_main = 0.0f32;
        let mut max_cross = 0.0f32;
        for &child in &children {
            let size = cx.layout_child(child, child_constraints);
            children_main += axis.main(size);
            max_cross = max_cross.max(axis.cross(size));
            child_sizes.push(size);
        }

        let total_spacing = self.spacing * children.len().saturating_sub(1) as f32;
        let natural_main = children_main + total_spacing;

        // Anything but Start spreads over the available main axis when it is bounded.
        let main_size = match self.main_axis_alignment {
            MainAxisAlignment::Start => natural_main.max(main_min).min(main_max),
            _ if main_max.is_finite() => main_max,
            _ => natural_main.max(main_min),
        };
        let cross_size = max_cross.max(cross_min).min(cross_max);

        let free_space = main_size - natural_main;
        if free_space < 0.0 {
            log::trace!("flex {:?} overflows by {}", cx.id(), -free_space);
        }
        let (leading, gap) =
            self.main_axis_alignment
                .spacing(self.spacing, free_space, children.len());

        let mut main_pos = leading;
        for (&child, size) in children.iter().zip(&child_sizes) {
            let child_cross = axis.cross(*size);
            let cross_pos = match self.cross_axis_alignment {
                CrossAxisAlignment::Start | CrossAxisAlignment::Stretch => 0.0,
                CrossAxisAlignment::Center => (cross_size - child_cross) / 2.0,
                CrossAxisAlignment::End => cross_size - child_cross,
            };
            cx.set_child_offset(child, axis.offset(main_pos, cross_pos));
            main_pos += axis.main(*size) + gap;
        }

        Ok(axis.size(main_size, cross_size))
    }
}
