use crate::error::LayoutError;
use crate::geometry::{Offset, Size};
use crate::layout::BoxConstraints;
use crate::pipeline::LayoutCtx;
use crate::render::{RenderBox, RenderObject};

/// Lays children on top of each other at its origin.
///
/// Children get loose constraints and the stack takes the size of its largest
/// child. Later children paint on top and are hit first.
#[derive(Debug, Clone, Default)]
pub struct RenderStack;

impl RenderStack {
    pub fn new() -> Self {
        Self
    }
}

impl RenderObject for RenderStack {}

impl RenderBox for RenderStack {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        let loose = constraints.loosen();
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for child in cx.children() {
            let size = cx.layout_child(child, loose);
            width = width.max(size.width);
            height = height.max(size.height);
            cx.set_child_offset(child, Offset::ZERO);
        }
        Ok(constraints.constrain(Size::new(width, height)))
    }
}
