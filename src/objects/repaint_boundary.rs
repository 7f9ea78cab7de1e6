use crate::error::LayoutError;
use crate::geometry::Size;
use crate::layout::BoxConstraints;
use crate::pipeline::LayoutCtx;
use crate::render::{RenderBox, RenderObject};

/// Gives its child a layer of its own, so repainting inside it leaves the
/// ancestors' recorded layers untouched.
#[derive(Debug, Clone, Default)]
pub struct RenderRepaintBoundary;

impl RenderRepaintBoundary {
    pub fn new() -> Self {
        Self
    }
}

impl RenderObject for RenderRepaintBoundary {
    fn is_repaint_boundary(&self) -> bool {
        true
    }
}

impl RenderBox for RenderRepaintBoundary {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        match cx.children().first() {
            Some(&child) => Ok(cx.layout_child(child, constraints)),
            None => Ok(constraints.smallest()),
        }
    }
}
