use crate::error::LayoutError;
use crate::geometry::Size;
use crate::layout::BoxConstraints;
use crate::pipeline::LayoutCtx;
use crate::render::{RenderBox, RenderObject};

/// Imposes extra constraints on its only child.
///
/// The extra constraints are clamped into the incoming ones, so the child
/// always sees a range its parent allows. Without a child the box takes the
/// smallest size that range permits.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConstrainedBox {
    additional: BoxConstraints,
}

impl RenderConstrainedBox {
    pub fn new(additional: BoxConstraints) -> Self {
        Self { additional }
    }

    pub fn additional(&self) -> BoxConstraints {
        self.additional
    }

    /// Returns true if the constraints changed and layout is needed.
    pub fn set_additional(&mut self, additional: BoxConstraints) -> bool {
        if self.additional == additional {
            return false;
        }
        self.additional = additional;
        true
    }
}

impl RenderObject for RenderConstrainedBox {}

impl RenderBox for RenderConstrainedBox {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        let inner = self.additional.enforce(constraints);
        match cx.children().first() {
            Some(&child) => Ok(cx.layout_child(child, inner)),
            None => Ok(inner.constrain(Size::ZERO)),
        }
    }
}
