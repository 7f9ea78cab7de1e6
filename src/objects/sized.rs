use crate::error::LayoutError;
use crate::geometry::{Offset, Rect, Size};
use crate::hit_test::HitTestBehavior;
use crate::layout::BoxConstraints;
use crate::paint::{Color, PaintContext};
use crate::pipeline::LayoutCtx;
use crate::render::{Protocol, RenderBox, RenderObject};

/// Leaf with a preferred size, constrained into whatever range it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFixedSize {
    preferred: Size,
    color: Option<Color>,
    behavior: HitTestBehavior,
}

impl RenderFixedSize {
    pub fn new(preferred: Size) -> Self {
        Self {
            preferred,
            color: None,
            behavior: HitTestBehavior::Opaque,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_behavior(mut self, behavior: HitTestBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn preferred(&self) -> Size {
        self.preferred
    }

    /// Returns true if the size changed and layout is needed.
    pub fn set_preferred(&mut self, preferred: Size) -> bool {
        if self.preferred == preferred {
            return false;
        }
        self.preferred = preferred;
        true
    }

    /// Returns true if the color changed and a repaint is needed.
    pub fn set_color(&mut self, color: Option<Color>) -> bool {
        if self.color == color {
            return false;
        }
        self.color = color;
        true
    }

    pub fn set_behavior(&mut self, behavior: HitTestBehavior) {
        self.behavior = behavior;
    }
}

impl RenderObject for RenderFixedSize {
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        if let Some(color) = self.color {
            cx.draw_rect(Rect::from_size(cx.size()).translate(offset), color);
        }
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        self.behavior
    }

    fn child_protocol(&self) -> Option<Protocol> {
        None
    }
}

impl RenderBox for RenderFixedSize {
    fn perform_layout(
        &mut self,
        _cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        Ok(constraints.constrain(self.preferred))
    }
}
