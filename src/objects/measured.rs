use std::any::Any;

use crate::error::LayoutError;
use crate::geometry::{Offset, Rect, Size};
use crate::layout::BoxConstraints;
use crate::paint::{Color, PaintContext};
use crate::pipeline::{LayoutCtx, UpdateCtx};
use crate::render::{Protocol, RenderBox, RenderObject};

/// Opaque measurement of leaf content such as text or an image.
///
/// Given box constraints it returns the size the content wants; the leaf
/// constrains the answer before using it.
pub trait Measure: Any + Send {
    fn measure(&self, constraints: BoxConstraints) -> Size;

    /// Text to emit when painted, if any.
    fn label(&self) -> Option<&str> {
        None
    }
}

/// Content with a fixed natural size, e.g. a decoded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrinsicSize(pub Size);

impl Measure for IntrinsicSize {
    fn measure(&self, _constraints: BoxConstraints) -> Size {
        self.0
    }
}

/// Fixed-advance text, wrapped at the maximum width.
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceText {
    text: String,
    char_width: f32,
    line_height: f32,
}

impl MonospaceText {
    pub fn new(text: impl Into<String>, char_width: f32, line_height: f32) -> Self {
        Self {
            text: text.into(),
            char_width,
            line_height,
        }
    }
}

impl Measure for MonospaceText {
    fn measure(&self, constraints: BoxConstraints) -> Size {
        let per_line = if constraints.has_bounded_width() && self.char_width > 0.0 {
            ((constraints.max_width / self.char_width).floor() as usize).max(1)
        } else {
            usize::MAX
        };

        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in self.text.split('\n') {
            let chars = line.chars().count();
            lines += chars.div_ceil(per_line).max(1);
            widest = widest.max(chars.min(per_line));
        }
        Size::new(
            widest as f32 * self.char_width,
            lines as f32 * self.line_height,
        )
    }

    fn label(&self) -> Option<&str> {
        Some(&self.text)
    }
}

/// Replaces the measurement of a [`RenderMeasured`] when posted to it.
pub struct MeasureUpdate(pub Box<dyn Measure>);

/// Leaf sized by a [`Measure`].
///
/// Its content may change off the frame thread: posting a [`MeasureUpdate`]
/// or an [`IntrinsicSize`] through the job queue swaps the measurement and
/// schedules layout for the next frame.
pub struct RenderMeasured {
    measure: Box<dyn Measure>,
    color: Color,
}

impl RenderMeasured {
    pub fn new(measure: impl Measure) -> Self {
        Self {
            measure: Box::new(measure),
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// The current measurement, if it is a `T`.
    pub fn measure_as<T: Measure>(&self) -> Option<&T> {
        let measure: &dyn Any = &*self.measure;
        measure.downcast_ref()
    }

    pub fn set_measure(&mut self, measure: Box<dyn Measure>) {
        self.measure = measure;
    }

    pub fn set_color(&mut self, color: Color) -> bool {
        if self.color == color {
            return false;
        }
        self.color = color;
        true
    }
}

impl RenderObject for RenderMeasured {
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        let rect = Rect::from_size(cx.size()).translate(offset);
        match self.measure.label() {
            Some(label) => cx.draw_text(label, rect, self.color),
            None => cx.draw_rect(rect, self.color),
        }
    }

    fn child_protocol(&self) -> Option<Protocol> {
        None
    }

    fn receive(&mut self, payload: Box<dyn Any + Send>, cx: &mut UpdateCtx<'_>) {
        let payload = match payload.downcast::<MeasureUpdate>() {
            Ok(update) => {
                self.measure = update.0;
                cx.mark_needs_layout();
                return;
            }
            Err(payload) => payload,
        };
        match payload.downcast::<IntrinsicSize>() {
            Ok(size) => {
                log::debug!("{:?} received intrinsic size {}", cx.id(), size.0);
                self.measure = size;
                cx.mark_needs_layout();
            }
            Err(_) => log::debug!("{:?} ignored an unknown payload", cx.id()),
        }
    }
}

impl RenderBox for RenderMeasured {
    fn perform_layout(
        &mut self,
        _cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        Ok(constraints.constrain(self.measure.measure(constraints)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_single_line() {
        let text = MonospaceText::new("hello", 10.0, 20.0);
        assert_eq!(text.measure(BoxConstraints::unbounded()), Size::new(50.0, 20.0));
    }

    #[test]
    fn test_monospace_wraps_at_max_width() {
        let text = MonospaceText::new("abcdefghij", 10.0, 20.0);
        let size = text.measure(BoxConstraints::loose(Size::new(45.0, 500.0)));
        // Four characters per line, three lines.
        assert_eq!(size, Size::new(40.0, 60.0));
    }

    #[test]
    fn test_monospace_counts_hard_breaks() {
        let text = MonospaceText::new("ab\n\nabcd", 10.0, 10.0);
        assert_eq!(text.measure(BoxConstraints::unbounded()), Size::new(40.0, 30.0));
    }
}
