//! Box widgets backed by the render objects in [`crate::objects`].

use crate::geometry::Size;
use crate::hit_test::HitTestBehavior;
use crate::layout::{Axis, BoxConstraints, CrossAxisAlignment, MainAxisAlignment};
use crate::objects::{
    MonospaceText, RenderConstrainedBox, RenderFixedSize, RenderFlex, RenderInkFeedback,
    RenderMeasured, RenderRepaintBoundary, RenderStack, RippleConfig,
};
use crate::paint::Color;
use crate::pipeline::UpdateCtx;
use crate::render::RenderKind;

use super::widget::{IntoWidget, Key, Widget, WidgetRef, with_render};
use super::{impl_with_key, widget_key};

/// Leaf with a preferred size.
#[derive(Debug, Clone)]
pub struct FixedSize {
    key: Option<Key>,
    size: Size,
    color: Option<Color>,
    behavior: HitTestBehavior,
}

impl FixedSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            key: None,
            size: Size::new(width, height),
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
}

impl Widget for FixedSize {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        let mut object = RenderFixedSize::new(self.size).with_behavior(self.behavior);
        object.set_color(self.color);
        Some(RenderKind::new_box(object))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderFixedSize>(object, |object| {
            if object.set_preferred(self.size) {
                cx.mark_needs_layout();
            }
            if object.set_color(self.color) {
                cx.mark_needs_paint();
            }
            object.set_behavior(self.behavior);
        });
    }
}

/// Monospace text, wrapped to the available width.
#[derive(Debug, Clone)]
pub struct Text {
    key: Option<Key>,
    text: String,
    char_width: f32,
    line_height: f32,
    color: Color,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            key: None,
            text: text.into(),
            char_width: 8.0,
            line_height: 16.0,
            color: Color::BLACK,
        }
    }

    /// Overrides the per-character advance and the line height.
    pub fn with_metrics(mut self, char_width: f32, line_height: f32) -> Self {
        self.char_width = char_width;
        self.line_height = line_height;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn content(&self) -> MonospaceText {
        MonospaceText::new(self.text.clone(), self.char_width, self.line_height)
    }
}

impl Widget for Text {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_box(
            RenderMeasured::new(self.content()).with_color(self.color),
        ))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        let content = self.content();
        with_render::<RenderMeasured>(object, |object| {
            if object.measure_as::<MonospaceText>() != Some(&content) {
                object.set_measure(Box::new(content));
                cx.mark_needs_layout();
            }
            if object.set_color(self.color) {
                cx.mark_needs_paint();
            }
        });
    }
}

/// Imposes additional constraints on its child.
#[derive(Debug, Clone)]
pub struct ConstrainedBox {
    key: Option<Key>,
    additional: BoxConstraints,
    child: Option<WidgetRef>,
}

impl ConstrainedBox {
    pub fn new(additional: BoxConstraints) -> Self {
        Self {
            key: None,
            additional,
            child: None,
        }
    }

    pub fn tight(width: f32, height: f32) -> Self {
        Self::new(BoxConstraints::tight(Size::new(width, height)))
    }

    pub fn child(mut self, child: impl IntoWidget) -> Self {
        self.child = Some(child.into_widget());
        self
    }
}

impl Widget for ConstrainedBox {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_box(RenderConstrainedBox::new(self.additional)))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderConstrainedBox>(object, |object| {
            if object.set_additional(self.additional) {
                cx.mark_needs_layout();
            }
        });
    }

    fn children(&self) -> &[WidgetRef] {
        self.child.as_slice()
    }
}

/// Lays its children out in a row or a column.
#[derive(Debug, Clone)]
pub struct Flex {
    key: Option<Key>,
    config: RenderFlex,
    children: Vec<WidgetRef>,
}

impl Flex {
    pub fn new(axis: Axis, children: Vec<WidgetRef>) -> Self {
        Self {
            key: None,
            config: RenderFlex::new(axis),
            children,
        }
    }

    pub fn main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.config = self.config.with_main_axis_alignment(alignment);
        self
    }

    pub fn cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.config = self.config.with_cross_axis_alignment(alignment);
        self
    }

    pub fn spacing(mut self, spacing: f32) -> Self {
        self.config = self.config.with_spacing(spacing);
        self
    }
}

/// Horizontal [`Flex`].
pub fn row(children: Vec<WidgetRef>) -> Flex {
    Flex::new(Axis::Horizontal, children)
}

/// Vertical [`Flex`].
pub fn column(children: Vec<WidgetRef>) -> Flex {
    Flex::new(Axis::Vertical, children)
}

impl Widget for Flex {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_box(self.config.clone()))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderFlex>(object, |object| {
            if object.configure(&self.config) {
                cx.mark_needs_layout();
            }
        });
    }

    fn children(&self) -> &[WidgetRef] {
        &self.children
    }
}

/// Overlays its children at the origin, later children on top.
#[derive(Debug, Clone)]
pub struct Stack {
    key: Option<Key>,
    children: Vec<WidgetRef>,
}

impl Stack {
    pub fn new(children: Vec<WidgetRef>) -> Self {
        Self {
            key: None,
            children,
        }
    }
}

impl Widget for Stack {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_box(RenderStack::new()))
    }

    fn children(&self) -> &[WidgetRef] {
        &self.children
    }
}

/// Paints its child into a layer of its own.
#[derive(Debug, Clone)]
pub struct RepaintBoundary {
    key: Option<Key>,
    child: Option<WidgetRef>,
}

impl RepaintBoundary {
    pub fn new(child: impl IntoWidget) -> Self {
        Self {
            key: None,
            child: Some(child.into_widget()),
        }
    }
}

impl Widget for RepaintBoundary {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_box(RenderRepaintBoundary::new()))
    }

    fn children(&self) -> &[WidgetRef] {
        self.child.as_slice()
    }
}

/// Press feedback drawn over a child.
#[derive(Debug, Clone)]
pub struct InkFeedback {
    key: Option<Key>,
    config: RippleConfig,
    child: Option<WidgetRef>,
}

impl InkFeedback {
    pub fn new(child: impl IntoWidget) -> Self {
        Self {
            key: None,
            config: RippleConfig::default(),
            child: Some(child.into_widget()),
        }
    }

    pub fn ripple(mut self, config: RippleConfig) -> Self {
        self.config = config;
        self
    }
}

impl Widget for InkFeedback {
    widget_key!();

    fn create_render_object(&self) -> Option<RenderKind> {
        Some(RenderKind::new_box(RenderInkFeedback::new(self.config)))
    }

    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        with_render::<RenderInkFeedback>(object, |object| {
            if object.set_config(self.config) {
                cx.mark_needs_paint();
            }
        });
    }

    fn children(&self) -> &[WidgetRef] {
        self.child.as_slice()
    }
}

impl_with_key!(FixedSize, Text, ConstrainedBox, Flex, Stack, RepaintBoundary, InkFeedback);
