//! Widgets, elements and reconciliation.
//!
//! Widgets are cheap immutable descriptions. The [`BuildOwner`] keeps the
//! element tree that outlives them and turns each new widget tree into the
//! smallest set of render tree edits.

mod basic;
mod element;
mod provider;
mod reconcile;
mod scrolling;
mod widget;

/// Adds the `with_key` builder to a widget with a `key: Option<Key>` field.
macro_rules! impl_with_key {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                pub fn with_key(mut self, key: impl Into<$crate::widgets::Key>) -> Self {
                    self.key = Some(key.into());
                    self
                }
            }
        )*
    };
}
pub(crate) use impl_with_key;

/// `Widget::key` for widgets with a `key: Option<Key>` field.
macro_rules! widget_key {
    () => {
        fn key(&self) -> Option<&$crate::widgets::Key> {
            self.key.as_ref()
        }
    };
}
pub(crate) use widget_key;

pub use basic::{
    ConstrainedBox, Flex, FixedSize, InkFeedback, RepaintBoundary, Stack, Text, column, row,
};
pub use element::{BuildContext, BuildOwner, ElementId};
pub use provider::{Builder, Provider};
pub use reconcile::{Patch, Signature, can_update, diff_children, duplicate_key};
pub use scrolling::{
    SliverBand, SliverFixedExtentList, SliverList, SliverPadding, SliverToBoxAdapter, Viewport,
};
pub use widget::{IntoWidget, Key, Widget, WidgetRef, widgets};

pub(crate) use widget::with_render;
