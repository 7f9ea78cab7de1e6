use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::pipeline::UpdateCtx;
use crate::render::{AsAny, RenderKind, short_type_name};

use super::element::BuildContext;

/// Shared handle to an immutable widget.
pub type WidgetRef = Rc<dyn Widget>;

/// Identity of a widget among its siblings.
///
/// Keyed siblings are matched across rebuilds by key regardless of their
/// position, so reordering keeps their elements and render objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(value) => write!(f, "#{value}"),
            Key::Str(value) => write!(f, "'{value}'"),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

/// Immutable description of part of the UI.
///
/// A widget is either a *render widget*, which creates a render object and
/// lists its child widgets, or a *composed widget*, which builds another
/// widget. Widgets are recreated on every build and never mutated.
pub trait Widget: AsAny {
    fn key(&self) -> Option<&Key> {
        None
    }

    fn debug_name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Builds the single child of a composed widget.
    fn build(&self, cx: &mut BuildContext<'_>) -> Option<WidgetRef> {
        let _ = cx;
        None
    }

    /// Creates the render object of a render widget. Composed widgets
    /// return `None`.
    fn create_render_object(&self) -> Option<RenderKind> {
        None
    }

    /// Pushes this widget's configuration into the render object created by
    /// a widget of the same type. Implementations mark the object dirty
    /// through `cx` only when something changed.
    fn update_render_object(&self, object: &mut RenderKind, cx: &mut UpdateCtx<'_>) {
        let _ = (object, cx);
    }

    fn children(&self) -> &[WidgetRef] {
        &[]
    }

    /// Ambient data made available to descendants through
    /// [`BuildContext::depend_on`].
    fn provided(&self) -> Option<Rc<dyn Any>> {
        None
    }

    /// Whether replacing `old` with `self` must rebuild the descendants that
    /// depend on the provided data.
    fn updates_dependents(&self, old: &dyn Widget) -> bool {
        let _ = old;
        true
    }
}

impl fmt::Debug for dyn Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(key) => write!(f, "{}({key})", self.debug_name()),
            None => f.write_str(self.debug_name()),
        }
    }
}

/// Conversion into a [`WidgetRef`].
pub trait IntoWidget {
    fn into_widget(self) -> WidgetRef;
}

impl<W: Widget> IntoWidget for W {
    fn into_widget(self) -> WidgetRef {
        Rc::new(self)
    }
}

impl IntoWidget for WidgetRef {
    fn into_widget(self) -> WidgetRef {
        self
    }
}

/// Collects widgets into a child list.
pub fn widgets<I>(items: I) -> Vec<WidgetRef>
where
    I: IntoIterator,
    I::Item: IntoWidget,
{
    items.into_iter().map(IntoWidget::into_widget).collect()
}

/// Runs `f` on the concrete render object behind `object`.
pub(crate) fn with_render<T: 'static>(object: &mut RenderKind, f: impl FnOnce(&mut T)) {
    match object.downcast_mut::<T>() {
        Some(target) => f(target),
        None => log::warn!(
            "expected a {} render object, found {object:?}",
            short_type_name::<T>()
        ),
    }
}
