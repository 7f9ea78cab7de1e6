//! Composed widgets: inherited data and closures that build.

use std::any::Any;
use std::rc::Rc;

use super::element::BuildContext;
use super::widget::{IntoWidget, Key, Widget, WidgetRef};
use super::{impl_with_key, widget_key};

/// Makes `value` available to every descendant that asks for a `T` through
/// [`BuildContext::depend_on`].
///
/// When a new provider replaces this one with an unequal value, exactly the
/// descendants that read it are rebuilt.
pub struct Provider<T> {
    key: Option<Key>,
    value: Rc<T>,
    child: WidgetRef,
}

impl<T: PartialEq + 'static> Provider<T> {
    pub fn new(value: T, child: impl IntoWidget) -> Self {
        Self {
            key: None,
            value: Rc::new(value),
            child: child.into_widget(),
        }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq + 'static> Widget for Provider<T> {
    widget_key!();

    fn build(&self, _cx: &mut BuildContext<'_>) -> Option<WidgetRef> {
        Some(self.child.clone())
    }

    fn provided(&self) -> Option<Rc<dyn Any>> {
        Some(self.value.clone())
    }

    fn updates_dependents(&self, old: &dyn Widget) -> bool {
        old.as_any()
            .downcast_ref::<Self>()
            .is_none_or(|old| old.value != self.value)
    }
}

type BuildFn = dyn Fn(&mut BuildContext<'_>) -> WidgetRef;

/// Builds its child with a closure, so the child can read inherited data.
#[derive(Clone)]
pub struct Builder {
    key: Option<Key>,
    build: Rc<BuildFn>,
}

impl Builder {
    pub fn new(build: impl Fn(&mut BuildContext<'_>) -> WidgetRef + 'static) -> Self {
        Self {
            key: None,
            build: Rc::new(build),
        }
    }
}

impl Widget for Builder {
    widget_key!();

    fn build(&self, cx: &mut BuildContext<'_>) -> Option<WidgetRef> {
        Some((self.build)(cx))
    }
}

impl_with_key!(Builder);
