//! The render object model.
//!
//! A render object is a persistent, mutable node that knows how to lay itself
//! out under one of two protocols and paint itself. The tree structure
//! (parent, children, dirty flags, cached results) is kept by
//! [`RenderTree`], not by the objects, so objects only hold their own
//! configuration and transient state.

pub mod tree;

use std::any::{Any, type_name};
use std::fmt::Debug;
use std::time::Duration;

use crate::arena::arena_id;
use crate::error::LayoutError;
use crate::geometry::{Offset, Size};
use crate::hit_test::HitTestBehavior;
use crate::layout::{BoxConstraints, SliverConstraints, SliverGeometry};
use crate::paint::PaintContext;
use crate::pipeline::{LayoutCtx, UpdateCtx};

pub use tree::{DirtyFlags, RenderNode, RenderTree};

arena_id!(
    /// Handle to a node in the [`RenderTree`].
    RenderId
);

/// Upcast to `Any` so trait objects can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Box,
    Sliver,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraints {
    Box(BoxConstraints),
    Sliver(SliverConstraints),
}

impl Constraints {
    pub fn protocol(&self) -> Protocol {
        match self {
            Constraints::Box(_) => Protocol::Box,
            Constraints::Sliver(_) => Protocol::Sliver,
        }
    }

    pub fn is_tight(&self) -> bool {
        match self {
            Constraints::Box(c) => c.is_tight(),
            Constraints::Sliver(_) => false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Constraints::Box(c) => c.validate(),
            Constraints::Sliver(c) => c.validate(),
        }
    }
}

/// Result of a completed layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box(Size),
    Sliver(SliverGeometry),
}

impl Geometry {
    pub fn size(&self) -> Option<Size> {
        match self {
            Geometry::Box(size) => Some(*size),
            Geometry::Sliver(_) => None,
        }
    }

    pub fn sliver(&self) -> Option<SliverGeometry> {
        match self {
            Geometry::Box(_) => None,
            Geometry::Sliver(geometry) => Some(*geometry),
        }
    }
}

/// Data a parent stores on each child. Only the parent writes it.
pub trait ParentData: AsAny + Debug {
    /// Where the child paints, relative to the parent's paint origin.
    fn paint_offset(&self) -> Offset;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxParentData {
    pub offset: Offset,
}

impl ParentData for BoxParentData {
    fn paint_offset(&self) -> Offset {
        self.offset
    }
}

/// Slot for a sliver inside a viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SliverParentData {
    /// Distance from the viewport's leading edge along the scroll axis.
    pub layout_offset: f32,
    pub paint_offset: Offset,
}

impl ParentData for SliverParentData {
    fn paint_offset(&self) -> Offset {
        self.paint_offset
    }
}

/// Slot for a lazily built box child of a list sliver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SliverListParentData {
    pub index: usize,
    /// Offset of the child's leading edge from the start of the sliver.
    pub layout_offset: f32,
    pub paint_offset: Offset,
}

impl ParentData for SliverListParentData {
    fn paint_offset(&self) -> Offset {
        self.paint_offset
    }
}

/// Capabilities shared by both layout protocols.
pub trait RenderObject: AsAny {
    fn debug_name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Paints this node with its origin at `offset`. The default paints the
    /// children at their parent-data offsets.
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        for child in self.child_paint_order(&cx.children()) {
            let child_offset = cx.child_offset(child);
            cx.paint_child(child, offset + child_offset);
        }
    }

    /// Children in back-to-front order. Hit testing walks the reverse.
    fn child_paint_order(&self, children: &[RenderId]) -> Vec<RenderId> {
        children.to_vec()
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        HitTestBehavior::DeferToChild
    }

    /// Refines a self hit inside the node's bounds. Only consulted when the
    /// behavior is not `DeferToChild`.
    fn hit_test_self(&self, position: Offset, size: Size) -> bool {
        let _ = (position, size);
        true
    }

    fn is_repaint_boundary(&self) -> bool {
        false
    }

    /// When true, size depends only on the incoming constraints.
    fn sized_by_parent(&self) -> bool {
        false
    }

    /// Protocol this node lays its children out with, or `None` for leaves.
    fn child_protocol(&self) -> Option<Protocol> {
        Some(Protocol::Box)
    }

    fn create_parent_data(&self) -> Box<dyn ParentData> {
        Box::new(BoxParentData::default())
    }

    /// Called once, after all children have been disposed.
    fn dispose(&mut self) {}

    /// Receives a result produced off the frame thread.
    fn receive(&mut self, payload: Box<dyn Any + Send>, cx: &mut UpdateCtx<'_>) {
        let _ = (payload, cx);
        log::debug!("{} ignored an async payload", self.debug_name());
    }

    /// Steps transient animation state. Returns true while more frames are needed.
    fn advance(&mut self, dt: Duration, cx: &mut UpdateCtx<'_>) -> bool {
        let _ = (dt, cx);
        false
    }
}

pub trait RenderBox: RenderObject {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError>;
}

pub trait RenderSliver: RenderObject {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: SliverConstraints,
    ) -> Result<SliverGeometry, LayoutError>;
}

pub enum RenderKind {
    Box(Box<dyn RenderBox>),
    Sliver(Box<dyn RenderSliver>),
}

impl RenderKind {
    pub fn new_box(object: impl RenderBox) -> Self {
        RenderKind::Box(Box::new(object))
    }

    pub fn new_sliver(object: impl RenderSliver) -> Self {
        RenderKind::Sliver(Box::new(object))
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            RenderKind::Box(_) => Protocol::Box,
            RenderKind::Sliver(_) => Protocol::Sliver,
        }
    }

    pub fn object(&self) -> &dyn RenderObject {
        match self {
            RenderKind::Box(object) => &**object,
            RenderKind::Sliver(object) => &**object,
        }
    }

    pub fn object_mut(&mut self) -> &mut dyn RenderObject {
        match self {
            RenderKind::Box(object) => &mut **object,
            RenderKind::Sliver(object) => &mut **object,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.object().as_any().downcast_ref()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.object_mut().as_any_mut().downcast_mut()
    }
}

impl Debug for RenderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self.protocol(), self.object().debug_name())
    }
}
