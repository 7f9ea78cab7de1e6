//! Arena-backed storage for render nodes.
//!
//! Each [`RenderNode`] wraps one render object together with the bookkeeping
//! the pipeline needs: tree links, depth, dirty flags, boundary status, and
//! the results of the last layout and paint.
//!
//! While a node is laid out, painted or updated, its object is taken out of
//! the node so the object can borrow the tree mutably through its context.
//! The slot is restored afterwards; finding it empty means re-entrancy.

use bitflags::bitflags;

use super::{
    Constraints, Geometry, ParentData, Protocol, RenderId, RenderKind, SliverGeometry,
};
use crate::arena::Arena;
use crate::error::LayoutError;
use crate::geometry::Size;
use crate::paint::Layer;
use crate::widgets::ElementId;

bitflags! {
    /// Work a node is waiting for.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u8 {
        const NEEDS_LAYOUT = 0b01;
        const NEEDS_PAINT = 0b10;
    }
}

pub struct RenderNode {
    pub(crate) object: Option<RenderKind>,
    protocol: Protocol,
    debug_name: &'static str,
    pub(crate) parent: Option<RenderId>,
    pub(crate) children: Vec<RenderId>,
    pub(crate) depth: usize,
    pub(crate) flags: DirtyFlags,
    pub(crate) relayout_boundary: bool,
    pub(crate) repaint_boundary: bool,
    pub(crate) sized_by_parent: bool,
    child_protocol: Option<Protocol>,
    pub(crate) parent_uses_size: bool,
    pub(crate) constraints: Option<Constraints>,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) parent_data: Option<Box<dyn ParentData>>,
    pub(crate) layer: Option<Layer>,
    pub(crate) element: Option<ElementId>,
    pub(crate) layout_pass: u64,
}

impl RenderNode {
    fn new(object: RenderKind) -> Self {
        let inner = object.object();
        Self {
            protocol: object.protocol(),
            debug_name: inner.debug_name(),
            repaint_boundary: inner.is_repaint_boundary(),
            sized_by_parent: inner.sized_by_parent(),
            child_protocol: inner.child_protocol(),
            object: Some(object),
            parent: None,
            children: Vec::new(),
            depth: 0,
            flags: DirtyFlags::NEEDS_LAYOUT | DirtyFlags::NEEDS_PAINT,
            relayout_boundary: false,
            parent_uses_size: false,
            constraints: None,
            geometry: None,
            parent_data: None,
            layer: None,
            element: None,
            layout_pass: 0,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn debug_name(&self) -> &'static str {
        self.debug_name
    }

    pub fn parent(&self) -> Option<RenderId> {
        self.parent
    }

    pub fn children(&self) -> &[RenderId] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    pub fn needs_layout(&self) -> bool {
        self.flags.contains(DirtyFlags::NEEDS_LAYOUT)
    }

    pub fn needs_paint(&self) -> bool {
        self.flags.contains(DirtyFlags::NEEDS_PAINT)
    }

    pub fn is_relayout_boundary(&self) -> bool {
        self.relayout_boundary
    }

    pub fn is_repaint_boundary(&self) -> bool {
        self.repaint_boundary
    }

    pub fn child_protocol(&self) -> Option<Protocol> {
        self.child_protocol
    }

    pub fn constraints(&self) -> Option<Constraints> {
        self.constraints
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    pub fn parent_data(&self) -> Option<&dyn ParentData> {
        self.parent_data.as_deref()
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn layer(&self) -> Option<&Layer> {
        self.layer.as_ref()
    }

    /// `None` while the object is checked out for layout, paint or update.
    pub fn object(&self) -> Option<&RenderKind> {
        self.object.as_ref()
    }
}

#[derive(Default)]
pub struct RenderTree {
    nodes: Arena<RenderId, RenderNode>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a detached render object. New nodes start dirty for both
    /// layout and paint.
    pub fn insert(&mut self, object: RenderKind) -> RenderId {
        let id = self.nodes.insert(RenderNode::new(object));
        log::trace!("inserted render node {id:?}");
        id
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: RenderId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: RenderId) -> bool {
        self.nodes.contains(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RenderId> + '_ {
        self.nodes.iter().map(|(id, _)| id)
    }

    pub fn parent(&self, id: RenderId) -> Option<RenderId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: RenderId) -> &[RenderId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn depth(&self, id: RenderId) -> Option<usize> {
        self.get(id).map(|node| node.depth)
    }

    pub fn size(&self, id: RenderId) -> Result<Size, LayoutError> {
        self.get(id)
            .and_then(|node| node.geometry)
            .and_then(|geometry| geometry.size())
            .ok_or(LayoutError::NotLaidOut { node: id })
    }

    pub fn sliver_geometry(&self, id: RenderId) -> Result<SliverGeometry, LayoutError> {
        self.get(id)
            .and_then(|node| node.geometry)
            .and_then(|geometry| geometry.sliver())
            .ok_or(LayoutError::NotLaidOut { node: id })
    }

    pub fn object<T: 'static>(&self, id: RenderId) -> Option<&T> {
        self.get(id)?.object.as_ref()?.downcast_ref()
    }

    pub fn parent_data<T: 'static>(&self, id: RenderId) -> Option<&T> {
        self.get(id)?.parent_data.as_deref()?.as_any().downcast_ref()
    }

    pub(crate) fn parent_data_mut<T: 'static>(&mut self, id: RenderId) -> Option<&mut T> {
        self.get_mut(id)?
            .parent_data
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut()
    }

    /// Debug names from the root down to `id`.
    pub fn ancestor_chain(&self, id: RenderId) -> Vec<&'static str> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else { break };
            chain.push(node.debug_name);
            current = node.parent;
        }
        chain.reverse();
        chain
    }

    pub fn is_ancestor(&self, ancestor: RenderId, id: RenderId) -> bool {
        let mut current = self.parent(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// All nodes below `id`, parents before children.
    pub fn descendants(&self, id: RenderId) -> Vec<RenderId> {
        let mut out = Vec::new();
        let mut stack: Vec<RenderId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    fn check_adoptable(&self, parent: RenderId, child: RenderId) -> Result<(), LayoutError> {
        let parent_node = self
            .get(parent)
            .ok_or_else(|| LayoutError::violation(child, "parent is not in the tree"))?;
        let child_node = self
            .get(child)
            .ok_or_else(|| LayoutError::violation(parent, "child is not in the tree"))?;

        if child == parent || self.is_ancestor(child, parent) {
            return Err(LayoutError::violation(child, "adopting an ancestor would form a cycle"));
        }

        match (parent_node.child_protocol, child_node.protocol) {
            (None, _) => Err(LayoutError::violation(
                parent,
                format!("{} does not accept children", parent_node.debug_name),
            )),
            (Some(expected), actual) if expected == actual => Ok(()),
            (Some(Protocol::Box), Protocol::Sliver) => Err(LayoutError::MissingAncestor {
                node: child,
                required: "a sliver host such as a viewport",
            }),
            (Some(_), _) => Err(LayoutError::violation(
                child,
                format!(
                    "{} lays out {:?} children but got {}",
                    parent_node.debug_name, parent_node.child_protocol, child_node.debug_name
                ),
            )),
        }
    }

    fn attach(&mut self, parent: RenderId, child: RenderId, parent_data: Box<dyn ParentData>) {
        if let Some(old_parent) = self.parent(child)
            && old_parent != parent
        {
            self.drop_child(old_parent, child);
        }
        let depth = self.depth(parent).map_or(0, |d| d + 1);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.parent_data = Some(parent_data);
        }
        self.redepth(child, depth);
    }

    fn redepth(&mut self, id: RenderId, depth: usize) {
        let mut stack = vec![(id, depth)];
        while let Some((next, depth)) = stack.pop() {
            if let Some(node) = self.get_mut(next) {
                node.depth = depth;
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
    }

    fn default_parent_data(&self, parent: RenderId) -> Box<dyn ParentData> {
        match self.get(parent).and_then(|node| node.object.as_ref()) {
            Some(object) => object.object().create_parent_data(),
            None => Box::new(super::BoxParentData::default()),
        }
    }

    /// Appends `child` to `parent`'s child list.
    pub fn adopt(&mut self, parent: RenderId, child: RenderId) -> Result<(), LayoutError> {
        let parent_data = self.default_parent_data(parent);
        self.adopt_at(parent, child, None, parent_data)
    }

    /// Inserts `child` at `index` (or appends) with the given parent data.
    pub(crate) fn adopt_at(
        &mut self,
        parent: RenderId,
        child: RenderId,
        index: Option<usize>,
        parent_data: Box<dyn ParentData>,
    ) -> Result<(), LayoutError> {
        self.check_adoptable(parent, child)?;
        self.attach(parent, child, parent_data);
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&c| c != child);
            let index = index.unwrap_or(node.children.len()).min(node.children.len());
            node.children.insert(index, child);
        }
        Ok(())
    }

    /// Detaches `child` from `parent` without disposing it.
    pub fn drop_child(&mut self, parent: RenderId, child: RenderId) -> bool {
        let Some(node) = self.get_mut(parent) else {
            return false;
        };
        let before = node.children.len();
        node.children.retain(|&c| c != child);
        let dropped = node.children.len() != before;
        if dropped && let Some(child_node) = self.get_mut(child) {
            child_node.parent = None;
            child_node.parent_data = None;
        }
        dropped
    }

    /// Replaces `parent`'s children with `ordered`, adopting new ones and
    /// detaching the ones left out. Returns whether anything changed.
    ///
    /// All new children are validated before the tree is touched.
    pub fn set_children(
        &mut self,
        parent: RenderId,
        ordered: &[RenderId],
    ) -> Result<bool, LayoutError> {
        let current = self.children(parent).to_vec();
        if current == ordered {
            return Ok(false);
        }

        let added: Vec<RenderId> = ordered
            .iter()
            .copied()
            .filter(|c| !current.contains(c))
            .collect();
        for &child in &added {
            self.check_adoptable(parent, child)?;
        }

        for &child in current.iter().filter(|c| !ordered.contains(c)) {
            self.drop_child(parent, child);
        }
        for &child in &added {
            let parent_data = self.default_parent_data(parent);
            self.attach(parent, child, parent_data);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children = ordered.to_vec();
        }
        Ok(true)
    }

    /// Removes `id` and its whole subtree. Children are disposed before their
    /// parent. Returns the removed ids in disposal order.
    pub fn remove(&mut self, id: RenderId) -> Vec<RenderId> {
        if let Some(parent) = self.parent(id) {
            self.drop_child(parent, id);
        }
        let mut removed = Vec::new();
        self.remove_subtree(id, &mut removed);
        removed
    }

    fn remove_subtree(&mut self, id: RenderId, removed: &mut Vec<RenderId>) {
        let children = self.children(id).to_vec();
        for child in children {
            self.remove_subtree(child, removed);
        }
        if let Some(mut node) = self.nodes.remove(id) {
            if let Some(object) = node.object.as_mut() {
                object.object_mut().dispose();
            }
            log::trace!("disposed {} {id:?}", node.debug_name);
            removed.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::RenderFixedSize;
    use crate::sliver::RenderSliverBand;

    fn leaf(tree: &mut RenderTree) -> RenderId {
        tree.insert(RenderKind::new_box(RenderFixedSize::new(Size::new(10.0, 10.0))))
    }

    fn stack(tree: &mut RenderTree) -> RenderId {
        tree.insert(RenderKind::new_box(crate::objects::RenderStack::new()))
    }

    #[test]
    fn test_tree_adopt_sets_depth_and_parent() {
        let mut tree = RenderTree::new();
        let root = stack(&mut tree);
        let mid = stack(&mut tree);
        let child = leaf(&mut tree);
        tree.adopt(mid, child).unwrap();
        tree.adopt(root, mid).unwrap();

        assert_eq!(tree.parent(child), Some(mid));
        assert_eq!(tree.children(root), &[mid]);
        assert_eq!(tree.depth(mid), Some(1));
        assert_eq!(tree.depth(child), Some(2));
        assert!(tree.is_ancestor(root, child));
    }

    #[test]
    fn test_tree_new_nodes_start_dirty() {
        let mut tree = RenderTree::new();
        let id = leaf(&mut tree);
        let node = tree.get(id).unwrap();
        assert!(node.needs_layout());
        assert!(node.needs_paint());
        assert_eq!(tree.size(id), Err(LayoutError::NotLaidOut { node: id }));
    }

    #[test]
    fn test_tree_leaf_rejects_children() {
        let mut tree = RenderTree::new();
        let parent = leaf(&mut tree);
        let child = leaf(&mut tree);
        assert!(matches!(
            tree.adopt(parent, child),
            Err(LayoutError::ProtocolViolation { .. })
        ));
        assert_eq!(tree.parent(child), None);
    }

    #[test]
    fn test_tree_sliver_needs_sliver_host() {
        let mut tree = RenderTree::new();
        let parent = stack(&mut tree);
        let sliver = tree.insert(RenderKind::new_sliver(RenderSliverBand::new(100.0)));
        assert_eq!(
            tree.adopt(parent, sliver),
            Err(LayoutError::MissingAncestor {
                node: sliver,
                required: "a sliver host such as a viewport",
            })
        );
    }

    #[test]
    fn test_tree_rejects_cycles() {
        let mut tree = RenderTree::new();
        let a = stack(&mut tree);
        let b = stack(&mut tree);
        tree.adopt(a, b).unwrap();
        assert!(tree.adopt(b, a).is_err());
    }

    #[test]
    fn test_tree_set_children_reorders_and_detaches() {
        let mut tree = RenderTree::new();
        let parent = stack(&mut tree);
        let a = leaf(&mut tree);
        let b = leaf(&mut tree);
        let c = leaf(&mut tree);
        assert!(tree.set_children(parent, &[a, b]).unwrap());
        assert!(!tree.set_children(parent, &[a, b]).unwrap());

        assert!(tree.set_children(parent, &[c, a]).unwrap());
        assert_eq!(tree.children(parent), &[c, a]);
        assert_eq!(tree.parent(b), None);
        assert_eq!(tree.parent(c), Some(parent));
        assert!(tree.contains(b));
    }

    #[test]
    fn test_tree_remove_subtree() {
        let mut tree = RenderTree::new();
        let root = stack(&mut tree);
        let mid = stack(&mut tree);
        let child = leaf(&mut tree);
        tree.adopt(root, mid).unwrap();
        tree.adopt(mid, child).unwrap();

        let removed = tree.remove(mid);
        assert_eq!(removed, vec![child, mid]);
        assert!(tree.children(root).is_empty());
        assert!(!tree.contains(child));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_tree_ancestor_chain() {
        let mut tree = RenderTree::new();
        let root = stack(&mut tree);
        let child = leaf(&mut tree);
        tree.adopt(root, child).unwrap();
        assert_eq!(tree.ancestor_chain(child), vec!["RenderStack", "RenderFixedSize"]);
    }
}
