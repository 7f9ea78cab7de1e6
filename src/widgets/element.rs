//! The element tree: persistent nodes that pair widgets with render objects.
//!
//! Each element holds the widget currently describing it and, for render
//! widgets, owns one render object. Rebuilding walks the new widgets against
//! the existing elements through [`diff_children`] and applies the patches,
//! so matching elements keep their render objects (and whatever transient
//! state those carry) while unmatched ones are unmounted children first.

use std::any::Any;
use std::collections::HashSet;
use std::rc::Rc;

use crate::arena::{Arena, arena_id};
use crate::error::BuildError;
use crate::pipeline::PipelineOwner;
use crate::render::{Protocol, RenderId};

use super::reconcile::{Patch, can_update, diff_children, duplicate_key};
use super::widget::WidgetRef;

arena_id!(
    /// Handle to a mounted element.
    ElementId
);

struct Element {
    widget: WidgetRef,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    render: Option<RenderId>,
    depth: usize,
    dirty: bool,
    /// Elements that read data this element provides.
    dependents: HashSet<ElementId>,
    /// Ancestors whose data this element reads.
    providers: Vec<ElementId>,
}

/// Handle a composed widget builds through.
pub struct BuildContext<'a> {
    elements: &'a mut Arena<ElementId, Element>,
    element: ElementId,
}

impl BuildContext<'_> {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Nearest ancestor data of type `T`. The calling element is rebuilt
    /// whenever the providing widget changes that data.
    pub fn depend_on<T: Any>(&mut self) -> Option<Rc<T>> {
        let mut current = self.elements.get(self.element)?.parent;
        while let Some(id) = current {
            let element = self.elements.get_mut(id)?;
            if let Some(data) = element.widget.provided()
                && let Ok(data) = data.downcast::<T>()
            {
                element.dependents.insert(self.element);
                if let Some(dependent) = self.elements.get_mut(self.element)
                    && !dependent.providers.contains(&id)
                {
                    dependent.providers.push(id);
                }
                return Some(data);
            }
            current = element.parent;
        }
        None
    }
}

#[derive(Default)]
pub struct BuildOwner {
    elements: Arena<ElementId, Element>,
    root: Option<ElementId>,
    dirty: HashSet<ElementId>,
}

impl BuildOwner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Number of mounted elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains(id)
    }

    pub fn widget(&self, id: ElementId) -> Option<&WidgetRef> {
        self.elements.get(id).map(|element| &element.widget)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map_or(&[], |element| element.children.as_slice())
    }

    /// Elements registered as reading the data `id` provides.
    pub fn dependents(&self, id: ElementId) -> Vec<ElementId> {
        self.elements
            .get(id)
            .map_or_else(Vec::new, |element| element.dependents.iter().copied().collect())
    }

    pub fn has_dirty_elements(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// The render object at or nearest below `id`.
    pub fn render_object_of(&self, id: ElementId) -> Option<RenderId> {
        let mut found = Vec::new();
        self.collect_render_objects(id, &mut found);
        found.first().copied()
    }

    /// The element that owns `render`.
    pub fn element_of(&self, owner: &PipelineOwner, render: RenderId) -> Option<ElementId> {
        owner
            .tree()
            .get(render)
            .and_then(|node| node.element())
            .filter(|id| self.elements.contains(*id))
    }

    /// Replaces the whole tree with one inflated from `widget`.
    pub fn mount_root(
        &mut self,
        owner: &mut PipelineOwner,
        widget: WidgetRef,
    ) -> Result<ElementId, BuildError> {
        if let Some(old) = self.root.take() {
            self.unmount(owner, old);
        }
        let id = self.inflate(owner, widget, None)?;
        self.root = Some(id);
        self.sync_root(owner)?;
        Ok(id)
    }

    /// Reconciles the tree against a new root widget.
    pub fn update_root(
        &mut self,
        owner: &mut PipelineOwner,
        widget: WidgetRef,
    ) -> Result<ElementId, BuildError> {
        let current = self
            .root
            .and_then(|root| self.elements.get(root).map(|e| (root, e.widget.clone())));
        match current {
            Some((root, old)) if can_update(&*old, &*widget) => {
                self.update(owner, root, widget)?;
                self.sync_root(owner)?;
                Ok(root)
            }
            _ => self.mount_root(owner, widget),
        }
    }

    pub fn mark_needs_build(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(id) {
            element.dirty = true;
            self.dirty.insert(id);
        }
    }

    /// Rebuilds dirty elements, shallowest first. Returns how many rebuilt.
    pub fn flush_build(&mut self, owner: &mut PipelineOwner) -> Result<usize, BuildError> {
        let mut rebuilt = 0;
        while !self.dirty.is_empty() {
            let mut dirty: Vec<ElementId> = self
                .dirty
                .drain()
                .filter(|id| self.elements.contains(*id))
                .collect();
            dirty.sort_by_key(|id| self.elements.get(*id).map_or(0, |e| e.depth));
            for id in dirty {
                // Already rebuilt by an ancestor, or unmounted by one.
                let Some(element) = self.elements.get(id).filter(|e| e.dirty) else {
                    continue;
                };
                let widget = element.widget.clone();
                self.update(owner, id, widget)?;
                rebuilt += 1;
            }
        }
        if rebuilt > 0 {
            log::debug!("rebuilt {rebuilt} elements");
            self.sync_root(owner)?;
        }
        Ok(rebuilt)
    }

    fn inflate(
        &mut self,
        owner: &mut PipelineOwner,
        widget: WidgetRef,
        parent: Option<ElementId>,
    ) -> Result<ElementId, BuildError> {
        let depth = parent
            .and_then(|parent| self.elements.get(parent))
            .map_or(0, |parent| parent.depth + 1);
        let render = widget.create_render_object().map(|object| owner.insert(object));
        let id = self.elements.insert(Element {
            widget: widget.clone(),
            parent,
            children: Vec::new(),
            render,
            depth,
            dirty: false,
            dependents: HashSet::new(),
            providers: Vec::new(),
        });
        if let Some(render) = render {
            owner.set_element(render, id);
        }
        log::trace!("mounted {} {id:?}", widget.debug_name());

        if let Err(error) = self.rebuild_children(owner, id, &widget) {
            self.unmount(owner, id);
            return Err(error);
        }
        Ok(id)
    }

    fn update(
        &mut self,
        owner: &mut PipelineOwner,
        id: ElementId,
        widget: WidgetRef,
    ) -> Result<(), BuildError> {
        let Some(element) = self.elements.get_mut(id) else {
            return Ok(());
        };
        if Rc::ptr_eq(&element.widget, &widget) && !element.dirty {
            return Ok(());
        }
        let old = std::mem::replace(&mut element.widget, widget.clone());
        let render = element.render;

        if widget.provided().is_some() && widget.updates_dependents(&*old) {
            let dependents: Vec<ElementId> = element.dependents.drain().collect();
            for dependent in dependents {
                self.mark_needs_build(dependent);
            }
        }
        if let Some(render) = render {
            owner.with_object_mut(render, |object, cx| widget.update_render_object(object, cx));
        }
        self.rebuild_children(owner, id, &widget)
    }

    /// Brings the children of `id` in line with `widget`: its child list for
    /// render widgets, or a fresh build for composed ones.
    fn rebuild_children(
        &mut self,
        owner: &mut PipelineOwner,
        id: ElementId,
        widget: &WidgetRef,
    ) -> Result<(), BuildError> {
        let is_render = self.elements.get(id).is_some_and(|e| e.render.is_some());
        let children: Vec<WidgetRef> = if is_render {
            widget.children().to_vec()
        } else {
            let mut cx = BuildContext {
                elements: &mut self.elements,
                element: id,
            };
            widget.build(&mut cx).into_iter().collect()
        };
        if let Some(element) = self.elements.get_mut(id) {
            element.dirty = false;
        }
        self.update_children(owner, id, widget.debug_name(), children)
    }

    fn update_children(
        &mut self,
        owner: &mut PipelineOwner,
        id: ElementId,
        parent_name: &'static str,
        new: Vec<WidgetRef>,
    ) -> Result<(), BuildError> {
        if let Some(key) = duplicate_key(&new) {
            return Err(BuildError::DuplicateKey {
                parent: parent_name,
                key,
            });
        }

        // Leaves, and lists that build their own render children, stay untouched.
        if new.is_empty() && self.children(id).is_empty() {
            return Ok(());
        }

        let (old_ids, old_widgets): (Vec<ElementId>, Vec<WidgetRef>) = self
            .children(id)
            .iter()
            .filter_map(|child| {
                self.elements
                    .get(*child)
                    .map(|element| (*child, element.widget.clone()))
            })
            .unzip();

        let mut slots: Vec<Option<ElementId>> = vec![None; new.len()];
        let mut result = Ok(());
        for patch in diff_children(&old_widgets, &new) {
            let step = match patch {
                Patch::Remove { old } => {
                    self.unmount(owner, old_ids[old]);
                    Ok(())
                }
                Patch::Update { old, new: index } => {
                    slots[index] = Some(old_ids[old]);
                    self.update(owner, old_ids[old], new[index].clone())
                }
                Patch::Insert { new: index } => self
                    .inflate(owner, new[index].clone(), Some(id))
                    .map(|child| slots[index] = Some(child)),
            };
            if let Err(error) = step {
                result = Err(error);
                break;
            }
        }

        let mut children: Vec<ElementId> = slots.into_iter().flatten().collect();
        if result.is_err() {
            // Keep unvisited old children reachable so unmounting the parent
            // still disposes them.
            let pending: Vec<ElementId> = old_ids
                .into_iter()
                .filter(|child| self.elements.contains(*child) && !children.contains(child))
                .collect();
            children.extend(pending);
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.children = children;
        }
        result?;
        self.sync_render_children(owner, id)
    }

    /// Re-parents the render objects under the nearest render element at or
    /// above `id`, in element order.
    fn sync_render_children(
        &mut self,
        owner: &mut PipelineOwner,
        id: ElementId,
    ) -> Result<(), BuildError> {
        let mut current = Some(id);
        while let Some(element_id) = current {
            let Some(element) = self.elements.get(element_id) else {
                return Ok(());
            };
            if let Some(render) = element.render {
                let mut ordered = Vec::new();
                for &child in &element.children {
                    self.collect_render_objects(child, &mut ordered);
                }
                owner.set_children(render, &ordered)?;
                return Ok(());
            }
            current = element.parent;
        }
        Ok(())
    }

    /// Topmost render objects in the subtree at `id`, in order.
    fn collect_render_objects(&self, id: ElementId, out: &mut Vec<RenderId>) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        match element.render {
            Some(render) => out.push(render),
            None => {
                for &child in &element.children {
                    self.collect_render_objects(child, out);
                }
            }
        }
    }

    /// Makes the root element's render object the pipeline root.
    fn sync_root(&mut self, owner: &mut PipelineOwner) -> Result<(), BuildError> {
        let Some(root) = self.root else {
            return Ok(());
        };
        let name = self
            .elements
            .get(root)
            .map_or("<unmounted>", |element| element.widget.debug_name());
        let Some(render) = self.render_object_of(root) else {
            return Err(BuildError::EmptyRoot(name));
        };
        if owner.root() == Some(render) {
            return Ok(());
        }
        if owner.tree().get(render).map(|node| node.protocol()) != Some(Protocol::Box) {
            return Err(BuildError::RootProtocol(name));
        }
        owner.set_root(render)?;
        Ok(())
    }

    /// Unmounts the subtree at `id`, children before parents. Each render
    /// object is removed and disposed with its element.
    fn unmount(&mut self, owner: &mut PipelineOwner, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        for child in element.children.clone() {
            self.unmount(owner, child);
        }
        if let Some(element) = self.elements.remove(id) {
            for provider in &element.providers {
                if let Some(provider) = self.elements.get_mut(*provider) {
                    provider.dependents.remove(&id);
                }
            }
            if let Some(render) = element.render {
                owner.remove(render);
            }
            log::trace!("unmounted {} {id:?}", element.widget.debug_name());
        }
        self.dirty.remove(&id);
        if self.root == Some(id) {
            self.root = None;
        }
    }
}
