//! The frame pipeline: dirty tracking, layout flush, paint flush.
//!
//! A [`PipelineOwner`] owns one render tree (one per window) and the two
//! dirty sets that drive incremental work between frames.
//!
//! ## Relayout boundaries
//!
//! A node is a relayout boundary when its parent cannot be affected by its
//! size: it is the root, its parent ignored its size, it is sized purely by
//! its constraints, or its constraints are tight. `mark_needs_layout` flags
//! the node and walks up until it reaches a boundary, which joins the dirty
//! set. If it meets a node that is already flagged, that node's boundary is
//! already queued and the walk stops early.
//!
//! `flush_layout` lays out the queued boundaries shallowest first, so a
//! boundary nested inside another dirty boundary is handled by its ancestor's
//! pass and then skipped as clean.
//!
//! ## Repaint boundaries
//!
//! Paint dirtiness bubbles the same way to the nearest repaint boundary.
//! `flush_paint` re-records those layers deepest first; ancestors keep
//! referencing the child layer and are left alone.

use std::collections::HashSet;
use std::mem;
use std::time::Duration;

use crate::config::{ErrorPolicy, PipelineConfig};
use crate::error::{Diagnostic, LayoutError, PipelineError};
use crate::geometry::{Offset, Size};
use crate::hit_test::{self, HitTestResult};
use crate::jobs::{JobKind, JobQueue};
use crate::layout::{BoxConstraints, SliverConstraints, SliverGeometry};
use crate::layout_stats::{self, LayoutReasons};
use crate::paint::{self, DisplayList};
use crate::render::{
    BoxParentData, Constraints, DirtyFlags, Geometry, ParentData, Protocol, RenderId, RenderKind,
    RenderTree,
};
use crate::widgets::ElementId;

/// What one `flush_layout` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutReport {
    /// Nodes whose `perform_layout` ran, in completion order.
    pub laid_out: Vec<RenderId>,
    /// Layout calls answered from the cache.
    pub skipped: usize,
    /// Dirty boundaries the flush started from.
    pub boundaries: Vec<RenderId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintReport {
    /// Repaint boundaries whose layer was re-recorded.
    pub repainted: Vec<RenderId>,
}

pub struct PipelineOwner {
    tree: RenderTree,
    root: Option<RenderId>,
    config: PipelineConfig,
    dirty_layout: HashSet<RenderId>,
    dirty_paint: HashSet<RenderId>,
    animating: HashSet<RenderId>,
    diagnostics: Vec<Diagnostic>,
    pass: u64,
    report: LayoutReport,
    jobs: JobQueue,
}

impl PipelineOwner {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            tree: RenderTree::new(),
            root: None,
            config,
            dirty_layout: HashSet::new(),
            dirty_paint: HashSet::new(),
            animating: HashSet::new(),
            diagnostics: Vec::new(),
            pass: 0,
            report: LayoutReport::default(),
            jobs: JobQueue::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn root(&self) -> Option<RenderId> {
        self.root
    }

    /// Errors recorded by the last layout flush.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn job_queue(&self) -> JobQueue {
        self.jobs.clone()
    }

    pub fn has_dirty_nodes(&self) -> bool {
        !self.dirty_layout.is_empty() || !self.dirty_paint.is_empty()
    }

    pub fn is_animating(&self) -> bool {
        !self.animating.is_empty()
    }

    pub fn insert(&mut self, object: RenderKind) -> RenderId {
        self.tree.insert(object)
    }

    pub(crate) fn set_element(&mut self, id: RenderId, element: ElementId) {
        if let Some(node) = self.tree.get_mut(id) {
            node.element = Some(element);
        }
    }

    pub fn adopt(&mut self, parent: RenderId, child: RenderId) -> Result<(), LayoutError> {
        self.tree.adopt(parent, child)?;
        self.mark_needs_layout(parent);
        self.mark_needs_paint(parent);
        Ok(())
    }

    pub fn set_children(&mut self, parent: RenderId, ordered: &[RenderId]) -> Result<(), LayoutError> {
        if self.tree.set_children(parent, ordered)? {
            self.mark_needs_layout(parent);
            self.mark_needs_paint(parent);
        }
        Ok(())
    }

    /// Removes and disposes the subtree at `id`. The former parent is marked
    /// for layout and paint.
    pub fn remove(&mut self, id: RenderId) {
        let parent = self.tree.parent(id);
        self.forget(id);
        if let Some(parent) = parent {
            self.mark_needs_layout(parent);
            self.mark_needs_paint(parent);
        }
    }

    fn forget(&mut self, id: RenderId) {
        for removed in self.tree.remove(id) {
            self.dirty_layout.remove(&removed);
            self.dirty_paint.remove(&removed);
            self.animating.remove(&removed);
        }
        if self.root == Some(id) {
            log::info!("pipeline root {id:?} removed");
            self.root = None;
        }
    }

    /// Makes `id` the root. The root is always a relayout and repaint boundary
    /// and is laid out with the configured root constraints.
    pub fn set_root(&mut self, id: RenderId) -> Result<(), LayoutError> {
        let node = self
            .tree
            .get_mut(id)
            .ok_or_else(|| LayoutError::violation(id, "root is not in the tree"))?;
        if node.protocol() != Protocol::Box {
            return Err(LayoutError::violation(id, "the root must use the box protocol"));
        }
        node.relayout_boundary = true;
        node.repaint_boundary = true;
        node.flags |= DirtyFlags::NEEDS_LAYOUT | DirtyFlags::NEEDS_PAINT;
        log::info!("pipeline root is now {} {id:?}", node.debug_name());
        self.root = Some(id);
        self.dirty_layout.insert(id);
        self.dirty_paint.insert(id);
        Ok(())
    }

    pub fn set_root_constraints(&mut self, constraints: BoxConstraints) {
        if self.config.root_constraints == constraints {
            return;
        }
        self.config.root_constraints = constraints;
        if let Some(root) = self.root {
            if let Some(node) = self.tree.get_mut(root) {
                node.flags |= DirtyFlags::NEEDS_LAYOUT;
            }
            self.dirty_layout.insert(root);
        }
    }

    pub fn mark_needs_layout(&mut self, id: RenderId) {
        let mut current = id;
        loop {
            let Some(node) = self.tree.get_mut(current) else {
                return;
            };
            if node.flags.contains(DirtyFlags::NEEDS_LAYOUT) {
                return;
            }
            node.flags.insert(DirtyFlags::NEEDS_LAYOUT);
            match node.parent {
                Some(parent) if !node.relayout_boundary => current = parent,
                _ => {
                    self.dirty_layout.insert(current);
                    return;
                }
            }
        }
    }

    pub fn mark_needs_paint(&mut self, id: RenderId) {
        let mut current = id;
        loop {
            let Some(node) = self.tree.get_mut(current) else {
                return;
            };
            if node.flags.contains(DirtyFlags::NEEDS_PAINT) {
                return;
            }
            node.flags.insert(DirtyFlags::NEEDS_PAINT);
            match node.parent {
                Some(parent) if !node.repaint_boundary => current = parent,
                _ => {
                    self.dirty_paint.insert(current);
                    return;
                }
            }
        }
    }

    fn is_attached(&self, id: RenderId) -> bool {
        match self.root {
            Some(root) => root == id || self.tree.is_ancestor(root, id),
            None => false,
        }
    }

    /// Lays out every dirty relayout boundary, shallowest first.
    ///
    /// A failing node is isolated: it gets the smallest geometry its
    /// constraints allow and the error is recorded, while the rest of the
    /// frame continues. Under [`ErrorPolicy::Strict`] the flush then returns
    /// the recorded diagnostics as an error.
    pub fn flush_layout(&mut self) -> Result<LayoutReport, PipelineError> {
        let root = self.root.ok_or(PipelineError::NoRoot)?;
        self.pass += 1;
        self.report = LayoutReport::default();
        self.diagnostics.clear();

        while !self.dirty_layout.is_empty() {
            let mut dirty: Vec<RenderId> = self
                .dirty_layout
                .drain()
                .filter(|id| self.tree.contains(*id))
                .collect();
            dirty.sort_by_key(|id| self.tree.depth(*id).unwrap_or(0));
            for id in dirty {
                self.flush_boundary(id, root);
            }
        }

        let report = mem::take(&mut self.report);
        log::debug!(
            "layout pass {}: {} laid out, {} skipped, {} boundaries",
            self.pass,
            report.laid_out.len(),
            report.skipped,
            report.boundaries.len()
        );
        if self.config.error_policy == ErrorPolicy::Strict && !self.diagnostics.is_empty() {
            return Err(PipelineError::Layout(self.diagnostics.clone()));
        }
        Ok(report)
    }

    fn flush_boundary(&mut self, id: RenderId, root: RenderId) {
        // Detached subtrees keep their flags until they are adopted again.
        if !self.is_attached(id) {
            return;
        }
        let Some(node) = self.tree.get_mut(id) else {
            return;
        };
        if !node.needs_layout() {
            return;
        }

        let constraints = if id == root {
            Constraints::Box(self.config.root_constraints)
        } else {
            if !node.relayout_boundary {
                // No longer a boundary: hand the work to the parent chain.
                node.flags.remove(DirtyFlags::NEEDS_LAYOUT);
                self.mark_needs_layout(id);
                return;
            }
            match node.constraints {
                Some(constraints) => constraints,
                // Never laid out; its parent will reach it.
                None => return,
            }
        };
        let parent_uses_size = node.parent_uses_size;

        log::debug!("flushing relayout boundary {} {id:?}", node_name(&self.tree, id));
        self.report.boundaries.push(id);
        if let Err(error) = self.layout_node(id, constraints, parent_uses_size) {
            self.isolate_failure(id, constraints, error);
        }
    }

    fn layout_node(
        &mut self,
        id: RenderId,
        constraints: Constraints,
        parent_uses_size: bool,
    ) -> Result<Geometry, LayoutError> {
        constraints
            .validate()
            .map_err(|message| LayoutError::violation(id, message))?;

        let is_root = self.root == Some(id);
        let pass = self.pass;
        let node = self
            .tree
            .get_mut(id)
            .ok_or_else(|| LayoutError::violation(id, "node is not in the tree"))?;
        if node.protocol() != constraints.protocol() {
            return Err(LayoutError::violation(
                id,
                format!(
                    "{} uses the {:?} protocol but got {:?} constraints",
                    node.debug_name(),
                    node.protocol(),
                    constraints.protocol()
                ),
            ));
        }

        node.parent_uses_size = parent_uses_size;
        node.relayout_boundary =
            is_root || !parent_uses_size || node.sized_by_parent || constraints.is_tight();

        if !node.needs_layout()
            && node.constraints == Some(constraints)
            && let Some(geometry) = node.geometry
        {
            self.report.skipped += 1;
            layout_stats::record_layout_skipped();
            return Ok(geometry);
        }

        if node.layout_pass == pass {
            return Err(LayoutError::LaidOutTwice { node: id });
        }
        node.layout_pass = pass;
        layout_stats::record_layout_executed(LayoutReasons {
            constraints_changed: node.constraints != Some(constraints),
            marked_dirty: node.needs_layout(),
        });
        node.constraints = Some(constraints);
        let Some(mut object) = node.object.take() else {
            return Err(LayoutError::violation(id, "re-entrant layout"));
        };

        let result = {
            let mut cx = LayoutCtx { owner: self, id };
            match (&mut object, constraints) {
                (RenderKind::Box(object), Constraints::Box(c)) => {
                    object.perform_layout(&mut cx, c).map(Geometry::Box)
                }
                (RenderKind::Sliver(object), Constraints::Sliver(c)) => {
                    object.perform_layout(&mut cx, c).map(Geometry::Sliver)
                }
                _ => Err(LayoutError::violation(id, "protocol mismatch")),
            }
        };
        if let Some(node) = self.tree.get_mut(id) {
            node.object = Some(object);
        }

        let geometry = self.check_geometry(id, constraints, result?)?;
        if let Some(node) = self.tree.get_mut(id) {
            node.geometry = Some(geometry);
            node.flags.remove(DirtyFlags::NEEDS_LAYOUT);
            log::trace!("laid out {} {id:?}: {geometry:?}", node.debug_name());
        }
        self.mark_needs_paint(id);
        self.report.laid_out.push(id);
        Ok(geometry)
    }

    fn check_geometry(
        &self,
        id: RenderId,
        constraints: Constraints,
        geometry: Geometry,
    ) -> Result<Geometry, LayoutError> {
        let tolerance = self.config.precision_tolerance;
        let lenient = self.config.error_policy == ErrorPolicy::Lenient;
        match (constraints, geometry) {
            (Constraints::Box(c), Geometry::Box(size)) => {
                if size.is_finite() && c.is_satisfied_by(size, tolerance) {
                    return Ok(geometry);
                }
                let message = format!("size {size} does not satisfy {c}");
                if !lenient {
                    return Err(LayoutError::violation(id, message));
                }
                log::warn!("{}: {message}; clamping", node_name(&self.tree, id));
                let clamped = c.constrain(size);
                Ok(Geometry::Box(if clamped.is_finite() { clamped } else { c.smallest() }))
            }
            (Constraints::Sliver(c), Geometry::Sliver(g)) => {
                if g.scroll_offset_correction != 0.0 {
                    return Ok(geometry);
                }
                match g.validate(&c, tolerance) {
                    Ok(()) => Ok(geometry),
                    Err(message) if lenient => {
                        log::warn!("{}: {message}; clamping", node_name(&self.tree, id));
                        Ok(Geometry::Sliver(g.clamped(&c)))
                    }
                    Err(message) => Err(LayoutError::violation(id, message)),
                }
            }
            _ => Err(LayoutError::violation(id, "geometry does not match the protocol")),
        }
    }

    fn record(&mut self, error: LayoutError) {
        let diagnostic = Diagnostic {
            chain: self.tree.ancestor_chain(error.node()),
            error,
        };
        match self.config.error_policy {
            ErrorPolicy::Strict => log::error!("{diagnostic}"),
            ErrorPolicy::Lenient => log::warn!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Records `error` and settles `id` on the smallest legal geometry so its
    /// parent and siblings can keep going.
    fn isolate_failure(
        &mut self,
        id: RenderId,
        constraints: Constraints,
        error: LayoutError,
    ) -> Geometry {
        let already_laid_out = matches!(error, LayoutError::LaidOutTwice { .. });
        self.record(error);

        if already_laid_out && let Some(geometry) = self.tree.get(id).and_then(|n| n.geometry) {
            return geometry;
        }
        let fallback = match constraints {
            Constraints::Box(c) => {
                Geometry::Box(if c.validate().is_ok() { c.smallest() } else { Size::ZERO })
            }
            Constraints::Sliver(_) => Geometry::Sliver(SliverGeometry::ZERO),
        };
        if let Some(node) = self.tree.get_mut(id)
            && node.protocol() == constraints.protocol()
        {
            node.geometry = Some(fallback);
            node.flags.remove(DirtyFlags::NEEDS_LAYOUT);
        }
        fallback
    }

    /// Re-records every dirty repaint boundary, deepest first.
    pub fn flush_paint(&mut self) -> Result<PaintReport, PipelineError> {
        let root = self.root.ok_or(PipelineError::NoRoot)?;
        let mut dirty: Vec<RenderId> = self
            .dirty_paint
            .drain()
            .filter(|id| self.tree.contains(*id))
            .collect();
        dirty.sort_by_key(|id| std::cmp::Reverse(self.tree.depth(*id).unwrap_or(0)));

        let mut repainted = Vec::new();
        for id in dirty {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            let paintable = node.needs_paint()
                && node.geometry().is_some()
                && (node.is_repaint_boundary() || id == root);
            if paintable && self.is_attached(id) {
                paint::record_layer(&mut self.tree, id, &mut repainted);
            }
        }
        Ok(PaintReport { repainted })
    }

    /// Flattens the cached layers into one display list.
    pub fn compose(&self) -> Result<DisplayList, PipelineError> {
        let root = self.root.ok_or(PipelineError::NoRoot)?;
        Ok(paint::compose(&self.tree, root))
    }

    pub fn hit_test(&self, position: Offset) -> HitTestResult {
        match self.root {
            Some(root) => hit_test::hit_test(&self.tree, root, position),
            None => HitTestResult::default(),
        }
    }

    /// Runs `f` against the render object at `id`, outside of layout.
    pub fn with_object_mut<R>(
        &mut self,
        id: RenderId,
        f: impl FnOnce(&mut RenderKind, &mut UpdateCtx<'_>) -> R,
    ) -> Option<R> {
        let mut object = self.tree.get_mut(id)?.object.take()?;
        let result = {
            let mut cx = UpdateCtx { owner: self, id };
            f(&mut object, &mut cx)
        };
        if let Some(node) = self.tree.get_mut(id) {
            node.object = Some(object);
        }
        Some(result)
    }

    /// Like [`with_object_mut`](Self::with_object_mut), downcast to `T`.
    pub fn update<T: 'static, R>(
        &mut self,
        id: RenderId,
        f: impl FnOnce(&mut T, &mut UpdateCtx<'_>) -> R,
    ) -> Option<R> {
        self.with_object_mut(id, |object, cx| object.downcast_mut::<T>().map(|t| f(t, cx)))
            .flatten()
    }

    /// Applies jobs posted since the last frame. Returns how many ran.
    pub fn drain_jobs(&mut self) -> usize {
        let jobs = self.jobs.drain();
        let count = jobs.len();
        for job in jobs {
            let target = job.target;
            if !self.tree.contains(target) {
                log::debug!("dropping {:?} job for stale {target:?}", job.kind);
                continue;
            }
            match job.kind {
                JobKind::Layout => self.mark_needs_layout(target),
                JobKind::Paint => self.mark_needs_paint(target),
                JobKind::Deliver(payload) => {
                    let delivered = self.with_object_mut(target, |object, cx| {
                        object.object_mut().receive(payload, cx)
                    });
                    if delivered.is_none() {
                        log::debug!("{target:?} is busy; payload dropped");
                    }
                }
            }
        }
        count
    }

    /// Steps every node that asked for animation frames. Returns true while
    /// any of them still needs more.
    pub fn advance_animations(&mut self, dt: Duration) -> bool {
        let animating: Vec<RenderId> = self.animating.drain().collect();
        for id in animating {
            let more = self
                .with_object_mut(id, |object, cx| object.object_mut().advance(dt, cx))
                .unwrap_or(false);
            if more {
                self.animating.insert(id);
            }
        }
        self.is_animating()
    }
}

fn node_name(tree: &RenderTree, id: RenderId) -> &'static str {
    tree.get(id).map_or("<removed>", |node| node.debug_name())
}

/// Handle a render object lays itself out through.
///
/// Child layout calls never fail from the caller's point of view: a child
/// that breaks the protocol is recorded and settled on the smallest legal
/// geometry.
pub struct LayoutCtx<'a> {
    owner: &'a mut PipelineOwner,
    id: RenderId,
}

impl LayoutCtx<'_> {
    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.owner.config
    }

    pub fn children(&self) -> Vec<RenderId> {
        self.owner.tree.children(self.id).to_vec()
    }

    pub fn child_count(&self) -> usize {
        self.owner.tree.children(self.id).len()
    }

    fn run_child(
        &mut self,
        child: RenderId,
        constraints: Constraints,
        parent_uses_size: bool,
    ) -> Geometry {
        let result = if self.owner.tree.parent(child) == Some(self.id) {
            self.owner.layout_node(child, constraints, parent_uses_size)
        } else {
            Err(LayoutError::violation(
                child,
                format!("not a child of {}", node_name(&self.owner.tree, self.id)),
            ))
        };
        match result {
            Ok(geometry) => geometry,
            Err(error) => self.owner.isolate_failure(child, constraints, error),
        }
    }

    /// Lays out a box child and reads its size.
    pub fn layout_child(&mut self, child: RenderId, constraints: BoxConstraints) -> Size {
        self.run_child(child, Constraints::Box(constraints), true)
            .size()
            .unwrap_or_else(|| constraints.smallest())
    }

    /// Lays out a box child whose size this node promises not to read. The
    /// child becomes a relayout boundary.
    pub fn layout_child_ignoring_size(&mut self, child: RenderId, constraints: BoxConstraints) {
        self.run_child(child, Constraints::Box(constraints), false);
    }

    pub fn layout_sliver_child(
        &mut self,
        child: RenderId,
        constraints: SliverConstraints,
    ) -> SliverGeometry {
        self.run_child(child, Constraints::Sliver(constraints), true)
            .sliver()
            .unwrap_or(SliverGeometry::ZERO)
    }

    /// Reads a child's size after layout. Refused when the child was laid out
    /// without `parent_uses_size`.
    pub fn child_size(&self, child: RenderId) -> Result<Size, LayoutError> {
        let node = self
            .owner
            .tree
            .get(child)
            .filter(|node| node.parent() == Some(self.id))
            .ok_or_else(|| LayoutError::violation(child, "not a child of this node"))?;
        if node.geometry().is_some() && !node.parent_uses_size {
            return Err(LayoutError::violation(
                child,
                "size read by a parent that laid it out without parent_uses_size",
            ));
        }
        self.owner.tree.size(child)
    }

    pub fn child_geometry(&self, child: RenderId) -> Result<SliverGeometry, LayoutError> {
        self.owner.tree.sliver_geometry(child)
    }

    pub fn parent_data<T: 'static>(&self, child: RenderId) -> Option<&T> {
        self.owner.tree.parent_data(child)
    }

    pub fn parent_data_mut<T: 'static>(&mut self, child: RenderId) -> Option<&mut T> {
        if self.owner.tree.parent(child) != Some(self.id) {
            return None;
        }
        self.owner.tree.parent_data_mut(child)
    }

    /// Positions a box child whose parent data is [`BoxParentData`].
    pub fn set_child_offset(&mut self, child: RenderId, offset: Offset) {
        if let Some(data) = self.parent_data_mut::<BoxParentData>(child) {
            data.offset = offset;
        }
    }

    /// Creates and adopts a child while this node is being laid out, as lazy
    /// slivers do. The new child is not laid out yet.
    pub fn insert_child(
        &mut self,
        index: usize,
        object: RenderKind,
        parent_data: Box<dyn ParentData>,
    ) -> Result<RenderId, LayoutError> {
        let child = self.owner.tree.insert(object);
        if let Err(error) = self.owner.tree.adopt_at(self.id, child, Some(index), parent_data) {
            self.owner.forget(child);
            return Err(error);
        }
        Ok(child)
    }

    /// Disposes a child subtree during layout. This node is not re-marked.
    pub fn remove_child(&mut self, child: RenderId) {
        if self.owner.tree.parent(child) == Some(self.id) {
            self.owner.forget(child);
        }
    }

    /// Allows this node's descendants to be laid out again in the current
    /// pass. Viewports use it when a scroll offset correction restarts their
    /// sliver sequence.
    pub fn restart_children(&mut self) {
        for id in self.owner.tree.descendants(self.id) {
            if let Some(node) = self.owner.tree.get_mut(id) {
                node.layout_pass = 0;
            }
        }
    }
}

/// Handle for mutating a render object between frames.
pub struct UpdateCtx<'a> {
    owner: &'a mut PipelineOwner,
    id: RenderId,
}

impl UpdateCtx<'_> {
    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.owner.config
    }

    pub fn mark_needs_layout(&mut self) {
        self.owner.mark_needs_layout(self.id);
    }

    pub fn mark_needs_paint(&mut self) {
        self.owner.mark_needs_paint(self.id);
    }

    /// Asks for `advance` to be called on the next frame.
    pub fn request_animation_frame(&mut self) {
        self.owner.animating.insert(self.id);
    }

    pub fn children(&self) -> Vec<RenderId> {
        self.owner.tree.children(self.id).to_vec()
    }

    /// Disposes a child subtree and marks this node for layout.
    pub fn remove_child(&mut self, child: RenderId) {
        if self.owner.tree.parent(child) == Some(self.id) {
            self.owner.remove(child);
        }
    }

    pub fn size(&self) -> Option<Size> {
        self.owner.tree.size(self.id).ok()
    }

    pub fn job_queue(&self) -> JobQueue {
        self.owner.job_queue()
    }
}
