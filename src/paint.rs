//! Paint recording.
//!
//! Painting does not rasterize anything. Each repaint boundary records its
//! subtree into a [`Layer`] of draw commands in the boundary's own coordinate
//! space. A boundary nested inside another layer appears there only as a
//! [`DrawCommand::Layer`] reference, so re-recording one boundary never
//! touches the layers around it. [`compose`] flattens the cached layers into
//! an absolute-coordinate [`DisplayList`].

use crate::geometry::{Offset, Rect, Size};
use crate::layout::SliverGeometry;
use crate::render::{Constraints, DirtyFlags, Geometry, RenderId, RenderTree};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// A single draw operation. Coordinates are relative to the enclosing layer
/// until composed.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        color: Color,
    },
    Circle {
        center: Offset,
        radius: f32,
        color: Color,
    },
    Text {
        text: String,
        rect: Rect,
        color: Color,
    },
    PushClip {
        rect: Rect,
    },
    PopClip,
    /// Composite the cached layer of a repaint boundary at `offset`.
    Layer {
        id: RenderId,
        offset: Offset,
    },
}

impl DrawCommand {
    pub fn translated(&self, by: Offset) -> DrawCommand {
        match self {
            DrawCommand::Rect { rect, color } => DrawCommand::Rect {
                rect: rect.translate(by),
                color: *color,
            },
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => DrawCommand::Circle {
                center: *center + by,
                radius: *radius,
                color: *color,
            },
            DrawCommand::Text { text, rect, color } => DrawCommand::Text {
                text: text.clone(),
                rect: rect.translate(by),
                color: *color,
            },
            DrawCommand::PushClip { rect } => DrawCommand::PushClip {
                rect: rect.translate(by),
            },
            DrawCommand::PopClip => DrawCommand::PopClip,
            DrawCommand::Layer { id, offset } => DrawCommand::Layer {
                id: *id,
                offset: *offset + by,
            },
        }
    }
}

/// Recorded output of one repaint boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub commands: Vec<DrawCommand>,
}

/// Flattened, absolute-coordinate commands for a whole frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn rects(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Rect { rect, color } => Some((*rect, *color)),
            _ => None,
        })
    }
}

/// Handle a render object paints through.
pub struct PaintContext<'a> {
    tree: &'a mut RenderTree,
    id: RenderId,
    commands: Vec<DrawCommand>,
    repainted: &'a mut Vec<RenderId>,
}

impl PaintContext<'_> {
    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn children(&self) -> Vec<RenderId> {
        self.tree.children(self.id).to_vec()
    }

    pub fn child_offset(&self, child: RenderId) -> Offset {
        self.tree
            .get(child)
            .and_then(|node| node.parent_data())
            .map_or(Offset::ZERO, |data| data.paint_offset())
    }

    /// Size of the node being painted, or zero for slivers.
    pub fn size(&self) -> Size {
        self.tree.size(self.id).unwrap_or_default()
    }

    pub fn sliver_geometry(&self) -> Option<SliverGeometry> {
        self.tree.sliver_geometry(self.id).ok()
    }

    pub fn constraints(&self) -> Option<Constraints> {
        self.tree.get(self.id).and_then(|node| node.constraints())
    }

    pub fn child_geometry(&self, child: RenderId) -> Option<Geometry> {
        self.tree.get(child).and_then(|node| node.geometry())
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    pub fn draw_circle(&mut self, center: Offset, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn draw_text(&mut self, text: impl Into<String>, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            rect,
            color,
        });
    }

    pub fn push_clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::PushClip { rect });
    }

    pub fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    /// Paints `child` with its origin at `offset`.
    ///
    /// A repaint-boundary child is referenced as a layer and re-recorded only
    /// if it is dirty. Children that never completed layout, and slivers that
    /// are not visible, are skipped.
    pub fn paint_child(&mut self, child: RenderId, offset: Offset) {
        let Some(node) = self.tree.get(child) else {
            return;
        };
        let Some(geometry) = node.geometry() else {
            return;
        };
        if matches!(geometry, Geometry::Sliver(g) if !g.visible) {
            if let Some(node) = self.tree.get_mut(child) {
                node.flags.remove(DirtyFlags::NEEDS_PAINT);
            }
            return;
        }

        if node.is_repaint_boundary() {
            if node.needs_paint() || node.layer().is_none() {
                record_layer(self.tree, child, self.repainted);
            }
            self.commands.push(DrawCommand::Layer { id: child, offset });
            return;
        }

        let Some(object) = self.tree.get_mut(child).and_then(|node| node.object.take()) else {
            log::warn!("{child:?} is already being painted");
            return;
        };
        let parent = std::mem::replace(&mut self.id, child);
        object.object().paint(self, offset);
        self.id = parent;
        if let Some(node) = self.tree.get_mut(child) {
            node.object = Some(object);
            node.flags.remove(DirtyFlags::NEEDS_PAINT);
        }
    }
}

/// Re-records the layer of the repaint boundary `id`.
pub(crate) fn record_layer(tree: &mut RenderTree, id: RenderId, repainted: &mut Vec<RenderId>) {
    let Some(object) = tree.get_mut(id).and_then(|node| node.object.take()) else {
        return;
    };
    let commands = {
        let mut cx = PaintContext {
            tree: &mut *tree,
            id,
            commands: Vec::new(),
            repainted: &mut *repainted,
        };
        object.object().paint(&mut cx, Offset::ZERO);
        cx.commands
    };
    if let Some(node) = tree.get_mut(id) {
        log::debug!("recorded layer for {} ({} commands)", node.debug_name(), commands.len());
        node.object = Some(object);
        node.layer = Some(Layer { commands });
        node.flags.remove(DirtyFlags::NEEDS_PAINT);
    }
    repainted.push(id);
}

/// Flattens the cached layers under `root` into absolute coordinates.
pub fn compose(tree: &RenderTree, root: RenderId) -> DisplayList {
    let mut commands = Vec::new();
    flatten_layer(tree, root, Offset::ZERO, &mut commands);
    DisplayList { commands }
}

fn flatten_layer(tree: &RenderTree, id: RenderId, base: Offset, out: &mut Vec<DrawCommand>) {
    let Some(layer) = tree.get(id).and_then(|node| node.layer()) else {
        return;
    };
    for command in &layer.commands {
        match command {
            DrawCommand::Layer { id, offset } => flatten_layer(tree, *id, base + *offset, out),
            other => out.push(other.translated(base)),
        }
    }
}
