use std::time::Duration;

use arbor::app::App;
use arbor::config::{ErrorPolicy, PipelineConfig};
use arbor::error::{LayoutError, PipelineError};
use arbor::geometry::{Offset, Size};
use arbor::layout::{BoxConstraints, CrossAxisAlignment};
use arbor::objects::{RenderFixedSize, RenderStack};
use arbor::pipeline::{LayoutCtx, PipelineOwner};
use arbor::render::{BoxParentData, RenderBox, RenderId, RenderKind, RenderObject};
use arbor::widgets::{ConstrainedBox, FixedSize, IntoWidget, column, widgets};

mod common;

const FRAME: Duration = Duration::from_millis(16);

fn children(app: &App) -> Vec<RenderId> {
    let root = app.root_render_object().unwrap();
    app.pipeline().tree().children(root).to_vec()
}

fn offset(app: &App, id: RenderId) -> Offset {
    app.pipeline()
        .tree()
        .parent_data::<BoxParentData>(id)
        .unwrap()
        .offset
}

#[test]
fn test_stretched_column_stacks_children() {
    let config = PipelineConfig::new().root_constraints(BoxConstraints::tight_for_width(100.0));
    let mut app = common::app_with(config);
    app.set_root_widget(
        column(widgets([
            FixedSize::new(20.0, 50.0),
            FixedSize::new(20.0, 80.0),
            FixedSize::new(20.0, 30.0),
        ]))
        .cross_axis_alignment(CrossAxisAlignment::Stretch),
    );
    app.pump(FRAME).unwrap();

    let root = app.root_render_object().unwrap();
    let tree = app.pipeline().tree();
    assert_eq!(tree.size(root).unwrap(), Size::new(100.0, 160.0));

    let ids = children(&app);
    let offsets: Vec<f32> = ids.iter().map(|&id| offset(&app, id).y).collect();
    assert_eq!(offsets, vec![0.0, 50.0, 130.0]);
    for id in ids {
        assert_eq!(tree.size(id).unwrap().width, 100.0);
    }
}

#[test]
fn test_clean_sibling_is_skipped() {
    let mut app = common::app();
    let tree = |first: f32| {
        column(widgets([
            FixedSize::new(50.0, first),
            FixedSize::new(50.0, 50.0),
        ]))
    };
    app.set_root_widget(tree(50.0));
    app.pump(FRAME).unwrap();
    let ids = children(&app);

    app.set_root_widget(tree(60.0));
    let frame = app.pump(FRAME).unwrap();
    assert!(frame.layout.laid_out.contains(&ids[0]));
    assert!(!frame.layout.laid_out.contains(&ids[1]));
    assert!(frame.layout.skipped >= 1);
    assert_eq!(offset(&app, ids[1]).y, 60.0);
}

#[test]
fn test_tightly_constrained_change_stays_inside_its_boundary() {
    let mut app = common::app();
    let tree = |size: f32| {
        column(widgets([
            ConstrainedBox::tight(100.0, 100.0)
                .child(FixedSize::new(size, size))
                .into_widget(),
            FixedSize::new(10.0, 10.0).into_widget(),
        ]))
    };
    app.set_root_widget(tree(20.0));
    app.pump(FRAME).unwrap();
    let constrained = children(&app)[0];
    let leaf = app.pipeline().tree().children(constrained)[0];
    assert!(app.pipeline().tree().get(leaf).unwrap().is_relayout_boundary());

    app.set_root_widget(tree(30.0));
    let frame = app.pump(FRAME).unwrap();
    assert_eq!(frame.layout.boundaries, vec![leaf]);
    assert_eq!(frame.layout.laid_out, vec![leaf]);
    assert_eq!(
        app.pipeline().tree().object::<RenderFixedSize>(leaf).unwrap().preferred(),
        Size::new(30.0, 30.0)
    );
}

#[test]
fn test_unchanged_frame_does_no_layout() {
    let mut app = common::app();
    app.set_root_widget(column(widgets([FixedSize::new(10.0, 10.0)])));
    app.pump(FRAME).unwrap();
    assert!(!app.needs_frame());

    let frame = app.pump(FRAME).unwrap();
    assert!(frame.layout.laid_out.is_empty());
    assert!(frame.paint.repainted.is_empty());
}

/// Lays its only child out twice with different constraints.
struct LaysOutTwice;

impl RenderObject for LaysOutTwice {}

impl RenderBox for LaysOutTwice {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        for child in cx.children() {
            cx.layout_child(child, constraints.loosen());
            cx.layout_child(child, BoxConstraints::tight(Size::new(5.0, 5.0)));
        }
        Ok(constraints.biggest())
    }
}

/// Reads a size it promised to ignore.
struct PeeksAtSize;

impl RenderObject for PeeksAtSize {}

impl RenderBox for PeeksAtSize {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        for child in cx.children() {
            cx.layout_child_ignoring_size(child, constraints.loosen());
            cx.child_size(child)?;
        }
        Ok(constraints.biggest())
    }
}

/// Returns a size no constraints allow.
struct Oversized;

impl RenderObject for Oversized {
    fn child_protocol(&self) -> Option<arbor::render::Protocol> {
        None
    }
}

impl RenderBox for Oversized {
    fn perform_layout(
        &mut self,
        _cx: &mut LayoutCtx<'_>,
        _constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        Ok(Size::new(5000.0, 5000.0))
    }
}

fn owner_with(policy: ErrorPolicy, parent: RenderKind) -> (PipelineOwner, RenderId, RenderId) {
    let mut owner = common::owner(PipelineConfig::new().error_policy(policy));
    let parent = owner.insert(parent);
    let child = owner.insert(RenderKind::new_box(RenderFixedSize::new(Size::new(10.0, 10.0))));
    owner.adopt(parent, child).unwrap();
    owner.set_root(parent).unwrap();
    (owner, parent, child)
}

#[test]
fn test_second_layout_in_one_pass_is_reported() {
    let (mut owner, _, child) = owner_with(ErrorPolicy::Lenient, RenderKind::new_box(LaysOutTwice));
    owner.flush_layout().unwrap();
    let diagnostics = owner.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].error, LayoutError::LaidOutTwice { node: child });
    // The first result stands.
    assert_eq!(owner.tree().size(child).unwrap(), Size::new(10.0, 10.0));
}

#[test]
fn test_strict_policy_fails_the_flush() {
    let (mut owner, _, _) = owner_with(ErrorPolicy::Strict, RenderKind::new_box(LaysOutTwice));
    match owner.flush_layout() {
        Err(PipelineError::Layout(diagnostics)) => assert_eq!(diagnostics.len(), 1),
        other => panic!("expected a layout error, got {other:?}"),
    }
}

#[test]
fn test_reading_an_ignored_size_is_refused() {
    let (mut owner, parent, _) = owner_with(ErrorPolicy::Lenient, RenderKind::new_box(PeeksAtSize));
    owner.flush_layout().unwrap();
    let diagnostics = owner.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        diagnostics[0].error,
        LayoutError::ProtocolViolation { node, .. } if node != parent
    ));
    // The failing root settles on its smallest legal size.
    assert_eq!(owner.tree().size(parent).unwrap(), Size::new(800.0, 600.0));
}

#[test]
fn test_lenient_policy_clamps_bad_sizes() {
    let mut owner = common::owner(PipelineConfig::new().error_policy(ErrorPolicy::Lenient));
    let root = owner.insert(RenderKind::new_box(RenderStack::new()));
    let child = owner.insert(RenderKind::new_box(Oversized));
    owner.adopt(root, child).unwrap();
    owner.set_root(root).unwrap();

    owner.flush_layout().unwrap();
    assert!(owner.diagnostics().is_empty());
    assert_eq!(owner.tree().size(child).unwrap(), Size::new(800.0, 600.0));
}

#[test]
fn test_failure_is_isolated_to_the_offending_node() {
    let mut owner = common::owner(PipelineConfig::new().error_policy(ErrorPolicy::Strict));
    let root = owner.insert(RenderKind::new_box(RenderStack::new()));
    let bad = owner.insert(RenderKind::new_box(Oversized));
    let good = owner.insert(RenderKind::new_box(RenderFixedSize::new(Size::new(10.0, 20.0))));
    owner.adopt(root, bad).unwrap();
    owner.adopt(root, good).unwrap();
    owner.set_root(root).unwrap();

    assert!(owner.flush_layout().is_err());
    let tree = owner.tree();
    assert_eq!(tree.size(bad).unwrap(), Size::ZERO);
    assert_eq!(tree.size(good).unwrap(), Size::new(10.0, 20.0));
    assert_eq!(tree.size(root).unwrap(), Size::new(800.0, 600.0));
    assert_eq!(owner.diagnostics()[0].chain, vec!["RenderStack", "Oversized"]);
}
