use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use arbor::app::App;
use arbor::config::PipelineConfig;
use arbor::error::LayoutError;
use arbor::geometry::{Padding, Size};
use arbor::layout::{AxisDirection, SliverConstraints, SliverGeometry};
use arbor::objects::RenderFixedSize;
use arbor::pipeline::LayoutCtx;
use arbor::render::{
    Protocol, RenderBox, RenderId, RenderKind, RenderObject, RenderSliver, SliverListParentData,
    SliverParentData,
};
use arbor::sliver::{RenderViewport, SliverChildBuilder};
use arbor::widgets::{
    FixedSize, IntoWidget, SliverBand, SliverFixedExtentList, SliverList, SliverPadding, SliverToBoxAdapter,
    Viewport, widgets,
};

mod common;

const FRAME: Duration = Duration::from_millis(16);

fn slivers(app: &App) -> Vec<RenderId> {
    let root = app.root_render_object().unwrap();
    app.pipeline().tree().children(root).to_vec()
}

fn viewport(app: &App) -> &RenderViewport {
    let root = app.root_render_object().unwrap();
    app.pipeline().tree().object::<RenderViewport>(root).unwrap()
}

fn constraints(app: &App, id: RenderId) -> SliverConstraints {
    match app.pipeline().tree().get(id).unwrap().constraints() {
        Some(arbor::render::Constraints::Sliver(constraints)) => constraints,
        other => panic!("expected sliver constraints, got {other:?}"),
    }
}

fn jump(app: &mut App, pixels: f32) {
    let root = app.root_render_object().unwrap();
    app.pipeline_mut()
        .update::<RenderViewport, _>(root, |viewport, cx| viewport.jump_to(pixels, cx));
    app.pump(FRAME).unwrap();
}

fn list_indices(app: &App, list: RenderId) -> Vec<usize> {
    let tree = app.pipeline().tree();
    tree.children(list)
        .iter()
        .map(|&child| tree.parent_data::<SliverListParentData>(child).unwrap().index)
        .collect()
}

fn item(height: f32) -> SliverChildBuilder {
    SliverChildBuilder::with_count(100, move |_| {
        Some(Box::new(RenderFixedSize::new(Size::new(10.0, height))) as Box<dyn RenderBox>)
    })
}

#[test]
fn test_max_scroll_extent_sums_scroll_extents() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([
        SliverBand::new(550.0),
        SliverBand::new(200.0).reserved(100.0),
    ])));
    app.pump(FRAME).unwrap();
    assert_eq!(viewport(&app).max_scroll_extent(), 50.0);

    for pixels in [30.0, 50.0, 10.0] {
        jump(&mut app, pixels);
        assert_eq!(viewport(&app).position().pixels(), pixels);
        assert_eq!(viewport(&app).max_scroll_extent(), 50.0);
    }
}

#[test]
fn test_reserved_band_overlaps_the_next_sliver() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([
        SliverBand::new(100.0).reserved(50.0),
        SliverBand::new(100.0),
    ])));
    app.pump(FRAME).unwrap();

    let ids = slivers(&app);
    let tree = app.pipeline().tree();
    let first = tree.sliver_geometry(ids[0]).unwrap();
    assert_eq!(first.paint_extent, 100.0);
    assert_eq!(first.layout_extent, 50.0);

    let second = constraints(&app, ids[1]);
    assert_eq!(second.overlap, 50.0);
    assert_eq!(second.remaining_paint_extent, 550.0);
    let data = tree.parent_data::<SliverParentData>(ids[1]).unwrap();
    assert_eq!(data.layout_offset, 50.0);
    assert_eq!(data.paint_offset.y, 50.0);
}

#[test]
fn test_scrolled_offsets_are_split_across_slivers() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([
        SliverBand::new(300.0),
        SliverBand::new(1000.0),
    ])));
    app.pump(FRAME).unwrap();
    let root = app.root_render_object().unwrap();
    app.pipeline_mut()
        .update::<RenderViewport, _>(root, |viewport, cx| viewport.jump_to(400.0, cx));
    app.pump(FRAME).unwrap();

    let ids = slivers(&app);
    let first = constraints(&app, ids[0]);
    let second = constraints(&app, ids[1]);
    assert_eq!(first.scroll_offset, 400.0);
    assert_eq!(second.scroll_offset, 100.0);
    assert_eq!(second.preceding_scroll_extent, 300.0);

    let tree = app.pipeline().tree();
    assert_eq!(tree.sliver_geometry(ids[0]).unwrap().paint_extent, 0.0);
    assert_eq!(tree.sliver_geometry(ids[1]).unwrap().paint_extent, 600.0);
}

#[test]
fn test_reversed_axis_paints_from_the_far_edge() {
    let mut app = common::app();
    app.set_root_widget(Viewport::new(
        AxisDirection::Up,
        widgets([SliverBand::new(100.0), SliverBand::new(50.0)]),
    ));
    app.pump(FRAME).unwrap();

    let ids = slivers(&app);
    let tree = app.pipeline().tree();
    let offsets: Vec<f32> = ids
        .iter()
        .map(|&id| tree.parent_data::<SliverParentData>(id).unwrap().paint_offset.y)
        .collect();
    assert_eq!(offsets, vec![500.0, 450.0]);
}

#[test]
fn test_box_adapter_scrolls_its_child() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([
        SliverToBoxAdapter::new(FixedSize::new(10.0, 300.0)).into_widget(),
        SliverBand::new(1000.0).into_widget(),
    ])));
    app.pump(FRAME).unwrap();
    let root = app.root_render_object().unwrap();
    app.pipeline_mut()
        .update::<RenderViewport, _>(root, |viewport, cx| viewport.jump_to(100.0, cx));
    app.pump(FRAME).unwrap();

    let adapter = slivers(&app)[0];
    let tree = app.pipeline().tree();
    let child = tree.children(adapter)[0];
    assert_eq!(tree.size(child).unwrap(), Size::new(800.0, 300.0));
    assert_eq!(tree.sliver_geometry(adapter).unwrap().paint_extent, 200.0);
    let offset = tree.get(child).unwrap().parent_data().unwrap().paint_offset();
    assert_eq!(offset.y, -100.0);
}

#[test]
fn test_padding_adds_scroll_extent() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([SliverPadding::new(
        Padding {
            top: 20.0,
            right: 0.0,
            bottom: 30.0,
            left: 10.0,
        },
        SliverBand::new(100.0),
    )])));
    app.pump(FRAME).unwrap();

    let padding = slivers(&app)[0];
    let tree = app.pipeline().tree();
    assert_eq!(tree.sliver_geometry(padding).unwrap().scroll_extent, 150.0);
    let band = tree.children(padding)[0];
    let offset = tree.parent_data::<SliverParentData>(band).unwrap().paint_offset;
    assert_eq!((offset.x, offset.y), (10.0, 20.0));
    assert_eq!(constraints(&app, band).cross_axis_extent, 790.0);
}

#[test]
fn test_fixed_extent_list_builds_the_cache_window() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([SliverFixedExtentList::new(
        100.0,
        item(100.0),
    )])));
    app.pump(FRAME).unwrap();

    let list = slivers(&app)[0];
    // 600 visible plus 250 of cache after the end.
    assert_eq!(list_indices(&app, list), (0..9).collect::<Vec<_>>());
    assert_eq!(viewport(&app).max_scroll_extent(), 9400.0);

    jump(&mut app, 1000.0);
    assert_eq!(list_indices(&app, list), (7..19).collect::<Vec<_>>());
    assert_eq!(viewport(&app).max_scroll_extent(), 9400.0);

    for pixels in [5000.0, 9400.0, 200.0] {
        jump(&mut app, pixels);
        assert_eq!(viewport(&app).position().pixels(), pixels);
        assert_eq!(viewport(&app).max_scroll_extent(), 9400.0);
    }
}

#[test]
fn test_variable_list_extrapolates_its_extent() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([SliverList::new(
        SliverChildBuilder::with_count(20, |_| {
            Some(Box::new(RenderFixedSize::new(Size::new(10.0, 50.0))) as Box<dyn RenderBox>)
        }),
    )])));
    app.pump(FRAME).unwrap();

    let list = slivers(&app)[0];
    assert_eq!(app.pipeline().tree().children(list).len(), 17);
    assert_eq!(viewport(&app).max_scroll_extent(), 400.0);
}

#[test]
fn test_scroll_animation_advances_with_frames() {
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([SliverBand::new(2000.0)])));
    app.pump(FRAME).unwrap();

    let root = app.root_render_object().unwrap();
    app.pipeline_mut().update::<RenderViewport, _>(root, |viewport, cx| {
        viewport.animate_to(
            1000.0,
            Duration::from_millis(100),
            arbor::animation::Curve::Linear,
            cx,
        )
    });
    let frame = app.pump(Duration::ZERO).unwrap();
    assert!(frame.animating);

    app.pump(Duration::from_millis(50)).unwrap();
    assert_eq!(viewport(&app).position().pixels(), 500.0);
    let frame = app.pump(Duration::from_millis(80)).unwrap();
    assert_eq!(viewport(&app).position().pixels(), 1000.0);
    assert!(!frame.animating);
}

#[test]
fn test_variable_list_recovers_leading_items_after_extents_change() {
    let height = Rc::new(Cell::new(50.0));
    let builder = {
        let height = height.clone();
        SliverChildBuilder::with_count(200, move |_| {
            Some(Box::new(RenderFixedSize::new(Size::new(10.0, height.get()))) as Box<dyn RenderBox>)
        })
    };
    let mut app = common::app();
    app.set_root_widget(Viewport::vertical(widgets([SliverList::new(builder)])));
    app.pump(FRAME).unwrap();
    let list = slivers(&app)[0];

    for pixels in [600.0, 1200.0, 2500.0] {
        jump(&mut app, pixels);
    }
    // Items built from now on are twice as tall, so estimates made while
    // scrolling back are wrong and the list has to correct.
    height.set(100.0);
    jump(&mut app, 2000.0);
    jump(&mut app, 1000.0);

    let mut settled = false;
    for _ in 0..5 {
        jump(&mut app, 0.0);
        if viewport(&app).position().pixels() == 0.0 {
            settled = true;
            break;
        }
    }
    assert!(settled, "the list kept correcting at the top");
    assert!(app.pipeline().diagnostics().is_empty());

    let indices = list_indices(&app, list);
    assert_eq!(indices.first(), Some(&0));
    let tree = app.pipeline().tree();
    let first = tree.children(list)[0];
    let data = tree.parent_data::<SliverListParentData>(first).unwrap();
    assert_eq!(data.layout_offset, 0.0);
    assert_eq!(data.paint_offset.y, 0.0);
    assert_eq!(tree.sliver_geometry(list).unwrap().paint_extent, 600.0);
}

/// Asks for one scroll offset correction, then lays out normally.
struct CorrectsOnce {
    corrected: bool,
}

impl RenderObject for CorrectsOnce {
    fn child_protocol(&self) -> Option<Protocol> {
        None
    }
}

impl RenderSliver for CorrectsOnce {
    fn perform_layout(
        &mut self,
        _cx: &mut LayoutCtx<'_>,
        constraints: SliverConstraints,
    ) -> Result<SliverGeometry, LayoutError> {
        if !self.corrected && constraints.scroll_offset > 0.0 {
            self.corrected = true;
            return Ok(SliverGeometry::correction(-20.0));
        }
        let paint = (1000.0 - constraints.scroll_offset).clamp(0.0, constraints.remaining_paint_extent);
        Ok(SliverGeometry::new(1000.0, paint, 1000.0))
    }
}

#[test]
fn test_viewport_applies_scroll_corrections() {
    let mut owner = common::owner(PipelineConfig::new());
    let viewport = owner.insert(RenderKind::new_box(
        RenderViewport::new(AxisDirection::Down).with_offset(100.0),
    ));
    let sliver = owner.insert(RenderKind::new_sliver(CorrectsOnce { corrected: false }));
    owner.adopt(viewport, sliver).unwrap();
    owner.set_root(viewport).unwrap();

    owner.flush_layout().unwrap();
    assert!(owner.diagnostics().is_empty());
    let viewport = owner.tree().object::<RenderViewport>(viewport).unwrap();
    assert_eq!(viewport.position().pixels(), 80.0);
    assert_eq!(viewport.max_scroll_extent(), 400.0);
}

#[test]
fn test_box_child_under_viewport_is_rejected() {
    let mut owner = common::owner(PipelineConfig::new());
    let viewport = owner.insert(RenderKind::new_box(RenderViewport::new(AxisDirection::Down)));
    let leaf = owner.insert(RenderKind::new_box(RenderFixedSize::new(Size::ZERO)));
    assert!(owner.adopt(viewport, leaf).is_err());
}
