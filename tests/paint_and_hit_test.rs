use std::time::Duration;

use arbor::app::App;
use arbor::geometry::{Offset, Rect};
use arbor::hit_test::HitTestBehavior;
use arbor::objects::RenderInkFeedback;
use arbor::paint::{Color, DrawCommand};
use arbor::render::RenderId;
use arbor::widgets::{FixedSize, InkFeedback, RepaintBoundary, Stack, column, widgets};

mod common;

const FRAME: Duration = Duration::from_millis(16);
const RED: Color = Color::rgb(1.0, 0.0, 0.0);
const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

fn root_children(app: &App) -> Vec<RenderId> {
    let root = app.root_render_object().unwrap();
    app.pipeline().tree().children(root).to_vec()
}

fn boundaries(first: Color) -> arbor::widgets::Flex {
    column(widgets([
        RepaintBoundary::new(FixedSize::new(50.0, 50.0).with_color(first)),
        RepaintBoundary::new(FixedSize::new(50.0, 50.0).with_color(BLUE)),
    ]))
}

#[test]
fn test_display_list_places_layers() {
    let mut app = common::app();
    app.set_root_widget(boundaries(RED));
    let frame = app.pump(FRAME).unwrap();

    let rects: Vec<(Rect, Color)> = frame.display_list.rects().collect();
    assert_eq!(
        rects,
        vec![
            (Rect::new(0.0, 0.0, 50.0, 50.0), RED),
            (Rect::new(0.0, 50.0, 50.0, 50.0), BLUE),
        ]
    );
}

#[test]
fn test_repaint_stays_inside_its_boundary() {
    let mut app = common::app();
    app.set_root_widget(boundaries(RED));
    let first = app.pump(FRAME).unwrap();
    assert_eq!(first.paint.repainted.len(), 3);
    let red_boundary = root_children(&app)[0];

    app.set_root_widget(boundaries(GREEN));
    let frame = app.pump(FRAME).unwrap();
    assert!(frame.layout.laid_out.is_empty());
    assert_eq!(frame.paint.repainted, vec![red_boundary]);
    let colors: Vec<Color> = frame.display_list.rects().map(|(_, color)| color).collect();
    assert_eq!(colors, vec![GREEN, BLUE]);
}

#[test]
fn test_root_layer_references_child_layers() {
    let mut app = common::app();
    app.set_root_widget(boundaries(RED));
    app.pump(FRAME).unwrap();

    let root = app.root_render_object().unwrap();
    let layer = app.pipeline().tree().get(root).unwrap().layer().unwrap();
    let referenced: Vec<RenderId> = layer
        .commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Layer { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(referenced, root_children(&app));
}

fn overlapping(top: HitTestBehavior) -> Stack {
    Stack::new(widgets([
        FixedSize::new(100.0, 100.0),
        FixedSize::new(100.0, 100.0).with_behavior(top),
    ]))
}

#[test]
fn test_opaque_child_hides_siblings_behind() {
    let mut app = common::app();
    app.set_root_widget(overlapping(HitTestBehavior::Opaque));
    app.pump(FRAME).unwrap();

    let root = app.root_render_object().unwrap();
    let children = root_children(&app);
    let [bottom, top] = children[..] else {
        panic!("expected two children");
    };
    let hits = app.hit_test(Offset::new(10.0, 10.0));
    assert_eq!(hits.targets(), vec![top, root]);
    assert!(!hits.contains(bottom));
}

#[test]
fn test_translucent_child_lets_siblings_be_hit() {
    let mut app = common::app();
    app.set_root_widget(overlapping(HitTestBehavior::Translucent));
    app.pump(FRAME).unwrap();

    let root = app.root_render_object().unwrap();
    let children = root_children(&app);
    let [bottom, top] = children[..] else {
        panic!("expected two children");
    };
    let hits = app.hit_test(Offset::new(10.0, 10.0));
    assert_eq!(hits.targets(), vec![top, bottom, root]);
}

#[test]
fn test_miss_outside_every_child() {
    let mut app = common::app();
    app.set_root_widget(overlapping(HitTestBehavior::Opaque));
    app.pump(FRAME).unwrap();
    assert!(app.hit_test(Offset::new(300.0, 300.0)).is_empty());
}

#[test]
fn test_hit_positions_are_local() {
    let mut app = common::app();
    app.set_root_widget(column(widgets([
        FixedSize::new(100.0, 50.0),
        FixedSize::new(100.0, 50.0),
    ])));
    app.pump(FRAME).unwrap();

    let second = root_children(&app)[1];
    let hits = app.hit_test(Offset::new(20.0, 70.0));
    assert_eq!(hits.path[0].target, second);
    assert_eq!(hits.path[0].local_position, Offset::new(20.0, 20.0));
}

#[test]
fn test_ripple_paints_until_it_fades() {
    let mut app = common::app();
    app.set_root_widget(Stack::new(widgets([InkFeedback::new(FixedSize::new(
        100.0, 100.0,
    ))])));
    app.pump(FRAME).unwrap();
    let ink = root_children(&app)[0];

    app.pipeline_mut()
        .update::<RenderInkFeedback, _>(ink, |ink, cx| ink.press(Offset::new(50.0, 50.0), cx));
    let frame = app.pump(FRAME).unwrap();
    let circles = |list: &arbor::paint::DisplayList| {
        list.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Circle { .. }))
            .count()
    };
    assert_eq!(circles(&frame.display_list), 1);

    app.pipeline_mut()
        .update::<RenderInkFeedback, _>(ink, |ink, cx| ink.release(Offset::new(50.0, 50.0), cx));
    let mut frame = app.pump(FRAME).unwrap();
    while frame.animating {
        frame = app.pump(Duration::from_millis(100)).unwrap();
    }
    assert_eq!(circles(&frame.display_list), 0);
    assert!(!app.pipeline().tree().object::<RenderInkFeedback>(ink).unwrap().ripple().is_active());
}
