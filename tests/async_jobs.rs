use std::thread;
use std::time::Duration;

use arbor::app::App;
use arbor::geometry::Size;
use arbor::objects::{IntrinsicSize, MeasureUpdate};
use arbor::render::RenderId;
use arbor::widgets::{Stack, Text, widgets};

mod common;

const FRAME: Duration = Duration::from_millis(16);

fn text_app() -> (App, RenderId) {
    let mut app = common::app();
    app.set_root_widget(Stack::new(widgets([Text::new("hi")])));
    app.pump(FRAME).unwrap();
    let root = app.root_render_object().unwrap();
    let text = app.pipeline().tree().children(root)[0];
    (app, text)
}

#[test]
fn test_measurement_from_worker_thread_resizes_leaf() {
    let (mut app, text) = text_app();
    assert_eq!(app.pipeline().tree().size(text).unwrap(), Size::new(16.0, 16.0));

    let queue = app.job_queue();
    thread::spawn(move || {
        queue.post(
            text,
            MeasureUpdate(Box::new(IntrinsicSize(Size::new(30.0, 40.0)))),
        )
    })
    .join()
    .unwrap();
    assert!(app.needs_frame());

    let frame = app.pump(FRAME).unwrap();
    assert_eq!(frame.jobs, 1);
    assert!(frame.layout.laid_out.contains(&text));
    assert_eq!(app.pipeline().tree().size(text).unwrap(), Size::new(30.0, 40.0));
}

#[test]
fn test_bare_intrinsic_size_is_accepted() {
    let (mut app, text) = text_app();
    app.job_queue().post(text, IntrinsicSize(Size::new(12.0, 12.0)));
    app.pump(FRAME).unwrap();
    assert_eq!(app.pipeline().tree().size(text).unwrap(), Size::new(12.0, 12.0));
}

#[test]
fn test_unknown_payload_changes_nothing() {
    let (mut app, text) = text_app();
    app.job_queue().post(text, "not a measurement");
    let frame = app.pump(FRAME).unwrap();
    assert_eq!(frame.jobs, 1);
    assert!(frame.layout.laid_out.is_empty());
    assert_eq!(app.pipeline().tree().size(text).unwrap(), Size::new(16.0, 16.0));
}

#[test]
fn test_jobs_for_removed_nodes_are_dropped() {
    let (mut app, text) = text_app();
    app.set_root_widget(Stack::new(Vec::new()));
    app.pump(FRAME).unwrap();
    assert!(!app.pipeline().tree().contains(text));

    app.job_queue().request_layout(text);
    let frame = app.pump(FRAME).unwrap();
    assert_eq!(frame.jobs, 1);
    assert!(frame.layout.laid_out.is_empty());
}
