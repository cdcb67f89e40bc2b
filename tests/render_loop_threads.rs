//! Render loop across threads: cancellation by run id, and animated values
//! driven from the render context.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use flexcanvas::pipeline::{LatestPicture, NodeBox};
use flexcanvas::{
    ManualFrameScheduler, Node, NodeType, RenderLoop, RunSlot, SharedValue, StyleKey, StyleSheet,
    StyleValue, ThreadFrameScheduler,
};

fn scene() -> Node {
    let root = Node::with_type(NodeType::Rect);
    root.set_style(
        &StyleSheet::new()
            .with(StyleKey::Width, 40)
            .with(StyleKey::Height, 40)
            .with(StyleKey::BackgroundColor, "#00ff00"),
    )
    .unwrap();
    root
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

#[test]
fn test_superseded_run_stops_within_one_iteration() {
    let node = scene();
    let scheduler = ManualFrameScheduler::new();
    let slot = RunSlot::new();

    let a = RenderLoop::new(NodeBox::new(&node), LatestPicture::new());
    let a_stats = a.stats();
    let run_a = a.start(&slot, &*scheduler).unwrap();
    scheduler.tick();
    scheduler.tick();
    assert_eq!(a_stats.frames(), 2);

    let b = RenderLoop::new(NodeBox::new(&node), LatestPicture::new());
    let b_stats = b.stats();
    let run_b = b.start(&slot, &*scheduler).unwrap();
    assert_ne!(run_a, run_b);

    scheduler.tick();
    scheduler.tick();

    assert_eq!(a_stats.frames(), 2);
    assert_eq!(b_stats.frames(), 2);
    assert_eq!(slot.current(), Some(run_b));
}

#[test]
fn test_render_thread_stops_when_slot_is_cleared() {
    let node = scene();
    let surface = LatestPicture::new();
    let slot = RunSlot::new();
    let scheduler = ThreadFrameScheduler::new(Duration::from_millis(1));

    let render = RenderLoop::new(NodeBox::new(&node), surface.clone());
    let stats = render.stats();
    render.start(&slot, &scheduler).unwrap();

    assert!(wait_until(Duration::from_secs(5), || stats.frames() >= 3));
    slot.clear();

    // At most the iteration in flight finishes after the clear
    thread::sleep(Duration::from_millis(20));
    let stopped_at = stats.frames();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(stats.frames(), stopped_at);
}

#[test]
fn test_animated_value_driven_from_render_thread() {
    let node = scene();
    let width = SharedValue::new(40.0);
    node.set_style(&StyleSheet::new().animated(StyleKey::Width, width.clone()))
        .unwrap();

    let surface = LatestPicture::new();
    let slot = RunSlot::new();
    let scheduler = ThreadFrameScheduler::new(Duration::from_millis(1));

    let driver = width.clone();
    let last_frame = Arc::new(AtomicU64::new(0));
    let seen = last_frame.clone();
    RenderLoop::new(NodeBox::new(&node), surface.clone())
        .on_frame(move |info| {
            if info.frame == 3 {
                driver.set(75.0);
            }
            seen.store(info.frame, Ordering::SeqCst);
        })
        .start(&slot, &scheduler)
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        last_frame.load(Ordering::SeqCst) > 3 && node.layout().width == 75.0
    }));
    slot.clear();

    assert_eq!(node.style_value(StyleKey::Width), Some(StyleValue::Number(75.0)));
    let picture = surface.latest().unwrap();
    let bounds = picture.flatten()[0].bounds;
    assert_eq!(bounds.width(), 75.0);
}

#[test]
fn test_control_thread_mutates_while_render_thread_draws() {
    let root = scene();
    let slot = RunSlot::new();
    let scheduler = ThreadFrameScheduler::new(Duration::from_millis(1));

    let render = RenderLoop::new(NodeBox::new(&root), LatestPicture::new());
    let stats = render.stats();
    render.start(&slot, &scheduler).unwrap();

    for i in 0..50 {
        let child = Node::with_type(NodeType::Oval);
        child
            .set_style(&StyleSheet::new().with(StyleKey::Height, 1 + i % 3))
            .unwrap();
        root.append_child(&child).unwrap();
        if i % 2 == 0 {
            root.remove_child(&child).unwrap();
        }
    }

    assert!(wait_until(Duration::from_secs(5), || stats.frames() >= 5));
    slot.clear();

    assert_eq!(stats.failures(), 0);
    assert_eq!(root.child_count(), 25);
}
