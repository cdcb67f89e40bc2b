//! End-to-end: style a small tree, lay it out, draw it, read the picture.

use flexcanvas::geometry::{Matrix, Rect};
use flexcanvas::layout::LayoutBox;
use flexcanvas::renderer::{Canvas, ClipOp, ClipShape, DrawCommand, Paint};
use flexcanvas::{InsertPosition, Node, NodeType, Rgba, StyleKey, StyleSheet};

fn red_blue_scene() -> (Node, Node) {
    let root = Node::with_type(NodeType::Rect);
    root.set_style(
        &StyleSheet::new()
            .with(StyleKey::Flex, 1)
            .with(StyleKey::Width, 100)
            .with(StyleKey::Height, 100)
            .with(StyleKey::BackgroundColor, "red"),
    )
    .unwrap();

    let child = Node::with_type(NodeType::Rect);
    child
        .set_style(
            &StyleSheet::new()
                .with(StyleKey::Flex, 1)
                .with(StyleKey::BackgroundColor, "blue")
                .with(StyleKey::Margin, 10),
        )
        .unwrap();
    root.insert_child(&child, InsertPosition::End).unwrap();
    (root, child)
}

#[test]
fn test_margin_is_consumed_on_all_sides() {
    let (root, child) = red_blue_scene();
    root.compute_layout(Some(100.0), Some(100.0)).unwrap();

    assert_eq!(
        child.layout(),
        LayoutBox {
            left: 10.0,
            top: 10.0,
            right: 10.0,
            bottom: 10.0,
            width: 80.0,
            height: 80.0,
        }
    );
}

#[test]
fn test_picture_has_both_fills_at_their_boxes() {
    let (root, _child) = red_blue_scene();
    root.compute_layout(Some(100.0), Some(100.0)).unwrap();
    let picture = root.draw().unwrap();

    let fills: Vec<(Rect, Rgba)> = picture
        .flatten()
        .into_iter()
        .filter_map(|flat| match flat.command {
            DrawCommand::DrawRect { paint, .. } => Some((flat.bounds, paint.color)),
            _ => None,
        })
        .collect();

    assert_eq!(
        fills,
        vec![
            (Rect::from_xywh(0.0, 0.0, 100.0, 100.0), Rgba::RED),
            (Rect::from_xywh(10.0, 10.0, 80.0, 80.0), Rgba::BLUE),
        ]
    );
}

#[test]
fn test_draw_is_repeatable_and_serializable() {
    let (root, _child) = red_blue_scene();
    let first = root.draw().unwrap();
    let second = root.draw().unwrap();
    assert_eq!(first, second);

    let json = first.to_json_value().unwrap();
    assert_eq!(json["commands"][0]["op"], "save");
}

/// Counts balanced save/restore pairs while replaying a picture.
#[derive(Default)]
struct CountingCanvas {
    depth: i32,
    max_depth: i32,
    draws: usize,
}

impl Canvas for CountingCanvas {
    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn restore(&mut self) {
        self.depth -= 1;
    }

    fn translate(&mut self, _dx: f32, _dy: f32) {}

    fn concat(&mut self, _matrix: &Matrix) {}

    fn clip(&mut self, _shape: &ClipShape, _op: ClipOp, _anti_alias: bool) {}

    fn save_layer(&mut self, _paint: &Paint) {
        self.save();
    }

    fn draw(&mut self, _command: &DrawCommand) {
        self.draws += 1;
    }
}

#[test]
fn test_playback_is_balanced() {
    let (root, _child) = red_blue_scene();
    let picture = root.draw().unwrap();

    let mut canvas = CountingCanvas::default();
    picture.playback(&mut canvas);

    assert_eq!(canvas.depth, 0);
    assert_eq!(canvas.max_depth, 2);
    assert_eq!(canvas.draws, 2);
}
