//! Draw serializer - post-layout tree walk into a [`Picture`].
//!
//! # Traversal Order
//!
//! Depth first, children in order. For each node:
//!
//! 1. Skip untyped nodes and `display: none` nodes with their subtree
//! 2. Save, translate to the node's layout origin
//! 3. Concat the resolved transform, clip, open the layer paint
//! 4. Emit the node's own command (groups have none)
//! 5. Recurse into children with the accumulated opacity
//! 6. Close the layer and restore
//!
//! Each node's state lock is held only while its snapshot is copied, so a
//! draw never holds two node locks at once.

use super::paint::{Paint, PaintMode};
use super::picture::{DrawCommand, Picture};
use crate::engine::{DrawSnapshot, Node, NodeProps};
use crate::geometry::{Point, RRect, Radius, Rect, Size};
use crate::types::{Display, ImageFit, NodeType};

/// Default recording bounds, large enough to never cull a real scene.
pub const DEFAULT_CULL_SIZE: f32 = 2_000_000.0;

/// Walks a laid-out tree and records it into a picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawSerializer {
    cull: Rect,
}

impl Default for DrawSerializer {
    fn default() -> Self {
        Self::new(Size::new(DEFAULT_CULL_SIZE, DEFAULT_CULL_SIZE))
    }
}

impl DrawSerializer {
    pub fn new(cull: Size) -> Self {
        Self {
            cull: Rect::from_size(cull),
        }
    }

    /// Record `root` and its subtree. Layout must already be computed.
    pub fn serialize(&self, root: &Node) -> Picture {
        let mut commands = Vec::new();
        self.visit(root, 1.0, &mut commands);
        tracing::trace!(node = %root.id(), commands = commands.len(), "picture recorded");
        Picture::new(self.cull, commands)
    }

    fn visit(&self, node: &Node, inherited_opacity: f32, out: &mut Vec<DrawCommand>) {
        let snapshot = node.draw_snapshot();
        let Some(node_type) = snapshot.node_type else {
            return;
        };
        if snapshot.display == Display::None {
            return;
        }

        let style = &snapshot.paint;
        let layout = snapshot.layout;
        let opacity = inherited_opacity * style.opacity;

        out.push(DrawCommand::Save);
        out.push(DrawCommand::Translate {
            dx: layout.left,
            dy: layout.top,
        });
        if let Some(matrix) = style.resolved_matrix() {
            if !matrix.is_identity() {
                out.push(DrawCommand::Concat { matrix });
            }
        }
        if let Some((shape, op)) = style.resolved_clip(layout.width, layout.height) {
            out.push(DrawCommand::Clip {
                shape,
                op,
                anti_alias: true,
            });
        }
        if let Some(layer) = &style.layer {
            out.push(DrawCommand::SaveLayer {
                paint: layer.clone(),
            });
        }

        if let Some(command) = own_command(node_type, &snapshot, opacity) {
            out.push(command);
        }

        for child in &snapshot.children {
            self.visit(child, opacity, out);
        }

        if style.layer.is_some() {
            out.push(DrawCommand::Restore);
        }
        out.push(DrawCommand::Restore);
    }
}

/// The command a node draws itself, in local coordinates.
fn own_command(node_type: NodeType, snapshot: &DrawSnapshot, opacity: f32) -> Option<DrawCommand> {
    let paint = snapshot.paint.paint.with_opacity(opacity);
    let bounds = Rect::from_size(snapshot.layout.size());

    let command = match (node_type, &snapshot.props) {
        (NodeType::Group, _) => return None,
        (NodeType::Rect, _) => DrawCommand::DrawRect { rect: bounds, paint },
        (NodeType::Oval, _) => DrawCommand::DrawOval { rect: bounds, paint },
        (NodeType::RRect, props) => {
            let r = match props {
                NodeProps::RRect { r } => *r,
                _ => Radius::default(),
            };
            DrawCommand::DrawRRect {
                rrect: RRect::from_rect_xy(bounds, r.x, r.y),
                paint,
            }
        }
        (NodeType::Text, NodeProps::Text { text, font }) => DrawCommand::DrawText {
            text: text.clone(),
            origin: Point::ZERO,
            font: font.clone(),
            paint,
        },
        (NodeType::Paragraph, NodeProps::Paragraph(paragraph)) => DrawCommand::DrawParagraph {
            paragraph: paragraph.clone(),
            origin: Point::ZERO,
            width: snapshot.layout.width,
        },
        (NodeType::Image, NodeProps::Image { image, fit, sampling }) => {
            let source = Rect::from_xywh(0.0, 0.0, image.width, image.height);
            let (src, dst) = fit_rects(*fit, source, bounds);
            DrawCommand::DrawImage {
                image: image.clone(),
                src,
                dst,
                sampling: *sampling,
                paint,
            }
        }
        (
            NodeType::Path,
            NodeProps::Path {
                path,
                start,
                end,
                stroke,
                fill_type,
            },
        ) => {
            let paint = match stroke {
                Some(stroke) => Paint {
                    mode: PaintMode::Stroke,
                    stroke_width: stroke.width,
                    stroke_miter: stroke.miter_limit,
                    stroke_cap: stroke.cap,
                    stroke_join: stroke.join,
                    ..paint
                },
                None => paint,
            };
            DrawCommand::DrawPath {
                path: path.clone(),
                start: *start,
                end: *end,
                fill_type: *fill_type,
                paint,
            }
        }
        (NodeType::Line, NodeProps::Line { p1, p2 }) => DrawCommand::DrawLine {
            p1: *p1,
            p2: *p2,
            paint,
        },
        // Content types without their props have nothing to draw yet
        _ => return None,
    };
    Some(command)
}

/// Source and destination rects for drawing an image of `src` into `dst`.
pub fn fit_rects(fit: ImageFit, src: Rect, dst: Rect) -> (Rect, Rect) {
    let (sw, sh) = (src.width(), src.height());
    let (dw, dh) = (dst.width(), dst.height());
    if sw <= 0.0 || sh <= 0.0 || dw <= 0.0 || dh <= 0.0 {
        return (src, dst);
    }

    let contain = || {
        let scale = (dw / sw).min(dh / sh);
        Size::new(sw * scale, sh * scale)
    };

    let (source, dest) = match fit {
        ImageFit::Fill => (Size::new(sw, sh), Size::new(dw, dh)),
        ImageFit::Contain => (Size::new(sw, sh), contain()),
        ImageFit::Cover => {
            let source = if sw / sh > dw / dh {
                Size::new(sh * dw / dh, sh)
            } else {
                Size::new(sw, sw * dh / dw)
            };
            (source, Size::new(dw, dh))
        }
        ImageFit::FitHeight => (Size::new(sw, sh), Size::new(sw * dh / sh, dh)),
        ImageFit::FitWidth => (Size::new(sw, sh), Size::new(dw, sh * dw / sw)),
        ImageFit::None => {
            let size = Size::new(sw.min(dw), sh.min(dh));
            (size, size)
        }
        ImageFit::ScaleDown => {
            let dest = if sw > dw || sh > dh {
                contain()
            } else {
                Size::new(sw, sh)
            };
            (Size::new(sw, sh), dest)
        }
    };
    (center_in(source, src), center_in(dest, dst))
}

fn center_in(size: Size, outer: Rect) -> Rect {
    Rect::from_xywh(
        outer.left + (outer.width() - size.width) / 2.0,
        outer.top + (outer.height() - size.height) / 2.0,
        size.width,
        size.height,
    )
}
