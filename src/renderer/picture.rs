//! Picture - an immutable, serializable list of drawing commands.
//!
//! A picture is what a draw pass hands to the display surface. It carries
//! no live references into the node tree: every command owns its geometry
//! and paint, so a picture can be replayed, compared or serialized after
//! the tree has moved on.
//!
//! # Coordinate System
//!
//! Commands are recorded in node-local coordinates. `Translate` and
//! `Concat` change the current matrix, `Save`/`SaveLayer` push it and
//! `Restore` pops it, the same way a canvas API does:
//!
//! ```text
//! Save, Translate(left, top), [Concat], [Clip], [SaveLayer],
//!     own command, children..., [Restore], Restore
//! ```
//!
//! [`Picture::flatten`] resolves that stack and reports every drawing in
//! device coordinates.

use serde::Serialize;

use super::paint::{ClipOp, ClipShape, Paint};
use crate::engine::{Font, ImageSource};
use crate::geometry::{Matrix, Path, Point, RRect, Rect};
use crate::layout::ParagraphHandle;
use crate::types::{FillType, Sampling};

// =============================================================================
// Commands
// =============================================================================

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawCommand {
    Save,
    Restore,
    Translate {
        dx: f32,
        dy: f32,
    },
    Concat {
        matrix: Matrix,
    },
    Clip {
        shape: ClipShape,
        #[serde(rename = "clipOp")]
        op: ClipOp,
        anti_alias: bool,
    },
    /// Offscreen layer composited with `paint` on the matching `Restore`.
    SaveLayer {
        paint: Paint,
    },
    DrawRect {
        rect: Rect,
        paint: Paint,
    },
    DrawRRect {
        rrect: RRect,
        paint: Paint,
    },
    DrawOval {
        rect: Rect,
        paint: Paint,
    },
    DrawText {
        text: String,
        origin: Point,
        font: Font,
        paint: Paint,
    },
    DrawParagraph {
        paragraph: ParagraphHandle,
        origin: Point,
        width: f32,
    },
    DrawImage {
        image: ImageSource,
        src: Rect,
        dst: Rect,
        sampling: Sampling,
        paint: Paint,
    },
    /// Path trimmed to `start..end` of its length before painting.
    DrawPath {
        path: Path,
        start: f32,
        end: f32,
        fill_type: FillType,
        paint: Paint,
    },
    DrawLine {
        p1: Point,
        p2: Point,
        paint: Paint,
    },
}

impl DrawCommand {
    /// True for commands that put pixels on the canvas.
    pub fn is_drawing(&self) -> bool {
        !matches!(
            self,
            Self::Save
                | Self::Restore
                | Self::Translate { .. }
                | Self::Concat { .. }
                | Self::Clip { .. }
                | Self::SaveLayer { .. }
        )
    }

    /// Paint of a drawing command. Paragraphs carry their own styling.
    pub fn paint(&self) -> Option<&Paint> {
        match self {
            Self::DrawRect { paint, .. }
            | Self::DrawRRect { paint, .. }
            | Self::DrawOval { paint, .. }
            | Self::DrawText { paint, .. }
            | Self::DrawImage { paint, .. }
            | Self::DrawPath { paint, .. }
            | Self::DrawLine { paint, .. } => Some(paint),
            _ => None,
        }
    }

    /// Local bounds of a drawing command.
    ///
    /// Text bounds are estimated from the font size; the picture never
    /// shapes text itself.
    pub fn local_bounds(&self) -> Option<Rect> {
        let bounds = match self {
            Self::DrawRect { rect, .. } | Self::DrawOval { rect, .. } => *rect,
            Self::DrawRRect { rrect, .. } => rrect.rect,
            Self::DrawText { text, origin, font, .. } => Rect::from_xywh(
                origin.x,
                origin.y,
                text.chars().count() as f32 * font.size * 0.6,
                font.size * 1.2,
            ),
            Self::DrawParagraph { paragraph, origin, width } => {
                let size = paragraph.measure(Some(*width));
                Rect::from_xywh(origin.x, origin.y, size.width, size.height)
            }
            Self::DrawImage { dst, .. } => *dst,
            Self::DrawPath { path, .. } => path.bounds(),
            Self::DrawLine { p1, p2, .. } => Rect::bounds_of([*p1, *p2])?,
            _ => return None,
        };
        Some(bounds)
    }
}

// =============================================================================
// Canvas
// =============================================================================

/// A drawing surface a picture can be replayed onto.
///
/// The state calls mirror the command list; every drawing command goes
/// through [`Canvas::draw`].
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn concat(&mut self, matrix: &Matrix);
    fn clip(&mut self, shape: &ClipShape, op: ClipOp, anti_alias: bool);
    fn save_layer(&mut self, paint: &Paint);
    fn draw(&mut self, command: &DrawCommand);
}

// =============================================================================
// Picture
// =============================================================================

/// A drawing resolved to device space by [`Picture::flatten`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDraw {
    /// Index of the command in [`Picture::commands`].
    pub index: usize,
    /// Local bounds mapped through the current matrix.
    pub bounds: Rect,
    pub matrix: Matrix,
    pub command: DrawCommand,
}

/// Immutable snapshot of one draw pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Picture {
    cull: Rect,
    commands: Vec<DrawCommand>,
}

impl Picture {
    pub fn new(cull: Rect, commands: Vec<DrawCommand>) -> Self {
        Self { cull, commands }
    }

    /// A picture with no commands.
    pub fn empty(cull: Rect) -> Self {
        Self::new(cull, Vec::new())
    }

    /// Recording bounds.
    pub fn cull_rect(&self) -> Rect {
        self.cull
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of commands that put pixels on the canvas.
    pub fn drawing_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_drawing()).count()
    }

    /// Replay every command onto `canvas`, in order.
    pub fn playback(&self, canvas: &mut dyn Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Save => canvas.save(),
                DrawCommand::Restore => canvas.restore(),
                DrawCommand::Translate { dx, dy } => canvas.translate(*dx, *dy),
                DrawCommand::Concat { matrix } => canvas.concat(matrix),
                DrawCommand::Clip { shape, op, anti_alias } => canvas.clip(shape, *op, *anti_alias),
                DrawCommand::SaveLayer { paint } => canvas.save_layer(paint),
                _ => canvas.draw(command),
            }
        }
    }

    /// Every drawing command with its device-space bounds.
    pub fn flatten(&self) -> Vec<FlatDraw> {
        let mut flattener = Flattener::default();
        self.playback(&mut flattener);
        flattener.draws
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Canvas that only tracks the matrix stack.
struct Flattener {
    matrix: Matrix,
    stack: Vec<Matrix>,
    next_index: usize,
    draws: Vec<FlatDraw>,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            stack: Vec::new(),
            next_index: 0,
            draws: Vec::new(),
        }
    }
}

impl Flattener {
    fn step(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }
}

impl Canvas for Flattener {
    fn save(&mut self) {
        self.step();
        self.stack.push(self.matrix);
    }

    fn restore(&mut self) {
        self.step();
        // Unbalanced restores are ignored, as a canvas would
        if let Some(matrix) = self.stack.pop() {
            self.matrix = matrix;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.step();
        self.matrix = self.matrix.concat(&Matrix::translate(dx, dy));
    }

    fn concat(&mut self, matrix: &Matrix) {
        self.step();
        self.matrix = self.matrix.concat(matrix);
    }

    fn clip(&mut self, _shape: &ClipShape, _op: ClipOp, _anti_alias: bool) {
        self.step();
    }

    fn save_layer(&mut self, _paint: &Paint) {
        self.step();
        self.stack.push(self.matrix);
    }

    fn draw(&mut self, command: &DrawCommand) {
        let index = self.step();
        let bounds = command
            .local_bounds()
            .map(|b| self.matrix.map_rect(&b))
            .unwrap_or(Rect::EMPTY);
        self.draws.push(FlatDraw {
            index,
            bounds,
            matrix: self.matrix,
            command: command.clone(),
        });
    }
}
