//! Paint and clip descriptions recorded into pictures.

use serde::{Deserialize, Serialize};

use crate::geometry::{Path, RRect, Rect};
use crate::types::{BlendMode, Rgba, StrokeCap, StrokeJoin};

/// Whether a shape is filled or stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaintMode {
    #[default]
    Fill,
    Stroke,
    StrokeAndFill,
}

/// How a node's shape is painted.
///
/// Defaults match a fresh canvas paint: opaque black fill, hairline
/// stroke width, miter limit 4, anti-aliasing on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub color: Rgba,
    pub mode: PaintMode,
    pub stroke_width: f32,
    pub stroke_cap: StrokeCap,
    pub stroke_join: StrokeJoin,
    pub stroke_miter: f32,
    pub anti_alias: bool,
    pub dither: bool,
    pub blend_mode: BlendMode,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            mode: PaintMode::Fill,
            stroke_width: 0.0,
            stroke_cap: StrokeCap::Butt,
            stroke_join: StrokeJoin::Miter,
            stroke_miter: 4.0,
            anti_alias: true,
            dither: false,
            blend_mode: BlendMode::SrcOver,
        }
    }
}

impl Paint {
    /// A fill paint of the given color.
    pub fn fill(color: Rgba) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// A stroke paint of the given color and width.
    pub fn stroke(color: Rgba, width: f32) -> Self {
        Self {
            color,
            mode: PaintMode::Stroke,
            stroke_width: width,
            ..Self::default()
        }
    }

    /// Copy with the alpha channel multiplied by `opacity`.
    pub fn with_opacity(&self, opacity: f32) -> Self {
        if opacity >= 1.0 {
            return self.clone();
        }
        Self {
            color: self.color.with_opacity(opacity),
            ..self.clone()
        }
    }
}

/// A clip region in the node's local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipShape {
    Rect(Rect),
    RRect(RRect),
    Path(Path),
}

/// Clip combination mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClipOp {
    #[default]
    Intersect,
    Difference,
}
