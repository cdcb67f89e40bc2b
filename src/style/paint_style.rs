//! Paint-class fields as the draw serializer reads them.

use super::transform::{around_origin, compose_transform, TransformOp};
use crate::geometry::{Matrix, Point, RRect, Radius, Rect};
use crate::renderer::{ClipOp, ClipShape, Paint};

/// Where a node's geometry transform comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TransformSource {
    #[default]
    None,
    /// An explicit `matrix` field.
    Matrix(Matrix),
    /// A `transform` list.
    List(Vec<TransformOp>),
}

/// Paint-class fields of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintStyle {
    /// Base paint: color, stroke parameters, blend mode, flags.
    pub paint: Paint,
    /// Multiplied into the paint alpha at draw time, and inherited by
    /// children.
    pub opacity: f32,
    /// Uniform corner radius from `borderRadius`.
    pub border_radius: Option<f32>,
    /// Per-corner overrides: top-left, top-right, bottom-right, bottom-left.
    pub corner_radii: [Option<Radius>; 4],
    pub clip: Option<ClipShape>,
    pub invert_clip: bool,
    pub transform: TransformSource,
    pub origin: Option<Point>,
    /// Paint of an offscreen layer wrapping the node and its children.
    pub layer: Option<Paint>,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            paint: Paint::default(),
            opacity: 1.0,
            border_radius: None,
            corner_radii: [None; 4],
            clip: None,
            invert_clip: false,
            transform: TransformSource::None,
            origin: None,
            layer: None,
        }
    }
}

impl PaintStyle {
    /// True if any radius field is set.
    pub fn has_radii(&self) -> bool {
        self.border_radius.is_some() || self.corner_radii.iter().any(Option::is_some)
    }

    /// Resolved corner radii, or `None` when no radius field is set.
    pub fn radii(&self) -> Option<[Radius; 4]> {
        if !self.has_radii() {
            return None;
        }
        let base = Radius::uniform(self.border_radius.unwrap_or(0.0));
        Some(self.corner_radii.map(|r| r.unwrap_or(base)))
    }

    /// The clip applied to a node of the given size, in local coordinates.
    ///
    /// Radii clip to the node's own rounded box and take precedence over an
    /// explicit `clip` shape.
    pub fn resolved_clip(&self, width: f32, height: f32) -> Option<(ClipShape, ClipOp)> {
        let op = if self.invert_clip {
            ClipOp::Difference
        } else {
            ClipOp::Intersect
        };
        if let Some(radii) = self.radii() {
            let rect = Rect::from_xywh(0.0, 0.0, width, height);
            return Some((ClipShape::RRect(RRect::new(rect, radii)), op));
        }
        self.clip.clone().map(|shape| (shape, op))
    }

    /// The geometry matrix, with the origin applied.
    pub fn resolved_matrix(&self) -> Option<Matrix> {
        let m = match &self.transform {
            TransformSource::None => return None,
            TransformSource::Matrix(m) => *m,
            TransformSource::List(ops) => compose_transform(ops)?,
        };
        Some(match self.origin {
            Some(origin) => around_origin(&m, origin),
            None => m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radii_override_uniform_per_corner() {
        let style = PaintStyle {
            border_radius: Some(4.0),
            corner_radii: [None, Some(Radius { x: 1.0, y: 2.0 }), None, None],
            ..PaintStyle::default()
        };
        let radii = style.radii().unwrap();
        assert_eq!(radii[0], Radius::uniform(4.0));
        assert_eq!(radii[1], Radius { x: 1.0, y: 2.0 });
    }

    #[test]
    fn test_radii_clip_wins_over_clip_shape() {
        let style = PaintStyle {
            border_radius: Some(8.0),
            clip: Some(ClipShape::Rect(Rect::from_xywh(0.0, 0.0, 1.0, 1.0))),
            invert_clip: true,
            ..PaintStyle::default()
        };
        let (shape, op) = style.resolved_clip(20.0, 10.0).unwrap();
        assert_eq!(op, ClipOp::Difference);
        assert!(matches!(shape, ClipShape::RRect(r) if r.rect == Rect::from_xywh(0.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_no_clip_by_default() {
        assert!(PaintStyle::default().resolved_clip(10.0, 10.0).is_none());
        assert!(PaintStyle::default().resolved_matrix().is_none());
    }

    #[test]
    fn test_matrix_with_origin() {
        let style = PaintStyle {
            transform: TransformSource::List(vec![TransformOp::Scale(2.0)]),
            origin: Some(Point::new(10.0, 10.0)),
            ..PaintStyle::default()
        };
        let m = style.resolved_matrix().unwrap();
        assert_eq!(m.map_point(Point::new(10.0, 10.0)), Point::new(10.0, 10.0));
        assert_eq!(m.map_point(Point::new(11.0, 10.0)), Point::new(12.0, 10.0));
    }
}
