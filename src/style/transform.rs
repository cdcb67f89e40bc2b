//! Transform lists.
//!
//! Operations are composed on a 4x4 matrix in list order (each one
//! pre-concatenated, so the last operation applies to points first) and then
//! collapsed to the 3x3 matrix recorded in pictures. Angles are radians.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::{Matrix, Point};

/// A single named transform operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformOp {
    RotateX(f32),
    RotateY(f32),
    RotateZ(f32),
    Scale(f32),
    ScaleX(f32),
    ScaleY(f32),
    TranslateX(f32),
    TranslateY(f32),
    SkewX(f32),
    SkewY(f32),
}

impl TransformOp {
    /// Build an operation from its style name.
    pub fn from_name(name: &str, amount: f32) -> Option<Self> {
        let op = match name {
            "rotateX" => Self::RotateX(amount),
            "rotateY" => Self::RotateY(amount),
            "rotateZ" | "rotate" => Self::RotateZ(amount),
            "scale" => Self::Scale(amount),
            "scaleX" => Self::ScaleX(amount),
            "scaleY" => Self::ScaleY(amount),
            "translateX" => Self::TranslateX(amount),
            "translateY" => Self::TranslateY(amount),
            "skewX" => Self::SkewX(amount),
            "skewY" => Self::SkewY(amount),
            _ => return None,
        };
        Some(op)
    }

    fn to_mat4(self) -> Mat4 {
        match self {
            Self::RotateX(a) => Mat4::from_rotation_x(a),
            Self::RotateY(a) => Mat4::from_rotation_y(a),
            Self::RotateZ(a) => Mat4::from_rotation_z(a),
            Self::Scale(s) => Mat4::from_scale(Vec3::new(s, s, 1.0)),
            Self::ScaleX(s) => Mat4::from_scale(Vec3::new(s, 1.0, 1.0)),
            Self::ScaleY(s) => Mat4::from_scale(Vec3::new(1.0, s, 1.0)),
            Self::TranslateX(t) => Mat4::from_translation(Vec3::new(t, 0.0, 0.0)),
            Self::TranslateY(t) => Mat4::from_translation(Vec3::new(0.0, t, 0.0)),
            // x' = x + tan(a) * y
            Self::SkewX(a) => {
                let mut m = Mat4::IDENTITY;
                m.y_axis.x = a.tan();
                m
            }
            // y' = y + tan(a) * x
            Self::SkewY(a) => {
                let mut m = Mat4::IDENTITY;
                m.x_axis.y = a.tan();
                m
            }
        }
    }
}

/// Drop the z row and column of a 4x4 matrix, keeping perspective terms.
fn collapse(m: Mat4) -> Matrix {
    const AXES: [usize; 3] = [0, 1, 3];
    let mut out = [0.0f32; 9];
    for (r, &row) in AXES.iter().enumerate() {
        for (c, &col) in AXES.iter().enumerate() {
            out[r * 3 + c] = m.col(col)[row];
        }
    }
    Matrix(out)
}

/// Compose a transform list. Returns `None` for an empty list.
///
/// # Example
///
/// ```
/// use flexcanvas::geometry::Point;
/// use flexcanvas::style::{compose_transform, TransformOp};
///
/// let m = compose_transform(&[TransformOp::TranslateX(10.0), TransformOp::Scale(2.0)]).unwrap();
/// assert_eq!(m.map_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
/// ```
pub fn compose_transform(ops: &[TransformOp]) -> Option<Matrix> {
    if ops.is_empty() {
        return None;
    }
    let m = ops
        .iter()
        .fold(Mat4::IDENTITY, |acc, op| acc * op.to_mat4());
    Some(collapse(m))
}

/// Apply `m` around `origin`: translate(origin) * m * translate(-origin).
pub fn around_origin(m: &Matrix, origin: Point) -> Matrix {
    Matrix::translate(origin.x, origin.y)
        .concat(m)
        .concat(&Matrix::translate(-origin.x, -origin.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_empty_list_has_no_matrix() {
        assert_eq!(compose_transform(&[]), None);
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let m = compose_transform(&[TransformOp::RotateZ(FRAC_PI_2)]).unwrap();
        assert!(approx(m.map_point(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
    }

    #[test]
    fn test_list_order_last_applies_first() {
        let m = compose_transform(&[TransformOp::Scale(2.0), TransformOp::TranslateX(5.0)]).unwrap();
        assert!(approx(m.map_point(Point::ZERO), Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_skews() {
        let quarter = std::f32::consts::FRAC_PI_4;
        let sx = compose_transform(&[TransformOp::SkewX(quarter)]).unwrap();
        assert!(approx(sx.map_point(Point::new(0.0, 2.0)), Point::new(2.0, 2.0)));
        let sy = compose_transform(&[TransformOp::SkewY(quarter)]).unwrap();
        assert!(approx(sy.map_point(Point::new(3.0, 0.0)), Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_rotate_x_collapses_to_vertical_squash() {
        let m = compose_transform(&[TransformOp::RotateX(FRAC_PI_2 / 1.5)]).unwrap();
        let p = m.map_point(Point::new(4.0, 10.0));
        assert!((p.x - 4.0).abs() < 1e-4);
        assert!((p.y - 10.0 * (FRAC_PI_2 / 1.5).cos()).abs() < 1e-4);
    }

    #[test]
    fn test_around_origin_keeps_origin_fixed() {
        let rot = compose_transform(&[TransformOp::RotateZ(1.0)]).unwrap();
        let origin = Point::new(50.0, 25.0);
        let m = around_origin(&rot, origin);
        assert!(approx(m.map_point(origin), origin));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TransformOp::from_name("translateY", 3.0), Some(TransformOp::TranslateY(3.0)));
        assert_eq!(TransformOp::from_name("perspective", 3.0), None);
    }
}
