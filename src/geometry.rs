//! Geometry primitives shared by styles, props and pictures.
//!
//! All coordinates are logical points. Rectangles are stored as edges
//! (left/top/right/bottom); matrices are 3x3 in row-major order so a
//! serialized picture reads the same as a canvas API call.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

// =============================================================================
// Point / Size
// =============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Rect
// =============================================================================

/// Axis-aligned rectangle stored by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const EMPTY: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn from_size(size: Size) -> Self {
        Self::from_xywh(0.0, 0.0, size.width, size.height)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        !(self.left < self.right && self.top < self.bottom)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Smallest rect containing both. Empty rects are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Intersection, or `None` if the rects do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!r.is_empty()).then_some(r)
    }

    /// Bounding box of a set of points.
    pub fn bounds_of(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut r = Rect::new(first.x, first.y, first.x, first.y);
        for p in iter {
            r.left = r.left.min(p.x);
            r.top = r.top.min(p.y);
            r.right = r.right.max(p.x);
            r.bottom = r.bottom.max(p.y);
        }
        Some(r)
    }
}

// =============================================================================
// Rounded rect
// =============================================================================

/// Corner radius with independent x and y components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Radius {
    pub x: f32,
    pub y: f32,
}

impl Radius {
    pub const fn uniform(r: f32) -> Self {
        Self { x: r, y: r }
    }

    pub fn is_zero(&self) -> bool {
        self.x <= 0.0 || self.y <= 0.0
    }
}

/// Corner order used by [`RRect::radii`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

/// Rectangle with per-corner elliptical radii.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RRect {
    pub rect: Rect,
    /// Top-left, top-right, bottom-right, bottom-left.
    pub radii: [Radius; 4],
}

impl RRect {
    pub fn new(rect: Rect, radii: [Radius; 4]) -> Self {
        Self { rect, radii }
    }

    pub fn from_rect_xy(rect: Rect, rx: f32, ry: f32) -> Self {
        Self::new(rect, [Radius { x: rx, y: ry }; 4])
    }

    pub fn radius(&self, corner: Corner) -> Radius {
        self.radii[corner as usize]
    }

    pub fn is_rect(&self) -> bool {
        self.radii.iter().all(Radius::is_zero)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.rect.offset(dx, dy), self.radii)
    }
}

// =============================================================================
// Matrix
// =============================================================================

/// 3x3 transform in row-major order:
/// `[scale_x, skew_x, trans_x, skew_y, scale_y, trans_y, persp_0, persp_1, persp_2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix(pub [f32; 9]);

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    pub fn translate(dx: f32, dy: f32) -> Self {
        Self([1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0])
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self([sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0])
    }

    /// Build from a glam matrix (column-major).
    pub fn from_mat3(m: Mat3) -> Self {
        Self(m.transpose().to_cols_array())
    }

    /// Convert to a glam matrix (column-major).
    pub fn to_mat3(&self) -> Mat3 {
        Mat3::from_cols_array(&self.0).transpose()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `self * other`: `other` applies first.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Self::from_mat3(self.to_mat3() * other.to_mat3())
    }

    pub fn invert(&self) -> Option<Matrix> {
        let m = self.to_mat3();
        let det = m.determinant();
        (det.abs() > f32::EPSILON).then(|| Self::from_mat3(m.inverse()))
    }

    pub fn map_point(&self, p: Point) -> Point {
        let v = self.to_mat3() * Vec3::new(p.x, p.y, 1.0);
        if v.z.abs() > f32::EPSILON && v.z != 1.0 {
            Point::new(v.x / v.z, v.y / v.z)
        } else {
            Point::new(v.x, v.y)
        }
    }

    /// Bounds of the four mapped corners.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        let corners = [
            Point::new(r.left, r.top),
            Point::new(r.right, r.top),
            Point::new(r.right, r.bottom),
            Point::new(r.left, r.bottom),
        ];
        Rect::bounds_of(corners.map(|p| self.map_point(p))).unwrap_or(Rect::EMPTY)
    }
}

// =============================================================================
// Path
// =============================================================================

/// A single path verb with its points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathVerb {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// Vector path geometry.
///
/// The path only records verbs; filling, stroking and trimming are left to
/// the canvas that plays the picture back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    pub verbs: Vec<PathVerb>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.verbs.push(PathVerb::MoveTo(Point::new(x, y)));
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.verbs.push(PathVerb::LineTo(Point::new(x, y)));
        self
    }

    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        self.verbs
            .push(PathVerb::QuadTo(Point::new(cx, cy), Point::new(x, y)));
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, to: Point) -> Self {
        self.verbs.push(PathVerb::CubicTo(c1, c2, to));
        self
    }

    pub fn close(mut self) -> Self {
        self.verbs.push(PathVerb::Close);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.verbs.iter().flat_map(|v| {
            let pts: Vec<Point> = match *v {
                PathVerb::MoveTo(p) | PathVerb::LineTo(p) => vec![p],
                PathVerb::QuadTo(c, p) => vec![c, p],
                PathVerb::CubicTo(c1, c2, p) => vec![c1, c2, p],
                PathVerb::Close => Vec::new(),
            };
            pts
        })
    }

    /// Control-point bounds. Empty for a path with no points.
    pub fn bounds(&self) -> Rect {
        Rect::bounds_of(self.points()).unwrap_or(Rect::EMPTY)
    }

    /// Parse SVG path data (`M L H V Q C Z`, absolute and relative).
    ///
    /// # Example
    ///
    /// ```
    /// use flexcanvas::geometry::Path;
    ///
    /// let tri = Path::from_svg("M0 0 L10 0 l0 10 z").unwrap();
    /// assert_eq!(tri.bounds().right, 10.0);
    /// assert!(Path::from_svg("M0 0 X1").is_none());
    /// ```
    pub fn from_svg(data: &str) -> Option<Path> {
        let tokens = tokenize_svg(data)?;
        let mut path = Path::new();
        let mut i = 0;
        let mut cmd = ' ';
        let mut current = Point::ZERO;
        let mut start = Point::ZERO;

        let number = |i: &mut usize| -> Option<f32> {
            match tokens.get(*i)? {
                SvgToken::Number(n) => {
                    *i += 1;
                    Some(*n)
                }
                SvgToken::Command(_) => None,
            }
        };

        while i < tokens.len() {
            if let SvgToken::Command(c) = tokens[i] {
                cmd = c;
                i += 1;
            } else if cmd == ' ' {
                return None;
            }
            let relative = cmd.is_ascii_lowercase();
            let base = if relative { current } else { Point::ZERO };
            match cmd.to_ascii_uppercase() {
                'M' => {
                    let p = Point::new(number(&mut i)? + base.x, number(&mut i)? + base.y);
                    path.verbs.push(PathVerb::MoveTo(p));
                    current = p;
                    start = p;
                    // Subsequent pairs are implicit line-tos
                    cmd = if relative { 'l' } else { 'L' };
                }
                'L' => {
                    let p = Point::new(number(&mut i)? + base.x, number(&mut i)? + base.y);
                    path.verbs.push(PathVerb::LineTo(p));
                    current = p;
                }
                'H' => {
                    let p = Point::new(number(&mut i)? + base.x, current.y);
                    path.verbs.push(PathVerb::LineTo(p));
                    current = p;
                }
                'V' => {
                    let p = Point::new(current.x, number(&mut i)? + base.y);
                    path.verbs.push(PathVerb::LineTo(p));
                    current = p;
                }
                'Q' => {
                    let c = Point::new(number(&mut i)? + base.x, number(&mut i)? + base.y);
                    let p = Point::new(number(&mut i)? + base.x, number(&mut i)? + base.y);
                    path.verbs.push(PathVerb::QuadTo(c, p));
                    current = p;
                }
                'C' => {
                    let c1 = Point::new(number(&mut i)? + base.x, number(&mut i)? + base.y);
                    let c2 = Point::new(number(&mut i)? + base.x, number(&mut i)? + base.y);
                    let p = Point::new(number(&mut i)? + base.x, number(&mut i)? + base.y);
                    path.verbs.push(PathVerb::CubicTo(c1, c2, p));
                    current = p;
                }
                'Z' => {
                    path.verbs.push(PathVerb::Close);
                    current = start;
                    // A command letter must follow a close
                    cmd = ' ';
                }
                _ => return None,
            }
        }
        Some(path)
    }
}

enum SvgToken {
    Command(char),
    Number(f32),
}

fn tokenize_svg(data: &str) -> Option<Vec<SvgToken>> {
    let mut tokens = Vec::new();
    let mut chars = data.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            if !"MLHVQCZmlhvqcz".contains(c) {
                return None;
            }
            tokens.push(SvgToken::Command(c));
            chars.next();
        } else {
            let mut end = start;
            let mut seen_exp = false;
            while let Some(&(idx, ch)) = chars.peek() {
                let sign_ok = (ch == '-' || ch == '+') && (idx == start || seen_exp);
                if ch.is_ascii_digit() || ch == '.' || sign_ok {
                    seen_exp = false;
                } else if ch == 'e' || ch == 'E' {
                    seen_exp = true;
                } else {
                    break;
                }
                end = idx + ch.len_utf8();
                chars.next();
            }
            if end == start {
                return None;
            }
            tokens.push(SvgToken::Number(data[start..end].parse().ok()?));
        }
    }
    Some(tokens)
}
