//! Style values and style sheets.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use super::animated::AnimatedValue;
use super::key::StyleKey;
use super::transform::TransformOp;
use crate::error::StyleError;
use crate::geometry::{Matrix, Point};
use crate::renderer::{ClipShape, Paint};
use crate::types::Rgba;

// =============================================================================
// StyleValue
// =============================================================================

/// A plain (non-animated) style value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Number(f32),
    /// Keywords, `"auto"`, `"50%"` and CSS colors.
    String(String),
    Bool(bool),
    Point(Point),
    Color(Rgba),
    Transform(Vec<TransformOp>),
    Matrix(Matrix),
    Clip(ClipShape),
    Paint(Paint),
}

impl StyleValue {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Point(_) => "point",
            Self::Color(_) => "color",
            Self::Transform(_) => "transform list",
            Self::Matrix(_) => "matrix",
            Self::Clip(_) => "clip shape",
            Self::Paint(_) => "paint",
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value as produced by a declarative front end.
    ///
    /// Numbers, strings and booleans map directly; `{x, y}` objects become
    /// points; an array of nine numbers is a matrix; an array of single-key
    /// objects (`[{"rotateZ": 0.5}]`) is a transform list.
    pub fn from_json(key: StyleKey, value: &Json) -> Result<Self, StyleError> {
        let invalid = |expected: &'static str| StyleError::InvalidValue {
            key: key.name(),
            expected,
            found: value.to_string(),
        };

        match value {
            Json::Number(n) => n
                .as_f64()
                .map(|n| Self::Number(n as f32))
                .ok_or_else(|| invalid("a finite number")),
            Json::String(s) => Ok(Self::String(s.clone())),
            Json::Bool(b) => Ok(Self::Bool(*b)),
            Json::Object(map) => {
                let x = map.get("x").and_then(Json::as_f64);
                let y = map.get("y").and_then(Json::as_f64);
                match (x, y) {
                    (Some(x), Some(y)) => Ok(Self::Point(Point::new(x as f32, y as f32))),
                    _ => Err(invalid("a point {x, y}")),
                }
            }
            Json::Array(items) if items.len() == 9 && items.iter().all(Json::is_number) => {
                let mut m = [0.0f32; 9];
                for (slot, item) in m.iter_mut().zip(items) {
                    *slot = item.as_f64().unwrap_or_default() as f32;
                }
                Ok(Self::Matrix(Matrix(m)))
            }
            Json::Array(items) => items
                .iter()
                .map(|item| {
                    let obj = item.as_object().filter(|o| o.len() == 1);
                    let (name, amount) = obj
                        .and_then(|o| o.iter().next())
                        .ok_or_else(|| invalid("a transform list"))?;
                    let amount = amount.as_f64().ok_or_else(|| invalid("a transform list"))?;
                    TransformOp::from_name(name, amount as f32)
                        .ok_or_else(|| invalid("a transform list"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Transform),
            Json::Null => Err(invalid("a value")),
        }
    }
}

impl From<f32> for StyleValue {
    fn from(v: f32) -> Self {
        Self::Number(v)
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        Self::Number(v as f32)
    }
}

impl From<i32> for StyleValue {
    fn from(v: i32) -> Self {
        Self::Number(v as f32)
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for StyleValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Point> for StyleValue {
    fn from(v: Point) -> Self {
        Self::Point(v)
    }
}

impl From<Rgba> for StyleValue {
    fn from(v: Rgba) -> Self {
        Self::Color(v)
    }
}

impl From<Vec<TransformOp>> for StyleValue {
    fn from(v: Vec<TransformOp>) -> Self {
        Self::Transform(v)
    }
}

impl From<Matrix> for StyleValue {
    fn from(v: Matrix) -> Self {
        Self::Matrix(v)
    }
}

impl From<ClipShape> for StyleValue {
    fn from(v: ClipShape) -> Self {
        Self::Clip(v)
    }
}

impl From<Paint> for StyleValue {
    fn from(v: Paint) -> Self {
        Self::Paint(v)
    }
}

// =============================================================================
// StyleInput / StyleSheet
// =============================================================================

/// One incoming style field.
#[derive(Clone)]
pub enum StyleInput {
    /// A plain value, applied once.
    Value(StyleValue),
    /// A live value: its snapshot is applied now and a listener keeps the
    /// field in sync afterwards.
    Animated(Arc<dyn AnimatedValue>),
    /// Reset the field to its default.
    Unset,
}

impl fmt::Debug for StyleInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Animated(a) => f.debug_tuple("Animated").field(&a.snapshot()).finish(),
            Self::Unset => f.write_str("Unset"),
        }
    }
}

impl PartialEq for StyleInput {
    /// Animated inputs are equal when they share the same source.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Animated(a), Self::Animated(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Self::Unset, Self::Unset) => true,
            _ => false,
        }
    }
}

/// An ordered set of style fields, merged into a node by `set_style`.
///
/// Setting a key twice keeps its first position and the last value.
///
/// # Example
///
/// ```
/// use flexcanvas::style::{StyleKey, StyleSheet};
///
/// let sheet = StyleSheet::new()
///     .with(StyleKey::Flex, 1)
///     .with(StyleKey::BackgroundColor, "red");
/// assert_eq!(sheet.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    entries: Vec<(StyleKey, StyleInput)>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier entry for the same key.
    pub fn insert(&mut self, key: StyleKey, input: StyleInput) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = input,
            None => self.entries.push((key, input)),
        }
    }

    pub fn set(&mut self, key: StyleKey, value: impl Into<StyleValue>) {
        self.insert(key, StyleInput::Value(value.into()));
    }

    /// Builder form of [`StyleSheet::set`].
    pub fn with(mut self, key: StyleKey, value: impl Into<StyleValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form for an animated field.
    pub fn animated(mut self, key: StyleKey, source: Arc<dyn AnimatedValue>) -> Self {
        self.insert(key, StyleInput::Animated(source));
        self
    }

    /// Builder form for a reset field.
    pub fn unset(mut self, key: StyleKey) -> Self {
        self.insert(key, StyleInput::Unset);
        self
    }

    pub fn get(&self, key: StyleKey) -> Option<&StyleInput> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: StyleKey) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = StyleKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleKey, &StyleInput)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any entry is a layout-class field.
    pub fn touches_layout(&self) -> bool {
        self.keys().any(|k| k.is_layout())
    }

    /// Build a sheet from a JSON object keyed by camelCase style names.
    ///
    /// A `null` value resets the field.
    pub fn from_json(value: &Json) -> Result<Self, StyleError> {
        let Some(map) = value.as_object() else {
            return Err(StyleError::InvalidValue {
                key: "style",
                expected: "an object",
                found: value.to_string(),
            });
        };
        let mut sheet = Self::new();
        for (name, v) in map {
            let key: StyleKey = name.parse()?;
            let input = match v {
                Json::Null => StyleInput::Unset,
                v => StyleInput::Value(StyleValue::from_json(key, v)?),
            };
            sheet.insert(key, input);
        }
        Ok(sheet)
    }
}

impl FromIterator<(StyleKey, StyleInput)> for StyleSheet {
    fn from_iter<I: IntoIterator<Item = (StyleKey, StyleInput)>>(iter: I) -> Self {
        let mut sheet = Self::new();
        for (k, v) in iter {
            sheet.insert(k, v);
        }
        sheet
    }
}
