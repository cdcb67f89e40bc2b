//! Box-model and flex fields as the layout adapter reads them.

use crate::types::{
    Align, BoxSizing, Dimension, Direction, Display, FlexDirection, FlexWrap, JustifyContent,
    Overflow, Position,
};

// =============================================================================
// Edges
// =============================================================================

/// Per-edge values as written in a style sheet, before shorthand resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges<T> {
    pub all: Option<T>,
    pub horizontal: Option<T>,
    pub vertical: Option<T>,
    pub left: Option<T>,
    pub right: Option<T>,
    pub top: Option<T>,
    pub bottom: Option<T>,
    pub start: Option<T>,
    pub end: Option<T>,
}

/// Physical edges after shorthand resolution. `None` means "not set".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedEdges<T> {
    pub left: Option<T>,
    pub right: Option<T>,
    pub top: Option<T>,
    pub bottom: Option<T>,
}

impl<T: Copy> Edges<T> {
    /// Resolve shorthands into physical edges.
    ///
    /// Precedence, most specific first: start/end (mapped through the
    /// layout direction), the physical edge, horizontal/vertical, all.
    pub fn resolve(&self, rtl: bool) -> ResolvedEdges<T> {
        let (leading, trailing) = if rtl {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        };
        ResolvedEdges {
            left: leading.or(self.left).or(self.horizontal).or(self.all),
            right: trailing.or(self.right).or(self.horizontal).or(self.all),
            top: self.top.or(self.vertical).or(self.all),
            bottom: self.bottom.or(self.vertical).or(self.all),
        }
    }
}

// =============================================================================
// LayoutStyle
// =============================================================================

/// Layout-class fields of a node.
///
/// Defaults follow the Yoga model rather than CSS: column direction,
/// `flexShrink` 0, `alignContent` flex-start.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    pub display: Display,
    pub direction: Direction,
    pub position: Position,
    pub overflow: Overflow,
    pub box_sizing: BoxSizing,

    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: Align,
    pub align_self: Align,
    pub align_content: Align,

    pub flex: Option<f32>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Dimension,

    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub aspect_ratio: Option<f32>,

    pub margin: Edges<Dimension>,
    pub padding: Edges<Dimension>,
    pub border: Edges<f32>,
    pub inset: Edges<Dimension>,

    pub gap: Option<f32>,
    pub row_gap: Option<f32>,
    pub column_gap: Option<f32>,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            display: Display::Flex,
            direction: Direction::Inherit,
            position: Position::Relative,
            overflow: Overflow::Visible,
            box_sizing: BoxSizing::BorderBox,
            flex_direction: FlexDirection::Column,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            align_content: Align::FlexStart,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Dimension::Auto,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            aspect_ratio: None,
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            inset: Edges::default(),
            gap: None,
            row_gap: None,
            column_gap: None,
        }
    }
}

impl LayoutStyle {
    /// Grow factor: explicit `flexGrow`, else a positive `flex`, else 0.
    pub fn effective_flex_grow(&self) -> f32 {
        self.flex_grow
            .or(self.flex.filter(|f| *f > 0.0))
            .unwrap_or(0.0)
    }

    /// Shrink factor: explicit `flexShrink`, else `-flex` for a negative
    /// `flex`, else 0.
    pub fn effective_flex_shrink(&self) -> f32 {
        self.flex_shrink
            .or(self.flex.filter(|f| *f < 0.0).map(|f| -f))
            .unwrap_or(0.0)
    }

    /// Basis: explicit non-auto `flexBasis`, else 0 when `flex` is positive,
    /// else auto.
    pub fn effective_flex_basis(&self) -> Dimension {
        if !self.flex_basis.is_auto() {
            return self.flex_basis;
        }
        match self.flex {
            Some(f) if f > 0.0 => Dimension::Points(0.0),
            _ => Dimension::Auto,
        }
    }

    /// Gap between rows and between columns.
    pub fn effective_gaps(&self) -> (f32, f32) {
        let row = self.row_gap.or(self.gap).unwrap_or(0.0);
        let column = self.column_gap.or(self.gap).unwrap_or(0.0);
        (row, column)
    }
}
