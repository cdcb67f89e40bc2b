//! Taffy Bridge - Integration with Taffy layout engine
//!
//! Converts layout styles to Taffy styles, runs layout computation over a
//! [`LayoutTree`] snapshot, and extracts the results as [`LayoutBox`]es.
//!
//! Taffy implements CSS flexbox. The Yoga defaults that differ (column
//! direction, no shrinking, `flex` shorthand) are already resolved in
//! [`LayoutStyle`]; the root is sized here: an `auto` root fills the
//! constraints minus its margins.

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems, AvailableSpace,
    BoxSizing as TaffyBoxSizing, Dimension as TaffyDimension, Display as TaffyDisplay,
    FlexDirection as TaffyFlexDirection, FlexWrap as TaffyFlexWrap,
    JustifyContent as TaffyJustifyContent, LengthPercentage, LengthPercentageAuto, NodeId,
    Overflow as TaffyOverflow, Position as TaffyPosition, Rect as TaffyRect, Size as TaffySize,
    Style, TaffyTree,
};

use crate::error::LayoutError;
use crate::geometry::Size;
use crate::style::{LayoutStyle, ResolvedEdges};
use crate::types::{
    Align, BoxSizing, Dimension, Display, FlexDirection, FlexWrap, JustifyContent, Overflow,
    Position,
};

use super::text::ParagraphHandle;
use super::types::{ComputedLayout, Constraints, LayoutBox, LayoutEngine, LayoutTree};

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

/// Convert our Dimension to Taffy's Dimension.
fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Points(n) => TaffyDimension::Length(n),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

/// Convert our Dimension to Taffy's LengthPercentageAuto.
fn to_taffy_lpa(dim: Dimension) -> LengthPercentageAuto {
    match dim {
        Dimension::Auto => LengthPercentageAuto::Auto,
        Dimension::Points(n) => LengthPercentageAuto::Length(n),
        Dimension::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
    }
}

/// Convert our Dimension to Taffy's LengthPercentage. Auto has no meaning
/// for padding and collapses to zero.
fn to_taffy_lp(dim: Dimension) -> LengthPercentage {
    match dim {
        Dimension::Auto => LengthPercentage::Length(0.0),
        Dimension::Points(n) => LengthPercentage::Length(n),
        Dimension::Percent(p) => LengthPercentage::Percent(p / 100.0),
    }
}

fn edges<T: Copy, U>(
    resolved: ResolvedEdges<T>,
    unset: U,
    convert: impl Fn(T) -> U,
) -> TaffyRect<U>
where
    U: Copy,
{
    let side = |v: Option<T>| v.map(&convert).unwrap_or(unset);
    TaffyRect {
        left: side(resolved.left),
        right: side(resolved.right),
        top: side(resolved.top),
        bottom: side(resolved.bottom),
    }
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_display(display: Display) -> TaffyDisplay {
    match display {
        Display::None => TaffyDisplay::None,
        // Taffy has no contents mode; the node keeps its own box
        Display::Flex | Display::Contents => TaffyDisplay::Flex,
    }
}

fn to_taffy_position(position: Position) -> TaffyPosition {
    match position {
        Position::Absolute => TaffyPosition::Absolute,
        Position::Relative | Position::Static => TaffyPosition::Relative,
    }
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

fn to_taffy_box_sizing(box_sizing: BoxSizing) -> TaffyBoxSizing {
    match box_sizing {
        BoxSizing::BorderBox => TaffyBoxSizing::BorderBox,
        BoxSizing::ContentBox => TaffyBoxSizing::ContentBox,
    }
}

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: JustifyContent) -> Option<TaffyJustifyContent> {
    Some(match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

/// alignItems / alignSelf. Distribution keywords have no item meaning and
/// fall back to the parent's alignment.
fn to_taffy_align_items(align: Align) -> Option<TaffyAlignItems> {
    match align {
        Align::Stretch => Some(TaffyAlignItems::Stretch),
        Align::FlexStart => Some(TaffyAlignItems::FlexStart),
        Align::Center => Some(TaffyAlignItems::Center),
        Align::FlexEnd => Some(TaffyAlignItems::FlexEnd),
        Align::Baseline => Some(TaffyAlignItems::Baseline),
        Align::Auto | Align::SpaceBetween | Align::SpaceAround | Align::SpaceEvenly => None,
    }
}

fn to_taffy_align_content(align: Align) -> Option<TaffyAlignContent> {
    match align {
        Align::Stretch => Some(TaffyAlignContent::Stretch),
        Align::FlexStart => Some(TaffyAlignContent::FlexStart),
        Align::Center => Some(TaffyAlignContent::Center),
        Align::FlexEnd => Some(TaffyAlignContent::FlexEnd),
        Align::SpaceBetween => Some(TaffyAlignContent::SpaceBetween),
        Align::SpaceAround => Some(TaffyAlignContent::SpaceAround),
        Align::SpaceEvenly => Some(TaffyAlignContent::SpaceEvenly),
        Align::Auto | Align::Baseline => None,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a Taffy Style from a layout style.
fn build_style(node: &LayoutStyle, rtl: bool) -> Style {
    let (row_gap, column_gap) = node.effective_gaps();
    let overflow = to_taffy_overflow(node.overflow);

    Style {
        display: to_taffy_display(node.display),
        position: to_taffy_position(node.position),
        box_sizing: to_taffy_box_sizing(node.box_sizing),
        overflow: taffy::Point {
            x: overflow,
            y: overflow,
        },

        // Flex container properties
        flex_direction: to_taffy_flex_direction(node.flex_direction),
        flex_wrap: to_taffy_flex_wrap(node.flex_wrap),
        justify_content: to_taffy_justify_content(node.justify_content),
        align_items: to_taffy_align_items(node.align_items),
        align_content: to_taffy_align_content(node.align_content),
        gap: TaffySize {
            width: LengthPercentage::Length(column_gap),
            height: LengthPercentage::Length(row_gap),
        },

        // Flex item properties
        flex_grow: node.effective_flex_grow(),
        flex_shrink: node.effective_flex_shrink(),
        flex_basis: to_taffy_dimension(node.effective_flex_basis()),
        align_self: to_taffy_align_items(node.align_self),

        // Dimensions
        size: TaffySize {
            width: to_taffy_dimension(node.width),
            height: to_taffy_dimension(node.height),
        },
        min_size: TaffySize {
            width: to_taffy_dimension(node.min_width),
            height: to_taffy_dimension(node.min_height),
        },
        max_size: TaffySize {
            width: to_taffy_dimension(node.max_width),
            height: to_taffy_dimension(node.max_height),
        },
        aspect_ratio: node.aspect_ratio,

        // Box model
        margin: edges(node.margin.resolve(rtl), LengthPercentageAuto::Length(0.0), to_taffy_lpa),
        padding: edges(node.padding.resolve(rtl), LengthPercentage::Length(0.0), to_taffy_lp),
        border: edges(node.border.resolve(rtl), LengthPercentage::Length(0.0), |w| {
            LengthPercentage::Length(w)
        }),
        inset: edges(node.inset.resolve(rtl), LengthPercentageAuto::Auto, to_taffy_lpa),

        ..Default::default()
    }
}

/// Resolved root margins: the root is placed by this module, not by Taffy.
fn root_margins(node: &LayoutStyle, rtl: bool, constraints: Constraints) -> TaffyRect<f32> {
    let margin = node.margin.resolve(rtl);
    let reference = constraints.width.unwrap_or(0.0);
    let side = |d: Option<Dimension>| d.and_then(|d| d.resolve(reference)).unwrap_or(0.0);
    TaffyRect {
        left: side(margin.left),
        right: side(margin.right),
        top: side(margin.top),
        bottom: side(margin.bottom),
    }
}

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

/// Measure function for paragraph leaves.
fn measure_paragraph(
    paragraph: &ParagraphHandle,
    known_dimensions: TaffySize<Option<f32>>,
    available_space: TaffySize<AvailableSpace>,
) -> TaffySize<f32> {
    if let (Some(width), Some(height)) = (known_dimensions.width, known_dimensions.height) {
        return TaffySize { width, height };
    }

    let max_width = known_dimensions.width.or(match available_space.width {
        AvailableSpace::Definite(w) => Some(w),
        AvailableSpace::MinContent => Some(0.0),
        AvailableSpace::MaxContent => None,
    });
    let measured = paragraph.measure(max_width);

    TaffySize {
        width: known_dimensions.width.unwrap_or(measured.width),
        height: known_dimensions.height.unwrap_or(measured.height),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

fn engine_error(err: taffy::TaffyError) -> LayoutError {
    LayoutError::Engine(err.to_string())
}

/// The flexbox layout engine backed by Taffy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaffyLayoutEngine;

impl LayoutEngine for TaffyLayoutEngine {
    fn compute(
        &self,
        tree: &LayoutTree,
        constraints: Constraints,
    ) -> Result<ComputedLayout, LayoutError> {
        let Some(root) = tree.get(0) else {
            return Err(LayoutError::EmptyTree);
        };

        let mut taffy: TaffyTree<usize> = TaffyTree::with_capacity(tree.len());

        // First pass: Create all nodes (without children)
        let margins = root_margins(&root.style, root.rtl, constraints);
        let mut ids: Vec<NodeId> = Vec::with_capacity(tree.len());
        for (idx, node) in tree.nodes().iter().enumerate() {
            let mut style = build_style(&node.style, node.rtl);

            if idx == 0 {
                style.margin = TaffyRect {
                    left: LengthPercentageAuto::Length(0.0),
                    right: LengthPercentageAuto::Length(0.0),
                    top: LengthPercentageAuto::Length(0.0),
                    bottom: LengthPercentageAuto::Length(0.0),
                };
                if let (Some(w), TaffyDimension::Auto) = (constraints.width, style.size.width) {
                    style.size.width = TaffyDimension::Length((w - margins.left - margins.right).max(0.0));
                }
                if let (Some(h), TaffyDimension::Auto) = (constraints.height, style.size.height) {
                    style.size.height = TaffyDimension::Length((h - margins.top - margins.bottom).max(0.0));
                }
            }

            let node_id = if node.measure.is_some() {
                taffy.new_leaf_with_context(style, idx)
            } else {
                taffy.new_leaf(style)
            }
            .map_err(engine_error)?;
            ids.push(node_id);
        }

        // Second pass: Build parent-child relationships
        for (idx, node) in tree.nodes().iter().enumerate() {
            for &child in &node.children {
                let child_id = ids.get(child).copied().ok_or_else(|| {
                    LayoutError::Engine(format!("node {idx} references missing child {child}"))
                })?;
                taffy.add_child(ids[idx], child_id).map_err(engine_error)?;
            }
        }

        let available = TaffySize {
            width: constraints
                .width
                .map_or(AvailableSpace::MaxContent, AvailableSpace::Definite),
            height: constraints
                .height
                .map_or(AvailableSpace::MaxContent, AvailableSpace::Definite),
        };

        taffy
            .compute_layout_with_measure(
                ids[0],
                available,
                |known_dimensions, available_space, _node_id, context, _style| {
                    let paragraph = context.and_then(|idx| tree.get(*idx)?.measure.as_ref());
                    match paragraph {
                        Some(p) => measure_paragraph(p, known_dimensions, available_space),
                        None => TaffySize::ZERO,
                    }
                },
            )
            .map_err(engine_error)?;

        // Extract results. Children always follow their parent in the
        // snapshot, so a parent's box is known before its children's.
        let mut boxes = vec![LayoutBox::default(); tree.len()];

        let layout = taffy.layout(ids[0]).map_err(engine_error)?;
        let (width, height) = (layout.size.width, layout.size.height);
        let outer = Size::new(
            constraints.width.unwrap_or(margins.left + width + margins.right),
            constraints.height.unwrap_or(margins.top + height + margins.bottom),
        );
        boxes[0] = LayoutBox::from_frame(
            margins.left + layout.location.x,
            margins.top + layout.location.y,
            width,
            height,
            outer,
        );

        for (idx, node) in tree.nodes().iter().enumerate() {
            let parent = boxes[idx].size();
            for &child in &node.children {
                let layout = taffy.layout(ids[child]).map_err(engine_error)?;
                boxes[child] = LayoutBox::from_frame(
                    layout.location.x,
                    layout.location.y,
                    layout.size.width,
                    layout.size.height,
                    parent,
                );
            }
        }

        tracing::debug!(nodes = tree.len(), ?constraints, "layout pass");
        Ok(ComputedLayout::new(boxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutNodeInput, MonospaceParagraph};
    use crate::style::Edges;

    fn node(style: LayoutStyle) -> LayoutNodeInput {
        LayoutNodeInput {
            style,
            ..Default::default()
        }
    }

    fn sized(width: f32, height: f32) -> LayoutStyle {
        LayoutStyle {
            width: Dimension::Points(width),
            height: Dimension::Points(height),
            ..LayoutStyle::default()
        }
    }

    fn compute(tree: &LayoutTree, width: f32, height: f32) -> ComputedLayout {
        TaffyLayoutEngine
            .compute(tree, Constraints::new(Some(width), Some(height)))
            .unwrap()
    }

    #[test]
    fn test_compute_layout_empty() {
        let err = TaffyLayoutEngine
            .compute(&LayoutTree::new(), Constraints::default())
            .unwrap_err();
        assert_eq!(err, LayoutError::EmptyTree);
    }

    #[test]
    fn test_margin_consumed_on_all_sides() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(LayoutStyle {
            flex: Some(1.0),
            ..sized(100.0, 100.0)
        }));
        let child = tree.push(node(LayoutStyle {
            flex: Some(1.0),
            margin: Edges {
                all: Some(Dimension::Points(10.0)),
                ..Edges::default()
            },
            ..LayoutStyle::default()
        }));
        tree.add_child(root, child);

        let layout = compute(&tree, 100.0, 100.0);

        assert_eq!(
            layout.get(child),
            LayoutBox {
                left: 10.0,
                top: 10.0,
                right: 10.0,
                bottom: 10.0,
                width: 80.0,
                height: 80.0,
            }
        );
        assert_eq!(layout.get(root).size(), Size::new(100.0, 100.0));
    }

    #[test]
    fn test_auto_root_fills_constraints() {
        let mut tree = LayoutTree::new();
        tree.push(node(LayoutStyle::default()));
        let layout = compute(&tree, 320.0, 240.0);
        assert_eq!(layout.get(0).size(), Size::new(320.0, 240.0));
        assert_eq!(layout.get(0).right, 0.0);
    }

    #[test]
    fn test_column_is_default_direction() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(sized(100.0, 100.0)));
        let a = tree.push(node(sized(10.0, 20.0)));
        let b = tree.push(node(sized(10.0, 20.0)));
        tree.add_child(root, a);
        tree.add_child(root, b);

        let layout = compute(&tree, 100.0, 100.0);
        assert_eq!(layout.get(b).top, 20.0);
        assert_eq!(layout.get(b).left, 0.0);
        assert_eq!(layout.get(b).bottom, 60.0);
    }

    #[test]
    fn test_flex_row() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(LayoutStyle {
            flex_direction: FlexDirection::Row,
            ..sized(40.0, 10.0)
        }));
        let child1 = tree.push(node(sized(10.0, 5.0)));
        let child2 = tree.push(node(sized(10.0, 5.0)));
        tree.add_child(root, child1);
        tree.add_child(root, child2);

        let layout = compute(&tree, 80.0, 24.0);
        assert_eq!(layout.get(child1).left, 0.0);
        assert_eq!(layout.get(child2).left, 10.0);
        assert_eq!(layout.get(child2).right, 20.0);
    }

    #[test]
    fn test_no_shrink_by_default() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(sized(50.0, 10.0)));
        let child = tree.push(node(sized(10.0, 40.0)));
        tree.add_child(root, child);

        let layout = compute(&tree, 50.0, 10.0);
        assert_eq!(layout.get(child).height, 40.0);
        assert_eq!(layout.get(child).bottom, -30.0);
    }

    #[test]
    fn test_padding_and_border() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(LayoutStyle {
            padding: Edges {
                left: Some(Dimension::Points(2.0)),
                top: Some(Dimension::Points(1.0)),
                ..Edges::default()
            },
            border: Edges {
                left: Some(1.0),
                ..Edges::default()
            },
            ..sized(40.0, 10.0)
        }));
        let child = tree.push(node(sized(10.0, 5.0)));
        tree.add_child(root, child);

        let layout = compute(&tree, 80.0, 24.0);
        assert_eq!(layout.get(child).left, 3.0);
        assert_eq!(layout.get(child).top, 1.0);
    }

    #[test]
    fn test_justify_content_center() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(LayoutStyle {
            flex_direction: FlexDirection::Row,
            justify_content: JustifyContent::Center,
            ..sized(100.0, 10.0)
        }));
        let child = tree.push(node(sized(20.0, 5.0)));
        tree.add_child(root, child);

        let layout = compute(&tree, 100.0, 10.0);
        assert_eq!(layout.get(child).left, 40.0);
    }

    #[test]
    fn test_percent_width_and_absolute_inset() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(sized(200.0, 100.0)));
        let half = tree.push(node(LayoutStyle {
            width: Dimension::Percent(50.0),
            height: Dimension::Points(10.0),
            ..LayoutStyle::default()
        }));
        let pinned = tree.push(node(LayoutStyle {
            position: Position::Absolute,
            inset: Edges {
                right: Some(Dimension::Points(5.0)),
                bottom: Some(Dimension::Points(5.0)),
                ..Edges::default()
            },
            ..sized(20.0, 20.0)
        }));
        tree.add_child(root, half);
        tree.add_child(root, pinned);

        let layout = compute(&tree, 200.0, 100.0);
        assert_eq!(layout.get(half).width, 100.0);
        assert_eq!(layout.get(pinned).left, 175.0);
        assert_eq!(layout.get(pinned).top, 75.0);
    }

    #[test]
    fn test_start_margin_follows_direction() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(LayoutStyle {
            flex_direction: FlexDirection::Row,
            ..sized(100.0, 10.0)
        }));
        let mut child = node(LayoutStyle {
            margin: Edges {
                start: Some(Dimension::Points(7.0)),
                ..Edges::default()
            },
            ..sized(10.0, 10.0)
        });
        child.rtl = true;
        let child = tree.push(child);
        tree.add_child(root, child);

        let layout = compute(&tree, 100.0, 10.0);
        assert_eq!(layout.get(child).left, 0.0);

        let mut tree = LayoutTree::new();
        let root = tree.push(node(LayoutStyle {
            flex_direction: FlexDirection::Row,
            ..sized(100.0, 10.0)
        }));
        let child = tree.push(node(LayoutStyle {
            margin: Edges {
                start: Some(Dimension::Points(7.0)),
                ..Edges::default()
            },
            ..sized(10.0, 10.0)
        }));
        tree.add_child(root, child);
        assert_eq!(compute(&tree, 100.0, 10.0).get(child).left, 7.0);
    }

    #[test]
    fn test_display_none_takes_no_space() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(sized(100.0, 100.0)));
        let hidden = tree.push(node(LayoutStyle {
            display: Display::None,
            ..sized(10.0, 30.0)
        }));
        let shown = tree.push(node(sized(10.0, 10.0)));
        tree.add_child(root, hidden);
        tree.add_child(root, shown);

        let layout = compute(&tree, 100.0, 100.0);
        assert_eq!(layout.get(hidden).width, 0.0);
        assert_eq!(layout.get(shown).top, 0.0);
    }

    #[test]
    fn test_paragraph_measure() {
        let mut tree = LayoutTree::new();
        let root = tree.push(node(LayoutStyle {
            align_items: Align::FlexStart,
            ..sized(30.0, 100.0)
        }));
        let text = tree.push(LayoutNodeInput {
            measure: Some(ParagraphHandle::new(MonospaceParagraph::new("hello world", 10.0))),
            ..Default::default()
        });
        tree.add_child(root, text);

        let layout = compute(&tree, 30.0, 100.0);
        assert_eq!(layout.get(text).width, 30.0);
        assert_eq!(layout.get(text).height, 36.0);
    }

    #[test]
    fn test_dimension_conversion() {
        assert!(matches!(to_taffy_dimension(Dimension::Auto), TaffyDimension::Auto));
        assert!(matches!(
            to_taffy_dimension(Dimension::Points(50.0)),
            TaffyDimension::Length(50.0)
        ));
        // Percent: 50% → 0.5
        if let TaffyDimension::Percent(p) = to_taffy_dimension(Dimension::Percent(50.0)) {
            assert!((p - 0.5).abs() < 0.001);
        } else {
            panic!("Expected Percent variant");
        }
    }
}
