//! Layout Types - Inputs and outputs of a layout pass.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::style::LayoutStyle;

use super::text::ParagraphHandle;

// =============================================================================
// LAYOUT BOX
// =============================================================================

/// The resolved box of one node, relative to its parent's border box.
///
/// `right` and `bottom` are insets from the parent's far edges, so a child
/// with a 10 point margin inside a 100x100 parent reads
/// `{left: 10, top: 10, right: 10, bottom: 10, width: 80, height: 80}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    /// Build a box from a frame and the size of the box it sits in.
    pub fn from_frame(left: f32, top: f32, width: f32, height: f32, parent: Size) -> Self {
        Self {
            left,
            top,
            right: parent.width - left - width,
            bottom: parent.height - top - height,
            width,
            height,
        }
    }

    /// The frame in parent coordinates.
    pub fn frame(&self) -> Rect {
        Rect::from_xywh(self.left, self.top, self.width, self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Constraints of a root layout pass. `None` leaves the axis unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Constraints {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl Constraints {
    pub const fn new(width: Option<f32>, height: Option<f32>) -> Self {
        Self { width, height }
    }

    /// Per axis: `self` where set, otherwise `fallback`.
    pub fn or(self, fallback: Constraints) -> Self {
        Self {
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
        }
    }
}

// =============================================================================
// LAYOUT TREE
// =============================================================================

/// One node of a layout snapshot.
#[derive(Debug, Clone, Default)]
pub struct LayoutNodeInput {
    pub style: LayoutStyle,
    /// Resolved direction, used for start/end edges.
    pub rtl: bool,
    /// Intrinsic sizing for paragraph leaves.
    pub measure: Option<ParagraphHandle>,
    /// Indices of the children, in order.
    pub children: Vec<usize>,
}

/// A flattened snapshot of a subtree. The root is at index 0.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    nodes: Vec<LayoutNodeInput>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index.
    pub fn push(&mut self, node: LayoutNodeInput) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_child(&mut self, parent: usize, child: usize) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub fn nodes(&self) -> &[LayoutNodeInput] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&LayoutNodeInput> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Boxes computed for a [`LayoutTree`], indexed like its nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedLayout {
    boxes: Vec<LayoutBox>,
}

impl ComputedLayout {
    pub fn new(boxes: Vec<LayoutBox>) -> Self {
        Self { boxes }
    }

    /// Box of node `index`; zero for an index outside the tree.
    pub fn get(&self, index: usize) -> LayoutBox {
        self.boxes.get(index).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// The flexbox capability a node tree computes its boxes with.
pub trait LayoutEngine: Send + Sync {
    fn compute(
        &self,
        tree: &LayoutTree,
        constraints: Constraints,
    ) -> Result<ComputedLayout, LayoutError>;
}
