//! Layout Module
//!
//! Flexbox layout computation for node trees using Taffy.
//!
//! # Architecture
//!
//! A layout pass never runs against the live tree. The node tree takes a
//! [`LayoutTree`] snapshot under short read locks, hands it to a
//! [`LayoutEngine`] with no locks held, and writes the resulting
//! [`LayoutBox`]es back node by node. The bridge:
//!
//! 1. Converts layout styles → Taffy styles
//! 2. Builds a Taffy tree from the snapshot's child lists
//! 3. Measures paragraph leaves through [`TextLayout`]
//! 4. Extracts boxes with `right`/`bottom` expressed as insets
//!
//! # Example
//!
//! ```
//! use flexcanvas::layout::{Constraints, LayoutEngine, LayoutNodeInput, LayoutTree, TaffyLayoutEngine};
//!
//! let mut tree = LayoutTree::new();
//! tree.push(LayoutNodeInput::default());
//! let layout = TaffyLayoutEngine
//!     .compute(&tree, Constraints::new(Some(80.0), Some(24.0)))
//!     .unwrap();
//! assert_eq!(layout.get(0).width, 80.0);
//! ```

mod taffy_bridge;
mod text;
mod types;

pub use taffy_bridge::TaffyLayoutEngine;
pub use text::{MonospaceParagraph, ParagraphHandle, TextLayout};
pub use types::{ComputedLayout, Constraints, LayoutBox, LayoutEngine, LayoutNodeInput, LayoutTree};
