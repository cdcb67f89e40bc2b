//! Engine - the retained node tree.
//!
//! The engine manages the scene graph itself:
//! - Node: identity, type, resolved style, props, children, cached layout
//! - DirtyFlags: what changed since the last layout and draw
//! - NodeProps: type-specific payloads (text, path, image, paragraph...)
//!
//! # Architecture
//!
//! Nodes are shared handles. The reconciler mutates them on the control
//! thread while the render loop lays them out and draws them on its own
//! thread; animated style values patch them from whichever thread drives
//! the animation:
//!
//! ```text
//! Host config ──mutate──> Node tree <──patch── animated values
//!                            │
//!                 render loop: layout → draw → Picture
//! ```

mod dirty;
mod node;
mod props;

pub use dirty::DirtyFlags;
pub use node::{InsertPosition, Node, NodeId, WeakNode};
pub use props::{Font, ImageSource, NodeProps, StrokeOptions};

pub(crate) use node::DrawSnapshot;
