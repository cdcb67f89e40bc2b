//! # flexcanvas
//!
//! Retained flexbox scene graph that records drawing pictures for a
//! declarative reconciler.
//!
//! ## Architecture
//!
//! A tree of [`Node`]s carries flexbox styles and paint styles. Layout is
//! delegated to [Taffy](https://github.com/DioxusLabs/taffy); drawing walks
//! the laid-out tree and records a [`Picture`] of draw commands that an
//! external canvas plays back.
//!
//! ```text
//! Element tree ─► HostConfig ─► Node tree ─► LayoutEngine ─► DrawSerializer ─► Picture
//!                                   ▲                                             │
//!                        animated values patch styles             DisplaySurface::present
//! ```
//!
//! Structural mutation happens on the control context; a render loop on a
//! second context draws every frame. Each node guards its own state, so
//! both may touch the tree at once.
//!
//! ## Modules
//!
//! - [`types`] - Colors, dimensions and keyword enums
//! - [`geometry`] - Points, rects, rounded rects, paths, matrices
//! - [`style`] - Style sheets, animated values, the style resolver
//! - [`engine`] - The node tree
//! - [`layout`] - Layout snapshots and the Taffy adapter
//! - [`renderer`] - Paints, draw commands, pictures, the draw serializer
//! - [`reconciler`] - Host config and the element reconciler
//! - [`pipeline`] - Render loop, schedulers, surfaces, install lifecycle
//!
//! ## Example
//!
//! ```
//! use flexcanvas::{InsertPosition, Node, NodeType, StyleKey, StyleSheet};
//!
//! let root = Node::with_type(NodeType::Rect);
//! root.set_style(&StyleSheet::new().with(StyleKey::BackgroundColor, "red")).unwrap();
//!
//! let child = Node::with_type(NodeType::Oval);
//! child.set_style(&StyleSheet::new().with(StyleKey::Flex, 1).with(StyleKey::Margin, 10)).unwrap();
//! root.insert_child(&child, InsertPosition::End).unwrap();
//!
//! root.compute_layout(Some(100.0), Some(100.0)).unwrap();
//! assert_eq!(child.layout().width, 80.0);
//!
//! let picture = root.draw().unwrap();
//! assert_eq!(picture.drawing_count(), 2);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod reconciler;
pub mod renderer;
pub mod style;
pub mod types;

pub use types::*;

pub use config::Config;

pub use engine::{DirtyFlags, InsertPosition, Node, NodeId, NodeProps, WeakNode};

pub use error::{BridgeError, InstallError, LayoutError, NodeError, NodeResult, StyleError};

pub use layout::{LayoutBox, LayoutEngine, TaffyLayoutEngine, TextLayout};

pub use style::{AnimatedValue, SharedValue, StyleInput, StyleKey, StyleSheet, StyleValue};

pub use renderer::{Canvas, DrawCommand, DrawSerializer, Paint, Picture};

pub use reconciler::{Element, HostConfig, HostProps, MountedTree, SceneHostConfig};

pub use pipeline::{
    FrameScheduler, Installer, ManualFrameScheduler, RenderLoop, RunId, RunSlot, SurfaceView,
    ThreadFrameScheduler,
};
