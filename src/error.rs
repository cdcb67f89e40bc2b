//! Error types.
//!
//! Every fallible public operation returns one of these. Tree misuse is
//! always reported; nothing is silently ignored.

use thiserror::Error;

use crate::engine::NodeId;
use crate::types::NodeType;

/// Errors from node-tree operations.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("node {child} is already attached to parent {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("node {child} is not a child of node {parent}")]
    NotAChild { child: NodeId, parent: NodeId },

    #[error("inserting node {child} under node {parent} would create a cycle")]
    WouldCycle { child: NodeId, parent: NodeId },

    #[error("node {0} has been disposed")]
    Disposed(NodeId),

    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),

    #[error("invalid props for `{node_type}`: {reason}")]
    InvalidProps { node_type: NodeType, reason: String },

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Errors raised while resolving a style sheet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("unknown style key `{0}`")]
    UnknownKey(String),

    #[error("style `{key}` expects {expected}, got {found}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("style `{key}` does not accept keyword `{value}`")]
    UnknownKeyword { key: &'static str, value: String },

    #[error("invalid color `{0}`")]
    InvalidColor(String),
}

/// Errors from the layout adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout engine failed: {0}")]
    Engine(String),

    #[error("layout tree is empty")]
    EmptyTree,
}

/// Reasons the native bridge could not be installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("runtime handle is unavailable")]
    MissingRuntime,

    #[error("neither a runtime executor nor a call invoker is available")]
    MissingExecutor,

    #[error("paint context peer is unavailable")]
    MissingPaintContext,

    #[error("native install failed: {0}")]
    Native(String),
}

/// Errors crossing the control/render boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("boxed node {0} has been disposed")]
    Disposed(NodeId),

    #[error("failed to spawn render thread: {0}")]
    Spawn(String),
}

pub type NodeResult<T> = Result<T, NodeError>;
