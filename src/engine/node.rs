//! Node - a retained scene-tree element.
//!
//! A node owns its type, resolved style, props, ordered children and cached
//! layout box. Handles are cheap clones of an `Arc`; the node lives until
//! every handle is gone, and [`Node::dispose`] tears down its animated-style
//! subscriptions (and those of its subtree) explicitly.
//!
//! # Locking
//!
//! Each node guards its state with its own `RwLock`. The parent link is a
//! separate leaf `Mutex`, and dirty flags and the generation counter are
//! atomics. Locks are only ever nested top-down: a parent's state lock may be
//! held while a child's parent link is taken, never the other way round. No
//! code holds a state lock while taking another node's state lock, so the
//! control thread, the render thread and animated-value listeners cannot
//! deadlock on a tree.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use super::dirty::{AtomicDirty, DirtyFlags};
use super::props::NodeProps;
use crate::error::{NodeError, NodeResult};
use crate::layout::{
    Constraints, LayoutBox, LayoutEngine, LayoutNodeInput, LayoutTree, TaffyLayoutEngine,
};
use crate::renderer::{DrawSerializer, Picture};
use crate::style::{
    FieldSubscriptions, Listener, PaintStyle, ResolvedStyle, StyleChange, StyleKey,
    StyleResolver, StyleSheet, StyleValue, SubscriptionToken,
};
use crate::types::{Direction, Display, NodeType};

// =============================================================================
// NodeId
// =============================================================================

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity, stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Node state
// =============================================================================

struct NodeInner {
    id: NodeId,
    state: RwLock<NodeState>,
    parent: Mutex<Option<WeakNode>>,
    dirty: AtomicDirty,
    /// Bumped on every mutation of this node or its subtree. A layout pass
    /// only clears LAYOUT if the generation it snapshotted is still current.
    generation: AtomicU64,
    disposed: AtomicBool,
}

#[derive(Default)]
struct NodeState {
    node_type: Option<NodeType>,
    style: ResolvedStyle,
    props: NodeProps,
    children: Vec<Node>,
    layout: LayoutBox,
    has_layout: bool,
    constraints: Constraints,
    subscriptions: FieldSubscriptions,
}

/// Where [`Node::insert_child`] puts the child.
#[derive(Debug, Clone, Default)]
pub enum InsertPosition {
    /// After the last child.
    #[default]
    End,
    /// At this index, clamped to `0..=len`.
    Index(usize),
    /// Immediately before this sibling, which must be a current child.
    Before(Node),
}

/// What the draw serializer reads from one node.
pub(crate) struct DrawSnapshot {
    pub node_type: Option<NodeType>,
    pub display: Display,
    pub paint: PaintStyle,
    pub props: NodeProps,
    pub layout: LayoutBox,
    pub children: Vec<Node>,
}

// =============================================================================
// Node
// =============================================================================

/// Handle to a scene-tree node.
///
/// # Example
///
/// ```
/// use flexcanvas::engine::Node;
/// use flexcanvas::style::{StyleKey, StyleSheet};
/// use flexcanvas::types::NodeType;
///
/// let root = Node::with_type(NodeType::Rect);
/// root.set_style(&StyleSheet::new().with(StyleKey::Width, 100).with(StyleKey::Height, 50)).unwrap();
/// let child = Node::with_type(NodeType::Oval);
/// root.append_child(&child).unwrap();
///
/// let layout = root.compute_layout(None, None).unwrap();
/// assert_eq!(layout.width, 100.0);
/// assert_eq!(child.layout().width, 100.0);
/// ```
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

/// Non-owning handle to a node.
#[derive(Clone)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "WeakNode({})", node.id()),
            None => f.write_str("WeakNode(<dropped>)"),
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// A fresh, untyped and unstyled node.
    pub fn new() -> Self {
        Self(Arc::new(NodeInner {
            id: NodeId::next(),
            state: RwLock::new(NodeState::default()),
            parent: Mutex::new(None),
            dirty: AtomicDirty::new(DirtyFlags::STYLE | DirtyFlags::LAYOUT),
            generation: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }))
    }

    pub fn with_type(node_type: NodeType) -> Self {
        let node = Self::new();
        node.0.state.write().node_type = Some(node_type);
        node
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Arc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_disposed(&self) -> bool {
        self.0.disposed.load(Ordering::SeqCst)
    }

    fn ensure_live(&self) -> NodeResult<()> {
        if self.is_disposed() {
            return Err(NodeError::Disposed(self.id()));
        }
        Ok(())
    }

    // =========================================================================
    // Dirty tracking
    // =========================================================================

    pub fn dirty(&self) -> DirtyFlags {
        self.0.dirty.get()
    }

    /// Mark this node dirty. LAYOUT also marks every ancestor.
    fn mark_dirty(&self, flags: DirtyFlags) {
        self.0.generation.fetch_add(1, Ordering::SeqCst);
        self.0.dirty.insert(flags);
        if flags.contains(DirtyFlags::LAYOUT) {
            let mut next = self.parent();
            while let Some(node) = next {
                node.0.generation.fetch_add(1, Ordering::SeqCst);
                node.0.dirty.insert(DirtyFlags::LAYOUT);
                next = node.parent();
            }
        }
    }

    fn mark_change(&self, change: StyleChange) {
        let mut flags = DirtyFlags::STYLE;
        if change.layout {
            flags |= DirtyFlags::LAYOUT;
        }
        self.mark_dirty(flags);
    }

    // =========================================================================
    // Type, style, props
    // =========================================================================

    pub fn node_type(&self) -> Option<NodeType> {
        self.0.state.read().node_type
    }

    pub fn set_type(&self, node_type: NodeType) -> NodeResult<()> {
        self.ensure_live()?;
        self.0.state.write().node_type = Some(node_type);
        self.mark_dirty(DirtyFlags::STYLE | DirtyFlags::LAYOUT);
        Ok(())
    }

    /// Merge a style sheet into this node's style.
    ///
    /// Fields not in `sheet` are left unchanged; `StyleInput::Unset` resets a
    /// field. Animated fields take their current snapshot and keep following
    /// the source until replaced, unset or disposed. The merge is atomic: on
    /// error the style is untouched.
    pub fn set_style(&self, sheet: &StyleSheet) -> NodeResult<StyleChange> {
        self.ensure_live()?;
        let weak = self.downgrade();
        let listen = move |key: StyleKey, token: SubscriptionToken| -> Listener {
            let weak = weak.clone();
            Arc::new(move |value: &StyleValue| {
                if let Some(node) = weak.upgrade() {
                    node.apply_animated(key, token, value);
                }
            })
        };

        let change = {
            let mut guard = self.0.state.write();
            let state = &mut *guard;
            StyleResolver::merge(&mut state.style, &mut state.subscriptions, sheet, &listen)?
        };
        if !change.is_empty() {
            self.mark_change(change);
        }
        Ok(change)
    }

    /// Listener path of an animated field.
    fn apply_animated(&self, key: StyleKey, token: SubscriptionToken, value: &StyleValue) {
        if self.is_disposed() {
            return;
        }
        let result = {
            let mut guard = self.0.state.write();
            let state = &mut *guard;
            StyleResolver::apply_animated(&mut state.style, &state.subscriptions, key, token, value)
        };
        match result {
            Ok(Some(change)) => self.mark_change(change),
            Ok(None) => tracing::trace!(node = %self.id(), %key, "stale animated update"),
            Err(err) => {
                tracing::warn!(node = %self.id(), %key, error = %err, "ignoring animated style value")
            }
        }
    }

    /// A copy of the resolved style.
    pub fn style(&self) -> ResolvedStyle {
        self.0.state.read().style.clone()
    }

    /// Effective value of one field.
    pub fn style_value(&self, key: StyleKey) -> Option<StyleValue> {
        self.0.state.read().style.value(key).cloned()
    }

    /// Fields currently driven by an animated value.
    pub fn animated_keys(&self) -> Vec<StyleKey> {
        let mut keys: Vec<StyleKey> = self.0.state.read().subscriptions.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Replace the props. Paragraph props also invalidate layout.
    pub fn set_props(&self, props: NodeProps) -> NodeResult<()> {
        self.ensure_live()?;
        let measured = {
            let mut state = self.0.state.write();
            let measured = state.props.paragraph().is_some() || props.paragraph().is_some();
            state.props = props;
            measured
        };
        let mut flags = DirtyFlags::STYLE;
        if measured {
            flags |= DirtyFlags::LAYOUT;
        }
        self.mark_dirty(flags);
        Ok(())
    }

    pub fn props(&self) -> NodeProps {
        self.0.state.read().props.clone()
    }

    // =========================================================================
    // Children
    // =========================================================================

    pub fn parent(&self) -> Option<Node> {
        let link = self.0.parent.lock().clone();
        link.and_then(|weak| weak.upgrade())
    }

    /// A copy of the children, in order.
    pub fn children(&self) -> Vec<Node> {
        self.0.state.read().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.state.read().children.len()
    }

    /// True if `self` is `node` or one of its ancestors.
    fn is_ancestor_or_self_of(&self, node: &Node) -> bool {
        let mut next = Some(node.clone());
        while let Some(current) = next {
            if current.ptr_eq(self) {
                return true;
            }
            next = current.parent();
        }
        false
    }

    /// Insert `child` at `position`.
    ///
    /// Fails with `AlreadyAttached` if the child has a parent, `NotAChild`
    /// if a `Before` sibling is not a current child, and `WouldCycle` if
    /// the child is this node or one of its ancestors.
    pub fn insert_child(&self, child: &Node, position: InsertPosition) -> NodeResult<()> {
        self.ensure_live()?;
        child.ensure_live()?;
        if child.is_ancestor_or_self_of(self) {
            return Err(NodeError::WouldCycle {
                child: child.id(),
                parent: self.id(),
            });
        }

        {
            let mut state = self.0.state.write();
            let index = match &position {
                InsertPosition::End => state.children.len(),
                InsertPosition::Index(i) => (*i).min(state.children.len()),
                InsertPosition::Before(sibling) => state
                    .children
                    .iter()
                    .position(|c| c.ptr_eq(sibling))
                    .ok_or(NodeError::NotAChild {
                        child: sibling.id(),
                        parent: self.id(),
                    })?,
            };

            let mut link = child.0.parent.lock();
            if let Some(current) = link.as_ref().and_then(WeakNode::upgrade) {
                return Err(NodeError::AlreadyAttached {
                    child: child.id(),
                    parent: current.id(),
                });
            }
            *link = Some(self.downgrade());
            drop(link);

            state.children.insert(index, child.clone());
        }

        self.mark_dirty(DirtyFlags::LAYOUT);
        Ok(())
    }

    pub fn append_child(&self, child: &Node) -> NodeResult<()> {
        self.insert_child(child, InsertPosition::End)
    }

    pub fn insert_before(&self, child: &Node, before: &Node) -> NodeResult<()> {
        self.insert_child(child, InsertPosition::Before(before.clone()))
    }

    /// Detach `child`. The child stays usable and can be inserted again.
    pub fn remove_child(&self, child: &Node) -> NodeResult<()> {
        {
            let mut state = self.0.state.write();
            let index = state
                .children
                .iter()
                .position(|c| c.ptr_eq(child))
                .ok_or(NodeError::NotAChild {
                    child: child.id(),
                    parent: self.id(),
                })?;
            state.children.remove(index);
            *child.0.parent.lock() = None;
        }
        self.mark_dirty(DirtyFlags::LAYOUT);
        Ok(())
    }

    /// Detach and dispose every child subtree.
    pub fn remove_all_children(&self) {
        let children = {
            let mut state = self.0.state.write();
            let children = mem::take(&mut state.children);
            for child in &children {
                *child.0.parent.lock() = None;
            }
            children
        };
        if children.is_empty() {
            return;
        }
        self.mark_dirty(DirtyFlags::LAYOUT);
        for child in children {
            child.dispose();
        }
    }

    /// Detach from the parent and tear down this subtree: animated-style
    /// subscriptions are closed and children are disposed recursively.
    ///
    /// Disposing twice is a no-op. Mutating a disposed node fails with
    /// [`NodeError::Disposed`].
    pub fn dispose(&self) {
        if self.0.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(parent) = self.parent() {
            if let Err(err) = parent.remove_child(self) {
                tracing::debug!(node = %self.id(), error = %err, "dispose: parent link was stale");
            }
        }

        let (children, subscriptions) = {
            let mut state = self.0.state.write();
            (
                mem::take(&mut state.children),
                mem::take(&mut state.subscriptions),
            )
        };
        drop(subscriptions);

        for child in children {
            *child.0.parent.lock() = None;
            child.dispose();
        }
        tracing::trace!(node = %self.id(), "disposed");
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out this subtree with the Taffy engine.
    ///
    /// Each omitted constraint falls back to the one from the previous call
    /// on this node. Returns this node's box.
    pub fn compute_layout(&self, width: Option<f32>, height: Option<f32>) -> NodeResult<LayoutBox> {
        self.compute_layout_with(&TaffyLayoutEngine, width, height)
    }

    pub fn compute_layout_with(
        &self,
        engine: &dyn LayoutEngine,
        width: Option<f32>,
        height: Option<f32>,
    ) -> NodeResult<LayoutBox> {
        self.ensure_live()?;
        let constraints = {
            let mut state = self.0.state.write();
            state.constraints = Constraints::new(width, height).or(state.constraints);
            state.constraints
        };

        let mut tree = LayoutTree::new();
        let mut visited: Vec<(Node, u64)> = Vec::new();
        self.snapshot_layout(&mut tree, &mut visited, false);

        let computed = engine.compute(&tree, constraints)?;

        for (index, (node, generation)) in visited.iter().enumerate() {
            node.finish_layout(computed.get(index), *generation);
        }
        Ok(computed.get(0))
    }

    /// Append this subtree to `tree` in pre-order. Each node's lock is held
    /// only while its own fields are copied.
    fn snapshot_layout(
        &self,
        tree: &mut LayoutTree,
        visited: &mut Vec<(Node, u64)>,
        inherited_rtl: bool,
    ) -> usize {
        let generation = self.0.generation.load(Ordering::SeqCst);
        let (style, measure, children) = {
            let state = self.0.state.read();
            (
                state.style.layout.clone(),
                state.props.paragraph().cloned(),
                state.children.clone(),
            )
        };
        let rtl = match style.direction {
            Direction::Ltr => false,
            Direction::Rtl => true,
            Direction::Inherit => inherited_rtl,
        };

        let index = tree.push(LayoutNodeInput {
            style,
            rtl,
            measure,
            children: Vec::with_capacity(children.len()),
        });
        visited.push((self.clone(), generation));

        for child in &children {
            let child_index = child.snapshot_layout(tree, visited, rtl);
            tree.add_child(index, child_index);
        }
        index
    }

    fn finish_layout(&self, layout: LayoutBox, generation: u64) {
        {
            let mut state = self.0.state.write();
            state.layout = layout;
            state.has_layout = true;
        }
        let inner = &self.0;
        if inner.generation.load(Ordering::SeqCst) == generation {
            inner.dirty.remove(DirtyFlags::LAYOUT | DirtyFlags::STYLE);
            // A mutation that raced the clear keeps its flag
            if inner.generation.load(Ordering::SeqCst) != generation {
                inner.dirty.insert(DirtyFlags::LAYOUT);
            }
        }
    }

    /// The cached layout box. Zero until the first layout pass.
    pub fn layout(&self) -> LayoutBox {
        self.0.state.read().layout
    }

    pub fn has_layout(&self) -> bool {
        self.0.state.read().has_layout
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Lay out if needed, then record this subtree into a picture.
    pub fn draw(&self) -> NodeResult<Picture> {
        self.draw_with(&DrawSerializer::default())
    }

    pub fn draw_with(&self, serializer: &DrawSerializer) -> NodeResult<Picture> {
        self.ensure_live()?;
        if self.dirty().contains(DirtyFlags::LAYOUT) || !self.has_layout() {
            self.compute_layout(None, None)?;
        }
        Ok(serializer.serialize(self))
    }

    pub(crate) fn draw_snapshot(&self) -> DrawSnapshot {
        let state = self.0.state.read();
        DrawSnapshot {
            node_type: state.node_type,
            display: state.style.layout.display,
            paint: state.style.paint.clone(),
            props: state.props.clone(),
            layout: state.layout,
            children: state.children.clone(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("id", &self.id());
        if let Some(state) = self.0.state.try_read() {
            s.field("type", &state.node_type)
                .field("children", &state.children.len());
        }
        s.finish()
    }
}
