//! Transferable node capsule.
//!
//! A [`NodeBox`] is built on the control thread and moved into the render
//! loop. Unboxing re-checks liveness so a loop never draws a disposed tree.

use crate::engine::{Node, NodeId};
use crate::error::BridgeError;

/// A node wrapped for the render context.
#[derive(Debug, Clone)]
pub struct NodeBox {
    node: Node,
}

impl NodeBox {
    pub fn new(node: &Node) -> Self {
        Self { node: node.clone() }
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Get the node back, or `Disposed` once it has been torn down.
    pub fn unbox(&self) -> Result<Node, BridgeError> {
        if self.node.is_disposed() {
            return Err(BridgeError::Disposed(self.node.id()));
        }
        Ok(self.node.clone())
    }
}

// Nodes cross threads inside the capsule.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Node>();
    assert_send_sync::<NodeBox>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    #[test]
    fn test_unbox_returns_same_node() {
        let node = Node::with_type(NodeType::Rect);
        let capsule = NodeBox::new(&node);
        assert_eq!(capsule.id(), node.id());
        assert_eq!(capsule.unbox().unwrap(), node);
    }

    #[test]
    fn test_unbox_after_dispose_fails() {
        let node = Node::with_type(NodeType::Group);
        let capsule = NodeBox::new(&node);
        node.dispose();
        assert_eq!(capsule.unbox(), Err(BridgeError::Disposed(node.id())));
    }

    #[test]
    fn test_capsule_moves_across_threads() {
        let node = Node::with_type(NodeType::Oval);
        let capsule = NodeBox::new(&node);
        let id = std::thread::spawn(move || capsule.unbox().map(|n| n.id()))
            .join()
            .unwrap();
        assert_eq!(id, Ok(node.id()));
    }
}
