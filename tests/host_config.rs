//! The host-config protocol as a reconciler drives it.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use flexcanvas::reconciler::{LoggingHostConfig, UpdatePriority};
use flexcanvas::{
    Element, HostConfig, HostProps, MountedTree, Node, NodeProps, NodeResult, NodeType,
    SceneHostConfig, StyleKey, StyleSheet, StyleValue,
};

/// Records every structural call, then forwards to the scene host.
#[derive(Default)]
struct Recording {
    inner: SceneHostConfig,
    calls: Mutex<Vec<String>>,
}

impl Recording {
    fn log(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl HostConfig for Recording {
    fn create_instance(&self, type_tag: &str, props: &HostProps) -> NodeResult<Node> {
        self.log(&format!("create {type_tag}"));
        self.inner.create_instance(type_tag, props)
    }

    fn create_text_instance(&self, text: &str) -> Option<Node> {
        self.inner.create_text_instance(text)
    }

    fn append_initial_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        self.log("appendInitial");
        self.inner.append_initial_child(parent, child)
    }

    fn finalize_initial_children(&self, instance: &Node, type_tag: &str, props: &HostProps) -> bool {
        self.inner.finalize_initial_children(instance, type_tag, props)
    }

    fn should_set_text_content(&self, type_tag: &str, props: &HostProps) -> bool {
        self.inner.should_set_text_content(type_tag, props)
    }

    fn append_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        self.log("append");
        self.inner.append_child(parent, child)
    }

    fn append_child_to_container(&self, container: &Node, child: &Node) -> NodeResult<()> {
        self.log("appendToContainer");
        self.inner.append_child_to_container(container, child)
    }

    fn insert_before(&self, parent: &Node, child: &Node, before: &Node) -> NodeResult<()> {
        self.log("insertBefore");
        self.inner.insert_before(parent, child, before)
    }

    fn insert_in_container_before(&self, container: &Node, child: &Node, before: &Node) -> NodeResult<()> {
        self.log("insertInContainerBefore");
        self.inner.insert_in_container_before(container, child, before)
    }

    fn remove_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        self.log("remove");
        self.inner.remove_child(parent, child)
    }

    fn remove_child_from_container(&self, container: &Node, child: &Node) -> NodeResult<()> {
        self.log("removeFromContainer");
        self.inner.remove_child_from_container(container, child)
    }

    fn commit_update(
        &self,
        instance: &Node,
        type_tag: &str,
        old_props: &HostProps,
        new_props: &HostProps,
    ) -> NodeResult<()> {
        self.log(&format!("update {type_tag}"));
        self.inner.commit_update(instance, type_tag, old_props, new_props)
    }

    fn prepare_for_commit(&self, container: &Node) {
        self.log("prepare");
        self.inner.prepare_for_commit(container);
    }

    fn reset_after_commit(&self, container: &Node) {
        self.log("reset");
        self.inner.reset_after_commit(container);
    }

    fn clear_container(&self, container: &Node) {
        self.log("clear");
        self.inner.clear_container(container);
    }

    fn detach_deleted_instance(&self, instance: &Node) {
        self.log("detach");
        self.inner.detach_deleted_instance(instance);
    }

    fn current_update_priority(&self) -> UpdatePriority {
        self.inner.current_update_priority()
    }

    fn set_current_update_priority(&self, priority: UpdatePriority) {
        self.inner.set_current_update_priority(priority);
    }

    fn resolve_update_priority(&self) -> UpdatePriority {
        self.inner.resolve_update_priority()
    }
}

fn recorded() -> (Arc<Recording>, MountedTree) {
    let host = Arc::new(Recording::default());
    let tree = MountedTree::new(host.clone(), Node::with_type(NodeType::Group));
    (host, tree)
}

#[test]
fn test_initial_mount_builds_detached_then_attaches_once() {
    let (host, mut tree) = recorded();
    tree.update(&[Element::new("group").child(Element::new("rect"))])
        .unwrap();

    assert_eq!(
        host.take(),
        [
            "prepare",
            "create group",
            "create rect",
            "appendInitial",
            "appendToContainer",
            "reset"
        ]
    );
}

#[test]
fn test_unchanged_props_skip_commit_update() {
    let (host, mut tree) = recorded();
    let elements = [Element::new("rect").style(StyleSheet::new().with(StyleKey::Width, 5))];
    tree.update(&elements).unwrap();
    host.take();

    tree.update(&elements).unwrap();
    assert_eq!(host.take(), ["prepare", "reset"]);
}

#[test]
fn test_replacement_inserts_before_then_detaches() {
    let (host, mut tree) = recorded();
    tree.update(&[Element::new("rect"), Element::new("oval")]).unwrap();
    host.take();

    tree.update(&[Element::new("line"), Element::new("oval")]).unwrap();
    assert_eq!(
        host.take(),
        [
            "prepare",
            "create line",
            "insertInContainerBefore",
            "removeFromContainer",
            "detach",
            "reset"
        ]
    );
    assert_eq!(
        tree.container()
            .children()
            .iter()
            .map(Node::node_type)
            .collect::<Vec<_>>(),
        [Some(NodeType::Line), Some(NodeType::Oval)]
    );
}

#[test]
fn test_text_slot_replacement_inserts_before_next_node() {
    let (host, mut tree) = recorded();
    tree.update(&[Element::new("rect"), Element::text("x"), Element::new("oval")])
        .unwrap();
    host.take();

    tree.update(&[Element::new("rect"), Element::new("line"), Element::new("oval")])
        .unwrap();
    assert_eq!(
        host.take(),
        ["prepare", "create line", "insertInContainerBefore", "reset"]
    );
    assert_eq!(
        tree.container()
            .children()
            .iter()
            .map(Node::node_type)
            .collect::<Vec<_>>(),
        [Some(NodeType::Rect), Some(NodeType::Line), Some(NodeType::Oval)]
    );
}

#[test]
fn test_nodes_survive_a_failed_commit_for_later_removal() {
    let (host, mut tree) = recorded();
    tree.update(&[Element::new("rect"), Element::new("oval")]).unwrap();

    let bad = Element::new("oval").style(StyleSheet::new().with(StyleKey::Width, true));
    assert!(tree.update(&[Element::new("rect"), bad]).is_err());
    host.take();

    tree.update(&[]).unwrap();
    assert_eq!(
        host.take(),
        [
            "prepare",
            "removeFromContainer",
            "detach",
            "removeFromContainer",
            "detach",
            "reset"
        ]
    );
    assert_eq!(tree.container().child_count(), 0);
}

#[test]
fn test_json_props_flow_into_nodes() {
    let (_host, mut tree) = recorded();
    let props = HostProps::from_json(
        NodeType::Text,
        &json!({
            "text": "hello",
            "style": {"width": "50%", "opacity": 0.5},
            "children": []
        }),
    )
    .unwrap();
    tree.update(&[Element::new("text").props(props.props).style(props.style)])
        .unwrap();

    let node = &tree.container().children()[0];
    assert!(matches!(node.props(), NodeProps::Text { ref text, .. } if text == "hello"));
    assert_eq!(node.style_value(StyleKey::Opacity), Some(StyleValue::Number(0.5)));
}

#[test]
fn test_logging_decorator_is_transparent() {
    let host: Arc<dyn HostConfig> = Arc::new(LoggingHostConfig::new(SceneHostConfig::new()));
    let mut tree = MountedTree::new(host, Node::with_type(NodeType::Group));
    tree.update(&[Element::new("rect").child(Element::new("oval"))])
        .unwrap();
    tree.update(&[Element::new("rect")]).unwrap();

    let rect = &tree.container().children()[0];
    assert_eq!(rect.child_count(), 0);
}

#[test]
fn test_priority_is_shared_state() {
    let host = SceneHostConfig::new();
    assert_eq!(host.current_update_priority(), UpdatePriority::Default);
    host.set_current_update_priority(UpdatePriority::Continuous);
    assert_eq!(host.resolve_update_priority(), UpdatePriority::Continuous);
}
