//! Host config - the mutation-mode contract a reconciler drives.
//!
//! A reconciler diffs a declarative description and calls back into the
//! host config for every change it wants applied. [`SceneHostConfig`]
//! translates those callbacks 1:1 into node-tree operations.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde_json::Value as Json;

use crate::engine::{Node, NodeProps};
use crate::error::NodeResult;
use crate::style::{StyleInput, StyleSheet};
use crate::types::NodeType;

// =============================================================================
// Props
// =============================================================================

/// What a reconciler hands over for one instance: its style sheet and its
/// type-specific props.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostProps {
    pub style: StyleSheet,
    pub props: NodeProps,
}

impl HostProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: StyleSheet) -> Self {
        self.style = style;
        self
    }

    pub fn with_props(mut self, props: NodeProps) -> Self {
        self.props = props;
        self
    }

    /// Split a JSON props object into its `style` sheet and the
    /// type-specific remainder. `children` is ignored.
    pub fn from_json(node_type: NodeType, value: &Json) -> NodeResult<Self> {
        let style = match value.get("style") {
            Some(style) => StyleSheet::from_json(style)?,
            None => StyleSheet::new(),
        };
        let rest = match value.as_object() {
            Some(map) => Json::Object(
                map.iter()
                    .filter(|(k, _)| k.as_str() != "style" && k.as_str() != "children")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            None => Json::Object(Default::default()),
        };
        Ok(Self {
            style,
            props: NodeProps::from_json(node_type, &rest)?,
        })
    }
}

// =============================================================================
// Priority
// =============================================================================

/// Update priority lanes a reconciler may ask for.
///
/// The scene schedules everything on one lane; the value is stored so
/// reconcilers that read it back see what they set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum UpdatePriority {
    Discrete = 0,
    Continuous = 1,
    #[default]
    Default = 2,
    Idle = 3,
}

impl UpdatePriority {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Discrete,
            1 => Self::Continuous,
            3 => Self::Idle,
            _ => Self::Default,
        }
    }
}

impl fmt::Display for UpdatePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discrete => "discrete",
            Self::Continuous => "continuous",
            Self::Default => "default",
            Self::Idle => "idle",
        };
        f.write_str(name)
    }
}

// =============================================================================
// HostConfig
// =============================================================================

/// Mutation-mode callbacks.
///
/// Instances and containers are both [`Node`]s; a container is the root
/// node a tree is mounted into. All calls happen on the control thread.
pub trait HostConfig: Send + Sync {
    /// Create a node with its type, props and style applied.
    fn create_instance(&self, type_tag: &str, props: &HostProps) -> NodeResult<Node>;

    /// Raw text is not drawable; text flows through `text` and `paragraph`
    /// nodes instead.
    fn create_text_instance(&self, text: &str) -> Option<Node>;

    fn append_initial_child(&self, parent: &Node, child: &Node) -> NodeResult<()>;

    /// Returns true if the instance wants a `commit_mount` call.
    fn finalize_initial_children(
        &self,
        instance: &Node,
        type_tag: &str,
        props: &HostProps,
    ) -> bool;

    fn should_set_text_content(&self, type_tag: &str, props: &HostProps) -> bool;

    fn append_child(&self, parent: &Node, child: &Node) -> NodeResult<()>;

    fn append_child_to_container(&self, container: &Node, child: &Node) -> NodeResult<()>;

    fn insert_before(&self, parent: &Node, child: &Node, before: &Node) -> NodeResult<()>;

    fn insert_in_container_before(
        &self,
        container: &Node,
        child: &Node,
        before: &Node,
    ) -> NodeResult<()>;

    fn remove_child(&self, parent: &Node, child: &Node) -> NodeResult<()>;

    fn remove_child_from_container(&self, container: &Node, child: &Node) -> NodeResult<()>;

    /// Apply changed props to an existing instance.
    fn commit_update(
        &self,
        instance: &Node,
        type_tag: &str,
        old_props: &HostProps,
        new_props: &HostProps,
    ) -> NodeResult<()>;

    fn commit_mount(&self, _instance: &Node, _type_tag: &str, _props: &HostProps) {}

    fn prepare_for_commit(&self, container: &Node);

    fn reset_after_commit(&self, container: &Node);

    fn clear_container(&self, container: &Node);

    /// A removed instance will not come back: tear it down.
    fn detach_deleted_instance(&self, instance: &Node);

    fn current_update_priority(&self) -> UpdatePriority;

    fn set_current_update_priority(&self, priority: UpdatePriority);

    fn resolve_update_priority(&self) -> UpdatePriority;
}

// =============================================================================
// SceneHostConfig
// =============================================================================

/// Host config over the node tree.
#[derive(Debug)]
pub struct SceneHostConfig {
    priority: AtomicU8,
}

impl Default for SceneHostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHostConfig {
    pub fn new() -> Self {
        Self {
            priority: AtomicU8::new(UpdatePriority::Default as u8),
        }
    }
}

impl HostConfig for SceneHostConfig {
    fn create_instance(&self, type_tag: &str, props: &HostProps) -> NodeResult<Node> {
        let node_type: NodeType = type_tag.parse()?;
        let node = Node::with_type(node_type);
        node.set_props(props.props.clone())?;
        if !props.style.is_empty() {
            node.set_style(&props.style)?;
        }
        Ok(node)
    }

    fn create_text_instance(&self, _text: &str) -> Option<Node> {
        None
    }

    fn append_initial_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        parent.append_child(child)
    }

    fn finalize_initial_children(
        &self,
        _instance: &Node,
        _type_tag: &str,
        _props: &HostProps,
    ) -> bool {
        false
    }

    fn should_set_text_content(&self, _type_tag: &str, _props: &HostProps) -> bool {
        false
    }

    fn append_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        parent.append_child(child)
    }

    fn append_child_to_container(&self, container: &Node, child: &Node) -> NodeResult<()> {
        container.append_child(child)
    }

    fn insert_before(&self, parent: &Node, child: &Node, before: &Node) -> NodeResult<()> {
        parent.insert_before(child, before)
    }

    fn insert_in_container_before(
        &self,
        container: &Node,
        child: &Node,
        before: &Node,
    ) -> NodeResult<()> {
        container.insert_before(child, before)
    }

    fn remove_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        parent.remove_child(child)
    }

    fn remove_child_from_container(&self, container: &Node, child: &Node) -> NodeResult<()> {
        container.remove_child(child)
    }

    fn commit_update(
        &self,
        instance: &Node,
        _type_tag: &str,
        old_props: &HostProps,
        new_props: &HostProps,
    ) -> NodeResult<()> {
        if old_props.style != new_props.style {
            let mut sheet = new_props.style.clone();
            for key in old_props.style.keys() {
                if !new_props.style.contains(key) {
                    sheet.insert(key, StyleInput::Unset);
                }
            }
            instance.set_style(&sheet)?;
        }
        if old_props.props != new_props.props {
            instance.set_props(new_props.props.clone())?;
        }
        Ok(())
    }

    fn prepare_for_commit(&self, _container: &Node) {}

    fn reset_after_commit(&self, _container: &Node) {}

    fn clear_container(&self, container: &Node) {
        container.remove_all_children();
    }

    fn detach_deleted_instance(&self, instance: &Node) {
        instance.dispose();
    }

    fn current_update_priority(&self) -> UpdatePriority {
        UpdatePriority::from_u8(self.priority.load(Ordering::Relaxed))
    }

    fn set_current_update_priority(&self, priority: UpdatePriority) {
        self.priority.store(priority as u8, Ordering::Relaxed);
    }

    fn resolve_update_priority(&self) -> UpdatePriority {
        self.current_update_priority()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use crate::style::{SharedValue, StyleKey, StyleValue};
    use serde_json::json;

    fn rect(style: StyleSheet) -> HostProps {
        HostProps::new().with_style(style)
    }

    #[test]
    fn test_create_instance_applies_everything() {
        let host = SceneHostConfig::new();
        let props = HostProps::from_json(
            NodeType::RRect,
            &json!({"r": 4, "style": {"width": 10, "backgroundColor": "red"}}),
        )
        .unwrap();
        let node = host.create_instance("rrect", &props).unwrap();

        assert_eq!(node.node_type(), Some(NodeType::RRect));
        assert!(matches!(node.props(), NodeProps::RRect { .. }));
        assert_eq!(node.style_value(StyleKey::Width), Some(StyleValue::Number(10.0)));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let host = SceneHostConfig::new();
        assert!(matches!(
            host.create_instance("circle", &HostProps::new()),
            Err(NodeError::UnknownNodeType(_))
        ));
    }

    #[test]
    fn test_text_instances_are_not_drawable() {
        assert!(SceneHostConfig::new().create_text_instance("hello").is_none());
    }

    #[test]
    fn test_commit_update_resets_dropped_keys() {
        let host = SceneHostConfig::new();
        let old = rect(
            StyleSheet::new()
                .with(StyleKey::Width, 10)
                .with(StyleKey::Opacity, 0.5),
        );
        let node = host.create_instance("rect", &old).unwrap();
        let new = rect(StyleSheet::new().with(StyleKey::Width, 20));

        host.commit_update(&node, "rect", &old, &new).unwrap();

        assert_eq!(node.style_value(StyleKey::Width), Some(StyleValue::Number(20.0)));
        assert_eq!(node.style_value(StyleKey::Opacity), None);
        assert_eq!(node.style().paint.opacity, 1.0);
    }

    #[test]
    fn test_commit_update_keeps_same_animated_source() {
        let host = SceneHostConfig::new();
        let width = SharedValue::new(10.0);
        let old = rect(StyleSheet::new().animated(StyleKey::Width, width.clone()));
        let node = host.create_instance("rect", &old).unwrap();
        let new = rect(
            StyleSheet::new()
                .animated(StyleKey::Width, width.clone())
                .with(StyleKey::Height, 5),
        );

        host.commit_update(&node, "rect", &old, &new).unwrap();

        assert_eq!(width.listener_count(), 1);
        width.set(30.0);
        assert_eq!(node.style_value(StyleKey::Width), Some(StyleValue::Number(30.0)));
    }

    #[test]
    fn test_priority_round_trips() {
        let host = SceneHostConfig::new();
        assert_eq!(host.resolve_update_priority(), UpdatePriority::Default);
        host.set_current_update_priority(UpdatePriority::Discrete);
        assert_eq!(host.current_update_priority(), UpdatePriority::Discrete);
    }

    #[test]
    fn test_clear_container_disposes_children() {
        let host = SceneHostConfig::new();
        let container = Node::with_type(NodeType::Group);
        let child = host.create_instance("rect", &HostProps::new()).unwrap();
        host.append_child_to_container(&container, &child).unwrap();

        host.clear_container(&container);

        assert!(container.children().is_empty());
        assert!(child.is_disposed());
    }
}
