//! Element descriptions and a positional reconciler over a [`HostConfig`].
//!
//! [`MountedTree`] keeps the last description it committed and, on each
//! [`MountedTree::update`], walks old and new children side by side:
//!
//! - same type and key at the same position: `commit_update`, recurse
//! - otherwise: build the new subtree, insert it before the old one,
//!   remove and detach the old one
//! - trailing old children: remove and detach
//!
//! Keys only guard identity; moving a keyed element rebuilds it.

use std::sync::Arc;

use super::host_config::{HostConfig, HostProps};
use crate::engine::{Node, NodeProps};
use crate::error::{NodeError, NodeResult};
use crate::style::StyleSheet;

// =============================================================================
// Element
// =============================================================================

/// A host element: type tag, props and children.
#[derive(Debug, Clone, PartialEq)]
pub struct HostElement {
    pub type_tag: String,
    pub key: Option<String>,
    pub props: HostProps,
    pub children: Vec<Element>,
}

/// One entry of a declarative description.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Host(HostElement),
    /// Raw text. Has no node; use a `text` element to draw text.
    Text(String),
}

impl Element {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self::Host(HostElement {
            type_tag: type_tag.into(),
            key: None,
            props: HostProps::default(),
            children: Vec::new(),
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn map_host(mut self, f: impl FnOnce(&mut HostElement)) -> Self {
        if let Self::Host(host) = &mut self {
            f(host);
        }
        self
    }

    pub fn key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.map_host(|h| h.key = Some(key))
    }

    pub fn style(self, style: StyleSheet) -> Self {
        self.map_host(|h| h.props.style = style)
    }

    pub fn props(self, props: NodeProps) -> Self {
        self.map_host(|h| h.props.props = props)
    }

    pub fn child(self, child: Element) -> Self {
        self.map_host(|h| h.children.push(child))
    }

    pub fn children(self, children: impl IntoIterator<Item = Element>) -> Self {
        self.map_host(|h| h.children.extend(children))
    }
}

// =============================================================================
// Mounted tree
// =============================================================================

#[derive(Debug)]
enum Mounted {
    Host {
        type_tag: String,
        key: Option<String>,
        props: HostProps,
        node: Node,
        children: Vec<Mounted>,
    },
    Text(String),
}

impl Mounted {
    fn node(&self) -> Option<&Node> {
        match self {
            Self::Host { node, .. } => Some(node),
            Self::Text(_) => None,
        }
    }
}

/// Where a child list lives: directly in the container or under a node.
#[derive(Clone, Copy)]
enum Parent<'a> {
    Container(&'a Node),
    Instance(&'a Node),
}

/// A description committed into a container node.
pub struct MountedTree {
    host: Arc<dyn HostConfig>,
    container: Node,
    children: Vec<Mounted>,
}

impl MountedTree {
    pub fn new(host: Arc<dyn HostConfig>, container: Node) -> Self {
        Self {
            host,
            container,
            children: Vec::new(),
        }
    }

    pub fn container(&self) -> &Node {
        &self.container
    }

    pub fn host(&self) -> &Arc<dyn HostConfig> {
        &self.host
    }

    /// Run one reconciliation pass against `elements`.
    ///
    /// On error the pass stops. Everything still attached stays tracked, so
    /// a later pass can update or remove it.
    pub fn update(&mut self, elements: &[Element]) -> NodeResult<()> {
        self.host.prepare_for_commit(&self.container);
        let old = std::mem::take(&mut self.children);
        let result = reconcile(
            self.host.as_ref(),
            Parent::Container(&self.container),
            old,
            elements,
        );
        self.host.reset_after_commit(&self.container);
        let (children, outcome) = result;
        self.children = children;
        outcome
    }

    /// Unmount everything and clear the container.
    pub fn clear(&mut self) -> NodeResult<()> {
        let outcome = self.update(&[]);
        self.host.clear_container(&self.container);
        outcome
    }
}

/// Entries still attached after a failed step, so the tree keeps tracking them.
type Failed = (Vec<Mounted>, NodeError);

fn reconcile(
    host: &dyn HostConfig,
    parent: Parent<'_>,
    old: Vec<Mounted>,
    elements: &[Element],
) -> (Vec<Mounted>, NodeResult<()>) {
    let mut next = Vec::with_capacity(elements.len());
    let mut old = old.into_iter();

    for element in elements {
        let previous = old.next();
        // A replacement goes where the old slot was; raw text has no node,
        // so fall back to the next old sibling that does.
        let anchor = previous
            .as_ref()
            .and_then(Mounted::node)
            .or_else(|| old.as_slice().iter().find_map(Mounted::node))
            .cloned();

        match reconcile_one(host, parent, previous, element, anchor.as_ref()) {
            Ok(mounted) => next.push(mounted),
            Err((kept, err)) => {
                next.extend(kept);
                next.extend(old);
                return (next, Err(err));
            }
        }
    }

    while let Some(stale) = old.next() {
        if let Err(err) = unmount(host, parent, &stale) {
            next.push(stale);
            next.extend(old);
            return (next, Err(err));
        }
    }
    (next, Ok(()))
}

fn reconcile_one(
    host: &dyn HostConfig,
    parent: Parent<'_>,
    previous: Option<Mounted>,
    element: &Element,
    anchor: Option<&Node>,
) -> Result<Mounted, Failed> {
    match (previous, element) {
        (
            Some(Mounted::Host {
                type_tag,
                key,
                props,
                node,
                children,
            }),
            Element::Host(next),
        ) if type_tag == next.type_tag && key == next.key => {
            if props != next.props {
                if let Err(err) = host.commit_update(&node, &type_tag, &props, &next.props) {
                    let kept = Mounted::Host {
                        type_tag,
                        key,
                        props,
                        node,
                        children,
                    };
                    return Err((vec![kept], err));
                }
            }
            let (children, outcome) =
                reconcile(host, Parent::Instance(&node), children, &next.children);
            let mounted = Mounted::Host {
                type_tag,
                key,
                props: next.props.clone(),
                node,
                children,
            };
            match outcome {
                Ok(()) => Ok(mounted),
                Err(err) => Err((vec![mounted], err)),
            }
        }
        (previous, element) => replace(host, parent, previous, element, anchor),
    }
}

/// Build `element`, insert it before `anchor` (or append), then unmount
/// `previous`.
fn replace(
    host: &dyn HostConfig,
    parent: Parent<'_>,
    previous: Option<Mounted>,
    element: &Element,
    anchor: Option<&Node>,
) -> Result<Mounted, Failed> {
    let mounted = match build(host, element) {
        Ok(mounted) => mounted,
        Err(err) => return Err((previous.into_iter().collect(), err)),
    };
    if let Some(node) = mounted.node() {
        let attached = match anchor {
            Some(before) => insert_before(host, parent, node, before),
            None => append(host, parent, node),
        };
        if let Err(err) = attached {
            host.detach_deleted_instance(node);
            return Err((previous.into_iter().collect(), err));
        }
    }
    if let Some(previous) = previous {
        if let Err(err) = unmount(host, parent, &previous) {
            return Err((vec![mounted, previous], err));
        }
    }
    Ok(mounted)
}

/// Create a detached subtree for `element`.
fn build(host: &dyn HostConfig, element: &Element) -> NodeResult<Mounted> {
    let next = match element {
        Element::Host(next) => next,
        Element::Text(text) => {
            // No drawable node for raw text
            let _ = host.create_text_instance(text);
            return Ok(Mounted::Text(text.clone()));
        }
    };

    let node = host.create_instance(&next.type_tag, &next.props)?;
    let mut children = Vec::with_capacity(next.children.len());
    for child in &next.children {
        let mounted = build(host, child)?;
        if let Some(child_node) = mounted.node() {
            host.append_initial_child(&node, child_node)?;
        }
        children.push(mounted);
    }
    if host.finalize_initial_children(&node, &next.type_tag, &next.props) {
        host.commit_mount(&node, &next.type_tag, &next.props);
    }

    Ok(Mounted::Host {
        type_tag: next.type_tag.clone(),
        key: next.key.clone(),
        props: next.props.clone(),
        node,
        children,
    })
}

fn append(host: &dyn HostConfig, parent: Parent<'_>, child: &Node) -> NodeResult<()> {
    match parent {
        Parent::Container(container) => host.append_child_to_container(container, child),
        Parent::Instance(node) => host.append_child(node, child),
    }
}

fn insert_before(
    host: &dyn HostConfig,
    parent: Parent<'_>,
    child: &Node,
    before: &Node,
) -> NodeResult<()> {
    match parent {
        Parent::Container(container) => host.insert_in_container_before(container, child, before),
        Parent::Instance(node) => host.insert_before(node, child, before),
    }
}

fn unmount(host: &dyn HostConfig, parent: Parent<'_>, mounted: &Mounted) -> NodeResult<()> {
    let Some(node) = mounted.node() else {
        return Ok(());
    };
    match parent {
        Parent::Container(container) => host.remove_child_from_container(container, node)?,
        Parent::Instance(parent) => host.remove_child(parent, node)?,
    }
    host.detach_deleted_instance(node);
    Ok(())
}
