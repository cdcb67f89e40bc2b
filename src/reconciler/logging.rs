//! Logging decorator over any [`HostConfig`].
//!
//! Every callback is traced at debug level under the `flexcanvas::host`
//! target before being forwarded, so a reconciliation pass can be followed
//! call by call with `FLEXCANVAS_LOG=flexcanvas::host=debug`.

use super::host_config::{HostConfig, HostProps, UpdatePriority};
use crate::engine::Node;
use crate::error::NodeResult;

const TARGET: &str = "flexcanvas::host";

/// Wraps a host config and traces each call.
#[derive(Debug, Default)]
pub struct LoggingHostConfig<H> {
    inner: H,
}

impl<H: HostConfig> LoggingHostConfig<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

/// Trace the outcome of a fallible call.
fn traced<T>(call: &'static str, result: NodeResult<T>) -> NodeResult<T> {
    if let Err(err) = &result {
        tracing::debug!(target: TARGET, call, error = %err, "host call failed");
    }
    result
}

impl<H: HostConfig> HostConfig for LoggingHostConfig<H> {
    fn create_instance(&self, type_tag: &str, props: &HostProps) -> NodeResult<Node> {
        let result = traced("createInstance", self.inner.create_instance(type_tag, props));
        if let Ok(node) = &result {
            tracing::debug!(
                target: TARGET,
                node = %node.id(),
                type_tag,
                style_fields = props.style.len(),
                "createInstance"
            );
        }
        result
    }

    fn create_text_instance(&self, text: &str) -> Option<Node> {
        tracing::debug!(target: TARGET, text, "createTextInstance");
        self.inner.create_text_instance(text)
    }

    fn append_initial_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        tracing::debug!(target: TARGET, parent = %parent.id(), child = %child.id(), "appendInitialChild");
        traced("appendInitialChild", self.inner.append_initial_child(parent, child))
    }

    fn finalize_initial_children(
        &self,
        instance: &Node,
        type_tag: &str,
        props: &HostProps,
    ) -> bool {
        tracing::debug!(target: TARGET, node = %instance.id(), type_tag, "finalizeInitialChildren");
        self.inner.finalize_initial_children(instance, type_tag, props)
    }

    fn should_set_text_content(&self, type_tag: &str, props: &HostProps) -> bool {
        self.inner.should_set_text_content(type_tag, props)
    }

    fn append_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        tracing::debug!(target: TARGET, parent = %parent.id(), child = %child.id(), "appendChild");
        traced("appendChild", self.inner.append_child(parent, child))
    }

    fn append_child_to_container(&self, container: &Node, child: &Node) -> NodeResult<()> {
        tracing::debug!(target: TARGET, container = %container.id(), child = %child.id(), "appendChildToContainer");
        traced(
            "appendChildToContainer",
            self.inner.append_child_to_container(container, child),
        )
    }

    fn insert_before(&self, parent: &Node, child: &Node, before: &Node) -> NodeResult<()> {
        tracing::debug!(
            target: TARGET,
            parent = %parent.id(),
            child = %child.id(),
            before = %before.id(),
            "insertBefore"
        );
        traced("insertBefore", self.inner.insert_before(parent, child, before))
    }

    fn insert_in_container_before(
        &self,
        container: &Node,
        child: &Node,
        before: &Node,
    ) -> NodeResult<()> {
        tracing::debug!(
            target: TARGET,
            container = %container.id(),
            child = %child.id(),
            before = %before.id(),
            "insertInContainerBefore"
        );
        traced(
            "insertInContainerBefore",
            self.inner.insert_in_container_before(container, child, before),
        )
    }

    fn remove_child(&self, parent: &Node, child: &Node) -> NodeResult<()> {
        tracing::debug!(target: TARGET, parent = %parent.id(), child = %child.id(), "removeChild");
        traced("removeChild", self.inner.remove_child(parent, child))
    }

    fn remove_child_from_container(&self, container: &Node, child: &Node) -> NodeResult<()> {
        tracing::debug!(target: TARGET, container = %container.id(), child = %child.id(), "removeChildFromContainer");
        traced(
            "removeChildFromContainer",
            self.inner.remove_child_from_container(container, child),
        )
    }

    fn commit_update(
        &self,
        instance: &Node,
        type_tag: &str,
        old_props: &HostProps,
        new_props: &HostProps,
    ) -> NodeResult<()> {
        tracing::debug!(target: TARGET, node = %instance.id(), type_tag, "commitUpdate");
        traced(
            "commitUpdate",
            self.inner.commit_update(instance, type_tag, old_props, new_props),
        )
    }

    fn commit_mount(&self, instance: &Node, type_tag: &str, props: &HostProps) {
        tracing::debug!(target: TARGET, node = %instance.id(), type_tag, "commitMount");
        self.inner.commit_mount(instance, type_tag, props);
    }

    fn prepare_for_commit(&self, container: &Node) {
        tracing::debug!(target: TARGET, container = %container.id(), "prepareForCommit");
        self.inner.prepare_for_commit(container);
    }

    fn reset_after_commit(&self, container: &Node) {
        tracing::debug!(target: TARGET, container = %container.id(), "resetAfterCommit");
        self.inner.reset_after_commit(container);
    }

    fn clear_container(&self, container: &Node) {
        tracing::debug!(target: TARGET, container = %container.id(), "clearContainer");
        self.inner.clear_container(container);
    }

    fn detach_deleted_instance(&self, instance: &Node) {
        tracing::debug!(target: TARGET, node = %instance.id(), "detachDeletedInstance");
        self.inner.detach_deleted_instance(instance);
    }

    fn current_update_priority(&self) -> UpdatePriority {
        self.inner.current_update_priority()
    }

    fn set_current_update_priority(&self, priority: UpdatePriority) {
        tracing::debug!(target: TARGET, %priority, "setCurrentUpdatePriority");
        self.inner.set_current_update_priority(priority);
    }

    fn resolve_update_priority(&self) -> UpdatePriority {
        self.inner.resolve_update_priority()
    }
}
