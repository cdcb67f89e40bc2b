//! SurfaceView - the declarative canvas component.
//!
//! Owns a root `group` node styled `flex: 1`, mounts element trees into it
//! through the host config, and runs the render loop that keeps presenting
//! the root's picture.

use std::sync::Arc;

use super::bridge::NodeBox;
use super::render_loop::{FrameInfo, RenderLoop, RunId, RunSlot};
use super::scheduler::FrameScheduler;
use super::surface::{DisplaySurface, LatestPicture};
use crate::config::Config;
use crate::engine::Node;
use crate::error::{BridgeError, NodeResult};
use crate::geometry::Size;
use crate::reconciler::{self, Element, MountedTree};
use crate::renderer::{DrawSerializer, Picture};
use crate::style::{StyleKey, StyleSheet};
use crate::types::NodeType;

pub struct SurfaceView {
    root: Node,
    tree: MountedTree,
    slot: RunSlot,
    surface: Arc<LatestPicture>,
    serializer: DrawSerializer,
}

impl SurfaceView {
    pub fn new(config: &Config) -> NodeResult<Self> {
        let root = Node::with_type(NodeType::Group);
        let mut style = StyleSheet::new().with(StyleKey::Flex, 1);
        if let Some(width) = config.default_width {
            style.set(StyleKey::Width, width);
        }
        if let Some(height) = config.default_height {
            style.set(StyleKey::Height, height);
        }
        root.set_style(&style)?;

        let tree = MountedTree::new(reconciler::host_config(config), root.clone());
        Ok(Self {
            root,
            tree,
            slot: RunSlot::new(),
            surface: LatestPicture::new(),
            serializer: DrawSerializer::new(Size::new(config.cull_bounds, config.cull_bounds)),
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn surface(&self) -> &Arc<LatestPicture> {
        &self.surface
    }

    pub fn run_slot(&self) -> &RunSlot {
        &self.slot
    }

    /// Apply the measured size of the host view.
    pub fn resize(&self, width: f32, height: f32) -> NodeResult<()> {
        self.root.set_style(
            &StyleSheet::new()
                .with(StyleKey::Width, width)
                .with(StyleKey::Height, height),
        )?;
        Ok(())
    }

    /// Reconcile `elements` into the root, then draw and present the first
    /// picture synchronously.
    pub fn render(&mut self, elements: &[Element]) -> NodeResult<Arc<Picture>> {
        self.tree.update(elements)?;
        let picture = Arc::new(self.root.draw_with(&self.serializer)?);
        self.surface.present(picture.clone());
        Ok(picture)
    }

    /// Start a render loop under a fresh run id, stopping any previous one.
    pub fn start(&self, scheduler: &dyn FrameScheduler) -> Result<RunId, BridgeError> {
        self.render_loop().start(&self.slot, scheduler)
    }

    /// Like [`start`](Self::start), with a hook run before every frame.
    pub fn start_with(
        &self,
        scheduler: &dyn FrameScheduler,
        on_frame: impl FnMut(&FrameInfo) + Send + 'static,
    ) -> Result<RunId, BridgeError> {
        self.render_loop().on_frame(on_frame).start(&self.slot, scheduler)
    }

    fn render_loop(&self) -> RenderLoop {
        let surface: Arc<dyn DisplaySurface> = self.surface.clone();
        RenderLoop::new(NodeBox::new(&self.root), surface).with_serializer(self.serializer)
    }

    /// Stop the running loop at its next iteration boundary.
    pub fn stop(&self) {
        self.slot.clear();
    }

    pub fn is_running(&self) -> bool {
        self.slot.current().is_some()
    }
}

impl Drop for SurfaceView {
    fn drop(&mut self) {
        self.stop();
        if let Err(err) = self.tree.clear() {
            tracing::warn!(error = %err, "failed to unmount surface view");
        }
        self.root.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ManualFrameScheduler;
    use crate::style::StyleValue;

    fn view() -> SurfaceView {
        let mut view = SurfaceView::new(&Config::default()).unwrap();
        view.resize(200.0, 100.0).unwrap();
        view.render(&[Element::new("rect").style(
            StyleSheet::new()
                .with(StyleKey::Flex, 1)
                .with(StyleKey::BackgroundColor, "red"),
        )])
        .unwrap();
        view
    }

    #[test]
    fn test_render_presents_synchronously() {
        let view = view();
        assert_eq!(view.surface().presented(), 1);

        let child = &view.root().children()[0];
        assert_eq!(child.layout().width, 200.0);
        assert_eq!(child.layout().height, 100.0);
    }

    #[test]
    fn test_default_size_is_overridden_by_resize() {
        let config = Config {
            default_width: Some(50.0),
            default_height: Some(40.0),
            ..Config::default()
        };
        let view = SurfaceView::new(&config).unwrap();
        assert_eq!(view.root().style_value(StyleKey::Width), Some(StyleValue::Number(50.0)));
        assert_eq!(view.root().style_value(StyleKey::Height), Some(StyleValue::Number(40.0)));

        view.resize(300.0, 120.0).unwrap();
        assert_eq!(view.root().style_value(StyleKey::Width), Some(StyleValue::Number(300.0)));
        assert_eq!(view.root().style_value(StyleKey::Height), Some(StyleValue::Number(120.0)));
    }

    #[test]
    fn test_start_and_stop() {
        let view = view();
        let scheduler = ManualFrameScheduler::new();
        let run = view.start(&*scheduler).unwrap();
        assert_eq!(view.run_slot().current(), Some(run));

        scheduler.tick();
        assert_eq!(view.surface().presented(), 2);

        view.stop();
        scheduler.tick();
        assert!(!view.is_running());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(view.surface().presented(), 2);
    }

    #[test]
    fn test_drop_disposes_tree() {
        let view = view();
        let root = view.root().clone();
        let child = root.children()[0].clone();
        drop(view);
        assert!(root.is_disposed());
        assert!(child.is_disposed());
    }
}
