//! Render loop with run-id cancellation.
//!
//! # Lifecycle
//!
//! ```text
//! RunSlot::begin() ─► id A ─► scheduler calls the loop once per frame:
//!     1. stop if the slot no longer holds A
//!     2. run the per-frame hook (animation drivers push values here)
//!     3. unbox the node, draw, present
//!     4. continue only if the slot still holds A
//! ```
//!
//! Starting another run or clearing the slot is the only way to stop a
//! loop. An iteration already past step 1 always completes.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use super::bridge::NodeBox;
use super::scheduler::{FrameControl, FrameScheduler};
use super::surface::DisplaySurface;
use crate::error::BridgeError;
use crate::renderer::DrawSerializer;

// =============================================================================
// Run identifiers
// =============================================================================

/// Identifies one activation of a render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The run id shared between a view and the loop it started.
#[derive(Debug, Clone, Default)]
pub struct RunSlot(Arc<Mutex<Option<RunId>>>);

impl RunSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh id, superseding any running loop.
    pub fn begin(&self) -> RunId {
        let id = RunId::new();
        *self.0.lock() = Some(id);
        id
    }

    /// Stop whichever loop is running.
    pub fn clear(&self) {
        self.0.lock().take();
    }

    /// Clear only if `id` is still the current run.
    pub fn clear_if(&self, id: RunId) -> bool {
        let mut current = self.0.lock();
        if *current == Some(id) {
            *current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<RunId> {
        *self.0.lock()
    }

    pub fn is_current(&self, id: RunId) -> bool {
        *self.0.lock() == Some(id)
    }
}

// =============================================================================
// Render loop
// =============================================================================

/// Passed to the per-frame hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// 1-based frame number within this run.
    pub frame: u64,
    /// Time since the run started.
    pub elapsed: Duration,
}

pub type FrameHook = Box<dyn FnMut(&FrameInfo) + Send>;

/// Counters a running loop updates.
#[derive(Debug, Default)]
pub struct LoopStats {
    frames: AtomicU64,
    failures: AtomicU64,
}

impl LoopStats {
    /// Pictures presented.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Frames whose hook panicked or whose draw failed.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }
}

/// Draws a boxed node every frame and presents the result.
pub struct RenderLoop {
    target: NodeBox,
    surface: Arc<dyn DisplaySurface>,
    serializer: DrawSerializer,
    on_frame: Option<FrameHook>,
    stats: Arc<LoopStats>,
}

impl RenderLoop {
    pub fn new(target: NodeBox, surface: Arc<dyn DisplaySurface>) -> Self {
        Self {
            target,
            surface,
            serializer: DrawSerializer::default(),
            on_frame: None,
            stats: Arc::default(),
        }
    }

    pub fn with_serializer(mut self, serializer: DrawSerializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Run `hook` at the start of every frame, before drawing.
    pub fn on_frame(mut self, hook: impl FnMut(&FrameInfo) + Send + 'static) -> Self {
        self.on_frame = Some(Box::new(hook));
        self
    }

    pub fn stats(&self) -> Arc<LoopStats> {
        self.stats.clone()
    }

    /// Begin a new run in `slot` and hand the loop to `scheduler`.
    ///
    /// Any loop started earlier on the same slot stops at its next
    /// iteration boundary.
    pub fn start(
        self,
        slot: &RunSlot,
        scheduler: &dyn FrameScheduler,
    ) -> Result<RunId, BridgeError> {
        let id = slot.begin();
        let run_slot = slot.clone();
        let Self {
            target,
            surface,
            serializer,
            mut on_frame,
            stats,
        } = self;

        let started = Instant::now();
        let mut frame = 0u64;
        tracing::debug!(run = %id, node = %target.id(), "render loop started");

        let callback = move || {
            if !run_slot.is_current(id) {
                tracing::debug!(run = %id, frames = frame, "render loop superseded");
                return FrameControl::Stop;
            }
            frame += 1;
            let info = FrameInfo {
                frame,
                elapsed: started.elapsed(),
            };

            if let Some(hook) = on_frame.as_mut() {
                let result = panic::catch_unwind(AssertUnwindSafe(|| hook(&info)));
                if result.is_err() {
                    tracing::error!(run = %id, frame, "frame hook panicked");
                    stats.failures.fetch_add(1, Ordering::AcqRel);
                }
            }

            let node = match target.unbox() {
                Ok(node) => node,
                Err(err) => {
                    tracing::debug!(run = %id, error = %err, "render target gone");
                    run_slot.clear_if(id);
                    return FrameControl::Stop;
                }
            };

            match node.draw_with(&serializer) {
                Ok(picture) => {
                    tracing::trace!(run = %id, frame, commands = picture.len(), "frame drawn");
                    surface.present(Arc::new(picture));
                    stats.frames.fetch_add(1, Ordering::AcqRel);
                }
                Err(err) => {
                    tracing::warn!(run = %id, frame, error = %err, "draw failed");
                    stats.failures.fetch_add(1, Ordering::AcqRel);
                }
            }

            if run_slot.is_current(id) {
                FrameControl::Continue
            } else {
                FrameControl::Stop
            }
        };

        match scheduler.schedule(Box::new(callback)) {
            Ok(()) => Ok(id),
            Err(err) => {
                slot.clear_if(id);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Node;
    use crate::pipeline::{LatestPicture, ManualFrameScheduler};
    use crate::style::{StyleKey, StyleSheet};
    use crate::types::NodeType;

    fn scene() -> Node {
        let root = Node::with_type(NodeType::Rect);
        root.set_style(
            &StyleSheet::new()
                .with(StyleKey::Width, 50)
                .with(StyleKey::Height, 50)
                .with(StyleKey::BackgroundColor, "red"),
        )
        .unwrap();
        root
    }

    #[test]
    fn test_run_slot_supersedes() {
        let slot = RunSlot::new();
        let a = slot.begin();
        let b = slot.begin();
        assert_ne!(a, b);
        assert!(!slot.is_current(a));
        assert!(!slot.clear_if(a));
        assert!(slot.clear_if(b));
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn test_loop_presents_each_tick() {
        let node = scene();
        let surface = LatestPicture::new();
        let scheduler = ManualFrameScheduler::new();
        let slot = RunSlot::new();

        let render = RenderLoop::new(NodeBox::new(&node), surface.clone());
        let stats = render.stats();
        render.start(&slot, &*scheduler).unwrap();

        scheduler.tick();
        scheduler.tick();

        assert_eq!(stats.frames(), 2);
        assert_eq!(surface.presented(), 2);
        assert_eq!(surface.latest().unwrap().drawing_count(), 1);
    }

    #[test]
    fn test_new_run_cancels_old() {
        let node = scene();
        let surface = LatestPicture::new();
        let scheduler = ManualFrameScheduler::new();
        let slot = RunSlot::new();

        let first = RenderLoop::new(NodeBox::new(&node), surface.clone());
        let first_stats = first.stats();
        first.start(&slot, &*scheduler).unwrap();
        scheduler.tick();

        RenderLoop::new(NodeBox::new(&node), surface.clone())
            .start(&slot, &*scheduler)
            .unwrap();
        scheduler.tick();

        assert_eq!(first_stats.frames(), 1);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_panicking_hook_does_not_stop_loop() {
        let node = scene();
        let scheduler = ManualFrameScheduler::new();
        let slot = RunSlot::new();

        let render = RenderLoop::new(NodeBox::new(&node), LatestPicture::new()).on_frame(|info| {
            if info.frame == 1 {
                panic!("driver failed");
            }
        });
        let stats = render.stats();
        render.start(&slot, &*scheduler).unwrap();

        scheduler.tick();
        scheduler.tick();

        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.frames(), 2);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_disposed_target_stops_and_clears() {
        let node = scene();
        let scheduler = ManualFrameScheduler::new();
        let slot = RunSlot::new();

        RenderLoop::new(NodeBox::new(&node), LatestPicture::new())
            .start(&slot, &*scheduler)
            .unwrap();
        node.dispose();
        scheduler.tick();

        assert_eq!(scheduler.pending(), 0);
        assert_eq!(slot.current(), None);
    }
}
