//! Pipeline - moving a node tree from the control context to the screen.
//!
//! ```text
//! control context                      render context
//! ───────────────                      ──────────────
//! SurfaceView::render                  FrameScheduler tick
//!   MountedTree::update                  RenderLoop iteration
//!   Node::draw ─► present                  run id still current?
//! SurfaceView::start ─► NodeBox ───────►   on_frame hook
//!                                          NodeBox::unbox ─► draw
//!                                          DisplaySurface::present
//! SurfaceView::stop ─► RunSlot::clear ─►   stops at next boundary
//! ```
//!
//! [`Installer`] is the platform lifecycle around all of this; it does not
//! take part in drawing.

mod bridge;
mod install;
mod render_loop;
mod scheduler;
mod surface;
mod view;

pub use bridge::NodeBox;
pub use install::{Capabilities, Capability, CapabilityProvider, Installer, Module};
pub use render_loop::{FrameHook, FrameInfo, LoopStats, RenderLoop, RunId, RunSlot};
pub use scheduler::{
    FrameCallback, FrameControl, FrameScheduler, ManualFrameScheduler, ThreadFrameScheduler,
};
pub use surface::{DisplaySurface, LatestPicture};
pub use view::SurfaceView;
