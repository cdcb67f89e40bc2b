//! Renderer - the "blind" recording layer.
//!
//! The renderer knows nothing about reconciliation or animated values. It
//! walks a laid-out node tree and records what each node paints into an
//! immutable [`Picture`], which a display surface plays back onto its own
//! canvas.
//!
//! - [`DrawSerializer`]: tree walk producing a picture
//! - [`Picture`] / [`DrawCommand`]: the recorded command list
//! - [`Canvas`]: playback target implemented by the host's backend
//! - [`Paint`] / [`ClipShape`]: paint and clip descriptions

mod paint;
mod picture;
mod serializer;

pub use paint::{ClipOp, ClipShape, Paint, PaintMode};
pub use picture::{Canvas, DrawCommand, FlatDraw, Picture};
pub use serializer::{fit_rects, DrawSerializer, DEFAULT_CULL_SIZE};
