//! Node styles.
//!
//! A style sheet is a map from [`StyleKey`] to a plain value, an animated
//! value, or an explicit reset. The [`StyleResolver`] merges sheets into a
//! node's [`ResolvedStyle`], which splits into layout fields (read by the
//! layout adapter) and paint fields (read by the draw serializer).
//!
//! # Example
//!
//! ```
//! use flexcanvas::style::{StyleKey, StyleSheet};
//!
//! let sheet = StyleSheet::new()
//!     .with(StyleKey::Width, 100)
//!     .with(StyleKey::BackgroundColor, "cyan");
//! assert!(sheet.touches_layout());
//! ```

mod animated;
mod key;
mod layout_style;
mod paint_style;
mod resolver;
mod transform;
mod value;

pub use animated::{AnimatedValue, Listener, ListenerId, SharedValue, Subscription};
pub use key::{KeyClass, StyleKey};
pub use layout_style::{Edges, LayoutStyle, ResolvedEdges};
pub use paint_style::{PaintStyle, TransformSource};
pub use resolver::{
    FieldSubscription, FieldSubscriptions, ResolvedStyle, StyleChange, StyleResolver,
    SubscriptionToken,
};
pub use transform::{around_origin, compose_transform, TransformOp};
pub use value::{StyleInput, StyleSheet, StyleValue};
