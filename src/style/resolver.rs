//! StyleResolver - merges incoming style sheets into a node's style.
//!
//! Plain values are converted and stored. Animated values contribute their
//! current snapshot and get a listener bound to the field; when the value
//! changes later, the listener patches that single field through
//! [`StyleResolver::apply_animated`].
//!
//! A merge is atomic: every field is converted on a copy of the style and
//! the copy is committed only if all of them succeed. Subscriptions opened
//! by a failed merge are dropped, which unregisters them.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use super::animated::{Listener, Subscription};
use super::key::StyleKey;
use super::layout_style::LayoutStyle;
use super::paint_style::{PaintStyle, TransformSource};
use super::value::{StyleInput, StyleSheet, StyleValue};
use crate::error::StyleError;
use crate::geometry::{Path, Radius};
use crate::renderer::{ClipShape, Paint};
use crate::types::{
    Align, BlendMode, BoxSizing, Dimension, Direction, Display, FlexDirection, FlexWrap,
    JustifyContent, Overflow, Position, Rgba, StrokeCap, StrokeJoin,
};

// =============================================================================
// Field subscriptions
// =============================================================================

/// Distinguishes successive subscriptions of the same field, so a listener
/// from a replaced subscription can never overwrite the field.
pub type SubscriptionToken = u64;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// The live subscription behind one animated field.
#[derive(Debug)]
pub struct FieldSubscription {
    pub token: SubscriptionToken,
    pub subscription: Subscription,
}

/// Animated fields of one node, keyed by field.
pub type FieldSubscriptions = HashMap<StyleKey, FieldSubscription>;

/// Which classes of fields a merge touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleChange {
    pub layout: bool,
    pub paint: bool,
}

impl StyleChange {
    fn record(&mut self, key: StyleKey) {
        if key.is_layout() {
            self.layout = true;
        } else {
            self.paint = true;
        }
        // borderWidth doubles as the stroke width
        if key == StyleKey::BorderWidth {
            self.paint = true;
        }
    }

    pub fn for_key(key: StyleKey) -> Self {
        let mut change = Self::default();
        change.record(key);
        change
    }

    pub fn is_empty(&self) -> bool {
        !self.layout && !self.paint
    }
}

// =============================================================================
// ResolvedStyle
// =============================================================================

/// The effective style of a node: typed layout and paint fields plus the
/// effective value of every field that is currently set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    pub layout: LayoutStyle,
    pub paint: PaintStyle,
    values: BTreeMap<StyleKey, StyleValue>,
}

impl ResolvedStyle {
    /// Effective value of a field, if set.
    pub fn value(&self, key: StyleKey) -> Option<&StyleValue> {
        self.values.get(&key)
    }

    /// Keys that currently carry a value.
    pub fn keys(&self) -> impl Iterator<Item = StyleKey> + '_ {
        self.values.keys().copied()
    }

    /// Set (`Some`) or reset (`None`) one field.
    pub fn apply(&mut self, key: StyleKey, value: Option<&StyleValue>) -> Result<(), StyleError> {
        match value {
            Some(v) => {
                self.apply_value(key, v)?;
                self.values.insert(key, v.clone());
            }
            None => {
                self.values.remove(&key);
                self.reset(key);
            }
        }
        Ok(())
    }

    fn apply_value(&mut self, key: StyleKey, v: &StyleValue) -> Result<(), StyleError> {
        use StyleKey as K;

        let layout = &mut self.layout;
        let paint = &mut self.paint;
        match key {
            K::AlignContent => layout.align_content = keyword(key, v, Align::from_keyword)?,
            K::AlignItems => layout.align_items = keyword(key, v, Align::from_keyword)?,
            K::AlignSelf => layout.align_self = keyword(key, v, Align::from_keyword)?,
            K::JustifyContent => {
                layout.justify_content = keyword(key, v, JustifyContent::from_keyword)?
            }
            K::FlexDirection => {
                layout.flex_direction = keyword(key, v, FlexDirection::from_keyword)?
            }
            K::FlexWrap => layout.flex_wrap = keyword(key, v, FlexWrap::from_keyword)?,
            K::Gap => layout.gap = Some(number(key, v)?),
            K::RowGap => layout.row_gap = Some(number(key, v)?),
            K::ColumnGap => layout.column_gap = Some(number(key, v)?),

            K::Flex => layout.flex = Some(number(key, v)?),
            K::FlexGrow => layout.flex_grow = Some(number(key, v)?),
            K::FlexShrink => layout.flex_shrink = Some(number(key, v)?),
            K::FlexBasis => layout.flex_basis = dimension(key, v)?,

            K::Display => layout.display = keyword(key, v, Display::from_keyword)?,
            K::Direction => layout.direction = keyword(key, v, Direction::from_keyword)?,
            K::Position => layout.position = keyword(key, v, Position::from_keyword)?,
            K::Overflow => layout.overflow = keyword(key, v, Overflow::from_keyword)?,
            K::BoxSizing => layout.box_sizing = keyword(key, v, BoxSizing::from_keyword)?,

            K::Width => layout.width = dimension(key, v)?,
            K::Height => layout.height = dimension(key, v)?,
            K::MinWidth => layout.min_width = length(key, v)?,
            K::MinHeight => layout.min_height = length(key, v)?,
            K::MaxWidth => layout.max_width = length(key, v)?,
            K::MaxHeight => layout.max_height = length(key, v)?,
            K::AspectRatio => layout.aspect_ratio = Some(number(key, v)?),

            K::Top => layout.inset.top = Some(length(key, v)?),
            K::Right => layout.inset.right = Some(length(key, v)?),
            K::Bottom => layout.inset.bottom = Some(length(key, v)?),
            K::Left => layout.inset.left = Some(length(key, v)?),
            K::Start => layout.inset.start = Some(length(key, v)?),
            K::End => layout.inset.end = Some(length(key, v)?),
            K::Inset => layout.inset.all = Some(length(key, v)?),
            K::InsetHorizontal => layout.inset.horizontal = Some(length(key, v)?),
            K::InsetVertical => layout.inset.vertical = Some(length(key, v)?),

            K::Margin => layout.margin.all = Some(dimension(key, v)?),
            K::MarginTop => layout.margin.top = Some(dimension(key, v)?),
            K::MarginRight => layout.margin.right = Some(dimension(key, v)?),
            K::MarginBottom => layout.margin.bottom = Some(dimension(key, v)?),
            K::MarginLeft => layout.margin.left = Some(dimension(key, v)?),
            K::MarginStart => layout.margin.start = Some(dimension(key, v)?),
            K::MarginEnd => layout.margin.end = Some(dimension(key, v)?),
            K::MarginHorizontal => layout.margin.horizontal = Some(dimension(key, v)?),
            K::MarginVertical => layout.margin.vertical = Some(dimension(key, v)?),

            K::Padding => layout.padding.all = Some(length(key, v)?),
            K::PaddingTop => layout.padding.top = Some(length(key, v)?),
            K::PaddingRight => layout.padding.right = Some(length(key, v)?),
            K::PaddingBottom => layout.padding.bottom = Some(length(key, v)?),
            K::PaddingLeft => layout.padding.left = Some(length(key, v)?),
            K::PaddingStart => layout.padding.start = Some(length(key, v)?),
            K::PaddingEnd => layout.padding.end = Some(length(key, v)?),
            K::PaddingHorizontal => layout.padding.horizontal = Some(length(key, v)?),
            K::PaddingVertical => layout.padding.vertical = Some(length(key, v)?),

            K::BorderWidth => {
                let w = number(key, v)?;
                layout.border.all = Some(w);
                paint.paint.stroke_width = w;
            }
            K::BorderTopWidth => layout.border.top = Some(number(key, v)?),
            K::BorderRightWidth => layout.border.right = Some(number(key, v)?),
            K::BorderBottomWidth => layout.border.bottom = Some(number(key, v)?),
            K::BorderLeftWidth => layout.border.left = Some(number(key, v)?),
            K::BorderStartWidth => layout.border.start = Some(number(key, v)?),
            K::BorderEndWidth => layout.border.end = Some(number(key, v)?),
            K::BorderHorizontalWidth => layout.border.horizontal = Some(number(key, v)?),
            K::BorderVerticalWidth => layout.border.vertical = Some(number(key, v)?),

            K::BackgroundColor => match v {
                StyleValue::Paint(p) => paint.paint = p.clone(),
                other => paint.paint.color = color(key, other)?,
            },
            K::Opacity => paint.opacity = number(key, v)?.clamp(0.0, 1.0),
            K::BlendMode => paint.paint.blend_mode = keyword(key, v, BlendMode::from_keyword)?,
            K::AntiAlias => paint.paint.anti_alias = boolean(key, v)?,
            K::Dither => paint.paint.dither = boolean(key, v)?,
            K::StrokeCap => paint.paint.stroke_cap = keyword(key, v, StrokeCap::from_keyword)?,
            K::StrokeJoin => {
                paint.paint.stroke_join = keyword(key, v, StrokeJoin::from_keyword)?
            }
            K::StrokeMiter => paint.paint.stroke_miter = number(key, v)?,
            K::BorderRadius => paint.border_radius = Some(number(key, v)?),
            K::BorderTopLeftRadius => paint.corner_radii[0] = Some(radius(key, v)?),
            K::BorderTopRightRadius => paint.corner_radii[1] = Some(radius(key, v)?),
            K::BorderBottomRightRadius => paint.corner_radii[2] = Some(radius(key, v)?),
            K::BorderBottomLeftRadius => paint.corner_radii[3] = Some(radius(key, v)?),
            K::Transform => match v {
                StyleValue::Transform(ops) => paint.transform = TransformSource::List(ops.clone()),
                other => return Err(invalid(key, "a transform list", other)),
            },
            K::Matrix => match v {
                StyleValue::Matrix(m) => paint.transform = TransformSource::Matrix(*m),
                other => return Err(invalid(key, "a matrix", other)),
            },
            K::Origin => match v {
                StyleValue::Point(p) => paint.origin = Some(*p),
                other => return Err(invalid(key, "a point", other)),
            },
            K::Clip => {
                paint.clip = Some(match v {
                    StyleValue::Clip(shape) => shape.clone(),
                    StyleValue::String(svg) => ClipShape::Path(
                        Path::from_svg(svg).ok_or_else(|| invalid(key, "SVG path data", v))?,
                    ),
                    other => return Err(invalid(key, "a clip shape", other)),
                })
            }
            K::InvertClip => paint.invert_clip = boolean(key, v)?,
            K::Layer => {
                paint.layer = Some(match v {
                    StyleValue::Paint(p) => p.clone(),
                    other => Paint::fill(color(key, other)?),
                })
            }
        }
        Ok(())
    }

    fn reset(&mut self, key: StyleKey) {
        use StyleKey as K;

        let d = LayoutStyle::default();
        let dp = PaintStyle::default();
        let layout = &mut self.layout;
        let paint = &mut self.paint;
        match key {
            K::AlignContent => layout.align_content = d.align_content,
            K::AlignItems => layout.align_items = d.align_items,
            K::AlignSelf => layout.align_self = d.align_self,
            K::JustifyContent => layout.justify_content = d.justify_content,
            K::FlexDirection => layout.flex_direction = d.flex_direction,
            K::FlexWrap => layout.flex_wrap = d.flex_wrap,
            K::Gap => layout.gap = None,
            K::RowGap => layout.row_gap = None,
            K::ColumnGap => layout.column_gap = None,
            K::Flex => layout.flex = None,
            K::FlexGrow => layout.flex_grow = None,
            K::FlexShrink => layout.flex_shrink = None,
            K::FlexBasis => layout.flex_basis = d.flex_basis,
            K::Display => layout.display = d.display,
            K::Direction => layout.direction = d.direction,
            K::Position => layout.position = d.position,
            K::Overflow => layout.overflow = d.overflow,
            K::BoxSizing => layout.box_sizing = d.box_sizing,
            K::Width => layout.width = d.width,
            K::Height => layout.height = d.height,
            K::MinWidth => layout.min_width = d.min_width,
            K::MinHeight => layout.min_height = d.min_height,
            K::MaxWidth => layout.max_width = d.max_width,
            K::MaxHeight => layout.max_height = d.max_height,
            K::AspectRatio => layout.aspect_ratio = None,
            K::Top => layout.inset.top = None,
            K::Right => layout.inset.right = None,
            K::Bottom => layout.inset.bottom = None,
            K::Left => layout.inset.left = None,
            K::Start => layout.inset.start = None,
            K::End => layout.inset.end = None,
            K::Inset => layout.inset.all = None,
            K::InsetHorizontal => layout.inset.horizontal = None,
            K::InsetVertical => layout.inset.vertical = None,
            K::Margin => layout.margin.all = None,
            K::MarginTop => layout.margin.top = None,
            K::MarginRight => layout.margin.right = None,
            K::MarginBottom => layout.margin.bottom = None,
            K::MarginLeft => layout.margin.left = None,
            K::MarginStart => layout.margin.start = None,
            K::MarginEnd => layout.margin.end = None,
            K::MarginHorizontal => layout.margin.horizontal = None,
            K::MarginVertical => layout.margin.vertical = None,
            K::Padding => layout.padding.all = None,
            K::PaddingTop => layout.padding.top = None,
            K::PaddingRight => layout.padding.right = None,
            K::PaddingBottom => layout.padding.bottom = None,
            K::PaddingLeft => layout.padding.left = None,
            K::PaddingStart => layout.padding.start = None,
            K::PaddingEnd => layout.padding.end = None,
            K::PaddingHorizontal => layout.padding.horizontal = None,
            K::PaddingVertical => layout.padding.vertical = None,
            K::BorderWidth => {
                layout.border.all = None;
                paint.paint.stroke_width = dp.paint.stroke_width;
            }
            K::BorderTopWidth => layout.border.top = None,
            K::BorderRightWidth => layout.border.right = None,
            K::BorderBottomWidth => layout.border.bottom = None,
            K::BorderLeftWidth => layout.border.left = None,
            K::BorderStartWidth => layout.border.start = None,
            K::BorderEndWidth => layout.border.end = None,
            K::BorderHorizontalWidth => layout.border.horizontal = None,
            K::BorderVerticalWidth => layout.border.vertical = None,
            K::BackgroundColor => paint.paint.color = dp.paint.color,
            K::Opacity => paint.opacity = dp.opacity,
            K::BlendMode => paint.paint.blend_mode = dp.paint.blend_mode,
            K::AntiAlias => paint.paint.anti_alias = dp.paint.anti_alias,
            K::Dither => paint.paint.dither = dp.paint.dither,
            K::StrokeCap => paint.paint.stroke_cap = dp.paint.stroke_cap,
            K::StrokeJoin => paint.paint.stroke_join = dp.paint.stroke_join,
            K::StrokeMiter => paint.paint.stroke_miter = dp.paint.stroke_miter,
            K::BorderRadius => paint.border_radius = None,
            K::BorderTopLeftRadius => paint.corner_radii[0] = None,
            K::BorderTopRightRadius => paint.corner_radii[1] = None,
            K::BorderBottomRightRadius => paint.corner_radii[2] = None,
            K::BorderBottomLeftRadius => paint.corner_radii[3] = None,
            // Fall back to whichever transform field is still set
            K::Transform | K::Matrix => {
                paint.transform = match (self.values.get(&K::Matrix), self.values.get(&K::Transform)) {
                    (Some(StyleValue::Matrix(m)), _) => TransformSource::Matrix(*m),
                    (_, Some(StyleValue::Transform(ops))) => TransformSource::List(ops.clone()),
                    _ => TransformSource::None,
                }
            }
            K::Origin => paint.origin = None,
            K::Clip => paint.clip = None,
            K::InvertClip => paint.invert_clip = false,
            K::Layer => paint.layer = None,
        }
    }
}

// =============================================================================
// Value conversion
// =============================================================================

fn invalid(key: StyleKey, expected: &'static str, found: &StyleValue) -> StyleError {
    StyleError::InvalidValue {
        key: key.name(),
        expected,
        found: format!("{} {:?}", found.kind(), found),
    }
}

fn number(key: StyleKey, v: &StyleValue) -> Result<f32, StyleError> {
    v.as_number().ok_or_else(|| invalid(key, "a number", v))
}

fn boolean(key: StyleKey, v: &StyleValue) -> Result<bool, StyleError> {
    match v {
        StyleValue::Bool(b) => Ok(*b),
        other => Err(invalid(key, "a boolean", other)),
    }
}

/// Number, percentage string or `"auto"`.
fn dimension(key: StyleKey, v: &StyleValue) -> Result<Dimension, StyleError> {
    match v {
        StyleValue::Number(n) => Ok(Dimension::Points(*n)),
        StyleValue::String(s) => {
            Dimension::parse(s).ok_or_else(|| invalid(key, "a number, percentage or \"auto\"", v))
        }
        other => Err(invalid(key, "a number, percentage or \"auto\"", other)),
    }
}

/// Number or percentage string; `"auto"` is rejected.
fn length(key: StyleKey, v: &StyleValue) -> Result<Dimension, StyleError> {
    match dimension(key, v) {
        Ok(Dimension::Auto) => Err(invalid(key, "a number or percentage", v)),
        other => other,
    }
}

fn keyword<T>(
    key: StyleKey,
    v: &StyleValue,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, StyleError> {
    let s = v.as_str().ok_or_else(|| invalid(key, "a keyword", v))?;
    parse(s).ok_or_else(|| StyleError::UnknownKeyword {
        key: key.name(),
        value: s.to_string(),
    })
}

fn color(key: StyleKey, v: &StyleValue) -> Result<Rgba, StyleError> {
    match v {
        StyleValue::Color(c) => Ok(*c),
        StyleValue::String(s) => s.parse(),
        other => Err(invalid(key, "a color", other)),
    }
}

fn radius(key: StyleKey, v: &StyleValue) -> Result<Radius, StyleError> {
    match v {
        StyleValue::Number(n) => Ok(Radius::uniform(*n)),
        StyleValue::Point(p) => Ok(Radius { x: p.x, y: p.y }),
        other => Err(invalid(key, "a number or point", other)),
    }
}

// =============================================================================
// StyleResolver
// =============================================================================

/// Merges style sheets into a [`ResolvedStyle`] and manages the listeners of
/// animated fields.
pub struct StyleResolver;

impl StyleResolver {
    /// Merge `sheet` into `style`.
    ///
    /// `listen` builds the listener for a newly animated field. It is called
    /// before the field's snapshot is read, so no update between the two is
    /// lost. An animated field whose source is unchanged keeps its existing
    /// subscription; any other entry for a field replaces or closes it.
    ///
    /// On error nothing is applied.
    pub fn merge(
        style: &mut ResolvedStyle,
        subscriptions: &mut FieldSubscriptions,
        sheet: &StyleSheet,
        listen: &dyn Fn(StyleKey, SubscriptionToken) -> Listener,
    ) -> Result<StyleChange, StyleError> {
        let mut next = style.clone();
        let mut opened: Vec<(StyleKey, FieldSubscription)> = Vec::new();
        let mut change = StyleChange::default();

        // An explicit matrix wins over a transform list in the same sheet
        let ordered = sheet
            .iter()
            .filter(|(k, _)| *k != StyleKey::Matrix)
            .chain(sheet.iter().filter(|(k, _)| *k == StyleKey::Matrix));

        for (key, input) in ordered {
            let value = match input {
                StyleInput::Value(v) => Some(v.clone()),
                StyleInput::Unset => None,
                StyleInput::Animated(source) => {
                    let kept = subscriptions
                        .get(&key)
                        .is_some_and(|s| s.subscription.is_for(source));
                    if !kept {
                        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
                        let subscription = Subscription::new(source.clone(), listen(key, token));
                        opened.push((key, FieldSubscription { token, subscription }));
                    }
                    Some(source.snapshot())
                }
            };
            next.apply(key, value.as_ref())?;
            change.record(key);
        }

        *style = next;
        for (key, input) in sheet.iter() {
            if !matches!(input, StyleInput::Animated(_)) {
                subscriptions.remove(&key);
            }
        }
        for (key, field) in opened {
            subscriptions.insert(key, field);
        }
        Ok(change)
    }

    /// Apply a value pushed by the listener of `key`.
    ///
    /// Returns `Ok(None)` when `token` no longer names the field's current
    /// subscription; the update is stale and ignored.
    pub fn apply_animated(
        style: &mut ResolvedStyle,
        subscriptions: &FieldSubscriptions,
        key: StyleKey,
        token: SubscriptionToken,
        value: &StyleValue,
    ) -> Result<Option<StyleChange>, StyleError> {
        match subscriptions.get(&key) {
            Some(field) if field.token == token => {}
            _ => return Ok(None),
        }
        style.apply(key, Some(value))?;
        Ok(Some(StyleChange::for_key(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Matrix, Point};
    use crate::style::{SharedValue, TransformOp};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn no_listen() -> impl Fn(StyleKey, SubscriptionToken) -> Listener {
        |_, _| Arc::new(|_: &StyleValue| {})
    }

    #[test]
    fn test_merge_plain_values() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let sheet = StyleSheet::new()
            .with(StyleKey::Width, 100)
            .with(StyleKey::Height, "50%")
            .with(StyleKey::BackgroundColor, "red")
            .with(StyleKey::FlexDirection, "row");

        let change = StyleResolver::merge(&mut style, &mut subs, &sheet, &no_listen()).unwrap();

        assert!(change.layout && change.paint);
        assert_eq!(style.layout.width, Dimension::Points(100.0));
        assert_eq!(style.layout.height, Dimension::Percent(50.0));
        assert_eq!(style.layout.flex_direction, FlexDirection::Row);
        assert_eq!(style.paint.paint.color, Rgba::RED);
    }

    #[test]
    fn test_merge_keeps_fields_not_in_sheet() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let listen = no_listen();
        StyleResolver::merge(&mut style, &mut subs, &StyleSheet::new().with(StyleKey::Width, 10), &listen)
            .unwrap();
        StyleResolver::merge(&mut style, &mut subs, &StyleSheet::new().with(StyleKey::Height, 20), &listen)
            .unwrap();
        assert_eq!(style.layout.width, Dimension::Points(10.0));
        assert_eq!(style.layout.height, Dimension::Points(20.0));
    }

    #[test]
    fn test_merge_is_atomic() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let shared = SharedValue::new(5.0);
        let sheet = StyleSheet::new()
            .with(StyleKey::Width, 10)
            .animated(StyleKey::Height, shared.clone())
            .with(StyleKey::FlexDirection, "diagonal");

        let err = StyleResolver::merge(&mut style, &mut subs, &sheet, &no_listen()).unwrap_err();

        assert_eq!(
            err,
            StyleError::UnknownKeyword {
                key: "flexDirection",
                value: "diagonal".into()
            }
        );
        assert_eq!(style, ResolvedStyle::default());
        assert!(subs.is_empty());
        assert_eq!(shared.listener_count(), 0);
    }

    #[test]
    fn test_unset_resets_to_default() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let listen = no_listen();
        let set = StyleSheet::new().with(StyleKey::BorderWidth, 3).with(StyleKey::Opacity, 0.5);
        StyleResolver::merge(&mut style, &mut subs, &set, &listen).unwrap();
        assert_eq!(style.paint.paint.stroke_width, 3.0);
        assert_eq!(style.layout.border.all, Some(3.0));

        let unset = StyleSheet::new().unset(StyleKey::BorderWidth).unset(StyleKey::Opacity);
        StyleResolver::merge(&mut style, &mut subs, &unset, &listen).unwrap();
        assert_eq!(style, ResolvedStyle::default());
    }

    #[test]
    fn test_animated_field_subscribes_and_applies_snapshot() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let shared = SharedValue::new(42.0);
        let pushed: Arc<Mutex<Vec<(StyleKey, SubscriptionToken, StyleValue)>>> = Arc::default();
        let sink = pushed.clone();
        let listen = move |key: StyleKey, token: SubscriptionToken| -> Listener {
            let sink = sink.clone();
            Arc::new(move |v: &StyleValue| sink.lock().push((key, token, v.clone())))
        };

        let sheet = StyleSheet::new().animated(StyleKey::Width, shared.clone());
        StyleResolver::merge(&mut style, &mut subs, &sheet, &listen).unwrap();
        assert_eq!(style.layout.width, Dimension::Points(42.0));
        assert_eq!(shared.listener_count(), 1);

        shared.set(64.0);
        let (key, token, value) = pushed.lock()[0].clone();
        let change =
            StyleResolver::apply_animated(&mut style, &subs, key, token, &value).unwrap();
        assert_eq!(change, Some(StyleChange { layout: true, paint: false }));
        assert_eq!(style.layout.width, Dimension::Points(64.0));
    }

    #[test]
    fn test_same_source_keeps_subscription_and_static_value_replaces_it() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let listen = no_listen();
        let shared = SharedValue::new(1.0);
        let sheet = StyleSheet::new().animated(StyleKey::Opacity, shared.clone());

        StyleResolver::merge(&mut style, &mut subs, &sheet, &listen).unwrap();
        let first = subs[&StyleKey::Opacity].token;
        StyleResolver::merge(&mut style, &mut subs, &sheet, &listen).unwrap();
        assert_eq!(subs[&StyleKey::Opacity].token, first);
        assert_eq!(shared.listener_count(), 1);

        let plain = StyleSheet::new().with(StyleKey::Opacity, 0.25);
        StyleResolver::merge(&mut style, &mut subs, &plain, &listen).unwrap();
        assert!(subs.is_empty());
        assert_eq!(shared.listener_count(), 0);
        assert_eq!(style.paint.opacity, 0.25);
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut style = ResolvedStyle::default();
        let subs = FieldSubscriptions::new();
        let result = StyleResolver::apply_animated(
            &mut style,
            &subs,
            StyleKey::Width,
            999,
            &StyleValue::Number(5.0),
        )
        .unwrap();
        assert_eq!(result, None);
        assert_eq!(style.layout.width, Dimension::Auto);
    }

    #[test]
    fn test_matrix_wins_over_transform_in_same_sheet() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let listen = no_listen();
        let sheet = StyleSheet::new()
            .with(StyleKey::Matrix, Matrix::translate(1.0, 2.0))
            .with(StyleKey::Transform, vec![TransformOp::Scale(3.0)]);
        StyleResolver::merge(&mut style, &mut subs, &sheet, &listen).unwrap();
        assert_eq!(style.paint.transform, TransformSource::Matrix(Matrix::translate(1.0, 2.0)));

        // Unsetting the matrix falls back to the list
        StyleResolver::merge(&mut style, &mut subs, &StyleSheet::new().unset(StyleKey::Matrix), &listen)
            .unwrap();
        assert_eq!(
            style.paint.transform,
            TransformSource::List(vec![TransformOp::Scale(3.0)])
        );
    }

    #[test]
    fn test_value_shapes() {
        let mut style = ResolvedStyle::default();
        let mut subs = FieldSubscriptions::new();
        let listen = no_listen();
        let sheet = StyleSheet::new()
            .with(StyleKey::BorderTopLeftRadius, Point::new(3.0, 4.0))
            .with(StyleKey::Clip, "M0 0 L10 0 L10 10 Z")
            .with(StyleKey::Layer, "rgba(0, 0, 0, 0.5)")
            .with(StyleKey::MarginLeft, "auto");
        StyleResolver::merge(&mut style, &mut subs, &sheet, &listen).unwrap();
        assert_eq!(style.paint.corner_radii[0], Some(Radius { x: 3.0, y: 4.0 }));
        assert!(matches!(style.paint.clip, Some(ClipShape::Path(_))));
        assert_eq!(style.paint.layer.as_ref().map(|p| p.color.a), Some(128));
        assert_eq!(style.layout.margin.left, Some(Dimension::Auto));

        for bad in [
            StyleSheet::new().with(StyleKey::Padding, "auto"),
            StyleSheet::new().with(StyleKey::Width, true),
            StyleSheet::new().with(StyleKey::BackgroundColor, "nope"),
        ] {
            assert!(StyleResolver::merge(&mut style, &mut subs, &bad, &listen).is_err());
        }
    }
}
