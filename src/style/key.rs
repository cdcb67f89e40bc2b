//! Style field names.

use std::fmt;
use std::str::FromStr;

use crate::error::StyleError;

/// Which consumer reads a style field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// Box model and flex fields read by the layout engine.
    Layout,
    /// Fields read only by the draw serializer.
    Paint,
}

macro_rules! style_keys {
    ($( $variant:ident => $name:literal, $class:ident; )+) => {
        /// Every field a node style sheet may carry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum StyleKey {
            $( $variant ),+
        }

        impl StyleKey {
            /// All keys in declaration order.
            pub const ALL: &'static [StyleKey] = &[ $( StyleKey::$variant ),+ ];

            /// The camelCase name used in style sheets.
            pub const fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name ),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(Self::$variant), )+
                    _ => None,
                }
            }

            pub const fn class(&self) -> KeyClass {
                match self {
                    $( Self::$variant => KeyClass::$class ),+
                }
            }
        }
    };
}

style_keys! {
    // Alignment and flex container
    AlignContent => "alignContent", Layout;
    AlignItems => "alignItems", Layout;
    AlignSelf => "alignSelf", Layout;
    JustifyContent => "justifyContent", Layout;
    FlexDirection => "flexDirection", Layout;
    FlexWrap => "flexWrap", Layout;
    Gap => "gap", Layout;
    RowGap => "rowGap", Layout;
    ColumnGap => "columnGap", Layout;

    // Flex item
    Flex => "flex", Layout;
    FlexGrow => "flexGrow", Layout;
    FlexShrink => "flexShrink", Layout;
    FlexBasis => "flexBasis", Layout;

    // Modes
    Display => "display", Layout;
    Direction => "direction", Layout;
    Position => "position", Layout;
    Overflow => "overflow", Layout;
    BoxSizing => "boxSizing", Layout;

    // Sizing
    Width => "width", Layout;
    Height => "height", Layout;
    MinWidth => "minWidth", Layout;
    MinHeight => "minHeight", Layout;
    MaxWidth => "maxWidth", Layout;
    MaxHeight => "maxHeight", Layout;
    AspectRatio => "aspectRatio", Layout;

    // Insets
    Top => "top", Layout;
    Right => "right", Layout;
    Bottom => "bottom", Layout;
    Left => "left", Layout;
    Start => "start", Layout;
    End => "end", Layout;
    Inset => "inset", Layout;
    InsetHorizontal => "insetHorizontal", Layout;
    InsetVertical => "insetVertical", Layout;

    // Margin
    Margin => "margin", Layout;
    MarginTop => "marginTop", Layout;
    MarginRight => "marginRight", Layout;
    MarginBottom => "marginBottom", Layout;
    MarginLeft => "marginLeft", Layout;
    MarginStart => "marginStart", Layout;
    MarginEnd => "marginEnd", Layout;
    MarginHorizontal => "marginHorizontal", Layout;
    MarginVertical => "marginVertical", Layout;

    // Padding
    Padding => "padding", Layout;
    PaddingTop => "paddingTop", Layout;
    PaddingRight => "paddingRight", Layout;
    PaddingBottom => "paddingBottom", Layout;
    PaddingLeft => "paddingLeft", Layout;
    PaddingStart => "paddingStart", Layout;
    PaddingEnd => "paddingEnd", Layout;
    PaddingHorizontal => "paddingHorizontal", Layout;
    PaddingVertical => "paddingVertical", Layout;

    // Border widths (borderWidth also sets the stroke width)
    BorderWidth => "borderWidth", Layout;
    BorderTopWidth => "borderTopWidth", Layout;
    BorderRightWidth => "borderRightWidth", Layout;
    BorderBottomWidth => "borderBottomWidth", Layout;
    BorderLeftWidth => "borderLeftWidth", Layout;
    BorderStartWidth => "borderStartWidth", Layout;
    BorderEndWidth => "borderEndWidth", Layout;
    BorderHorizontalWidth => "borderHorizontalWidth", Layout;
    BorderVerticalWidth => "borderVerticalWidth", Layout;

    // Paint
    BackgroundColor => "backgroundColor", Paint;
    Opacity => "opacity", Paint;
    BlendMode => "blendMode", Paint;
    AntiAlias => "antiAlias", Paint;
    Dither => "dither", Paint;
    StrokeCap => "strokeCap", Paint;
    StrokeJoin => "strokeJoin", Paint;
    StrokeMiter => "strokeMiter", Paint;
    BorderRadius => "borderRadius", Paint;
    BorderTopLeftRadius => "borderTopLeftRadius", Paint;
    BorderTopRightRadius => "borderTopRightRadius", Paint;
    BorderBottomRightRadius => "borderBottomRightRadius", Paint;
    BorderBottomLeftRadius => "borderBottomLeftRadius", Paint;
    Transform => "transform", Paint;
    Origin => "origin", Paint;
    Matrix => "matrix", Paint;
    Clip => "clip", Paint;
    InvertClip => "invertClip", Paint;
    Layer => "layer", Paint;
}

impl StyleKey {
    #[inline]
    pub const fn is_layout(&self) -> bool {
        matches!(self.class(), KeyClass::Layout)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleKey {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| StyleError::UnknownKey(s.to_string()))
    }
}
