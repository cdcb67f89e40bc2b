//! Core types for flexcanvas.
//!
//! These types define the vocabulary every other module speaks: colors,
//! dimensions, the flex keywords accepted by a style sheet, and the closed
//! set of node types the draw serializer understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NodeError;

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Using integers for exact comparison - no floating point epsilon needed.
/// Alpha 255 = fully opaque, 0 = fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Transparent color.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    // Standard colors (CSS values)
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Check if color is fully opaque.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Check if color is fully transparent.
    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Multiply the alpha channel by `opacity` (clamped to 0.0-1.0).
    #[inline]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * opacity).round() as u8,
            ..self
        }
    }

    /// Channels as floats in 0.0-1.0, in RGBA order.
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Create from a packed 0xRRGGBB integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexcanvas::types::Rgba;
    ///
    /// assert_eq!(Rgba::from_rgb_int(0xff0000), Rgba::rgb(255, 0, 0));
    /// ```
    pub const fn from_rgb_int(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Parse hex color string (#RGB, #RGBA, #RRGGBB, #RRGGBBAA).
    ///
    /// Alpha comes last, as in CSS. Returns None for invalid format.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexcanvas::types::Rgba;
    ///
    /// assert_eq!(Rgba::from_hex("#ff0000"), Some(Rgba::rgb(255, 0, 0)));
    /// assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::WHITE));
    /// assert_eq!(Rgba::from_hex("#ff000080"), Some(Rgba::new(255, 0, 0, 128)));
    /// assert!(Rgba::from_hex("#gg0000").is_none());
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }

        // Shorthand digits are duplicated: "f" -> "ff"
        fn nibble(s: &[u8], i: usize) -> Option<u8> {
            let v = hex_digit(s[i])?;
            Some((v << 4) | v)
        }

        fn byte(s: &[u8], i: usize) -> Option<u8> {
            Some((hex_digit(s[i])? << 4) | hex_digit(s[i + 1])?)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(nibble(bytes, 0)?, nibble(bytes, 1)?, nibble(bytes, 2)?)),
            4 => Some(Self::new(
                nibble(bytes, 0)?,
                nibble(bytes, 1)?,
                nibble(bytes, 2)?,
                nibble(bytes, 3)?,
            )),
            6 => Some(Self::rgb(byte(bytes, 0)?, byte(bytes, 2)?, byte(bytes, 4)?)),
            8 => Some(Self::new(
                byte(bytes, 0)?,
                byte(bytes, 2)?,
                byte(bytes, 4)?,
                byte(bytes, 6)?,
            )),
            _ => None,
        }
    }

    /// Parse `rgb()` / `rgba()` notation.
    ///
    /// Accepts comma or whitespace separated channels, an optional fourth
    /// channel or `/ alpha`, channels as 0-255 numbers or percentages and
    /// alpha as 0-1, 0-255 or a percentage.
    pub fn from_rgb_fn(input: &str) -> Option<Self> {
        let (name, args) = split_function(input)?;
        if name != "rgb" && name != "rgba" {
            return None;
        }
        let (mut channels, mut alpha) = split_alpha(&args);
        if channels.len() == 4 && alpha.is_none() {
            alpha = channels.pop();
        }
        if channels.len() != 3 {
            return None;
        }

        let channel = |s: &str| -> Option<u8> {
            match s.strip_suffix('%') {
                Some(p) => Some(percent_to_byte(p.parse::<f32>().ok()?)),
                None => Some(s.parse::<f32>().ok()?.round().clamp(0.0, 255.0) as u8),
            }
        };

        let a = match alpha {
            Some(a) => parse_alpha(&a)?,
            None => 255,
        };
        Some(Self::new(
            channel(&channels[0])?,
            channel(&channels[1])?,
            channel(&channels[2])?,
            a,
        ))
    }

    /// Parse `hsl()` / `hsla()` notation.
    ///
    /// Hue is in degrees (an optional `deg` suffix is accepted), saturation
    /// and lightness must be percentages.
    pub fn from_hsl_fn(input: &str) -> Option<Self> {
        let (name, args) = split_function(input)?;
        if name != "hsl" && name != "hsla" {
            return None;
        }
        let (mut parts, mut alpha) = split_alpha(&args);
        if parts.len() == 4 && alpha.is_none() {
            alpha = parts.pop();
        }
        if parts.len() != 3 {
            return None;
        }

        let hue = parts[0].strip_suffix("deg").unwrap_or(&parts[0]).parse::<f32>().ok()?;
        let hue = hue.rem_euclid(360.0) / 360.0;
        let percent = |s: &str| -> Option<f32> {
            Some((s.strip_suffix('%')?.parse::<f32>().ok()? / 100.0).clamp(0.0, 1.0))
        };
        let s = percent(&parts[1])?;
        let l = percent(&parts[2])?;

        fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        }

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_rgb(p, q, hue + 1.0 / 3.0),
                hue_to_rgb(p, q, hue),
                hue_to_rgb(p, q, hue - 1.0 / 3.0),
            )
        };

        let a = match alpha {
            Some(a) => parse_alpha(&a)?,
            None => 255,
        };
        Some(Self::new(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), a))
    }

    /// Look up a CSS named color.
    pub fn named(name: &str) -> Option<Self> {
        let color = match name {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "yellow" => Self::YELLOW,
            "cyan" | "aqua" => Self::CYAN,
            "magenta" | "fuchsia" => Self::MAGENTA,
            "gray" | "grey" => Self::GRAY,
            "lightgray" | "lightgrey" => Self::rgb(211, 211, 211),
            "darkgray" | "darkgrey" => Self::rgb(169, 169, 169),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "pink" => Self::rgb(255, 192, 203),
            "brown" => Self::rgb(165, 42, 42),
            "navy" => Self::rgb(0, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "olive" => Self::rgb(128, 128, 0),
            "maroon" => Self::rgb(128, 0, 0),
            "silver" => Self::rgb(192, 192, 192),
            "lime" => Self::rgb(0, 255, 0),
            "rebeccapurple" => Self::rgb(102, 51, 153),
            _ => return None,
        };
        Some(color)
    }

    /// Parse any supported color format.
    ///
    /// Supports hex, `rgb()`/`rgba()`, `hsl()`/`hsla()` and CSS names.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexcanvas::types::Rgba;
    ///
    /// assert_eq!(Rgba::parse("red"), Some(Rgba::RED));
    /// assert_eq!(Rgba::parse("rgba(0, 0, 255, 0.5)"), Some(Rgba::new(0, 0, 255, 128)));
    /// assert_eq!(Rgba::parse("hsl(120, 100%, 25%)"), Some(Rgba::rgb(0, 128, 0)));
    /// assert!(Rgba::parse("not-a-color").is_none());
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return None;
        }
        if lower.starts_with('#') {
            return Self::from_hex(&lower);
        }
        if lower.starts_with("rgb") {
            return Self::from_rgb_fn(&lower);
        }
        if lower.starts_with("hsl") {
            return Self::from_hsl_fn(&lower);
        }
        Self::named(&lower)
    }
}

impl FromStr for Rgba {
    type Err = crate::error::StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::error::StyleError::InvalidColor(s.to_string()))
    }
}

/// Split `name(args)` into a lowercase name and its argument string.
fn split_function(input: &str) -> Option<(String, String)> {
    let s = input.trim().to_ascii_lowercase();
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    if close <= open {
        return None;
    }
    Some((s[..open].trim().to_string(), s[open + 1..close].trim().to_string()))
}

/// Split channel arguments from an optional `/ alpha` part.
fn split_alpha(args: &str) -> (Vec<String>, Option<String>) {
    let normalized = args.replace(',', " ");
    let (main, alpha) = match normalized.split_once('/') {
        Some((main, alpha)) => (main.to_string(), Some(alpha.trim().to_string())),
        None => (normalized, None),
    };
    let parts = main.split_whitespace().map(str::to_string).collect();
    (parts, alpha.filter(|a| !a.is_empty()))
}

fn parse_alpha(s: &str) -> Option<u8> {
    match s.strip_suffix('%') {
        Some(p) => Some(percent_to_byte(p.parse::<f32>().ok()?)),
        None => {
            let v = s.parse::<f32>().ok()?;
            if v > 1.0 {
                Some(v.round().clamp(0.0, 255.0) as u8)
            } else {
                Some(unit_to_byte(v))
            }
        }
    }
}

fn percent_to_byte(p: f32) -> u8 {
    (p * 2.55).round().clamp(0.0, 255.0) as u8
}

fn unit_to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

// =============================================================================
// Dimension - Supports absolute and percentage values
// =============================================================================

/// A dimension value that can be absolute (points) or percentage.
///
/// - `Auto`: size determined by content and flex rules
/// - `Points(n)`: absolute value in logical points
/// - `Percent(n)`: percentage of parent (0-100)
///
/// # Examples
///
/// ```
/// use flexcanvas::types::Dimension;
///
/// assert_eq!(Dimension::parse("50%"), Some(Dimension::Percent(50.0)));
/// assert_eq!(Dimension::parse("auto"), Some(Dimension::Auto));
/// assert_eq!(Dimension::from(12.0), Dimension::Points(12.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Dimension {
    #[default]
    Auto,
    Points(f32),
    Percent(f32),
}

impl Dimension {
    /// Parse `"auto"`, `"NN%"` or a bare number.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        if let Some(p) = s.strip_suffix('%') {
            return p.trim().parse::<f32>().ok().map(Self::Percent);
        }
        s.strip_suffix("px").unwrap_or(s).parse::<f32>().ok().map(Self::Points)
    }

    /// Resolve against a reference length. `Auto` resolves to `None`.
    pub fn resolve(&self, reference: f32) -> Option<f32> {
        match *self {
            Self::Auto => None,
            Self::Points(v) => Some(v),
            Self::Percent(p) => Some(reference * p / 100.0),
        }
    }

    /// True for `Auto`.
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Self::Points(value)
    }
}

// =============================================================================
// Keyword enums
// =============================================================================

/// Declare a style keyword enum together with its keyword table.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $kw:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Keyword as written in a style sheet.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $kw ),+
                }
            }

            /// Parse a style keyword. Matching is exact.
            pub fn from_keyword(keyword: &str) -> Option<Self> {
                match keyword {
                    $( $kw => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Flex keywords - For layout
// -----------------------------------------------------------------------------

keyword_enum! {
    /// Flex direction for container layout. Column is the default.
    pub enum FlexDirection {
        #[default]
        Column => "column",
        ColumnReverse => "column-reverse",
        Row => "row",
        RowReverse => "row-reverse",
    }
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }
}

keyword_enum! {
    /// Flex wrap behavior.
    pub enum FlexWrap {
        #[default]
        NoWrap => "nowrap",
        Wrap => "wrap",
        WrapReverse => "wrap-reverse",
    }
}

keyword_enum! {
    /// Justify content (main axis alignment).
    pub enum JustifyContent {
        #[default]
        FlexStart => "flex-start",
        Center => "center",
        FlexEnd => "flex-end",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
    }
}

keyword_enum! {
    /// Cross axis alignment shared by alignItems, alignSelf and alignContent.
    ///
    /// `Auto` only means something for alignSelf (inherit from parent).
    pub enum Align {
        #[default]
        Auto => "auto",
        FlexStart => "flex-start",
        Center => "center",
        FlexEnd => "flex-end",
        Stretch => "stretch",
        Baseline => "baseline",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
    }
}

keyword_enum! {
    /// Display mode.
    pub enum Display {
        #[default]
        Flex => "flex",
        None => "none",
        Contents => "contents",
    }
}

keyword_enum! {
    /// Layout direction used to resolve start/end edges.
    pub enum Direction {
        #[default]
        Inherit => "inherit",
        Ltr => "ltr",
        Rtl => "rtl",
    }
}

keyword_enum! {
    /// Positioning scheme.
    pub enum Position {
        #[default]
        Relative => "relative",
        Absolute => "absolute",
        Static => "static",
    }
}

keyword_enum! {
    /// Overflow behavior.
    pub enum Overflow {
        #[default]
        Visible => "visible",
        Hidden => "hidden",
        Scroll => "scroll",
    }
}

keyword_enum! {
    /// Whether width/height include padding and border.
    pub enum BoxSizing {
        #[default]
        BorderBox => "border-box",
        ContentBox => "content-box",
    }
}

// -----------------------------------------------------------------------------
// Paint keywords
// -----------------------------------------------------------------------------

keyword_enum! {
    /// Stroke end cap.
    pub enum StrokeCap {
        #[default]
        Butt => "butt",
        Round => "round",
        Square => "square",
    }
}

keyword_enum! {
    /// Stroke corner join.
    pub enum StrokeJoin {
        #[default]
        Miter => "miter",
        Round => "round",
        Bevel => "bevel",
    }
}

keyword_enum! {
    /// Porter-Duff and separable/non-separable blend modes.
    pub enum BlendMode {
        Clear => "clear",
        Src => "src",
        Dst => "dst",
        #[default]
        SrcOver => "srcOver",
        DstOver => "dstOver",
        SrcIn => "srcIn",
        DstIn => "dstIn",
        SrcOut => "srcOut",
        DstOut => "dstOut",
        SrcATop => "srcATop",
        DstATop => "dstATop",
        Xor => "xor",
        Plus => "plus",
        Modulate => "modulate",
        Screen => "screen",
        Overlay => "overlay",
        Darken => "darken",
        Lighten => "lighten",
        ColorDodge => "colorDodge",
        ColorBurn => "colorBurn",
        HardLight => "hardLight",
        SoftLight => "softLight",
        Difference => "difference",
        Exclusion => "exclusion",
        Multiply => "multiply",
        Hue => "hue",
        Saturation => "saturation",
        Color => "color",
        Luminosity => "luminosity",
    }
}

keyword_enum! {
    /// How an image is fitted into its node box.
    pub enum ImageFit {
        #[default]
        Contain => "contain",
        Cover => "cover",
        Fill => "fill",
        FitHeight => "fitHeight",
        FitWidth => "fitWidth",
        None => "none",
        ScaleDown => "scaleDown",
    }
}

keyword_enum! {
    /// Image sampling filter.
    pub enum Sampling {
        Nearest => "nearest",
        #[default]
        Linear => "linear",
        Cubic => "cubic",
    }
}

keyword_enum! {
    /// Path fill rule.
    pub enum FillType {
        #[default]
        Winding => "winding",
        EvenOdd => "evenOdd",
        InverseWinding => "inverseWinding",
        InverseEvenOdd => "inverseEvenOdd",
    }
}

// =============================================================================
// Node type
// =============================================================================

keyword_enum! {
    /// The closed set of node types.
    ///
    /// The type only decides how the node draws itself; any node may hold
    /// any children.
    pub enum NodeType {
        Rect => "rect",
        RRect => "rrect",
        Oval => "oval",
        Text => "text",
        Paragraph => "paragraph",
        #[default]
        Group => "group",
        Image => "image",
        Path => "path",
        Line => "line",
    }
}

impl FromStr for NodeType {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| NodeError::UnknownNodeType(s.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
