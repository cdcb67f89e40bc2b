//! Type-specific node props.
//!
//! Props are opaque to layout, except paragraph props, whose shaped
//! paragraph doubles as the node's measure function.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::NodeError;
use crate::geometry::{Path, Point, Radius};
use crate::layout::ParagraphHandle;
use crate::types::{FillType, ImageFit, NodeType, Sampling, StrokeCap, StrokeJoin};

/// Font used by `text` nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub family: Option<String>,
    pub size: f32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: None,
            size: 14.0,
        }
    }
}

/// Stroke parameters of a `path` node. Without them the path is filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeOptions {
    pub width: f32,
    pub miter_limit: f32,
    pub cap: StrokeCap,
    pub join: StrokeJoin,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            miter_limit: 4.0,
            cap: StrokeCap::Butt,
            join: StrokeJoin::Miter,
        }
    }
}

/// A decoded image, referenced by key. Decoding happens outside the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub key: String,
    pub width: f32,
    pub height: f32,
}

/// Type-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeProps {
    #[default]
    None,
    RRect {
        r: Radius,
    },
    Text {
        text: String,
        font: Font,
    },
    Paragraph(ParagraphHandle),
    Path {
        path: Path,
        /// Trim start, 0..=1.
        start: f32,
        /// Trim end, 0..=1.
        end: f32,
        stroke: Option<StrokeOptions>,
        fill_type: FillType,
    },
    Line {
        p1: Point,
        p2: Point,
    },
    Image {
        image: ImageSource,
        fit: ImageFit,
        sampling: Sampling,
    },
}

impl NodeProps {
    /// A filled, untrimmed path.
    pub fn path(path: Path) -> Self {
        Self::Path {
            path,
            start: 0.0,
            end: 1.0,
            stroke: None,
            fill_type: FillType::Winding,
        }
    }

    pub fn text(text: impl Into<String>, size: f32) -> Self {
        Self::Text {
            text: text.into(),
            font: Font { family: None, size },
        }
    }

    pub fn image(image: ImageSource) -> Self {
        Self::Image {
            image,
            fit: ImageFit::Contain,
            sampling: Sampling::Linear,
        }
    }

    /// The measure function of paragraph props.
    pub fn paragraph(&self) -> Option<&ParagraphHandle> {
        match self {
            Self::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Parse props of `node_type` from a JSON object.
    ///
    /// Paragraphs carry a shaped paragraph object and cannot be described
    /// in JSON; types without props yield [`NodeProps::None`].
    pub fn from_json(node_type: NodeType, value: &Json) -> Result<Self, NodeError> {
        let invalid = |reason: String| NodeError::InvalidProps { node_type, reason };
        let parse = |value: &Json| -> Result<RawProps, NodeError> {
            RawProps::deserialize(value).map_err(|e| invalid(e.to_string()))
        };

        let props = match node_type {
            NodeType::RRect => {
                let raw = parse(value)?;
                let r = match raw.r {
                    Some(RawRadius::Uniform(r)) => Radius::uniform(r),
                    Some(RawRadius::Xy { x, y }) => Radius { x, y },
                    None => Radius::default(),
                };
                Self::RRect { r }
            }
            NodeType::Text => {
                let raw = parse(value)?;
                Self::Text {
                    text: raw.text.unwrap_or_default(),
                    font: raw.font.unwrap_or_default(),
                }
            }
            NodeType::Path => {
                let raw = parse(value)?;
                let data = raw.path.unwrap_or_default();
                let path = Path::from_svg(&data)
                    .ok_or_else(|| invalid(format!("bad path data `{data}`")))?;
                let stroke = match raw.stroke {
                    Some(s) => Some(StrokeOptions {
                        width: s.width.unwrap_or(1.0),
                        miter_limit: s.miter_limit.unwrap_or(4.0),
                        cap: keyword(s.cap.as_deref(), StrokeCap::from_keyword, &invalid)?,
                        join: keyword(s.join.as_deref(), StrokeJoin::from_keyword, &invalid)?,
                    }),
                    None => None,
                };
                Self::Path {
                    path,
                    start: raw.start.unwrap_or(0.0).clamp(0.0, 1.0),
                    end: raw.end.unwrap_or(1.0).clamp(0.0, 1.0),
                    stroke,
                    fill_type: keyword(raw.fill_type.as_deref(), FillType::from_keyword, &invalid)?,
                }
            }
            NodeType::Line => {
                let raw = parse(value)?;
                Self::Line {
                    p1: raw.p1.unwrap_or_default(),
                    p2: raw.p2.unwrap_or_default(),
                }
            }
            NodeType::Image => {
                let raw = parse(value)?;
                let image = raw.image.ok_or_else(|| invalid("missing `image`".into()))?;
                Self::Image {
                    image,
                    fit: keyword(raw.fit.as_deref(), ImageFit::from_keyword, &invalid)?,
                    sampling: keyword(raw.sampling.as_deref(), Sampling::from_keyword, &invalid)?,
                }
            }
            NodeType::Paragraph => {
                return Err(invalid("paragraphs must be built from a TextLayout".into()));
            }
            NodeType::Rect | NodeType::Oval | NodeType::Group => Self::None,
        };
        Ok(props)
    }
}

fn keyword<T: Default>(
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    invalid: &impl Fn(String) -> NodeError,
) -> Result<T, NodeError> {
    match value {
        None => Ok(T::default()),
        Some(s) => parse(s).ok_or_else(|| invalid(format!("unknown keyword `{s}`"))),
    }
}

// =============================================================================
// JSON shapes
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRadius {
    Uniform(f32),
    Xy { x: f32, y: f32 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStroke {
    width: Option<f32>,
    miter_limit: Option<f32>,
    cap: Option<String>,
    join: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawProps {
    r: Option<RawRadius>,
    text: Option<String>,
    font: Option<Font>,
    path: Option<String>,
    start: Option<f32>,
    end: Option<f32>,
    stroke: Option<RawStroke>,
    fill_type: Option<String>,
    p1: Option<Point>,
    p2: Option<Point>,
    image: Option<ImageSource>,
    fit: Option<String>,
    sampling: Option<String>,
}
