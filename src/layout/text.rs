//! Paragraph measurement.
//!
//! Shaping and line breaking belong to the text backend. The layout pass
//! only needs a paragraph's size for a given maximum width, which it gets
//! through [`TextLayout`].
//!
//! [`MonospaceParagraph`] is a fixed-advance implementation: every character
//! occupies one or two cells of `font_size * 0.6` points and lines are
//! `font_size * 1.2` points tall. Hosts without a shaping backend and tests
//! use it.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::geometry::Size;

/// A shaped paragraph as provided by the text backend.
pub trait TextLayout: Send + Sync {
    /// The paragraph's text.
    fn text(&self) -> &str;

    /// Lay out for `max_width` (`None` = unconstrained) and return the size.
    fn measure(&self, max_width: Option<f32>) -> Size;
}

// =============================================================================
// ParagraphHandle
// =============================================================================

/// Shared handle to a paragraph. Compared by identity.
#[derive(Clone)]
pub struct ParagraphHandle(Arc<dyn TextLayout>);

impl ParagraphHandle {
    pub fn new(paragraph: impl TextLayout + 'static) -> Self {
        Self(Arc::new(paragraph))
    }

    pub fn from_arc(paragraph: Arc<dyn TextLayout>) -> Self {
        Self(paragraph)
    }

    pub fn text(&self) -> &str {
        self.0.text()
    }

    pub fn measure(&self, max_width: Option<f32>) -> Size {
        self.0.measure(max_width)
    }

    pub fn layout(&self) -> &Arc<dyn TextLayout> {
        &self.0
    }
}

impl PartialEq for ParagraphHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ParagraphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParagraphHandle").field(&self.text()).finish()
    }
}

impl Serialize for ParagraphHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text())
    }
}

// =============================================================================
// Character cells
// =============================================================================

/// Cells a character advances: 0 for controls, 2 for wide CJK and emoji.
fn char_cells(c: char) -> u32 {
    if c.is_ascii() {
        return if c.is_ascii_control() { 0 } else { 1 };
    }
    let code = c as u32;
    let wide = (0x1100..=0x115F).contains(&code)     // Hangul Jamo
        || (0x2E80..=0x9FFF).contains(&code)          // CJK
        || (0xAC00..=0xD7A3).contains(&code)          // Hangul Syllables
        || (0xF900..=0xFAFF).contains(&code)          // CJK Compatibility
        || (0xFE30..=0xFE6F).contains(&code)          // CJK Compatibility Forms
        || (0xFF00..=0xFF60).contains(&code)          // Fullwidth Forms
        || (0x1F300..=0x1F9FF).contains(&code)        // Emoji
        || (0x20000..=0x2FFFF).contains(&code);       // CJK Extension B-F
    if wide { 2 } else { 1 }
}

// =============================================================================
// MonospaceParagraph
// =============================================================================

/// Fixed-advance paragraph with greedy character wrapping.
///
/// # Example
///
/// ```
/// use flexcanvas::layout::{MonospaceParagraph, TextLayout};
///
/// let p = MonospaceParagraph::new("hello world", 10.0);
/// let one_line = p.measure(None);
/// assert_eq!(one_line.width, 66.0);
/// assert_eq!(one_line.height, 12.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceParagraph {
    text: String,
    font_size: f32,
}

impl MonospaceParagraph {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }

    pub fn advance(&self) -> f32 {
        self.font_size * 0.6
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * 1.2
    }

    /// Break into lines of at most `max_cells` cells. Explicit newlines
    /// always break.
    pub fn wrap(&self, max_cells: Option<u32>) -> Vec<String> {
        if self.text.is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut width = 0u32;

        for c in self.text.chars() {
            if c == '\n' {
                lines.push(std::mem::take(&mut current));
                width = 0;
                continue;
            }
            let cells = char_cells(c);
            let overflows = max_cells.is_some_and(|max| width + cells > max);
            if overflows && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                width = 0;
            }
            current.push(c);
            width += cells;
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

impl TextLayout for MonospaceParagraph {
    fn text(&self) -> &str {
        &self.text
    }

    fn measure(&self, max_width: Option<f32>) -> Size {
        let advance = self.advance();
        let max_cells = match max_width {
            Some(w) if advance > 0.0 => Some((w / advance).floor().max(1.0) as u32),
            _ => None,
        };
        let lines = self.wrap(max_cells);
        let widest = lines
            .iter()
            .map(|line| line.chars().map(char_cells).sum::<u32>())
            .max()
            .unwrap_or(0);
        Size::new(
            widest as f32 * advance,
            lines.len() as f32 * self.line_height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_cells() {
        assert_eq!(char_cells('a'), 1);
        assert_eq!(char_cells('\t'), 0);
        assert_eq!(char_cells('漢'), 2);
    }

    #[test]
    fn test_wrap() {
        let p = MonospaceParagraph::new("hello world", 10.0);
        assert_eq!(p.wrap(Some(5)), vec!["hello", " worl", "d"]);
        assert_eq!(p.wrap(None), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_newlines() {
        let p = MonospaceParagraph::new("a\nb", 10.0);
        assert_eq!(p.wrap(Some(10)), vec!["a", "b"]);
    }

    #[test]
    fn test_measure_wraps_to_width() {
        let p = MonospaceParagraph::new("hello world", 10.0);
        // 30 points fit five 6-point cells
        let size = p.measure(Some(30.0));
        assert_eq!(size.width, 30.0);
        assert_eq!(size.height, 36.0);
    }

    #[test]
    fn test_empty_paragraph_is_zero() {
        let p = MonospaceParagraph::new("", 12.0);
        assert_eq!(p.measure(Some(100.0)), Size::ZERO);
    }

    #[test]
    fn test_handle_identity() {
        let a = ParagraphHandle::new(MonospaceParagraph::new("x", 10.0));
        let b = ParagraphHandle::new(MonospaceParagraph::new("x", 10.0));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
