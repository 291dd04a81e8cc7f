//! Text Measurement
//!
//! Intrinsic sizing for text content, in points.
//!
//! Widths come from Unicode display widths (`unicode-width`): every cell is
//! half the font size wide, so CJK and most emoji take two cells. Wrapping
//! is per character, which is enough for sizing and keeps measurement pure.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use unicode_width::UnicodeWidthChar;

use crate::types::{LayoutConstraints, Size};

/// Width of one cell relative to the font size.
const CELL_ADVANCE: f32 = 0.5;

/// Line height relative to the font size when none is set.
const DEFAULT_LINE_HEIGHT: f32 = 1.2;

#[inline]
fn char_width(c: char) -> usize {
    if c.is_control() {
        0
    } else {
        c.width().unwrap_or(0)
    }
}

/// Display width of a string in cells.
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Number of lines `text` occupies when wrapped at `available_width` cells.
pub fn measure_text_height(text: &str, available_width: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    wrap_text(text, available_width).len().max(1)
}

/// Wraps text at `width` cells. Explicit newlines always break.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0usize;

    for c in text.chars() {
        if c == '\n' {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
            continue;
        }

        let w = char_width(c);
        if current_width + w > width && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }

        current_line.push(c);
        current_width += w;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Truncates text to `width` cells, ending with an ellipsis when cut.
pub fn truncate_text(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    if string_width(text) <= width {
        return text.to_string();
    }

    let target_width = width.saturating_sub(1);
    let mut result = String::new();
    let mut current_width = 0usize;

    for c in text.chars() {
        let w = char_width(c);
        if current_width + w > target_width {
            break;
        }
        result.push(c);
        current_width += w;
    }

    result.push('…');
    result
}

// =============================================================================
// Measurement
// =============================================================================

/// Attributes that affect the size of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAttributes {
    pub font_size: f32,
    pub line_height: Option<f32>,
    /// Lines beyond this are cut off. `None` or zero means unlimited.
    pub max_lines: Option<usize>,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: None,
            max_lines: None,
        }
    }
}

impl TextAttributes {
    pub fn effective_line_height(&self) -> f32 {
        self.line_height
            .unwrap_or(self.font_size * DEFAULT_LINE_HEIGHT)
    }

    fn cell_width(&self) -> f32 {
        self.font_size * CELL_ADVANCE
    }
}

/// Size of `text` laid out within `constraints`.
pub fn measure_text(text: &str, attributes: &TextAttributes, constraints: &LayoutConstraints) -> Size {
    if text.is_empty() || attributes.font_size <= 0.0 {
        return constraints.clamp(Size::ZERO);
    }

    let cell = attributes.cell_width();
    let max_cells = if constraints.maximum_size.width.is_finite() {
        (constraints.maximum_size.width / cell).floor().max(1.0) as usize
    } else {
        usize::MAX
    };

    let mut lines = wrap_text(text, max_cells);
    if let Some(max_lines) = attributes.max_lines.filter(|&n| n > 0) {
        lines.truncate(max_lines);
    }

    let widest = lines.iter().map(|line| string_width(line)).max().unwrap_or(0);
    constraints.clamp(Size::new(
        widest as f32 * cell,
        lines.len() as f32 * attributes.effective_line_height(),
    ))
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    font_size: u32,
    line_height: Option<u32>,
    max_lines: Option<usize>,
    minimum: (u32, u32),
    maximum: (u32, u32),
}

impl MeasureKey {
    fn new(text: &str, attributes: &TextAttributes, constraints: &LayoutConstraints) -> Self {
        Self {
            text: text.to_string(),
            font_size: attributes.font_size.to_bits(),
            line_height: attributes.line_height.map(f32::to_bits),
            max_lines: attributes.max_lines,
            minimum: (
                constraints.minimum_size.width.to_bits(),
                constraints.minimum_size.height.to_bits(),
            ),
            maximum: (
                constraints.maximum_size.width.to_bits(),
                constraints.maximum_size.height.to_bits(),
            ),
        }
    }
}

/// LRU cache in front of [`measure_text`], shared by all paragraphs of a
/// registry. Keyed by content, attributes and constraints.
pub struct TextMeasureCache {
    entries: Mutex<LruCache<MeasureKey, Size>>,
}

impl TextMeasureCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn measure(&self, text: &str, attributes: &TextAttributes, constraints: &LayoutConstraints) -> Size {
        let key = MeasureKey::new(text, attributes, constraints);
        if let Some(size) = self.entries.lock().get(&key) {
            return *size;
        }
        let size = measure_text(text, attributes, constraints);
        self.entries.lock().put(key, size);
        size
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TextMeasureCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("TextMeasureCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}
