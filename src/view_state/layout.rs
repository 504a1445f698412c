//! Row layout: turn a slice of clean text into bounded-width display cells.
//!
//! [`format_row`] walks one row of a [`NormalizedLine`] a character at a time
//! and stops at the first character that does not fit. [`layout_row`] runs it
//! without output to find the natural break, applies smart wrap, and reports
//! where the next row starts.

use crate::parser::{utf8_len, NormalizedLine};
use ratatui::style::Modifier;
use unicode_width::UnicodeWidthChar;

/// Width of a tab stop.
pub const TAB_WIDTH: usize = 8;

/// Glyph drawn for characters with no printable form.
pub const REPLACEMENT_GLYPH: char = '\u{FFFD}';

/// Resolve the configured wrap margin against the window width.
///
/// Zero means the window width, a positive value caps the width, a negative
/// value is subtracted from it when the window is wide enough.
pub fn wrap_columns(window_cols: usize, wrap: i32) -> usize {
    match wrap {
        0 => window_cols,
        w if w < 0 => {
            let margin = w.unsigned_abs() as usize;
            if window_cols > margin {
                window_cols - margin
            } else {
                window_cols
            }
        }
        w => (w as usize).min(window_cols),
    }
}

/// One display cell (or a run of cells for tabs and escapes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Clean-text byte position the glyph was produced from.
    pub pos: usize,
    /// Text to draw.
    pub text: String,
    /// Columns occupied.
    pub width: usize,
}

/// Result of one formatter pass over a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatResult {
    /// Clean position where the pass stopped.
    pub end: usize,
    /// Position of the last space or tab seen.
    pub last_space: Option<usize>,
    /// Columns used, including the starting column.
    pub columns: usize,
    /// Overstrike attributes of the last character handled.
    pub special: Modifier,
}

/// Zero-width and display-corrupting code points that are dropped.
pub fn is_skipped(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'
            | '\u{FEFF}'
            | '\u{00AD}'
            | '\u{200E}'
            | '\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2066}'..='\u{2069}'
    )
}

fn is_printable(ch: char) -> bool {
    !ch.is_control() && !matches!(ch, '\u{2028}' | '\u{2029}')
}

/// Decode the character at the start of `bytes`, or `None` if malformed.
fn decode(bytes: &[u8]) -> Option<(char, usize)> {
    let first = *bytes.first()?;
    let len = utf8_len(first);
    let encoded = bytes.get(..len)?;
    let ch = std::str::from_utf8(encoded).ok()?.chars().next()?;
    Some((ch, len))
}

fn emit(out: &mut Option<&mut Vec<Glyph>>, pos: usize, text: String, width: usize) {
    if let Some(glyphs) = out.as_deref_mut() {
        glyphs.push(Glyph { pos, text, width });
    }
}

/// Format clean text from `start` up to `limit`, starting at column `first_col`.
///
/// Stops before a newline, before a carriage return that ends the line, and
/// before the first character that would overflow `wrap_cols`. Glyphs are
/// pushed to `out` when given.
pub fn format_row(
    line: &NormalizedLine,
    start: usize,
    limit: usize,
    first_col: usize,
    wrap_cols: usize,
    mut out: Option<&mut Vec<Glyph>>,
) -> FormatResult {
    let clean = &line.clean;
    let limit = limit.min(clean.len());
    let mut col = first_col;
    let mut pos = start;
    let mut last_space = None;
    let mut special = Modifier::empty();

    while pos < limit {
        let Some((ch, len)) = decode(&clean[pos..limit]) else {
            if col + 4 > wrap_cols {
                break;
            }
            col += 4;
            emit(&mut out, pos, format!("\\{:03o}", clean[pos]), 4);
            pos += 1;
            continue;
        };
        if is_skipped(ch) {
            pos += len;
            continue;
        }
        special = line.attr_at(pos).special;

        if is_printable(ch) {
            if ch == ' ' {
                last_space = Some(pos);
            }
            let width = ch.width().unwrap_or(0);
            if col + width > wrap_cols {
                break;
            }
            col += width;
            emit(&mut out, pos, ch.to_string(), width);
        } else if ch == '\n' || (ch == '\r' && matches!(clean.get(pos + 1), None | Some(b'\n'))) {
            break;
        } else if ch == '\t' {
            last_space = Some(pos);
            let stop = (col & !(TAB_WIDTH - 1)) + TAB_WIDTH;
            if stop > wrap_cols {
                break;
            }
            emit(&mut out, pos, " ".repeat(stop - col), stop - col);
            col = stop;
        } else if (ch as u32) < 0x20 || ch == '\x7f' {
            if col + 2 > wrap_cols {
                break;
            }
            col += 2;
            let caret = char::from((b'@'.wrapping_add(ch as u8)) & 0x7f);
            emit(&mut out, pos, format!("^{caret}"), 2);
        } else if (ch as u32) < 0x100 {
            if col + 4 > wrap_cols {
                break;
            }
            col += 4;
            emit(&mut out, pos, format!("\\{:03o}", ch as u32), 4);
        } else {
            if col + 1 > wrap_cols {
                break;
            }
            col += 1;
            emit(&mut out, pos, REPLACEMENT_GLYPH.to_string(), 1);
        }
        pos += len;
    }

    FormatResult {
        end: pos,
        last_space,
        columns: col,
        special,
    }
}

/// Wrapping switches for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapSettings {
    /// Columns available for text.
    pub wrap_cols: usize,
    /// Full window width, used for attachment marker lines.
    pub window_cols: usize,
    /// Draw a `+` at column 0 of continuation rows.
    pub markers: bool,
    /// Break at word boundaries.
    pub smart_wrap: bool,
    /// Keep leading blanks at the start of continuation rows.
    pub no_skip_blanks: bool,
}

/// Where one display row starts and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Clean position of the first byte on the row.
    pub start: usize,
    /// Clean position after the last byte drawn.
    pub end: usize,
    /// Clean position where the next row starts.
    pub next: usize,
    /// Columns used by the natural break.
    pub columns: usize,
    /// Column the text starts at.
    pub first_col: usize,
    /// Width the row was wrapped at.
    pub wrap_cols: usize,
}

impl RowLayout {
    /// True if the logical line continues on another row.
    pub fn wraps(&self, line: &NormalizedLine) -> bool {
        self.next < line.clean.len()
    }
}

/// Lay out the row of `line` that starts at clean position `start`.
pub fn layout_row(
    line: &NormalizedLine,
    start: usize,
    continuation: bool,
    is_header: bool,
    settings: &WrapSettings,
) -> RowLayout {
    let clean = &line.clean;
    let first_col = usize::from(settings.markers && continuation);
    let wrap_cols = if line.markers.attachment {
        settings.window_cols
    } else {
        settings.wrap_cols
    };

    let natural = format_row(line, start, clean.len(), first_col, wrap_cols, None);
    let mut end = natural.end;
    let mut next = end;

    if settings.smart_wrap {
        if let Some(space) = natural.last_space {
            let mid_word = end < clean.len() && !clean[end].is_ascii_whitespace();
            if mid_word && !is_header {
                next = space;
                let mut back = space;
                while back > start && matches!(clean[back], b' ' | b'\t' | b'\r') {
                    back -= 1;
                }
                if back == start {
                    next = end;
                } else {
                    end = back + 1;
                }
            }
        }
        if !settings.no_skip_blanks {
            while matches!(clean.get(next), Some(b' ' | b'\t')) {
                next += 1;
            }
        }
    }
    if clean.get(next) == Some(&b'\r') {
        next += 1;
    }
    if clean.get(next) == Some(&b'\n') {
        next += 1;
    }

    if next == start && start < clean.len() {
        next = start + utf8_len(clean[start]).min(clean.len() - start);
        end = next;
    }

    RowLayout {
        start,
        end,
        next,
        columns: natural.columns,
        first_col,
        wrap_cols,
    }
}

/// Produce the glyphs for a laid-out row.
pub fn row_glyphs(line: &NormalizedLine, layout: &RowLayout) -> Vec<Glyph> {
    let mut glyphs = Vec::new();
    format_row(
        line,
        layout.start,
        layout.end,
        layout.first_col,
        layout.wrap_cols,
        Some(&mut glyphs),
    );
    if glyphs.is_empty() && layout.end > layout.start {
        // Forced progress on a glyph wider than the row: draw it anyway.
        format_row(
            line,
            layout.start,
            layout.end,
            layout.first_col,
            usize::MAX,
            Some(&mut glyphs),
        );
    }
    glyphs
}
