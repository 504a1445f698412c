//! ANSI SGR attribute state and the terminal color-pair cache.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

/// Attribute state driven by `ESC [ ... m` sequences.
///
/// Colors are the single digit after `3` or `4` in the SGR code (0-7 are the
/// eight standard colors, 8 and 9 select the terminal default).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AnsiAttr {
    /// Bold, underline, blink and reverse flags.
    pub modifiers: Modifier,
    /// Foreground color digit, if one was selected.
    pub fg: Option<u8>,
    /// Background color digit, if one was selected.
    pub bg: Option<u8>,
}

impl AnsiAttr {
    /// True if any explicit color is active.
    pub fn has_color(&self) -> bool {
        self.fg.is_some() || self.bg.is_some()
    }

    /// True if no attribute at all is active.
    pub fn is_plain(&self) -> bool {
        self.modifiers.is_empty() && !self.has_color()
    }

    /// Apply the parameter bytes of one SGR sequence (between `[` and `m`).
    ///
    /// An empty parameter list resets everything, as does code `0`.
    /// Unrecognized codes are skipped up to the next `;`.
    pub fn apply_sgr(&mut self, params: &[u8]) {
        if params.is_empty() {
            *self = AnsiAttr::default();
            return;
        }

        let end = params.len();
        let single = |pos: usize| pos + 1 == end || params.get(pos + 1) == Some(&b';');
        let pair = |pos: usize| {
            params.get(pos + 1).is_some_and(u8::is_ascii_digit)
                && (pos + 2 == end || params.get(pos + 2) == Some(&b';'))
        };

        let mut pos = 0;
        while pos < end {
            match params[pos] {
                b'1' if single(pos) => {
                    self.modifiers |= Modifier::BOLD;
                    pos += 2;
                }
                b'4' if single(pos) => {
                    self.modifiers |= Modifier::UNDERLINED;
                    pos += 2;
                }
                b'5' if single(pos) => {
                    self.modifiers |= Modifier::SLOW_BLINK;
                    pos += 2;
                }
                b'7' if single(pos) => {
                    self.modifiers |= Modifier::REVERSED;
                    pos += 2;
                }
                b'0' if single(pos) => {
                    *self = AnsiAttr::default();
                    pos += 2;
                }
                b'3' if pair(pos) => {
                    self.fg = Some(params[pos + 1] - b'0');
                    pos += 3;
                }
                b'4' if pair(pos) => {
                    self.bg = Some(params[pos + 1] - b'0');
                    pos += 3;
                }
                _ => {
                    while pos < end && params[pos] != b';' {
                        pos += 1;
                    }
                    pos += 1;
                }
            }
        }
    }
}

/// Length of the parameter run of an SGR sequence starting at `bytes`.
///
/// `bytes` begins just after `ESC [`. Returns the number of parameter bytes when
/// they are all digits or `;` and are followed by `m`.
pub fn sgr_params_len(bytes: &[u8]) -> Option<usize> {
    let len = bytes
        .iter()
        .position(|b| !(b.is_ascii_digit() || *b == b';'))?;
    (bytes[len] == b'm').then_some(len)
}

/// Terminal color for an SGR color digit.
pub fn ansi_color(code: u8) -> Color {
    match code {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        7 => Color::Gray,
        _ => Color::Reset,
    }
}

// ===== ColorPairs =====

#[derive(Debug, Clone, Copy)]
struct PairEntry {
    style: Style,
    refs: usize,
}

/// Reference-counted cache of foreground/background color pairs.
///
/// Pairs are built on first use and shared until every user has released them.
#[derive(Debug, Default)]
pub struct ColorPairs {
    pairs: HashMap<(Option<u8>, Option<u8>), PairEntry>,
}

impl ColorPairs {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the style for a pair, allocating it if needed.
    pub fn alloc_pair(&mut self, fg: Option<u8>, bg: Option<u8>) -> Style {
        let entry = self.pairs.entry((fg, bg)).or_insert_with(|| PairEntry {
            style: Style::default()
                .fg(fg.map_or(Color::Reset, ansi_color))
                .bg(bg.map_or(Color::Reset, ansi_color)),
            refs: 0,
        });
        entry.refs += 1;
        entry.style
    }

    /// Release one reference to a pair, dropping it when unused.
    pub fn free_pair(&mut self, fg: Option<u8>, bg: Option<u8>) {
        if let Some(entry) = self.pairs.get_mut(&(fg, bg)) {
            entry.refs = entry.refs.saturating_sub(1);
            if entry.refs == 0 {
                self.pairs.remove(&(fg, bg));
            }
        }
    }

    /// Number of live pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if no pair is allocated.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
