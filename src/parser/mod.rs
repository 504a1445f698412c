//! Escape normalization for raw source lines.
//!
//! Raw lines may carry backspace overstrike (`X\bX` for bold, `_\bX` for
//! underline), ANSI SGR sequences and private `ESC ] ... BEL` markers. The
//! normalizer strips all of these and produces the clean text used by pattern
//! matching, plus one [`CellAttr`] per clean byte describing the attributes
//! active at that byte. A raw-offset map lets callers translate clean positions
//! back into stream offsets.

pub mod ansi;

pub use ansi::{ansi_color, sgr_params_len, AnsiAttr, ColorPairs};

use ratatui::style::Modifier;

const BACKSPACE: u8 = 0x08;
const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Default marker written before attachment boundary lines.
pub const DEFAULT_ATTACHMENT_MARKER: &[u8] = b"\x1b]9;pgview-attachment\x07";

/// Default marker written before protected header lines.
pub const DEFAULT_PROTECTED_HEADER_MARKER: &[u8] = b"\x1b]8;pgview-protected-header\x07";

/// Reset-to-normal ANSI sequence that forces a line to be treated as body text.
pub const ANSI_RESET: &[u8] = b"\x1b[0m";

/// Attributes of one clean byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellAttr {
    /// Bold or underline folded in from backspace overstrike.
    pub special: Modifier,
    /// ANSI state when the byte was emitted.
    pub ansi: AnsiAttr,
}

/// Which private markers were found at the start of the raw line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Markers {
    /// Line begins with the attachment marker.
    pub attachment: bool,
    /// Line begins with the protected-header marker.
    pub protected_header: bool,
}

/// Settings that change how raw bytes are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerOptions {
    /// Apply ANSI attributes. When false, SGR sequences are stripped without effect.
    pub allow_ansi: bool,
    /// Attachment marker, including its terminating BEL.
    pub attachment_marker: Vec<u8>,
    /// Protected-header marker, including its terminating BEL.
    pub protected_header_marker: Vec<u8>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            allow_ansi: false,
            attachment_marker: DEFAULT_ATTACHMENT_MARKER.to_vec(),
            protected_header_marker: DEFAULT_PROTECTED_HEADER_MARKER.to_vec(),
        }
    }
}

/// A raw line together with its clean form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedLine {
    /// Bytes as read from the stream, line terminator included.
    pub raw: Vec<u8>,
    /// Text with overstrike, ANSI and markers removed.
    pub clean: Vec<u8>,
    /// One entry per clean byte.
    pub attrs: Vec<CellAttr>,
    /// Markers seen at the start of `raw`.
    pub markers: Markers,
    raw_index: Vec<usize>,
}

impl NormalizedLine {
    /// Raw byte offset corresponding to a clean position.
    ///
    /// Positions at or past the end of clean text map to the raw length.
    pub fn raw_offset(&self, clean_pos: usize) -> usize {
        self.raw_index
            .get(clean_pos)
            .copied()
            .unwrap_or(self.raw.len())
    }

    /// Attributes at a clean position.
    pub fn attr_at(&self, clean_pos: usize) -> CellAttr {
        self.attrs.get(clean_pos).copied().unwrap_or_default()
    }

    /// Clean text without its trailing line terminator.
    pub fn content(&self) -> &[u8] {
        let text = self.clean.strip_suffix(b"\n").unwrap_or(&self.clean);
        text.strip_suffix(b"\r").unwrap_or(text)
    }

    /// True if the line is nothing but a terminator.
    pub fn is_blank(&self) -> bool {
        self.content().is_empty()
    }

    /// True if the clean text is only spaces, tabs and a terminator.
    pub fn is_whitespace(&self) -> bool {
        self.clean.iter().all(u8::is_ascii_whitespace)
    }
}

/// Byte length of the UTF-8 sequence introduced by `first`, or 1 if invalid.
pub(crate) fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 1,
    }
}

/// Strip escapes from `raw` and record per-byte attributes.
pub fn normalize(raw: &[u8], options: &NormalizerOptions) -> NormalizedLine {
    let mut clean = Vec::with_capacity(raw.len());
    let mut attrs = Vec::with_capacity(raw.len());
    let mut raw_index = Vec::with_capacity(raw.len());
    let mut ansi = AnsiAttr::default();
    // Clean position where the most recent character begins
    let mut last_char: Option<usize> = None;

    let starts_with_marker =
        |at: &[u8], marker: &[u8]| !marker.is_empty() && at.starts_with(marker);

    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];

        if b == BACKSPACE {
            if let (Some(prev), Some(&next_first)) = (last_char, raw.get(i + 1)) {
                let next_len = utf8_len(next_first).min(raw.len() - i - 1);
                let next = &raw[i + 1..i + 1 + next_len];
                if next != b"\n" {
                    fold_overstrike(&mut clean, &mut attrs, &mut raw_index, prev, next);
                    i += 1 + next_len;
                    continue;
                }
            }
            // Lone backspace is kept and later shown as ^H
            last_char = Some(clean.len());
            push(&mut clean, &mut attrs, &mut raw_index, b, i, ansi);
            i += 1;
            continue;
        }

        if b == ESC {
            let rest = &raw[i..];
            if rest.get(1) == Some(&b'[') {
                if let Some(len) = sgr_params_len(&rest[2..]) {
                    if options.allow_ansi {
                        ansi.apply_sgr(&rest[2..2 + len]);
                    }
                    i += 2 + len + 1;
                    continue;
                }
            }
            if rest.get(1) == Some(&b']')
                && (starts_with_marker(rest, options.attachment_marker.as_slice())
                    || starts_with_marker(rest, options.protected_header_marker.as_slice()))
            {
                let skip = rest.iter().position(|&c| c == BEL).map_or(rest.len(), |p| p + 1);
                i += skip;
                continue;
            }
        }

        // UTF-8 continuation bytes belong to the character already started
        if b & 0xc0 != 0x80 {
            last_char = Some(clean.len());
        }
        push(&mut clean, &mut attrs, &mut raw_index, b, i, ansi);
        i += 1;
    }

    NormalizedLine {
        markers: Markers {
            attachment: starts_with_marker(raw, options.attachment_marker.as_slice()),
            protected_header: starts_with_marker(raw, options.protected_header_marker.as_slice()),
        },
        raw: raw.to_vec(),
        clean,
        attrs,
        raw_index,
    }
}

fn push(
    clean: &mut Vec<u8>,
    attrs: &mut Vec<CellAttr>,
    raw_index: &mut Vec<usize>,
    byte: u8,
    raw_pos: usize,
    ansi: AnsiAttr,
) {
    clean.push(byte);
    attrs.push(CellAttr {
        special: Modifier::empty(),
        ansi,
    });
    raw_index.push(raw_pos);
}

/// Merge `next` into the character starting at clean position `prev`.
///
/// Same glyph twice is bold, an underscore on either side is underline of the
/// other glyph, and anything else is a plain overstrike where `next` wins.
fn fold_overstrike(
    clean: &mut Vec<u8>,
    attrs: &mut Vec<CellAttr>,
    raw_index: &mut Vec<usize>,
    prev: usize,
    next: &[u8],
) {
    let (glyph, added): (&[u8], Modifier) = {
        let current = &clean[prev..];
        if current == next {
            let already_underlined = attrs[prev].special.contains(Modifier::UNDERLINED);
            if current == b"_" && already_underlined {
                (next, Modifier::UNDERLINED)
            } else {
                (next, Modifier::BOLD)
            }
        } else if next == b"_" {
            (current, Modifier::UNDERLINED)
        } else if current == b"_" {
            (next, Modifier::UNDERLINED)
        } else {
            (next, Modifier::empty())
        }
    };
    let glyph = glyph.to_vec();

    let base = attrs[prev];
    let origin = raw_index[prev];
    clean.truncate(prev);
    attrs.truncate(prev);
    raw_index.truncate(prev);

    let cell = CellAttr {
        special: base.special | added,
        ansi: base.ansi,
    };
    for &b in &glyph {
        clean.push(b);
        attrs.push(cell);
        raw_index.push(origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &[u8]) -> NormalizedLine {
        normalize(raw, &NormalizerOptions::default())
    }

    fn norm_ansi(raw: &[u8]) -> NormalizedLine {
        let options = NormalizerOptions {
            allow_ansi: true,
            ..NormalizerOptions::default()
        };
        normalize(raw, &options)
    }

    // ===== Plain Text Tests =====

    #[test]
    fn plain_text_is_unchanged() {
        let line = norm(b"Hello, world\n");
        assert_eq!(line.clean, b"Hello, world\n");
        assert_eq!(line.attrs.len(), line.clean.len());
        assert!(line.attrs.iter().all(|a| *a == CellAttr::default()));
        assert_eq!(line.markers, Markers::default());
    }

    #[test]
    fn multibyte_text_is_unchanged() {
        let raw = "naïve 日本語\n".as_bytes();
        let line = norm(raw);
        assert_eq!(line.clean, raw);
    }

    // ===== Overstrike Tests =====

    #[test]
    fn repeated_char_becomes_bold() {
        let line = norm(b"X\x08X");
        assert_eq!(line.clean, b"X");
        assert_eq!(line.attrs[0].special, Modifier::BOLD);
    }

    #[test]
    fn underscore_then_char_becomes_underlined_char() {
        let line = norm(b"_\x08a");
        assert_eq!(line.clean, b"a");
        assert_eq!(line.attrs[0].special, Modifier::UNDERLINED);
    }

    #[test]
    fn char_then_underscore_keeps_char_underlined() {
        let line = norm(b"a\x08_b");
        assert_eq!(line.clean, b"ab");
        assert_eq!(line.attrs[0].special, Modifier::UNDERLINED);
        assert_eq!(line.attrs[1].special, Modifier::empty());
    }

    #[test]
    fn different_chars_overstrike_with_later_glyph() {
        let line = norm(b"a\x08b");
        assert_eq!(line.clean, b"b");
        assert_eq!(line.attrs[0].special, Modifier::empty());
    }

    #[test]
    fn multibyte_overstrike_replaces_whole_char() {
        let line = norm("é\x08é".as_bytes());
        assert_eq!(line.clean, "é".as_bytes());
        assert!(line.attrs.iter().all(|a| a.special == Modifier::BOLD));
    }

    #[test]
    fn leading_backspace_is_literal() {
        let line = norm(b"\x08abc");
        assert_eq!(line.clean, b"\x08abc");
    }

    #[test]
    fn overstrike_raw_offsets_point_at_original_char() {
        let line = norm(b"ab\x08bc\n");
        assert_eq!(line.clean, b"abc\n");
        assert_eq!(line.raw_offset(1), 1);
        assert_eq!(line.raw_offset(2), 4);
        assert_eq!(line.raw_offset(99), 6);
    }

    // ===== ANSI Tests =====

    #[test]
    fn sgr_sequences_are_stripped() {
        let line = norm(b"\x1b[1;31mred\x1b[0m plain\n");
        assert_eq!(line.clean, b"red plain\n");
        assert!(
            line.attrs.iter().all(|a| a.ansi.is_plain()),
            "ANSI disabled: attributes must be discarded"
        );
    }

    #[test]
    fn sgr_sequences_set_attributes_when_allowed() {
        let line = norm_ansi(b"\x1b[1;31mred\x1b[0m ok");
        assert_eq!(line.clean, b"red ok");
        assert_eq!(line.attrs[0].ansi.modifiers, Modifier::BOLD);
        assert_eq!(line.attrs[0].ansi.fg, Some(1));
        assert!(line.attrs[3].ansi.is_plain(), "reset applies after 'red'");
    }

    #[test]
    fn unterminated_csi_is_kept() {
        let line = norm(b"\x1b[12Hx");
        assert_eq!(line.clean, b"\x1b[12Hx");
    }

    // ===== Marker Tests =====

    #[test]
    fn attachment_marker_is_stripped_and_signaled() {
        let mut raw = DEFAULT_ATTACHMENT_MARKER.to_vec();
        raw.extend_from_slice(b"[-- Attachment #1 --]\n");
        let line = norm(&raw);
        assert_eq!(line.clean, b"[-- Attachment #1 --]\n");
        assert!(line.markers.attachment);
        assert!(!line.markers.protected_header);
    }

    #[test]
    fn protected_header_marker_is_signaled() {
        let mut raw = DEFAULT_PROTECTED_HEADER_MARKER.to_vec();
        raw.extend_from_slice(b"Subject: hidden\n");
        let line = norm(&raw);
        assert_eq!(line.clean, b"Subject: hidden\n");
        assert!(line.markers.protected_header);
    }

    #[test]
    fn unknown_osc_sequence_is_kept() {
        let line = norm(b"\x1b]0;title\x07x");
        assert_eq!(line.clean, b"\x1b]0;title\x07x");
        assert_eq!(line.markers, Markers::default());
    }

    // ===== Helper Tests =====

    #[test]
    fn content_strips_lf_and_crlf() {
        assert_eq!(norm(b"abc\n").content(), b"abc");
        assert_eq!(norm(b"abc\r\n").content(), b"abc");
        assert!(norm(b"\n").is_blank());
        assert!(norm(b"\r\n").is_blank());
        assert!(!norm(b" \n").is_blank());
        assert!(norm(b" \t\n").is_whitespace());
    }
}
