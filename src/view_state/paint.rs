//! Per-cell color resolution and row painting.

use super::layout::Glyph;
use crate::classify::{ColorScheme, QuoteForest};
use crate::model::{chunk_at, LineRecord, LineType};
use crate::parser::{CellAttr, ColorPairs, NormalizedLine};
use ratatui::style::{Modifier, Style};
use std::collections::HashSet;

/// Terminal drawing primitives the pager paints through.
pub trait Canvas {
    /// Width of the drawing area in columns.
    fn width(&self) -> u16;

    /// Move the cursor to `row`, `col`.
    fn move_cursor(&mut self, row: u16, col: u16);

    /// Style used by the following output.
    fn set_style(&mut self, style: Style);

    /// Draw `text` at the cursor and advance it by `width` columns.
    fn emit(&mut self, text: &str, width: usize);

    /// Blank the rest of the current row using the current style.
    fn clear_to_eol(&mut self);
}

/// What a row is painted with.
#[derive(Debug, Clone, Copy)]
pub struct PaintContext<'a> {
    /// Object colors.
    pub scheme: &'a ColorScheme,
    /// Quote colors.
    pub quotes: &'a QuoteForest,
    /// Record of the logical line's first row.
    pub origin: &'a LineRecord,
    /// Use type, quote and rule colors.
    pub show_color: bool,
    /// Highlight search matches.
    pub show_search: bool,
    /// Color lines by message-log level.
    pub message_log: bool,
}

impl PaintContext<'_> {
    /// Color of a cell before chunks and attributes are applied.
    pub fn default_style(&self, pos: usize) -> Style {
        let origin = self.origin;
        if self.message_log {
            return origin.line_style.unwrap_or(self.scheme.normal);
        }
        if !self.show_color {
            return self.scheme.normal;
        }
        match origin.line_type {
            LineType::Header => origin.line_style.unwrap_or(self.scheme.header_default),
            LineType::Quoted => match origin.quote {
                Some(id) => self.quotes.style_at(id, pos),
                None => self.scheme.for_type(LineType::Quoted),
            },
            other => self.scheme.for_type(other),
        }
    }

    /// Color used to fill the rest of a row.
    pub fn fill_style(&self) -> Style {
        if !self.show_color {
            return self.scheme.normal;
        }
        match self.origin.line_type {
            LineType::Header => self.origin.line_style.unwrap_or(self.scheme.header_default),
            LineType::MessageLog => self.origin.line_style.unwrap_or(self.scheme.normal),
            other => self.scheme.for_type(other),
        }
    }
}

fn toggle(style: Style, modifier: Modifier) -> Style {
    if style.add_modifier.contains(modifier) {
        style.remove_modifier(modifier)
    } else {
        style.add_modifier(modifier)
    }
}

/// Paints rows and owns the terminal color pairs used by ANSI text.
#[derive(Debug, Default)]
pub struct Painter {
    pairs: ColorPairs,
    held: HashSet<(Option<u8>, Option<u8>)>,
    last_style: Option<Style>,
}

impl Painter {
    /// Create a painter with no allocated pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live color pairs.
    pub fn pairs(&self) -> &ColorPairs {
        &self.pairs
    }

    /// Release every color pair.
    pub fn release(&mut self) {
        for (fg, bg) in self.held.drain() {
            self.pairs.free_pair(fg, bg);
        }
    }

    fn pair_style(&mut self, fg: Option<u8>, bg: Option<u8>) -> Style {
        if self.held.insert((fg, bg)) {
            self.pairs.alloc_pair(fg, bg)
        } else {
            // Already held: look the style up without taking another reference.
            let style = self.pairs.alloc_pair(fg, bg);
            self.pairs.free_pair(fg, bg);
            style
        }
    }

    /// Final color of the cell at clean position `pos`.
    pub fn resolve_color(&mut self, ctx: &PaintContext<'_>, pos: usize, attr: CellAttr) -> Style {
        let origin = ctx.origin;
        let mut style = ctx.default_style(pos);
        let mut search = false;

        if ctx.show_color {
            if let Some(chunk) = chunk_at(&origin.style_chunks, pos) {
                style = chunk.style;
            }
        }
        if ctx.show_search {
            if let Some(chunks) = origin.search_chunks.as_deref() {
                if chunk_at(chunks, pos).is_some() {
                    style = ctx.scheme.search;
                    search = true;
                }
            }
        }

        let special = attr.special;
        let ansi = attr.ansi;
        if special.is_empty() && ansi.is_plain() {
            return style;
        }

        let bold = special.contains(Modifier::BOLD) || ansi.modifiers.contains(Modifier::BOLD);
        if ansi.has_color() {
            style = self.pair_style(ansi.fg, ansi.bg);
            if ansi.modifiers.contains(Modifier::BOLD) {
                style = style.add_modifier(Modifier::BOLD);
            }
        } else if bold {
            style = match ctx.scheme.bold {
                Some(bold_style) if !search => bold_style,
                _ => toggle(style, Modifier::BOLD),
            };
        }

        let underline = special.contains(Modifier::UNDERLINED)
            || ansi.modifiers.contains(Modifier::UNDERLINED);
        if underline {
            style = match ctx.scheme.underline {
                Some(underline_style) if !search => underline_style,
                _ => toggle(style, Modifier::UNDERLINED),
            };
        } else if ansi.modifiers.contains(Modifier::REVERSED) {
            style = toggle(style, Modifier::REVERSED);
        } else if ansi.modifiers.contains(Modifier::SLOW_BLINK) {
            style = toggle(style, Modifier::SLOW_BLINK);
        }
        style
    }

    fn set_style<C: Canvas + ?Sized>(&mut self, canvas: &mut C, style: Style) {
        if self.last_style != Some(style) {
            canvas.set_style(style);
            self.last_style = Some(style);
        }
    }

    /// Paint one row at screen row `y` and return the columns used.
    pub fn paint_row<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        y: u16,
        ctx: &PaintContext<'_>,
        line: &NormalizedLine,
        glyphs: &[Glyph],
        marker: bool,
    ) -> usize {
        canvas.move_cursor(y, 0);
        self.last_style = None;
        let mut col = 0;

        if marker {
            self.set_style(canvas, ctx.scheme.markers);
            canvas.emit("+", 1);
            col += 1;
        }
        for glyph in glyphs {
            let style = self.resolve_color(ctx, glyph.pos, line.attr_at(glyph.pos));
            self.set_style(canvas, style);
            canvas.emit(&glyph.text, glyph.width);
            col += glyph.width;
        }

        if col < usize::from(canvas.width()) {
            self.set_style(canvas, ctx.fill_style());
            canvas.clear_to_eol();
        }
        self.last_style = None;
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SearchChunk, StyleChunk};
    use crate::parser::AnsiAttr;
    use ratatui::style::Color;

    /// Canvas that records text and every style change.
    #[derive(Default)]
    struct Recorder {
        text: String,
        styles: Vec<Style>,
        cleared: usize,
    }

    impl Canvas for Recorder {
        fn width(&self) -> u16 {
            20
        }
        fn move_cursor(&mut self, _row: u16, _col: u16) {}
        fn set_style(&mut self, style: Style) {
            self.styles.push(style);
        }
        fn emit(&mut self, text: &str, _width: usize) {
            self.text.push_str(text);
        }
        fn clear_to_eol(&mut self) {
            self.cleared += 1;
        }
    }

    fn glyphs(text: &str) -> Vec<Glyph> {
        text.char_indices()
            .map(|(pos, c)| Glyph {
                pos,
                text: c.to_string(),
                width: 1,
            })
            .collect()
    }

    fn context<'a>(
        scheme: &'a ColorScheme,
        quotes: &'a QuoteForest,
        origin: &'a LineRecord,
    ) -> PaintContext<'a> {
        PaintContext {
            scheme,
            quotes,
            origin,
            show_color: true,
            show_search: true,
            message_log: false,
        }
    }

    fn plain(_: usize) -> CellAttr {
        CellAttr::default()
    }

    // ===== Color Resolution Tests =====

    #[test]
    fn style_chunk_overrides_type_color() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord {
            line_type: LineType::Normal,
            style_chunks: vec![StyleChunk {
                start: 2,
                end: 4,
                style: Style::default().fg(Color::Red),
            }],
            ..LineRecord::default()
        };
        let ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();

        assert_eq!(painter.resolve_color(&ctx, 0, plain(0)), scheme.normal);
        assert_eq!(
            painter.resolve_color(&ctx, 3, plain(3)),
            Style::default().fg(Color::Red)
        );
        assert_eq!(painter.resolve_color(&ctx, 4, plain(4)), scheme.normal);
    }

    #[test]
    fn search_chunk_overrides_style_chunk() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord {
            line_type: LineType::Normal,
            style_chunks: vec![StyleChunk {
                start: 0,
                end: 4,
                style: Style::default().fg(Color::Red),
            }],
            search_chunks: Some(vec![SearchChunk { start: 1, end: 2 }]),
            ..LineRecord::default()
        };
        let mut ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();
        assert_eq!(painter.resolve_color(&ctx, 1, plain(1)), scheme.search);

        ctx.show_search = false;
        assert_eq!(
            painter.resolve_color(&ctx, 1, plain(1)),
            Style::default().fg(Color::Red)
        );
    }

    #[test]
    fn show_color_off_uses_normal() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord {
            line_type: LineType::Signature,
            ..LineRecord::default()
        };
        let mut ctx = context(&scheme, &quotes, &origin);
        ctx.show_color = false;
        let mut painter = Painter::new();
        assert_eq!(painter.resolve_color(&ctx, 0, plain(0)), scheme.normal);
    }

    #[test]
    fn quoted_cells_take_quote_colors() {
        let scheme = ColorScheme::default();
        let mut quotes = QuoteForest::new(scheme.quoted.clone());
        let outer = quotes.classify(b">").id;
        let inner = quotes.classify(b">>").id;
        let origin = LineRecord {
            line_type: LineType::Quoted,
            quote: Some(inner),
            ..LineRecord::default()
        };
        let ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();
        assert_eq!(
            painter.resolve_color(&ctx, 0, plain(0)),
            quotes.style_of(outer)
        );
        assert_eq!(
            painter.resolve_color(&ctx, 5, plain(5)),
            quotes.style_of(inner)
        );
    }

    #[test]
    fn overstrike_bold_toggles_modifier_without_bold_color() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord::default();
        let ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();
        let attr = CellAttr {
            special: Modifier::BOLD,
            ..CellAttr::default()
        };
        let style = painter.resolve_color(&ctx, 0, attr);
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn bold_color_used_when_configured() {
        let scheme = ColorScheme {
            bold: Some(Style::default().fg(Color::White)),
            ..ColorScheme::default()
        };
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord::default();
        let ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();
        let attr = CellAttr {
            special: Modifier::BOLD,
            ..CellAttr::default()
        };
        assert_eq!(
            painter.resolve_color(&ctx, 0, attr),
            Style::default().fg(Color::White)
        );
    }

    #[test]
    fn ansi_color_allocates_pair_once() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord::default();
        let ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();
        let attr = CellAttr {
            ansi: AnsiAttr {
                modifiers: Modifier::BOLD,
                fg: Some(1),
                bg: None,
            },
            ..CellAttr::default()
        };

        let first = painter.resolve_color(&ctx, 0, attr);
        let second = painter.resolve_color(&ctx, 1, attr);
        assert_eq!(first, second);
        assert_eq!(first.fg, Some(Color::Red));
        assert!(first.add_modifier.contains(Modifier::BOLD));
        assert_eq!(painter.pairs().len(), 1);

        painter.release();
        assert!(painter.pairs().is_empty());
    }

    #[test]
    fn message_log_uses_line_style() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord {
            line_type: LineType::MessageLog,
            line_style: Some(scheme.error),
            ..LineRecord::default()
        };
        let mut ctx = context(&scheme, &quotes, &origin);
        ctx.message_log = true;
        let mut painter = Painter::new();
        assert_eq!(painter.resolve_color(&ctx, 0, plain(0)), scheme.error);
    }

    // ===== Row Painting Tests =====

    #[test]
    fn paint_row_sets_style_only_on_change() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord {
            style_chunks: vec![StyleChunk {
                start: 2,
                end: 3,
                style: Style::default().fg(Color::Red),
            }],
            ..LineRecord::default()
        };
        let ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();
        let mut canvas = Recorder::default();

        let line = NormalizedLine::default();
        let cols = painter.paint_row(&mut canvas, 0, &ctx, &line, &glyphs("abcd"), false);

        assert_eq!(cols, 4);
        assert_eq!(canvas.text, "abcd");
        assert_eq!(
            canvas.styles,
            vec![scheme.normal, Style::default().fg(Color::Red), scheme.normal],
            "normal for 'ab', red for 'c', back to normal for 'd' and the fill"
        );
        assert_eq!(canvas.cleared, 1);
    }

    #[test]
    fn continuation_marker_is_drawn_first() {
        let scheme = ColorScheme::default();
        let quotes = QuoteForest::new(Vec::new());
        let origin = LineRecord::default();
        let ctx = context(&scheme, &quotes, &origin);
        let mut painter = Painter::new();
        let mut canvas = Recorder::default();

        let line = NormalizedLine::default();
        let cols = painter.paint_row(&mut canvas, 0, &ctx, &line, &glyphs("xy"), true);
        assert_eq!(cols, 3);
        assert_eq!(canvas.text, "+xy");
        assert_eq!(canvas.styles[0], scheme.markers);
    }
}
