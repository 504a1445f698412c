//! Line classification and regex highlighting.
//!
//! [`Classifier::classify_and_highlight`] assigns a [`LineType`] to one logical
//! line and computes its style chunks. Some decisions reach back into rows
//! that were already painted (a shorter quote prefix shifting colors, a header
//! continuation recoloring its field, a signature delimiter reclaiming rows
//! below it); those are reported through [`ClassifyOutcome`] so the viewport
//! can repaint without the classifier touching rendering state.

pub mod quote;
pub mod rules;

pub use quote::{QuoteForest, QuoteMatch};
pub use rules::{
    compile_pattern, compile_search, ColorScheme, QuotePatterns, RuleContext, RuleSet, RuleSpec,
    StyleRule, DEFAULT_QUOTE_REGEX, DEFAULT_SMILEYS,
};

use crate::model::{LineRecord, LineType, SearchChunk, StyleChunk};
use crate::parser::{NormalizedLine, ANSI_RESET};
use crate::view_state::LineStore;
use regex::bytes::Regex;
use std::ops::Range;
use tracing::{debug, trace};

/// Maximum number of chunks recorded for one line.
pub const MAX_CHUNKS: usize = i16::MAX as usize;

/// Signature lines accepted before only whitespace lines may extend the block.
pub const SIGNATURE_LINES: usize = 4;

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// Only the classified line changed.
    Classified,
    /// Rows in the range were recolored and must be painted again.
    ClassifiedWithRetroactiveRepaint(Range<usize>),
}

impl ClassifyOutcome {
    /// Rows needing a repaint, if any.
    pub fn repaint_range(&self) -> Option<Range<usize>> {
        match self {
            ClassifyOutcome::Classified => None,
            ClassifyOutcome::ClassifiedWithRetroactiveRepaint(range) => Some(range.clone()),
        }
    }

    /// True if earlier rows were recolored.
    pub fn needs_repaint(&self) -> bool {
        matches!(self, ClassifyOutcome::ClassifiedWithRetroactiveRepaint(_))
    }

    /// Widen the outcome to also cover `range`.
    pub fn with_repaint(self, range: Range<usize>) -> Self {
        match self {
            ClassifyOutcome::Classified => ClassifyOutcome::ClassifiedWithRetroactiveRepaint(range),
            ClassifyOutcome::ClassifiedWithRetroactiveRepaint(existing) => {
                ClassifyOutcome::ClassifiedWithRetroactiveRepaint(
                    existing.start.min(range.start)..existing.end.max(range.end),
                )
            }
        }
    }
}

/// Session-wide classification switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Match header rules per line instead of coloring whole header fields.
    pub header_color_partial: bool,
    /// Treat every line as a message-log entry.
    pub message_log: bool,
    /// The text has no leading header block.
    pub body_only: bool,
}

/// Assigns line types and style chunks using a compiled [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
    options: ClassifyOptions,
}

impl Classifier {
    /// Create a classifier.
    pub fn new(rules: RuleSet, options: ClassifyOptions) -> Self {
        Self { rules, options }
    }

    /// Compiled rules and colors.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classification switches.
    pub fn options(&self) -> ClassifyOptions {
        self.options
    }

    /// Classify logical line `row` and compute its style chunks.
    ///
    /// Already classified rows are left alone. When `classify_quotes` is set the
    /// quote prefix of a quoted line is fed to `quotes` to pick its color.
    pub fn classify_and_highlight(
        &self,
        store: &mut LineStore,
        quotes: &mut QuoteForest,
        row: usize,
        line: &NormalizedLine,
        classify_quotes: bool,
    ) -> ClassifyOutcome {
        if store.line_type(row).is_classified() {
            return ClassifyOutcome::Classified;
        }
        {
            let record = store.record_mut(row);
            record.is_blank = line.is_blank();
            record.style_chunks.clear();
            record.line_style = None;
            record.is_header_continuation = false;
        }

        if self.options.message_log {
            let style = self.rules.scheme().for_log_level(line.raw.get(11).copied());
            let record = store.record_mut(row);
            record.line_type = LineType::MessageLog;
            record.line_style = Some(style);
            store.propagate_type(row);
            return ClassifyOutcome::Classified;
        }

        let mut outcome = ClassifyOutcome::Classified;
        let previous = row.checked_sub(1).map(|p| store.line_type(p));
        let in_header = previous.map_or(!self.options.body_only, LineType::is_header)
            || line.markers.protected_header;

        let line_type = if in_header {
            self.classify_header(store, row, line, &mut outcome)
        } else if line.raw.starts_with(ANSI_RESET) {
            LineType::Normal
        } else if line.markers.attachment {
            LineType::Attachment
        } else if is_signature_delimiter(&line.clean) {
            store.record_mut(row).line_type = LineType::Signature;
            if let Some(range) = reclaim_signature(store, row) {
                outcome = outcome.with_repaint(range);
            }
            LineType::Signature
        } else if continues_signature(store.rows(), row, line) {
            LineType::Signature
        } else if let Some(prefix) = self.rules.quote_patterns().quote_prefix(line.content()) {
            if classify_quotes && store.record(row).quote.is_none() {
                let found = quotes.classify(&line.content()[prefix]);
                store.record_mut(row).quote = Some(found.id);
                if found.restructured {
                    debug!(row, "Quote forest restructured");
                    outcome = outcome.with_repaint(0..row);
                }
            }
            LineType::Quoted
        } else {
            LineType::Normal
        };
        store.record_mut(row).line_type = line_type;

        let context = match line_type {
            LineType::Normal | LineType::Quoted => Some((RuleContext::Body, true)),
            LineType::HeaderDefault if self.options.header_color_partial => {
                Some((RuleContext::Header, true))
            }
            LineType::Attachment => Some((RuleContext::Attachment, false)),
            _ => None,
        };
        if let Some((context, stop_on_miss)) = context {
            store.record_mut(row).style_chunks =
                highlight(self.rules.rules(context), line.content(), stop_on_miss);
        }

        store.propagate_type(row);
        trace!(row, ?line_type, "Classified line");
        outcome
    }

    fn classify_header(
        &self,
        store: &mut LineStore,
        row: usize,
        line: &NormalizedLine,
        outcome: &mut ClassifyOutcome,
    ) -> LineType {
        if line.is_blank() {
            return LineType::Normal;
        }
        let partial = self.options.header_color_partial;

        let mut line_type = LineType::HeaderDefault;
        if row > 0 && matches!(line.clean.first(), Some(b' ' | b'\t')) {
            let above_origin = store.origin_of(row - 1);
            let inherited = store.line_type(row - 1);
            let inherited_style = store.record(above_origin).line_style;
            if inherited.is_header() {
                line_type = inherited;
            }
            if !partial {
                let record = store.record_mut(row);
                record.line_style = inherited_style;
                record.is_header_continuation = true;
            }
        }

        if partial {
            return line_type;
        }
        let Some(rule) = self
            .rules
            .rules(RuleContext::Header)
            .iter()
            .find(|r| r.pattern.is_match(line.content()))
        else {
            return line_type;
        };

        let style = rule.style;
        let record = store.record_mut(row);
        record.line_style = Some(style);
        if record.is_header_continuation {
            let first = recolor_header_field(store, row, style);
            *outcome = outcome.clone().with_repaint(first..row);
        }
        LineType::Header
    }
}

/// Retype the rows of the header field above `row` and return its first row.
fn recolor_header_field(store: &mut LineStore, row: usize, style: ratatui::style::Style) -> usize {
    let mut first = row;
    while first > 0 {
        first -= 1;
        let record = store.record_mut(first);
        let keep_walking = record.is_header_continuation || record.is_continuation();
        record.line_type = LineType::Header;
        record.line_style = Some(style);
        if !keep_walking {
            break;
        }
    }
    first
}

fn is_signature_delimiter(clean: &[u8]) -> bool {
    clean == b"-- \n" || clean == b"-- \r\n"
}

/// True if `candidate` at `row` continues a signature block ending just above it.
///
/// Up to [`SIGNATURE_LINES`] signature lines above, any non-blank line
/// continues the block and a blank line closes it. Past that bound only
/// whitespace lines continue it.
pub fn continues_signature(rows: &[LineRecord], row: usize, candidate: &NormalizedLine) -> bool {
    let count = signature_run(rows, row);
    if count == 0 {
        false
    } else if count > SIGNATURE_LINES {
        candidate.is_whitespace()
    } else {
        !candidate.is_blank()
    }
}

/// Number of logical signature lines directly above `row`, capped just past the bound.
fn signature_run(rows: &[LineRecord], row: usize) -> usize {
    let mut count = 0;
    let mut index = row.min(rows.len());
    while index > 0 && count <= SIGNATURE_LINES {
        index -= 1;
        let record = &rows[index];
        if record.line_type != LineType::Signature {
            break;
        }
        if !record.is_continuation() {
            count += 1;
        }
    }
    count
}

/// Retype already scanned plain rows below a signature delimiter at `row`.
///
/// Returns the reclaimed rows, which were painted with their old type.
fn reclaim_signature(store: &mut LineStore, row: usize) -> Option<Range<usize>> {
    let mut next = row + 1;
    while next < store.last() {
        let Some(record) = store.get(next) else {
            break;
        };
        let (line_type, continuation, blank) =
            (record.line_type, record.is_continuation(), record.is_blank);
        let plain = matches!(
            line_type,
            LineType::Normal | LineType::Quoted | LineType::Header
        );
        if !plain {
            break;
        }
        if !continuation {
            let count = signature_run(store.rows(), next);
            let within_bound = count > 0 && count <= SIGNATURE_LINES;
            if !within_bound || blank {
                break;
            }
        }
        let record = store.record_mut(next);
        record.style_chunks.clear();
        record.line_type = LineType::Signature;
        next += 1;
    }
    (next > row + 1).then(|| row + 1..next)
}

/// Run one highlight pass of `rules` over `text`.
///
/// At each offset every active rule is tried; the earliest match wins, and
/// the longest among those starting together. The scan then continues at the
/// end of the kept match. With `stop_on_miss` a rule that fails once is not
/// tried again on this line.
pub fn highlight(rules: &[StyleRule], text: &[u8], stop_on_miss: bool) -> Vec<StyleChunk> {
    let mut chunks: Vec<StyleChunk> = Vec::new();
    let mut stopped = vec![false; rules.len()];
    let mut offset = 0;

    while offset < text.len() {
        let mut best: Option<StyleChunk> = None;
        let mut empty_match = false;

        for (rule, stopped) in rules.iter().zip(stopped.iter_mut()) {
            if *stopped {
                continue;
            }
            let Some(m) = rule.pattern.find_at(text, offset) else {
                *stopped = stop_on_miss;
                continue;
            };
            if m.is_empty() {
                empty_match = true;
                continue;
            }
            let better = best.map_or(true, |b| {
                m.start() < b.start || (m.start() == b.start && m.end() > b.end)
            });
            if better {
                best = Some(StyleChunk {
                    start: m.start(),
                    end: m.end(),
                    style: rule.style,
                });
            }
        }

        match best {
            Some(chunk) => {
                if chunks.len() >= MAX_CHUNKS {
                    trace!(offset, "Chunk limit reached");
                    break;
                }
                offset = chunk.end;
                chunks.push(chunk);
            }
            None if empty_match => offset += 1,
            None => break,
        }
    }
    chunks
}

/// Find every match of a search pattern in `text`.
pub fn find_search_chunks(pattern: &Regex, text: &[u8]) -> Vec<SearchChunk> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    while offset < text.len() && chunks.len() < MAX_CHUNKS {
        let Some(m) = pattern.find_at(text, offset) else {
            break;
        };
        if m.is_empty() {
            offset = m.start() + 1;
            continue;
        }
        chunks.push(SearchChunk {
            start: m.start(),
            end: m.end(),
        });
        offset = m.end();
    }
    chunks
}

/// Compute the search chunks of logical line `row` if they are missing.
pub fn apply_search(store: &mut LineStore, row: usize, line: &NormalizedLine, pattern: &Regex) {
    let record = store.record_mut(row);
    if record.search_chunks.is_none() {
        record.search_chunks = Some(find_search_chunks(pattern, line.content()));
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
