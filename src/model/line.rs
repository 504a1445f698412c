//! Per-row line metadata kept by the line store.
//!
//! One [`LineRecord`] exists per rendered row. A logical source line that wraps
//! across several rows produces one record for its first row plus one
//! continuation record per additional row. Chunk offsets are byte positions in
//! the clean (escape-normalized) text of the logical line, so every row of a
//! wrapped line shares the same coordinate space.

use ratatui::style::Style;
use std::ops::Range;

// ===== LineType =====

/// Semantic classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineType {
    /// Not classified yet, or invalidated.
    #[default]
    Unclassified,
    /// Plain body text.
    Normal,
    /// Header line matched by a configured header rule.
    Header,
    /// Header line with no matching rule.
    HeaderDefault,
    /// Quoted text (matched the quote pattern).
    Quoted,
    /// Part of a signature block.
    Signature,
    /// Attachment boundary line.
    Attachment,
    /// Line of an application message log.
    MessageLog,
}

impl LineType {
    /// True for both header variants.
    pub fn is_header(self) -> bool {
        matches!(self, LineType::Header | LineType::HeaderDefault)
    }

    /// True once a concrete type has been assigned.
    pub fn is_classified(self) -> bool {
        self != LineType::Unclassified
    }
}

// ===== Chunks =====

/// Common view over chunk types so lookups can share one binary search.
pub trait ChunkSpan {
    /// Byte range covered by the chunk, end exclusive.
    fn span(&self) -> Range<usize>;
}

/// A colored byte range of clean text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleChunk {
    /// First byte covered.
    pub start: usize,
    /// One past the last byte covered.
    pub end: usize,
    /// Color applied to the range.
    pub style: Style,
}

impl ChunkSpan for StyleChunk {
    fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A search-match byte range of clean text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchChunk {
    /// First byte of the match.
    pub start: usize,
    /// One past the last byte of the match.
    pub end: usize,
}

impl ChunkSpan for SearchChunk {
    fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Find the chunk covering `pos`.
///
/// `chunks` must be sorted by start and mutually exclusive, which both
/// highlight passes guarantee by construction.
pub fn chunk_at<T: ChunkSpan>(chunks: &[T], pos: usize) -> Option<&T> {
    let idx = chunks.partition_point(|c| c.span().end <= pos);
    chunks.get(idx).filter(|c| c.span().contains(&pos))
}

// ===== QuoteId =====

/// Index of a node in the quote forest arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuoteId(usize);

impl QuoteId {
    /// Wrap a raw arena index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw arena index.
    pub fn get(self) -> usize {
        self.0
    }
}

// ===== LineRecord =====

/// Link from a wrapped row back to the row holding its logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    /// Row index of the logical line's first row.
    pub origin: usize,
    /// Clean-text byte position where this row starts.
    pub clean_start: usize,
}

/// Metadata for one rendered row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineRecord {
    /// Start offset of the row in the source stream.
    pub byte_offset: u64,
    /// Classification; continuation rows copy their origin's type.
    pub line_type: LineType,
    /// Set when this row is the wrapped tail of an earlier logical line.
    pub continuation: Option<Continuation>,
    /// Style-rule highlights, sorted and non-overlapping.
    pub style_chunks: Vec<StyleChunk>,
    /// Search highlights; `None` until computed for the active pattern.
    pub search_chunks: Option<Vec<SearchChunk>>,
    /// Quote class for quoted lines, once classified.
    pub quote: Option<QuoteId>,
    /// Whole-line color chosen by a header rule or the message-log level.
    pub line_style: Option<Style>,
    /// Header field continuation (leading whitespace) that inherited its color.
    pub is_header_continuation: bool,
    /// The line holds nothing but a line terminator.
    pub is_blank: bool,
}

impl LineRecord {
    /// True for wrap-continuation rows.
    pub fn is_continuation(&self) -> bool {
        self.continuation.is_some()
    }

    /// Clean-text position this row starts at.
    pub fn clean_start(&self) -> usize {
        self.continuation.map_or(0, |c| c.clean_start)
    }

    /// Number of search matches, or `None` when not computed.
    pub fn search_count(&self) -> Option<usize> {
        self.search_chunks.as_ref().map(Vec::len)
    }

    /// Forget classification and every derived chunk list.
    pub fn reset_classification(&mut self) {
        self.line_type = LineType::Unclassified;
        self.style_chunks.clear();
        self.search_chunks = None;
        self.quote = None;
        self.line_style = None;
        self.is_header_continuation = false;
        self.is_blank = false;
    }
}
