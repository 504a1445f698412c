//! Viewport controller.
//!
//! A [`PagerSession`] owns everything one paged text needs: the source
//! stream, the row store, the quote forest and the compiled rules. Rows are
//! discovered lazily. Rendering starts at the top row and lays out, classifies
//! and paints rows until the viewport is full; navigation moves the top row
//! and scans further only when it has to.
//!
//! # Redraw passes
//!
//! Classifying a line can recolor rows above it (see
//! [`ClassifyOutcome`](crate::classify::ClassifyOutcome)). When that touches a
//! row already painted in the current pass, `force_redraw` is raised, the rest
//! of the pass only counts rows, and the pass is repeated.

use super::search::{SearchDirection, SearchQuery, SearchState};
use crate::classify::{apply_search, Classifier, ClassifyOptions, QuoteForest, RuleSet};
use crate::model::{
    Continuation, KeyAction, LineRecord, LineType, Notice, PagerError, PatternError, StreamError,
};
use crate::parser::{normalize, NormalizedLine, NormalizerOptions};
use crate::source::PagerSource;
use crate::view_state::{
    layout_row, row_glyphs, wrap_columns, Canvas, LineStore, PaintContext, Painter, RowLayout,
    WrapSettings,
};
use std::fmt;
use tracing::{debug, info, trace};

// ===== Options =====

/// Pager behavior switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerOptions {
    /// Color by line type, quote level and style rules.
    pub show_color: bool,
    /// Classify lines even when not coloring.
    pub show_types: bool,
    /// Treat the text as an application message log.
    pub message_log: bool,
    /// The text has no leading header block.
    pub body_only: bool,
    /// Wrap margin: 0 = window width, > 0 = at most that many columns,
    /// < 0 = window width minus that many.
    pub wrap: i32,
    /// Ignore the wrap margin and wrap at the window width.
    pub no_wrap: bool,
    /// Break rows at word boundaries.
    pub smart_wrap: bool,
    /// Keep leading blanks on continuation rows.
    pub no_skip_blanks: bool,
    /// Draw `+` at the start of continuation rows.
    pub markers: bool,
    /// Pad rows past the end of text with `~`.
    pub tilde: bool,
    /// Apply ANSI color sequences found in the text.
    pub allow_ansi: bool,
    /// Match header rules per line instead of per header field.
    pub header_color_partial: bool,
    /// Rows of the previous page kept on screen by `NextPage`.
    pub pager_context: usize,
    /// Rows shown above a search hit.
    pub search_context: usize,
    /// Continue searching from the other end.
    pub wrap_search: bool,
    /// Rows of lookahead used when skipping quoted text.
    pub skip_quoted_offset: usize,
    /// Hide quoted rows.
    pub hide_quoted: bool,
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            show_color: true,
            show_types: false,
            message_log: false,
            body_only: false,
            wrap: 0,
            no_wrap: false,
            smart_wrap: true,
            no_skip_blanks: false,
            markers: true,
            tilde: false,
            allow_ansi: false,
            header_color_partial: false,
            pager_context: 0,
            search_context: 0,
            wrap_search: true,
            skip_quoted_offset: 0,
            hide_quoted: false,
        }
    }
}

/// Size of the text area in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Columns.
    pub width: u16,
    /// Text rows, at least one.
    pub height: u16,
}

impl Viewport {
    /// Create a viewport, clamping both dimensions to at least one cell.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

// ===== Render and close results =====

/// How much of the text the last render showed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Everything fits on screen from the top.
    All,
    /// The end of the text is visible.
    End,
    /// Share of the stream before the first row not shown.
    Percent(u8),
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::All => f.write_str("All"),
            Progress::End => f.write_str("End"),
            Progress::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// Outcome of one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStatus {
    /// Row drawn first.
    pub top: usize,
    /// Row after the last one considered.
    pub last_row: usize,
    /// Screen rows drawn with text.
    pub rows_drawn: usize,
    /// Position indicator.
    pub progress: Progress,
}

/// Scroll position that survives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResumePosition {
    /// Logical line index of the top row.
    pub logical_line: usize,
}

/// What a closed session hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Source name.
    pub name: String,
    /// Rows laid out during the session.
    pub rows_scanned: usize,
    /// Where the user left off.
    pub resume: ResumePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStatus {
    Eof,
    Skipped,
    Drawn,
}

// ===== PagerSession =====

/// One paged text and its viewport.
#[derive(Debug)]
pub struct PagerSession<S> {
    source: S,
    store: LineStore,
    quotes: QuoteForest,
    classifier: Classifier,
    normalizer: NormalizerOptions,
    options: PagerOptions,
    search: SearchState,
    viewport: Viewport,
    top: usize,
    force_redraw: bool,
    line_cache: Option<(u64, NormalizedLine)>,
    painter: Painter,
}

impl<S: PagerSource> PagerSession<S> {
    /// Start a session at the top of `source`.
    pub fn open(source: S, rules: RuleSet, options: PagerOptions, viewport: Viewport) -> Self {
        let quotes = QuoteForest::new(rules.scheme().quoted.clone());
        let classifier = Classifier::new(
            rules,
            ClassifyOptions {
                header_color_partial: options.header_color_partial,
                message_log: options.message_log,
                body_only: options.body_only,
            },
        );
        let normalizer = NormalizerOptions {
            allow_ansi: options.allow_ansi,
            ..NormalizerOptions::default()
        };
        info!(name = source.name(), len = source.len(), "Opened pager session");
        Self {
            source,
            store: LineStore::with_capacity(usize::from(viewport.height) * 2),
            quotes,
            classifier,
            normalizer,
            options,
            search: SearchState::Inactive,
            viewport,
            top: 0,
            force_redraw: false,
            line_cache: None,
            painter: Painter::new(),
        }
    }

    /// Start a session at a position saved by an earlier [`PagerSession::close`].
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the source fails while scanning to the position.
    pub fn open_at(
        source: S,
        rules: RuleSet,
        options: PagerOptions,
        viewport: Viewport,
        resume: ResumePosition,
    ) -> Result<Self, PagerError> {
        let mut session = Self::open(source, rules, options, viewport);
        session.top = session.replay_logical(resume.logical_line)?;
        debug!(resume = resume.logical_line, top = session.top, "Restored position");
        Ok(session)
    }

    /// End the session, releasing color pairs.
    pub fn close(mut self) -> SessionSummary {
        self.painter.release();
        let summary = SessionSummary {
            name: self.source.name().to_string(),
            rows_scanned: self.store.last(),
            resume: self.resume_position(),
        };
        info!(
            name = %summary.name,
            rows = summary.rows_scanned,
            resume = summary.resume.logical_line,
            "Closed pager session"
        );
        summary
    }

    // ===== Accessors =====

    /// First row on screen.
    pub fn top(&self) -> usize {
        self.top
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Behavior switches.
    pub fn options(&self) -> &PagerOptions {
        &self.options
    }

    /// Row metadata discovered so far.
    pub fn store(&self) -> &LineStore {
        &self.store
    }

    /// Quote levels seen so far.
    pub fn quotes(&self) -> &QuoteForest {
        &self.quotes
    }

    /// Compiled rules and colors.
    pub fn rules(&self) -> &RuleSet {
        self.classifier.rules()
    }

    /// Search state.
    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    /// Source name.
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Logical line index of the top row.
    pub fn resume_position(&self) -> ResumePosition {
        ResumePosition {
            logical_line: self.store.logical_index(self.store.origin_of(self.top)),
        }
    }

    /// Record for `row`, scanning forward with classification until it is
    /// known. `None` past the end of the text.
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the source fails.
    pub fn get_or_scan(&mut self, row: usize) -> Result<Option<&LineRecord>, StreamError> {
        while self.store.last() <= row {
            let next = self.store.last();
            if self.display_row(next, None, true)? == RowStatus::Eof {
                return Ok(None);
            }
        }
        if !self.store.line_type(row).is_classified() {
            self.display_row(row, None, true)?;
        }
        Ok(self.store.get(row))
    }

    // ===== Rows =====

    fn classifies(&self) -> bool {
        self.options.show_color
            || self.options.show_types
            || self.options.message_log
            || self.options.hide_quoted
    }

    fn hides(&self, row: usize) -> bool {
        self.options.hide_quoted && self.store.line_type(row) == LineType::Quoted
    }

    fn wrap_settings(&self) -> WrapSettings {
        let window_cols = usize::from(self.viewport.width);
        let wrap_cols = if self.options.no_wrap {
            window_cols
        } else {
            wrap_columns(window_cols, self.options.wrap)
        };
        WrapSettings {
            wrap_cols,
            window_cols,
            markers: self.options.markers,
            smart_wrap: self.options.smart_wrap,
            no_skip_blanks: self.options.no_skip_blanks,
        }
    }

    /// Lay out row `n`, classifying its line first, and paint it when `show`
    /// gives a canvas row.
    fn display_row(
        &mut self,
        n: usize,
        show: Option<(&mut dyn Canvas, u16)>,
        types: bool,
    ) -> Result<RowStatus, StreamError> {
        let fresh = self.store.mark_laid_out(n);
        let origin = self.store.origin_of(n);
        let offset = self.store.record(origin).byte_offset;

        let line = match self.line_cache.take() {
            Some((cached, line)) if cached == offset => line,
            _ => match self.source.read_line_at(offset)? {
                Some(raw) => normalize(&raw, &self.normalizer),
                None => {
                    if fresh {
                        self.store.unmark_laid_out(n);
                    }
                    return Ok(RowStatus::Eof);
                }
            },
        };
        let status = self.display_line(n, origin, offset, &line, show, types, fresh);
        self.line_cache = Some((offset, line));
        Ok(status)
    }

    #[allow(clippy::too_many_arguments)]
    fn display_line(
        &mut self,
        n: usize,
        origin: usize,
        offset: u64,
        line: &NormalizedLine,
        show: Option<(&mut dyn Canvas, u16)>,
        types: bool,
        fresh: bool,
    ) -> RowStatus {
        if (types || self.classifies()) && !self.store.line_type(origin).is_classified() {
            let outcome = self.classifier.classify_and_highlight(
                &mut self.store,
                &mut self.quotes,
                origin,
                line,
                self.options.show_color,
            );
            if let Some(range) = outcome.repaint_range() {
                if range.start < n && range.end > self.top {
                    debug!(row = origin, ?range, "Rows above recolored");
                    self.force_redraw = true;
                }
            }
        }

        let line_type = self.store.line_type(origin);
        if self.options.show_color
            && line_type == LineType::Quoted
            && self.store.record(origin).quote.is_none()
        {
            self.classify_quote(n, origin, line);
        }
        if let Some(pattern) = self.search.pattern() {
            if self.store.record(origin).search_chunks.is_none() {
                apply_search(&mut self.store, origin, line, pattern);
            }
        }

        let show = if self.hides(origin) { None } else { show };
        if !fresh && (show.is_none() || self.force_redraw) {
            return if show.is_some() {
                RowStatus::Drawn
            } else {
                RowStatus::Skipped
            };
        }

        let layout = self.lay_out(n, origin, offset, line, fresh);
        match show {
            Some((canvas, y)) => {
                self.paint(canvas, y, origin, line, &layout);
                RowStatus::Drawn
            }
            None => RowStatus::Skipped,
        }
    }

    /// Color a quoted line that was classified while colors were off.
    fn classify_quote(&mut self, n: usize, origin: usize, line: &NormalizedLine) {
        let Some(prefix) = self
            .classifier
            .rules()
            .quote_patterns()
            .quote_prefix(line.content())
        else {
            return;
        };
        let found = self.quotes.classify(&line.content()[prefix]);
        self.store.record_mut(origin).quote = Some(found.id);
        if found.restructured && n > self.top {
            self.force_redraw = true;
        }
    }

    fn lay_out(
        &mut self,
        n: usize,
        origin: usize,
        offset: u64,
        line: &NormalizedLine,
        fresh: bool,
    ) -> RowLayout {
        let settings = self.wrap_settings();
        let line_type = self.store.line_type(origin);
        let record = self.store.record(n);
        let layout = layout_row(
            line,
            record.clean_start(),
            record.is_continuation(),
            line_type.is_header(),
            &settings,
        );

        if fresh {
            let next = self.store.record_mut(n + 1);
            if layout.wraps(line) {
                next.continuation = Some(Continuation {
                    origin,
                    clean_start: layout.next,
                });
                next.line_type = line_type;
                next.byte_offset = offset + line.raw_offset(layout.next) as u64;
            } else {
                next.continuation = None;
                next.byte_offset = offset + line.raw.len() as u64;
            }
        }
        layout
    }

    fn paint(
        &mut self,
        canvas: &mut dyn Canvas,
        y: u16,
        origin: usize,
        line: &NormalizedLine,
        layout: &RowLayout,
    ) {
        let glyphs = row_glyphs(line, layout);
        let Some(record) = self.store.get(origin) else {
            return;
        };
        let ctx = PaintContext {
            scheme: self.classifier.rules().scheme(),
            quotes: &self.quotes,
            origin: record,
            show_color: self.options.show_color,
            show_search: self.search.highlight_visible(),
            message_log: self.options.message_log,
        };
        self.painter
            .paint_row(canvas, y, &ctx, line, &glyphs, layout.first_col > 0);
    }

    // ===== Rendering =====

    /// Paint the viewport starting at the top row.
    ///
    /// # Errors
    ///
    /// Returns `PagerError::Stream` if the source fails. The session should
    /// be abandoned.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> Result<RenderStatus, PagerError> {
        let height = self.viewport.height;
        let len = self.source.len();
        let mut passes = 0;

        let (row, drawn) = loop {
            self.force_redraw = false;
            let mut drawn: u16 = 0;
            let mut row = self.top;
            while drawn < height && self.store.record(row).byte_offset < len {
                match self.display_row(row, Some((&mut *canvas, drawn)), false)? {
                    RowStatus::Drawn => drawn += 1,
                    RowStatus::Skipped => {}
                    RowStatus::Eof => break,
                }
                row += 1;
            }
            passes += 1;
            if !self.force_redraw {
                break (row, drawn);
            }
            trace!(passes, "Repeating render pass");
        };

        let scheme = self.classifier.rules().scheme();
        for y in drawn..height {
            canvas.move_cursor(y, 0);
            if self.options.tilde {
                canvas.set_style(scheme.tilde);
                canvas.emit("~", 1);
            }
            canvas.set_style(scheme.normal);
            canvas.clear_to_eol();
        }

        let last_offset = self.store.record(row).byte_offset;
        let progress = if last_offset < len {
            Progress::Percent(u8::try_from(last_offset * 100 / len).unwrap_or(100))
        } else if self.top == 0 {
            Progress::All
        } else {
            Progress::End
        };
        Ok(RenderStatus {
            top: self.top,
            last_row: row,
            rows_drawn: usize::from(drawn),
            progress,
        })
    }

    /// Change the viewport size, keeping the logical line at the top.
    ///
    /// All layout and classification is discarded and rebuilt for the new
    /// width.
    ///
    /// # Errors
    ///
    /// Returns `PagerError::Stream` if the source fails while rescanning.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), PagerError> {
        let logical = self.resume_position().logical_line;
        self.viewport = viewport;
        self.store.invalidate_from(0);
        self.top = self.replay_logical(logical)?;
        debug!(
            width = viewport.width,
            height = viewport.height,
            logical,
            top = self.top,
            "Resized"
        );
        Ok(())
    }

    /// Scan from row 0 and return the first row of logical line `logical`.
    ///
    /// With an active search the scan continues to the end so every row has
    /// its search chunks.
    fn replay_logical(&mut self, logical: usize) -> Result<usize, StreamError> {
        let mut top = 0;
        let mut seen = 0;
        let mut row = 0;
        while self.display_row(row, None, false)? != RowStatus::Eof {
            if !self.store.record(row).is_continuation() {
                if seen == logical {
                    top = row;
                    if !self.search.is_active() {
                        break;
                    }
                }
                seen += 1;
            }
            row += 1;
        }
        Ok(top)
    }

    fn scan_to_eof(&mut self) -> Result<(), StreamError> {
        let mut row = self.store.last();
        while self.display_row(row, None, false)? != RowStatus::Eof {
            row += 1;
        }
        Ok(())
    }

    /// Compute search chunks for every row, revisiting rows already laid out.
    fn scan_search(&mut self) -> Result<(), StreamError> {
        for row in 0..self.store.last() {
            if self.display_row(row, None, false)? == RowStatus::Eof {
                return Ok(());
            }
        }
        self.scan_to_eof()
    }

    // ===== Navigation =====

    /// Move up `count` visible rows from `row`.
    fn up_rows(&self, count: usize, mut row: usize) -> usize {
        let mut count = count;
        while row > 0 && count > 0 {
            row -= 1;
            if !self.hides(row) {
                count -= 1;
            }
        }
        row
    }

    /// Row after the last one a render would show.
    fn visible_end(&mut self) -> Result<usize, StreamError> {
        let height = usize::from(self.viewport.height);
        let len = self.source.len();
        let mut shown = 0;
        let mut row = self.top;
        while shown < height && self.store.record(row).byte_offset < len {
            if self.display_row(row, None, false)? == RowStatus::Eof {
                break;
            }
            if !self.hides(row) {
                shown += 1;
            }
            row += 1;
        }
        Ok(row)
    }

    fn more_below(&mut self, row: usize) -> bool {
        self.store.record(row).byte_offset < self.source.len()
    }

    /// Apply a navigation key.
    ///
    /// Keys the shell handles itself (search prompts, redraw, quit) are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `PagerError::Stream` if the source fails.
    pub fn handle(&mut self, action: KeyAction) -> Result<Option<Notice>, PagerError> {
        let notice = match action {
            KeyAction::NextLine => self.next_line()?,
            KeyAction::PrevLine => self.prev_line(),
            KeyAction::NextPage => self.next_page()?,
            KeyAction::PrevPage => self.prev_page(),
            KeyAction::HalfDown => self.half_down()?,
            KeyAction::HalfUp => self.half_up(),
            KeyAction::Top => self.jump_top(),
            KeyAction::Bottom => self.jump_bottom()?,
            KeyAction::SearchNext | KeyAction::SearchOpposite => {
                match self.search.direction() {
                    Some(direction) if action == KeyAction::SearchOpposite => {
                        self.search_next(direction.reverse())?
                    }
                    Some(direction) => self.search_next(direction)?,
                    None => Some(Notice::NoSearchPattern),
                }
            }
            KeyAction::ToggleSearchHighlight => {
                self.toggle_search_highlight();
                None
            }
            KeyAction::ToggleQuoted => {
                self.toggle_hide_quoted();
                None
            }
            KeyAction::SkipQuoted => self.skip_quoted()?,
            KeyAction::SearchForward
            | KeyAction::SearchBackward
            | KeyAction::Redraw
            | KeyAction::Quit => None,
        };
        debug!(?action, top = self.top, ?notice, "Navigation");
        Ok(notice)
    }

    /// Scroll down one visible row.
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the source fails.
    pub fn next_line(&mut self) -> Result<Option<Notice>, StreamError> {
        let end = self.visible_end()?;
        if !self.more_below(end) {
            return Ok(Some(Notice::BottomShown));
        }
        self.top += 1;
        while self.hides(self.top) && self.top < self.store.last() {
            self.top += 1;
        }
        Ok(None)
    }

    /// Scroll up one visible row.
    pub fn prev_line(&mut self) -> Option<Notice> {
        if self.top == 0 {
            return Some(Notice::TopShown);
        }
        self.top = self.up_rows(1, self.top);
        None
    }

    /// Show the next page, keeping `pager_context` rows of the current one.
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the source fails.
    pub fn next_page(&mut self) -> Result<Option<Notice>, StreamError> {
        let end = self.visible_end()?;
        if !self.more_below(end) {
            return Ok(Some(Notice::BottomShown));
        }
        self.top = self.up_rows(self.options.pager_context, end);
        Ok(None)
    }

    /// Show the previous page.
    pub fn prev_page(&mut self) -> Option<Notice> {
        if self.top == 0 {
            return Some(Notice::TopShown);
        }
        let rows = usize::from(self.viewport.height)
            .saturating_sub(self.options.pager_context)
            .max(1);
        self.top = self.up_rows(rows, self.top);
        None
    }

    /// Scroll down half a page.
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the source fails.
    pub fn half_down(&mut self) -> Result<Option<Notice>, StreamError> {
        let end = self.visible_end()?;
        if !self.more_below(end) {
            return Ok(Some(Notice::BottomShown));
        }
        self.top = self.up_rows(usize::from(self.viewport.height) / 2, end);
        Ok(None)
    }

    /// Scroll up half a page.
    pub fn half_up(&mut self) -> Option<Notice> {
        if self.top == 0 {
            return Some(Notice::TopShown);
        }
        let height = usize::from(self.viewport.height);
        self.top = self.up_rows(height / 2 + height % 2, self.top);
        None
    }

    /// Jump to the first row.
    pub fn jump_top(&mut self) -> Option<Notice> {
        if self.top == 0 {
            return Some(Notice::TopShown);
        }
        self.top = 0;
        None
    }

    /// Jump so the last page is shown.
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the source fails.
    pub fn jump_bottom(&mut self) -> Result<Option<Notice>, StreamError> {
        let end = self.visible_end()?;
        if !self.more_below(end) {
            return Ok(Some(Notice::BottomShown));
        }
        self.scan_to_eof()?;
        self.top = self.up_rows(usize::from(self.viewport.height), self.store.last());
        Ok(None)
    }

    // ===== Search =====

    fn search_context(&self) -> usize {
        if self.options.search_context < usize::from(self.viewport.height) {
            self.options.search_context
        } else {
            0
        }
    }

    fn is_hit(&self, row: usize) -> bool {
        self.store.get(row).is_some_and(|r| {
            !r.is_continuation()
                && r.search_count().is_some_and(|count| count > 0)
                && !(self.options.hide_quoted && r.line_type == LineType::Quoted)
        })
    }

    fn show_hit(&mut self, row: usize) {
        self.top = row;
        self.search.show_highlight();
        let context = self.search_context();
        if self.top > context {
            self.top -= context;
        }
    }

    /// Search for `query` from the top row.
    ///
    /// Every row of the text is scanned for matches. Returns whether a match
    /// was found; when none is, the search is turned off.
    ///
    /// # Errors
    ///
    /// Returns `PagerError::Pattern` if the query is empty or does not
    /// compile, and `PagerError::Stream` if the source fails.
    pub fn search(&mut self, query: &str, direction: SearchDirection) -> Result<bool, PagerError> {
        let query =
            SearchQuery::new(query).ok_or_else(|| PatternError::new(query, "empty pattern"))?;
        self.store.reset_search();
        self.search = SearchState::Inactive;
        self.search = SearchState::activate(query, direction)?;
        self.scan_search()?;

        let last = self.store.last();
        let hit = match direction {
            SearchDirection::Forward => (self.top..last).find(|&row| self.is_hit(row)),
            SearchDirection::Backward => (0..=self.top).rev().find(|&row| self.is_hit(row)),
        };
        match hit {
            Some(row) => {
                self.show_hit(row);
                debug!(row, top = self.top, "Search hit");
                Ok(true)
            }
            None => {
                self.search = SearchState::Inactive;
                self.store.reset_search();
                debug!("Search found nothing");
                Ok(false)
            }
        }
    }

    /// Move to the next match in `direction`.
    ///
    /// # Errors
    ///
    /// Returns `PagerError::Stream` if the source fails.
    pub fn search_next(&mut self, direction: SearchDirection) -> Result<Option<Notice>, PagerError> {
        if !self.search.is_active() {
            return Ok(Some(Notice::NoSearchPattern));
        }
        let context = self.search_context();
        let last = self.store.last();
        let mut notice = None;

        let hit = match direction {
            SearchDirection::Forward => {
                let start = self.top + context + 1;
                (start..last).find(|&row| self.is_hit(row)).or_else(|| {
                    if self.options.wrap_search {
                        notice = Some(Notice::SearchWrappedToTop);
                        (0..last).find(|&row| self.is_hit(row))
                    } else {
                        None
                    }
                })
            }
            SearchDirection::Backward => (self.top + context)
                .checked_sub(1)
                .and_then(|start| (0..=start).rev().find(|&row| self.is_hit(row)))
                .or_else(|| {
                    if self.options.wrap_search {
                        notice = Some(Notice::SearchWrappedToBottom);
                        (0..last).rev().find(|&row| self.is_hit(row))
                    } else {
                        None
                    }
                }),
        };

        match hit {
            Some(row) => {
                self.show_hit(row);
                Ok(notice)
            }
            None => Ok(Some(Notice::NotFound)),
        }
    }

    /// Show or hide match highlighting.
    pub fn toggle_search_highlight(&mut self) {
        self.search.toggle_highlight();
    }

    // ===== Quoted text =====

    /// Hide or show quoted rows.
    pub fn set_hide_quoted(&mut self, hide: bool) {
        self.options.hide_quoted = hide;
        if hide && self.store.line_type(self.top) == LineType::Quoted {
            self.top = self.up_rows(1, self.top);
        }
    }

    /// Flip quoted-row hiding.
    pub fn toggle_hide_quoted(&mut self) {
        self.set_hide_quoted(!self.options.hide_quoted);
    }

    fn line_type_at(&mut self, row: usize) -> Result<Option<LineType>, StreamError> {
        Ok(self.get_or_scan(row)?.map(|r| r.line_type))
    }

    /// Jump past the next block of quoted text.
    ///
    /// On a header block the jump only skips the headers. Ignored while
    /// quoted rows are hidden.
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the source fails.
    pub fn skip_quoted(&mut self) -> Result<Option<Notice>, StreamError> {
        if self.options.hide_quoted {
            return Ok(None);
        }
        let lookahead = self.options.skip_quoted_offset;
        let mut row = self.top;

        if self.line_type_at(row)?.is_some_and(LineType::is_header) {
            while self.line_type_at(row)?.is_some_and(LineType::is_header) {
                row += 1;
            }
            self.top = row;
            return Ok(None);
        }

        loop {
            match self.line_type_at(row + lookahead)? {
                None => return Ok(Some(Notice::NoMoreQuoted)),
                Some(LineType::Quoted) => break,
                Some(_) => row += 1,
            }
        }
        loop {
            match self.line_type_at(row + lookahead)? {
                None => return Ok(Some(Notice::NoMoreUnquoted)),
                Some(LineType::Quoted) => row += 1,
                Some(_) => break,
            }
        }
        self.top = row;
        Ok(None)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
