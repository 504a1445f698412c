//! Search prompt shown in place of the status bar while a pattern is typed.

use crate::state::SearchDirection;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Pattern being typed and the direction it will search in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPrompt {
    direction: SearchDirection,
    query: String,
}

impl SearchPrompt {
    /// Empty prompt for `direction`.
    pub fn new(direction: SearchDirection) -> Self {
        Self {
            direction,
            query: String::new(),
        }
    }

    /// Direction the search will run in.
    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// Pattern typed so far.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Append a typed character.
    pub fn push(&mut self, ch: char) {
        self.query.push(ch);
    }

    /// Delete the last character. Returns false when the prompt was already
    /// empty.
    pub fn pop(&mut self) -> bool {
        self.query.pop().is_some()
    }

    fn leader(&self) -> &'static str {
        match self.direction {
            SearchDirection::Forward => "/",
            SearchDirection::Backward => "?",
        }
    }
}

/// Search prompt widget.
pub struct SearchInput<'a> {
    prompt: &'a SearchPrompt,
    style: Style,
}

impl<'a> SearchInput<'a> {
    /// Create new SearchInput widget.
    pub fn new(prompt: &'a SearchPrompt, style: Style) -> Self {
        Self { prompt, style }
    }
}

impl Widget for SearchInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::raw(self.prompt.leader()),
            Span::raw(self.prompt.query.as_str()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]);
        Paragraph::new(line).style(self.style).render(area, buf);
    }
}
