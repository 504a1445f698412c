//! Status bar: source name, last message and position.

use crate::state::Progress;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Paragraph, Widget},
};

/// One-shot message shown until the next key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Text shown.
    pub text: String,
    /// Drawn with the error color instead of the message color.
    pub is_error: bool,
}

impl StatusMessage {
    /// Informational message.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    /// Error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Styles the status bar draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyles {
    /// Bar background and name.
    pub bar: Style,
    /// Informational messages.
    pub message: Style,
    /// Error messages.
    pub error: Style,
}

/// Status bar widget.
pub struct StatusBar<'a> {
    name: &'a str,
    progress: Progress,
    message: Option<&'a StatusMessage>,
    styles: StatusStyles,
}

impl<'a> StatusBar<'a> {
    /// Status bar for `name` at `progress`.
    pub fn new(name: &'a str, progress: Progress, styles: StatusStyles) -> Self {
        Self {
            name,
            progress,
            message: None,
            styles,
        }
    }

    /// Show `message` instead of the name.
    pub fn message(mut self, message: Option<&'a StatusMessage>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let progress = self.progress.to_string();
        let progress_width = u16::try_from(progress.len() + 1).unwrap_or(u16::MAX);
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(progress_width)])
                .areas(area);

        buf.set_style(area, self.styles.bar);
        let left_line = match self.message {
            Some(message) if message.is_error => {
                Line::styled(message.text.as_str(), self.styles.error)
            }
            Some(message) => Line::styled(message.text.as_str(), self.styles.message),
            None => Line::raw(self.name),
        };
        Paragraph::new(left_line)
            .style(self.styles.bar)
            .render(left, buf);
        Paragraph::new(Line::raw(progress).right_aligned())
            .style(self.styles.bar)
            .render(right, buf);
    }
}
