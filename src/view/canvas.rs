//! [`Canvas`] over a ratatui frame buffer.

use crate::view_state::Canvas;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;

/// Draws pager rows into one area of a [`Buffer`].
///
/// Coordinates are relative to the area; output past its right or bottom
/// edge is dropped.
pub struct BufferCanvas<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    row: u16,
    col: u16,
    style: Style,
}

impl<'a> BufferCanvas<'a> {
    /// Canvas over `area` of `buf`.
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        let area = area.intersection(buf.area);
        Self {
            buf,
            area,
            row: 0,
            col: 0,
            style: Style::default(),
        }
    }

    fn in_bounds(&self) -> bool {
        self.row < self.area.height && self.col < self.area.width
    }
}

impl Canvas for BufferCanvas<'_> {
    fn width(&self) -> u16 {
        self.area.width
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.row = row;
        self.col = col;
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn emit(&mut self, text: &str, width: usize) {
        if !self.in_bounds() {
            return;
        }
        let remaining = usize::from(self.area.width - self.col);
        self.buf.set_stringn(
            self.area.x + self.col,
            self.area.y + self.row,
            text,
            remaining,
            self.style,
        );
        let col = usize::from(self.col).saturating_add(width);
        self.col = u16::try_from(col).unwrap_or(u16::MAX).min(self.area.width);
    }

    fn clear_to_eol(&mut self) {
        if self.row >= self.area.height {
            return;
        }
        let y = self.area.y + self.row;
        for x in self.col..self.area.width {
            if let Some(cell) = self.buf.cell_mut(Position::new(self.area.x + x, y)) {
                cell.reset();
                cell.set_style(self.style);
            }
        }
    }
}
