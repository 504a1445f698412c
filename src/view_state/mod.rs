//! View-state layer: row metadata, layout and painting.
//!
//! # Module Structure
//!
//! - `line_store`: LineStore - per-row metadata grown as rows are discovered
//! - `layout`: width-aware wrapping of one row of a logical line
//! - `paint`: per-cell color resolution and the `Canvas` drawing primitive

pub mod layout;
pub mod line_store;
pub mod paint;

pub use layout::{layout_row, row_glyphs, wrap_columns, Glyph, RowLayout, WrapSettings};
pub use line_store::LineStore;
pub use paint::{Canvas, PaintContext, Painter};
