//! pgview
//!
//! Terminal pager for mail bodies, logs and help text. Rows are discovered
//! lazily from a seekable stream, classified (headers, nested quotes,
//! signatures, attachments), colored by configurable rules and wrapped to
//! the window.
//!
//! Pure core (`model`, `parser`, `classify`, `view_state`, `state`) and
//! impure shell (`source`, `view`, `logging`).

pub mod classify;
pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;
