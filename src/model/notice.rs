//! User-facing notices produced by navigation.

use std::fmt;

/// Outcome of a navigation request that the user should be told about.
///
/// Returned by the viewport controller instead of being written to a status line
/// directly, so the shell decides how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Already at the first line.
    TopShown,
    /// Already showing the end of the text.
    BottomShown,
    /// Search found nothing.
    NotFound,
    /// A forward search restarted from the top.
    SearchWrappedToTop,
    /// A backward search restarted from the bottom.
    SearchWrappedToBottom,
    /// Search repeat requested with no active pattern.
    NoSearchPattern,
    /// No quoted block follows the top line.
    NoMoreQuoted,
    /// Quoted text runs to the end.
    NoMoreUnquoted,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Notice::TopShown => "Top of message is shown.",
            Notice::BottomShown => "Bottom of message is shown.",
            Notice::NotFound => "Not found.",
            Notice::SearchWrappedToTop => "Search wrapped to top.",
            Notice::SearchWrappedToBottom => "Search wrapped to bottom.",
            Notice::NoSearchPattern => "No search pattern.",
            Notice::NoMoreQuoted => "No more quoted text.",
            Notice::NoMoreUnquoted => "No more unquoted text after quoted text.",
        };
        f.write_str(msg)
    }
}
