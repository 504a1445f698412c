//! Domain-level keyboard actions independent of key bindings.

/// Pager actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Line scrolling
    /// Scroll down one visible line. Default: j/↓/Enter
    NextLine,
    /// Scroll up one visible line. Default: k/↑/Backspace
    PrevLine,

    // Page scrolling
    /// Next page, keeping the configured context. Default: Space/PageDown
    NextPage,
    /// Previous page. Default: -/b/PageUp
    PrevPage,
    /// Down half a page. Default: Ctrl+d
    HalfDown,
    /// Up half a page. Default: Ctrl+u
    HalfUp,
    /// Jump to the first line. Default: g/Home/^
    Top,
    /// Jump to the last page. Default: G/End/$
    Bottom,

    // Search
    /// Enter a forward search pattern. Default: /
    SearchForward,
    /// Enter a backward search pattern. Default: ?
    SearchBackward,
    /// Repeat the search in its direction. Default: n
    SearchNext,
    /// Repeat the search in the opposite direction. Default: N
    SearchOpposite,
    /// Show or hide search highlighting. Default: \
    ToggleSearchHighlight,

    // Quoted text
    /// Show or hide quoted lines. Default: T
    ToggleQuoted,
    /// Skip past the next block of quoted text. Default: S
    SkipQuoted,

    // Application
    /// Repaint the screen. Default: Ctrl+l
    Redraw,
    /// Leave the pager. Default: q/Ctrl+c
    Quit,
}
