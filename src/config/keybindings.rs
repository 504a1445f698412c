//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to pager actions.
///
/// Defaults follow less and mutt's pager.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Punctuation typed with Shift is reported with the modifier by some
    /// terminals, so a shifted character falls back to its unshifted binding.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        let key = KeyEvent::new(key.code, key.modifiers);
        self.bindings.get(&key).copied().or_else(|| match key.code {
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::SHIFT) => self
                .bindings
                .get(&KeyEvent::new(key.code, key.modifiers - KeyModifiers::SHIFT))
                .copied(),
            _ => None,
        })
    }

    /// Bind `key` to `action`, replacing any earlier binding.
    pub fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = HashMap::new();
        let mut bind = |code: KeyCode, modifiers: KeyModifiers, action: KeyAction| {
            bindings.insert(KeyEvent::new(code, modifiers), action);
        };
        let none = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let shift = KeyModifiers::SHIFT;

        // Lines
        bind(KeyCode::Char('j'), none, KeyAction::NextLine);
        bind(KeyCode::Down, none, KeyAction::NextLine);
        bind(KeyCode::Enter, none, KeyAction::NextLine);
        bind(KeyCode::Char('k'), none, KeyAction::PrevLine);
        bind(KeyCode::Up, none, KeyAction::PrevLine);
        bind(KeyCode::Backspace, none, KeyAction::PrevLine);

        // Pages
        bind(KeyCode::Char(' '), none, KeyAction::NextPage);
        bind(KeyCode::PageDown, none, KeyAction::NextPage);
        bind(KeyCode::Char('f'), ctrl, KeyAction::NextPage);
        bind(KeyCode::Char('-'), none, KeyAction::PrevPage);
        bind(KeyCode::Char('b'), none, KeyAction::PrevPage);
        bind(KeyCode::PageUp, none, KeyAction::PrevPage);
        bind(KeyCode::Char('b'), ctrl, KeyAction::PrevPage);
        bind(KeyCode::Char('d'), ctrl, KeyAction::HalfDown);
        bind(KeyCode::Char('u'), ctrl, KeyAction::HalfUp);
        bind(KeyCode::Char('g'), none, KeyAction::Top);
        bind(KeyCode::Home, none, KeyAction::Top);
        bind(KeyCode::Char('^'), none, KeyAction::Top);
        bind(KeyCode::Char('G'), shift, KeyAction::Bottom);
        bind(KeyCode::End, none, KeyAction::Bottom);
        bind(KeyCode::Char('$'), none, KeyAction::Bottom);

        // Search
        bind(KeyCode::Char('/'), none, KeyAction::SearchForward);
        bind(KeyCode::Char('?'), none, KeyAction::SearchBackward);
        bind(KeyCode::Char('n'), none, KeyAction::SearchNext);
        bind(KeyCode::Char('N'), shift, KeyAction::SearchOpposite);
        bind(KeyCode::Char('\\'), none, KeyAction::ToggleSearchHighlight);

        // Quoted text
        bind(KeyCode::Char('T'), shift, KeyAction::ToggleQuoted);
        bind(KeyCode::Char('S'), shift, KeyAction::SkipQuoted);

        // Application
        bind(KeyCode::Char('l'), ctrl, KeyAction::Redraw);
        bind(KeyCode::Char('q'), none, KeyAction::Quit);
        bind(KeyCode::Char('c'), ctrl, KeyAction::Quit);

        Self { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn default_bindings_cover_paging_keys() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(KeyAction::NextPage)
        );
        assert_eq!(
            bindings.get(key(KeyCode::Char('-'), KeyModifiers::NONE)),
            Some(KeyAction::PrevPage)
        );
        assert_eq!(
            bindings.get(key(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(KeyAction::Bottom)
        );
        assert_eq!(
            bindings.get(key(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(KeyAction::HalfDown)
        );
    }

    #[test]
    fn shifted_punctuation_falls_back_to_plain_binding() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(key(KeyCode::Char('?'), KeyModifiers::SHIFT)),
            Some(KeyAction::SearchBackward),
            "'?' reported with Shift should still start a backward search"
        );
    }

    #[test]
    fn repeat_events_match_like_presses() {
        let bindings = KeyBindings::default();
        let mut event = key(KeyCode::Char('q'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Repeat;
        event.state = KeyEventState::CAPS_LOCK;

        assert_eq!(bindings.get(event), Some(KeyAction::Quit));
    }

    #[test]
    fn unbound_key_has_no_action() {
        let bindings = KeyBindings::default();

        assert_eq!(bindings.get(key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn bind_overrides_default() {
        let mut bindings = KeyBindings::default();
        bindings.bind(key(KeyCode::Char('q'), KeyModifiers::NONE), KeyAction::Redraw);

        assert_eq!(
            bindings.get(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(KeyAction::Redraw)
        );
    }
}
