//! Tests for SearchState and SearchQuery.

use super::*;

// ===== SearchQuery::new Tests =====

#[test]
fn search_query_new_accepts_non_empty_string() {
    let query = SearchQuery::new("test");

    assert!(query.is_some());
}

#[test]
fn search_query_new_rejects_empty_string() {
    let query = SearchQuery::new("");

    assert!(query.is_none());
}

#[test]
fn search_query_keeps_whitespace_patterns() {
    let query = SearchQuery::new("  ").expect("whitespace is a valid pattern");

    assert_eq!(query.as_str(), "  ");
}

// ===== SearchState Tests =====

#[test]
fn default_state_is_inactive() {
    let state = SearchState::default();

    assert!(!state.is_active());
    assert!(state.pattern().is_none());
    assert!(state.direction().is_none());
    assert!(!state.highlight_visible());
}

#[test]
fn activate_compiles_and_highlights() {
    let query = SearchQuery::new("needle").expect("valid query");

    let state = SearchState::activate(query, SearchDirection::Backward).expect("compiles");

    assert!(state.is_active());
    assert!(state.highlight_visible());
    assert_eq!(state.direction(), Some(SearchDirection::Backward));
    assert_eq!(state.query().map(SearchQuery::as_str), Some("needle"));
}

#[test]
fn activate_uses_smart_case() {
    let lower = SearchState::activate(
        SearchQuery::new("needle").expect("valid query"),
        SearchDirection::Forward,
    )
    .expect("compiles");
    let upper = SearchState::activate(
        SearchQuery::new("Needle").expect("valid query"),
        SearchDirection::Forward,
    )
    .expect("compiles");

    let lower = lower.pattern().expect("active");
    let upper = upper.pattern().expect("active");
    assert!(lower.is_match(b"NEEDLE"), "lowercase query ignores case");
    assert!(!upper.is_match(b"needle"), "uppercase query is case sensitive");
    assert!(upper.is_match(b"a Needle"));
}

#[test]
fn activate_rejects_invalid_pattern() {
    let query = SearchQuery::new("(unclosed").expect("valid query");

    let err = SearchState::activate(query, SearchDirection::Forward).unwrap_err();

    assert_eq!(err.pattern, "(unclosed");
}

#[test]
fn toggle_highlight_flips_visibility() {
    let mut state = SearchState::activate(
        SearchQuery::new("x").expect("valid query"),
        SearchDirection::Forward,
    )
    .expect("compiles");

    state.toggle_highlight();
    assert!(!state.highlight_visible());
    assert!(state.is_active(), "hiding matches keeps the search");

    state.show_highlight();
    assert!(state.highlight_visible());
}

#[test]
fn toggle_highlight_ignored_when_inactive() {
    let mut state = SearchState::Inactive;

    state.toggle_highlight();

    assert!(!state.is_active());
}

#[test]
fn direction_reverse() {
    assert_eq!(SearchDirection::Forward.reverse(), SearchDirection::Backward);
    assert_eq!(SearchDirection::Backward.reverse(), SearchDirection::Forward);
}
