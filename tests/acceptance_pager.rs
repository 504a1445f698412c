//! Acceptance tests: whole texts paged through the public API.
//!
//! Sessions render into a ratatui buffer through `BufferCanvas`, the same
//! path the terminal shell uses.

use pgview::classify::{
    ColorScheme, RuleContext, RuleSet, RuleSpec, DEFAULT_QUOTE_REGEX, DEFAULT_SMILEYS,
};
use pgview::model::{LineType, Notice};
use pgview::source::{detect_input_source, PagerSource, StreamSource};
use pgview::state::{
    PagerOptions, PagerSession, Progress, RenderStatus, SearchDirection, Viewport,
};
use pgview::view::BufferCanvas;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use std::io::Cursor;

type MemSession = PagerSession<StreamSource<Cursor<Vec<u8>>>>;

const MAIL: &str = "From: alice@example.com\n\
Subject: lunch\n\
\n\
Hi Bob,\n\
> Are we still on?\n\
>> Yes, noon.\n\
-- \n\
Alice\n";

fn rules(specs: &[RuleSpec]) -> RuleSet {
    let (rules, errors) =
        RuleSet::compile(specs, DEFAULT_QUOTE_REGEX, DEFAULT_SMILEYS, ColorScheme::default());
    assert!(errors.is_empty(), "{errors:?}");
    rules
}

fn open(text: &str, options: PagerOptions, width: u16, height: u16) -> MemSession {
    PagerSession::open(
        StreamSource::from_bytes(text, "message"),
        rules(&[]),
        options,
        Viewport::new(width, height),
    )
}

fn body() -> PagerOptions {
    PagerOptions {
        body_only: true,
        ..PagerOptions::default()
    }
}

fn render<S: PagerSource>(session: &mut PagerSession<S>) -> (Buffer, RenderStatus) {
    let viewport = session.viewport();
    let area = Rect::new(0, 0, viewport.width, viewport.height);
    let mut buf = Buffer::empty(area);
    let status = {
        let mut canvas = BufferCanvas::new(&mut buf, area);
        session.render(&mut canvas).expect("render")
    };
    (buf, status)
}

fn row(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .map(|x| buf[(x, y)].symbol().to_string())
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn rows(buf: &Buffer) -> Vec<String> {
    (0..buf.area.height).map(|y| row(buf, y)).collect()
}

// ===== Classification =====

#[test]
fn mail_message_is_classified_and_colored() {
    let mut session = open(MAIL, PagerOptions::default(), 40, 10);

    let (buf, status) = render(&mut session);

    let types: Vec<LineType> = (0..8)
        .map(|r| session.store().line_type(r))
        .collect();
    assert_eq!(
        types,
        vec![
            LineType::HeaderDefault,
            LineType::HeaderDefault,
            LineType::Normal,
            LineType::Normal,
            LineType::Quoted,
            LineType::Quoted,
            LineType::Signature,
            LineType::Signature,
        ]
    );
    assert_eq!(status.progress, Progress::All);
    assert_eq!(row(&buf, 3), "Hi Bob,");
    assert_eq!(buf[(0, 0)].fg, Color::Cyan, "header without a rule");
    assert_eq!(buf[(2, 4)].fg, Color::Blue, "first quote level");
    assert_eq!(buf[(3, 5)].fg, Color::Green, "second quote level");
    assert_eq!(buf[(0, 7)].fg, Color::DarkGray, "signature");
}

#[test]
fn quote_levels_nest_in_the_forest() {
    let mut session = open(MAIL, PagerOptions::default(), 40, 10);
    render(&mut session);

    let outer = session.store().get(4).and_then(|r| r.quote).expect("outer");
    let inner = session.store().get(5).and_then(|r| r.quote).expect("inner");

    assert_eq!(session.quotes().parent(inner), Some(outer));
    assert_eq!(session.quotes().depth_index(outer), Some(0));
    assert_eq!(session.quotes().depth_index(inner), Some(1));
}

#[test]
fn header_rules_color_matching_fields() {
    let specs = [RuleSpec {
        context: RuleContext::Header,
        pattern: "^Subject:".to_string(),
        style: Style::default().fg(Color::Magenta),
    }];
    let mut session = PagerSession::open(
        StreamSource::from_bytes(MAIL, "message"),
        rules(&specs),
        PagerOptions::default(),
        Viewport::new(40, 10),
    );

    let (buf, _) = render(&mut session);

    assert_eq!(session.store().line_type(1), LineType::Header);
    assert_eq!(buf[(10, 1)].fg, Color::Magenta);
    assert_eq!(buf[(0, 0)].fg, Color::Cyan);
}

#[test]
fn ansi_sequences_are_stripped_or_applied() {
    let text = "\x1b[1mloud\x1b[0m quiet\n";

    let mut plain = open(text, body(), 20, 2);
    let (buf, _) = render(&mut plain);
    assert_eq!(row(&buf, 0), "loud quiet");
    assert!(!buf[(0, 0)].modifier.contains(Modifier::BOLD));

    let mut colored = open(
        text,
        PagerOptions {
            allow_ansi: true,
            ..body()
        },
        20,
        2,
    );
    let (buf, _) = render(&mut colored);
    assert_eq!(row(&buf, 0), "loud quiet");
    assert!(buf[(0, 0)].modifier.contains(Modifier::BOLD));
    assert!(!buf[(6, 0)].modifier.contains(Modifier::BOLD));
}

// ===== Wrapping and resize =====

#[test]
fn long_lines_wrap_with_markers_and_survive_resize() {
    let text = "short\nabcdefghij klmnopqrst uvw\nend\n";
    let mut session = open(text, body(), 12, 6);

    let (buf, _) = render(&mut session);
    assert_eq!(
        rows(&buf)[..5],
        ["short", "abcdefghij", "+klmnopqrst", "+uvw", "end"]
    );
    assert!(session.store().get(2).is_some_and(|r| r.is_continuation()));

    session.next_line().expect("scroll");
    session.next_line().expect("scroll");
    assert_eq!(session.top(), 2);
    assert_eq!(session.resume_position().logical_line, 1);

    session.resize(Viewport::new(40, 6)).expect("resize");
    let (buf, _) = render(&mut session);

    assert_eq!(session.top(), 1);
    assert_eq!(row(&buf, 0), "abcdefghij klmnopqrst uvw");
}

// ===== Navigation =====

#[test]
fn paging_through_a_long_text() {
    let text: String = (0..100).map(|i| format!("line {i}\n")).collect();
    let mut session = open(&text, body(), 20, 10);

    let (_, status) = render(&mut session);
    assert!(matches!(status.progress, Progress::Percent(p) if p < 20));

    session.next_page().expect("page");
    assert_eq!(session.top(), 10);

    session.jump_bottom().expect("bottom");
    let (buf, status) = render(&mut session);
    assert_eq!(status.progress, Progress::End);
    assert_eq!(row(&buf, 9), "line 99");
    assert_eq!(session.next_page().expect("page"), Some(Notice::BottomShown));

    assert_eq!(session.jump_top(), None);
    assert_eq!(session.prev_line(), Some(Notice::TopShown));
}

#[test]
fn hidden_quotes_are_not_drawn() {
    let text = "a\n> q1\n> q2\nb\n";
    let mut session = open(text, body(), 20, 4);

    session.set_hide_quoted(true);
    let (buf, _) = render(&mut session);

    assert_eq!(rows(&buf)[..2], ["a", "b"]);
    assert_eq!(row(&buf, 2), "");
}

#[test]
fn skip_quoted_lands_on_the_reply() {
    let mut text = String::from("intro\n> q1\n> q2\nreply\n");
    for i in 0..20 {
        text.push_str(&format!("more {i}\n"));
    }
    let mut session = open(&text, body(), 20, 5);

    assert_eq!(session.skip_quoted().expect("skip"), None);
    assert_eq!(session.top(), 3);
    assert_eq!(session.skip_quoted().expect("skip"), Some(Notice::NoMoreQuoted));
}

// ===== Search =====

#[test]
fn search_highlights_and_wraps() {
    let text: String = (0..200).map(|i| format!("line {i}\n")).collect();
    let mut session = open(&text, body(), 20, 10);

    assert!(session.search("line 150", SearchDirection::Forward).expect("search"));
    assert_eq!(session.top(), 150);

    let (buf, _) = render(&mut session);
    assert_eq!(row(&buf, 0), "line 150");
    assert!(buf[(0, 0)].modifier.contains(Modifier::REVERSED));
    assert!(buf[(7, 0)].modifier.contains(Modifier::REVERSED));
    assert!(!buf[(8, 0)].modifier.contains(Modifier::REVERSED));
    assert!(!buf[(0, 1)].modifier.contains(Modifier::REVERSED));

    assert_eq!(
        session.search_next(SearchDirection::Forward).expect("next"),
        Some(Notice::SearchWrappedToTop)
    );
    assert_eq!(session.top(), 150);
}

#[test]
fn new_search_replaces_previous_matches() {
    let text: String = (0..60).map(|i| format!("line {i}\n")).collect();
    let mut session = open(&text, body(), 20, 10);

    assert!(session.search("line 12", SearchDirection::Forward).expect("search"));
    assert_eq!(session.top(), 12);
    render(&mut session);

    assert!(session.search("line 4", SearchDirection::Backward).expect("search"));
    assert_eq!(session.top(), 4);
    let (buf, _) = render(&mut session);
    assert_eq!(row(&buf, 0), "line 4");
    assert!(buf[(0, 0)].modifier.contains(Modifier::REVERSED));
    assert!(!buf[(0, 8)].modifier.contains(Modifier::REVERSED), "line 12 is no longer a match");

    session.jump_bottom().expect("bottom");
    assert!(session.search("line 20", SearchDirection::Backward).expect("search"));
    assert_eq!(session.top(), 20);
}

#[test]
fn bad_search_pattern_is_not_fatal() {
    let mut session = open("text\n", body(), 20, 3);

    let err = session
        .search("[unclosed", SearchDirection::Forward)
        .unwrap_err();

    assert!(!err.is_fatal());
    assert!(!session.search_state().is_active());
    render(&mut session);
}

// ===== Sources and lifecycle =====

#[test]
fn file_source_pages_like_memory() {
    let path = std::env::temp_dir().join(format!("pgview_accept_{}.txt", std::process::id()));
    std::fs::write(&path, MAIL).expect("write temp file");

    let source = detect_input_source(Some(path.clone())).expect("open file");
    let mut session = PagerSession::open(
        source,
        rules(&[]),
        PagerOptions::default(),
        Viewport::new(40, 10),
    );
    let (buf, _) = render(&mut session);

    assert_eq!(row(&buf, 7), "Alice");
    assert!(session.name().ends_with(".txt"));
    std::fs::remove_file(path).ok();
}

#[test]
fn closed_position_reopens_at_same_line() {
    let text: String = (0..50).map(|i| format!("line {i}\n")).collect();
    let mut session = open(&text, body(), 20, 5);
    session.next_page().expect("page");
    session.next_line().expect("line");

    let summary = session.close();
    assert_eq!(summary.resume.logical_line, 6);

    let mut reopened = PagerSession::open_at(
        StreamSource::from_bytes(text.as_str(), "message"),
        rules(&[]),
        body(),
        Viewport::new(20, 5),
        summary.resume,
    )
    .expect("reopen");
    let (buf, _) = render(&mut reopened);

    assert_eq!(row(&buf, 0), "line 6");
}
