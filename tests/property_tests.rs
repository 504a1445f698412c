//! Property-based tests for engine invariants.
//!
//! Tests validate:
//! 1. Quote forest depth indices stay contiguous and prefixes stay nested
//! 2. Highlight chunks are sorted, disjoint and inside the line
//! 3. Row layout always makes progress and fits the wrap width
//! 4. Any navigation sequence leaves a renderable session

use pgview::classify::{
    highlight, ColorScheme, QuoteForest, RuleContext, RuleSet, RuleSpec, DEFAULT_QUOTE_REGEX,
    DEFAULT_SMILEYS,
};
use pgview::model::{KeyAction, QuoteId};
use pgview::parser::{normalize, NormalizerOptions};
use pgview::source::StreamSource;
use pgview::state::{PagerOptions, PagerSession, Viewport};
use pgview::view::BufferCanvas;
use pgview::view_state::{layout_row, row_glyphs, WrapSettings};
use proptest::prelude::*;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use std::collections::HashSet;

fn forest() -> QuoteForest {
    QuoteForest::new(ColorScheme::default().quoted)
}

fn quote_prefix() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'>', b' ', b'|']), 1..6)
}

// ===== Property 1: Quote forest =====

proptest! {
    #[test]
    fn depth_indices_are_contiguous(prefixes in prop::collection::vec(quote_prefix(), 1..20)) {
        let mut forest = forest();
        for prefix in &prefixes {
            forest.classify(prefix);
        }

        let indices: HashSet<usize> = (0..forest.len())
            .filter_map(|i| forest.depth_index(QuoteId::new(i)))
            .collect();
        let expected: HashSet<usize> = (0..forest.len()).collect();
        prop_assert_eq!(indices, expected);
    }

    #[test]
    fn children_extend_their_parent(prefixes in prop::collection::vec(quote_prefix(), 1..20)) {
        let mut forest = forest();
        for prefix in &prefixes {
            forest.classify(prefix);
        }

        for i in 0..forest.len() {
            let id = QuoteId::new(i);
            if let Some(parent) = forest.parent(id) {
                let child = forest.prefix(id);
                let parent = forest.prefix(parent);
                prop_assert!(child.len() > parent.len());
                prop_assert!(child.starts_with(parent));
            }
        }
    }

    #[test]
    fn siblings_are_unrelated(prefixes in prop::collection::vec(quote_prefix(), 1..20)) {
        let mut forest = forest();
        for prefix in &prefixes {
            forest.classify(prefix);
        }

        let mut levels = vec![forest.roots()];
        levels.extend((0..forest.len()).map(|i| forest.children(QuoteId::new(i))));
        for siblings in levels {
            for a in &siblings {
                for b in &siblings {
                    if a != b {
                        prop_assert!(!forest.prefix(*b).starts_with(forest.prefix(*a)));
                    }
                }
            }
        }
    }

    #[test]
    fn classify_is_stable(prefixes in prop::collection::vec(quote_prefix(), 1..20)) {
        let mut forest = forest();
        for prefix in &prefixes {
            forest.classify(prefix);
        }
        let ids: Vec<QuoteId> = prefixes.iter().map(|p| forest.classify(p).id).collect();

        for (prefix, id) in prefixes.iter().zip(ids) {
            let again = forest.classify(prefix);
            prop_assert_eq!(again.id, id);
            prop_assert!(!again.restructured);
            prop_assert_eq!(forest.prefix(id), prefix.as_slice());
        }
    }
}

// ===== Property 2: Highlighting =====

fn body_rules(patterns: &[&str]) -> RuleSet {
    let specs: Vec<RuleSpec> = patterns
        .iter()
        .map(|p| RuleSpec {
            context: RuleContext::Body,
            pattern: (*p).to_string(),
            style: Style::default(),
        })
        .collect();
    let (rules, errors) =
        RuleSet::compile(&specs, DEFAULT_QUOTE_REGEX, DEFAULT_SMILEYS, ColorScheme::default());
    assert!(errors.is_empty());
    rules
}

proptest! {
    #[test]
    fn chunks_are_sorted_disjoint_and_in_bounds(
        text in "[ab0-9x ]{0,40}",
        stop_on_miss in any::<bool>(),
    ) {
        let rules = body_rules(&["a+", "ab", "b.", "[0-9]+", "x*"]);

        let chunks = highlight(rules.rules(RuleContext::Body), text.as_bytes(), stop_on_miss);

        for chunk in &chunks {
            prop_assert!(chunk.start < chunk.end);
            prop_assert!(chunk.end <= text.len());
        }
        for pair in chunks.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }
}

// ===== Property 3: Layout =====

proptest! {
    #[test]
    fn layout_advances_and_fits(
        text in "[a-z é]{0,60}",
        wrap_cols in 2usize..30,
        smart_wrap in any::<bool>(),
        markers in any::<bool>(),
    ) {
        let line = normalize(format!("{text}\n").as_bytes(), &NormalizerOptions::default());
        let settings = WrapSettings {
            wrap_cols,
            window_cols: wrap_cols,
            markers,
            smart_wrap,
            no_skip_blanks: false,
        };

        let mut start = 0;
        let mut rows = 0;
        while start < line.clean.len() {
            let layout = layout_row(&line, start, rows > 0, false, &settings);
            prop_assert!(layout.next > start, "row at {} made no progress", start);

            let used: usize = row_glyphs(&line, &layout).iter().map(|g| g.width).sum();
            prop_assert!(layout.first_col + used <= wrap_cols);

            start = layout.next;
            rows += 1;
            prop_assert!(rows <= line.clean.len());
        }
    }
}

// ===== Property 4: Navigation =====

fn action() -> impl Strategy<Value = KeyAction> {
    prop::sample::select(vec![
        KeyAction::NextLine,
        KeyAction::PrevLine,
        KeyAction::NextPage,
        KeyAction::PrevPage,
        KeyAction::HalfDown,
        KeyAction::HalfUp,
        KeyAction::Top,
        KeyAction::Bottom,
        KeyAction::ToggleQuoted,
        KeyAction::SkipQuoted,
    ])
}

fn text_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,30}",
        "> [a-z ]{0,30}",
        ">> [a-z]{0,10}",
        Just("-- ".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn navigation_keeps_session_renderable(
        lines in prop::collection::vec(text_line(), 0..40),
        actions in prop::collection::vec(action(), 0..20),
        width in 4u16..40,
        height in 1u16..10,
    ) {
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let mut session = PagerSession::open(
            StreamSource::from_bytes(text.as_str(), "prop"),
            body_rules(&[]),
            PagerOptions { body_only: true, ..PagerOptions::default() },
            Viewport::new(width, height),
        );
        let area = Rect::new(0, 0, width, height);

        for action in actions {
            session.handle(action).expect("in-memory source never fails");
            let mut buf = Buffer::empty(area);
            let status = session
                .render(&mut BufferCanvas::new(&mut buf, area))
                .expect("render");

            prop_assert!(status.rows_drawn <= usize::from(height));
            prop_assert!(session.top() == 0 || session.top() < session.store().last());
        }
    }
}
