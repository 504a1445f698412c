//! Color specs used in the `[colors]` table.
//!
//! A spec is a list of words: any number of attributes, then a foreground
//! color, then optionally `on` and a background color:
//!
//! ```
//! use pgview::config::parse_style;
//! use ratatui::style::{Color, Modifier};
//!
//! let style = parse_style("bold red on black").unwrap();
//! assert_eq!(style.fg, Some(Color::Red));
//! assert_eq!(style.bg, Some(Color::Black));
//! assert!(style.add_modifier.contains(Modifier::BOLD));
//! ```

use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;
use thiserror::Error;

/// A color spec that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color {spec:?}: {reason}")]
pub struct ColorSpecError {
    /// The spec as written.
    pub spec: String,
    /// What was wrong with it.
    pub reason: String,
}

impl ColorSpecError {
    fn new(spec: &str, reason: impl Into<String>) -> Self {
        Self {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

fn modifier(word: &str) -> Option<Modifier> {
    match word {
        "bold" => Some(Modifier::BOLD),
        "underline" | "underlined" => Some(Modifier::UNDERLINED),
        "reverse" | "reversed" => Some(Modifier::REVERSED),
        "blink" => Some(Modifier::SLOW_BLINK),
        "dim" => Some(Modifier::DIM),
        "italic" => Some(Modifier::ITALIC),
        "none" | "normal" => Some(Modifier::empty()),
        _ => None,
    }
}

/// Parse one color word.
///
/// Accepts ratatui's names (`red`, `lightblue`, `#rrggbb`, palette indices),
/// `default`, and the `brightX` / `colorN` spellings of terminal configs.
pub fn parse_color(word: &str) -> Option<Color> {
    let word = word.trim().to_ascii_lowercase();
    if word == "default" {
        return Some(Color::Reset);
    }
    if let Some(index) = word.strip_prefix("color") {
        return index.parse::<u8>().ok().map(Color::Indexed);
    }
    let word = match word.strip_prefix("bright") {
        Some(base) => format!("light{base}"),
        None => word,
    };
    Color::from_str(&word).ok()
}

/// Parse a color spec such as `"yellow"`, `"white on blue"` or
/// `"bold underline red on default"`.
pub fn parse_style(spec: &str) -> Result<Style, ColorSpecError> {
    let lowered = spec.to_ascii_lowercase();
    let mut words = lowered.split_whitespace().peekable();
    let mut style = Style::default();
    let mut attributes = false;

    while let Some(m) = words.peek().and_then(|w| modifier(w)) {
        style = style.add_modifier(m);
        attributes = true;
        words.next();
    }

    let Some(fg) = words.next() else {
        return if !attributes {
            Err(ColorSpecError::new(spec, "empty color"))
        } else {
            Ok(style)
        };
    };
    if fg != "on" {
        let color =
            parse_color(fg).ok_or_else(|| ColorSpecError::new(spec, format!("unknown color {fg:?}")))?;
        style = style.fg(color);
        match words.next() {
            None => return Ok(style),
            Some("on") => {}
            Some(other) => {
                return Err(ColorSpecError::new(spec, format!("expected \"on\", found {other:?}")))
            }
        }
    }

    let bg = words
        .next()
        .ok_or_else(|| ColorSpecError::new(spec, "missing background after \"on\""))?;
    let color =
        parse_color(bg).ok_or_else(|| ColorSpecError::new(spec, format!("unknown color {bg:?}")))?;
    style = style.bg(color);

    match words.next() {
        None => Ok(style),
        Some(extra) => Err(ColorSpecError::new(spec, format!("unexpected {extra:?}"))),
    }
}
