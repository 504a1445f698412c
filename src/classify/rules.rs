//! Style rules, quote patterns and object colors consumed by the classifier.

use crate::model::{LineType, PatternError};
use ratatui::style::{Color, Modifier, Style};
use regex::bytes::{Regex, RegexBuilder};
use std::ops::Range;
use tracing::warn;

/// Default pattern recognizing quote prefixes.
pub const DEFAULT_QUOTE_REGEX: &str = r"^([ \t]*[|>:}#])+";

/// Default pattern for smileys that must not be mistaken for quotes.
pub const DEFAULT_SMILEYS: &str = r"(>From )|(:[-^]?[\]\[)(><}{|/DP])";

/// Which part of a message a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleContext {
    /// Header lines.
    Header,
    /// Body lines (normal and quoted).
    Body,
    /// Attachment boundary lines.
    Attachment,
}

/// Uncompiled rule as written in configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    /// Rule context.
    pub context: RuleContext,
    /// Regular expression source.
    pub pattern: String,
    /// Color for matched text.
    pub style: Style,
}

/// A compiled pattern and the color it paints.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// Compiled pattern.
    pub pattern: Regex,
    /// Color for matched text.
    pub style: Style,
}

/// Compile a pattern for matching against raw line bytes.
pub fn compile_pattern(pattern: &str, case_insensitive: bool) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| PatternError::new(pattern, e))
}

/// Compile an interactive search pattern.
///
/// Matching ignores case unless the pattern contains an uppercase letter.
pub fn compile_search(pattern: &str) -> Result<Regex, PatternError> {
    let smart_case = !pattern.chars().any(char::is_uppercase);
    compile_pattern(pattern, smart_case)
}

// ===== ColorScheme =====

/// Colors for each kind of screen object.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    /// Body text.
    pub normal: Style,
    /// Header lines not matched by any header rule.
    pub header_default: Style,
    /// Quote palette, indexed by quote depth.
    pub quoted: Vec<Style>,
    /// Signature blocks.
    pub signature: Style,
    /// Attachment boundary lines.
    pub attachment: Style,
    /// Search matches.
    pub search: Style,
    /// Overstrike bold; `None` toggles the bold modifier instead.
    pub bold: Option<Style>,
    /// Overstrike underline; `None` toggles the underline modifier instead.
    pub underline: Option<Style>,
    /// The `+` marker on wrapped rows.
    pub markers: Style,
    /// The `~` filler past the end of text.
    pub tilde: Style,
    /// Message-log informational lines.
    pub message: Style,
    /// Message-log error lines.
    pub error: Style,
    /// Status bar.
    pub status: Style,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            normal: Style::default(),
            header_default: Style::default().fg(Color::Cyan),
            quoted: vec![
                Style::default().fg(Color::Blue),
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Magenta),
                Style::default().fg(Color::Cyan),
            ],
            signature: Style::default().fg(Color::DarkGray),
            attachment: Style::default().fg(Color::Yellow),
            search: Style::default().add_modifier(Modifier::REVERSED),
            bold: None,
            underline: None,
            markers: Style::default().fg(Color::Red),
            tilde: Style::default().fg(Color::Blue),
            message: Style::default().fg(Color::Green),
            error: Style::default().fg(Color::Red),
            status: Style::default().add_modifier(Modifier::REVERSED),
        }
    }
}

impl ColorScheme {
    /// A scheme with no colors, for monochrome output.
    ///
    /// Search matches and the status bar stay reversed so they remain visible.
    pub fn monochrome() -> Self {
        Self {
            normal: Style::default(),
            header_default: Style::default(),
            quoted: vec![Style::default()],
            signature: Style::default(),
            attachment: Style::default(),
            search: Style::default().add_modifier(Modifier::REVERSED),
            bold: None,
            underline: None,
            markers: Style::default(),
            tilde: Style::default(),
            message: Style::default(),
            error: Style::default(),
            status: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Object color for a line type.
    pub fn for_type(&self, line_type: LineType) -> Style {
        match line_type {
            LineType::HeaderDefault | LineType::Header => self.header_default,
            LineType::Quoted => self.quoted.first().copied().unwrap_or(self.normal),
            LineType::Signature => self.signature,
            LineType::Attachment => self.attachment,
            LineType::MessageLog | LineType::Normal | LineType::Unclassified => self.normal,
        }
    }

    /// Color for a message-log line from its level byte.
    pub fn for_log_level(&self, level: Option<u8>) -> Style {
        match level {
            Some(b'M') => self.message,
            Some(b'E') => self.error,
            _ => self.normal,
        }
    }
}

// ===== QuotePatterns =====

/// Quote detection pattern and its smiley exception.
#[derive(Debug, Clone, Default)]
pub struct QuotePatterns {
    /// Pattern whose match is the quote prefix.
    pub quote: Option<Regex>,
    /// Smiley pattern that can veto a quote match.
    pub smileys: Option<Regex>,
}

impl QuotePatterns {
    /// Byte range of the quote prefix if `text` is a quoted line.
    ///
    /// A smiley matching at a nonzero offset truncates the text before it and the
    /// quote pattern is tried again; a smiley at offset 0 vetoes the quote.
    pub fn quote_prefix(&self, text: &[u8]) -> Option<Range<usize>> {
        let quote = self.quote.as_ref()?;
        let found = quote.find(text)?;
        match self.smileys.as_ref().and_then(|s| s.find(text)) {
            None => Some(found.range()),
            Some(smiley) if smiley.start() > 0 => quote
                .find(&text[..smiley.start()])
                .map(|m| m.range()),
            Some(_) => None,
        }
    }
}

// ===== RuleSet =====

/// All compiled rules for a session.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    header: Vec<StyleRule>,
    body: Vec<StyleRule>,
    attachment: Vec<StyleRule>,
    quote: QuotePatterns,
    scheme: ColorScheme,
}

impl RuleSet {
    /// Compile rule specs and quote patterns.
    ///
    /// Patterns that fail to compile are logged, returned as errors and left
    /// out; the remaining rules keep their declaration order.
    pub fn compile(
        specs: &[RuleSpec],
        quote_regex: &str,
        smileys: &str,
        scheme: ColorScheme,
    ) -> (Self, Vec<PatternError>) {
        let mut errors = Vec::new();
        let mut set = RuleSet {
            scheme,
            ..RuleSet::default()
        };

        for spec in specs {
            match compile_pattern(&spec.pattern, false) {
                Ok(pattern) => {
                    let rule = StyleRule {
                        pattern,
                        style: spec.style,
                    };
                    match spec.context {
                        RuleContext::Header => set.header.push(rule),
                        RuleContext::Body => set.body.push(rule),
                        RuleContext::Attachment => set.attachment.push(rule),
                    }
                }
                Err(err) => {
                    warn!(error = %err, context = ?spec.context, "Skipping color rule");
                    errors.push(err);
                }
            }
        }

        let mut optional = |source: &str| -> Option<Regex> {
            if source.is_empty() {
                return None;
            }
            compile_pattern(source, false)
                .map_err(|err| {
                    warn!(error = %err, "Skipping quote pattern");
                    errors.push(err);
                })
                .ok()
        };
        set.quote = QuotePatterns {
            quote: optional(quote_regex),
            smileys: optional(smileys),
        };

        (set, errors)
    }

    /// Rules for a context, in declaration order.
    pub fn rules(&self, context: RuleContext) -> &[StyleRule] {
        match context {
            RuleContext::Header => &self.header,
            RuleContext::Body => &self.body,
            RuleContext::Attachment => &self.attachment,
        }
    }

    /// Quote detection patterns.
    pub fn quote_patterns(&self) -> &QuotePatterns {
        &self.quote
    }

    /// Object colors.
    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }
}
