//! Configuration file loading with precedence handling.

use super::colors::{parse_style, ColorSpecError};
use crate::classify::{ColorScheme, RuleContext, RuleSet, RuleSpec, DEFAULT_QUOTE_REGEX, DEFAULT_SMILEYS};
use crate::model::PatternError;
use crate::state::PagerOptions;
use ratatui::style::Style;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A `[colors]` entry holds an unparsable color spec.
    #[error("Invalid color for {key}: {source}")]
    InvalidColor {
        /// Key or rule the spec was given for.
        key: String,
        /// Parse failure.
        #[source]
        source: ColorSpecError,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/pgview/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Wrap margin.
    #[serde(default)]
    pub wrap: Option<i32>,

    /// Break rows at word boundaries.
    #[serde(default)]
    pub smart_wrap: Option<bool>,

    /// Mark continuation rows with `+`.
    #[serde(default)]
    pub markers: Option<bool>,

    /// Pad past the end of text with `~`.
    #[serde(default)]
    pub tilde: Option<bool>,

    /// Apply ANSI colors found in the text.
    #[serde(default)]
    pub allow_ansi: Option<bool>,

    /// Match header rules per line.
    #[serde(default)]
    pub header_color_partial: Option<bool>,

    /// Rows kept from the previous page.
    #[serde(default)]
    pub pager_context: Option<usize>,

    /// Rows shown above a search hit.
    #[serde(default)]
    pub search_context: Option<usize>,

    /// Continue searching from the other end.
    #[serde(default)]
    pub wrap_search: Option<bool>,

    /// Lookahead when skipping quoted text.
    #[serde(default)]
    pub skip_quoted_offset: Option<usize>,

    /// Start with quoted text hidden.
    #[serde(default)]
    pub hide_quoted: Option<bool>,

    /// Color the text.
    #[serde(default)]
    pub show_color: Option<bool>,

    /// Pattern whose match is a quote prefix.
    #[serde(default)]
    pub quote_regex: Option<String>,

    /// Smileys that are not quote prefixes.
    #[serde(default)]
    pub smileys: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Object colors and style rules.
    #[serde(default)]
    pub colors: Option<ColorsSection>,
}

/// `[colors]` table.
///
/// ```toml
/// [colors]
/// header_default = "cyan"
/// quoted = ["blue", "green", "yellow"]
/// search = "black on yellow"
///
/// [[colors.header]]
/// regex = "^Subject:"
/// color = "bold white"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ColorsSection {
    /// Body text.
    #[serde(default)]
    pub normal: Option<String>,
    /// Header lines not matched by a header rule.
    #[serde(default)]
    pub header_default: Option<String>,
    /// Quote palette, outermost level first.
    #[serde(default)]
    pub quoted: Option<Vec<String>>,
    /// Signature blocks.
    #[serde(default)]
    pub signature: Option<String>,
    /// Attachment boundary lines.
    #[serde(default)]
    pub attachment: Option<String>,
    /// Search matches.
    #[serde(default)]
    pub search: Option<String>,
    /// Overstrike bold.
    #[serde(default)]
    pub bold: Option<String>,
    /// Overstrike underline.
    #[serde(default)]
    pub underline: Option<String>,
    /// The `+` continuation marker.
    #[serde(default)]
    pub markers: Option<String>,
    /// The `~` filler.
    #[serde(default)]
    pub tilde: Option<String>,
    /// Message-log informational lines.
    #[serde(default)]
    pub message: Option<String>,
    /// Message-log error lines.
    #[serde(default)]
    pub error: Option<String>,
    /// Status bar.
    #[serde(default)]
    pub status: Option<String>,
    /// Header rules, in match order.
    #[serde(default)]
    pub header: Vec<RuleEntry>,
    /// Body rules, in match order.
    #[serde(default)]
    pub body: Vec<RuleEntry>,
    /// Attachment rules, in match order.
    #[serde(default)]
    pub attachment_rules: Vec<RuleEntry>,
}

/// One `{ regex, color }` rule.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Pattern source.
    pub regex: String,
    /// Color spec for matched text.
    pub color: String,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Wrap margin.
    pub wrap: i32,
    /// Wrap at the window width regardless of `wrap`.
    pub no_wrap: bool,
    /// Word-boundary wrapping.
    pub smart_wrap: bool,
    /// `+` on continuation rows.
    pub markers: bool,
    /// `~` past the end of text.
    pub tilde: bool,
    /// Apply ANSI colors.
    pub allow_ansi: bool,
    /// Per-line header rule matching.
    pub header_color_partial: bool,
    /// Rows kept from the previous page.
    pub pager_context: usize,
    /// Rows above a search hit.
    pub search_context: usize,
    /// Wrap searches around.
    pub wrap_search: bool,
    /// Lookahead when skipping quoted text.
    pub skip_quoted_offset: usize,
    /// Start with quoted text hidden.
    pub hide_quoted: bool,
    /// Color the text.
    pub show_color: bool,
    /// Classify lines even when not coloring.
    pub show_types: bool,
    /// The text is an application message log.
    pub message_log: bool,
    /// The text has no header block.
    pub body_only: bool,
    /// Quote prefix pattern.
    pub quote_regex: String,
    /// Smiley exception pattern.
    pub smileys: String,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Object colors.
    pub scheme: ColorScheme,
    /// Style rules in declaration order.
    pub rules: Vec<RuleSpec>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let options = PagerOptions::default();
        Self {
            wrap: options.wrap,
            no_wrap: options.no_wrap,
            smart_wrap: options.smart_wrap,
            markers: options.markers,
            tilde: options.tilde,
            allow_ansi: options.allow_ansi,
            header_color_partial: options.header_color_partial,
            pager_context: options.pager_context,
            search_context: options.search_context,
            wrap_search: options.wrap_search,
            skip_quoted_offset: options.skip_quoted_offset,
            hide_quoted: options.hide_quoted,
            show_color: options.show_color,
            show_types: options.show_types,
            message_log: options.message_log,
            body_only: options.body_only,
            quote_regex: DEFAULT_QUOTE_REGEX.to_string(),
            smileys: DEFAULT_SMILEYS.to_string(),
            log_file_path: default_log_path(),
            scheme: ColorScheme::default(),
            rules: Vec::new(),
        }
    }
}

impl ResolvedConfig {
    /// Session switches.
    pub fn pager_options(&self) -> PagerOptions {
        PagerOptions {
            show_color: self.show_color,
            show_types: self.show_types,
            message_log: self.message_log,
            body_only: self.body_only,
            wrap: self.wrap,
            no_wrap: self.no_wrap,
            smart_wrap: self.smart_wrap,
            no_skip_blanks: false,
            markers: self.markers,
            tilde: self.tilde,
            allow_ansi: self.allow_ansi,
            header_color_partial: self.header_color_partial,
            pager_context: self.pager_context,
            search_context: self.search_context,
            wrap_search: self.wrap_search,
            skip_quoted_offset: self.skip_quoted_offset,
            hide_quoted: self.hide_quoted,
        }
    }

    /// Compile the configured rules and quote patterns.
    ///
    /// Patterns that fail to compile are returned and left out of the set.
    pub fn rule_set(&self) -> (RuleSet, Vec<PatternError>) {
        let scheme = if self.show_color {
            self.scheme.clone()
        } else {
            ColorScheme::monochrome()
        };
        RuleSet::compile(&self.rules, &self.quote_regex, &self.smileys, scheme)
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/pgview/pgview.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("pgview").join("pgview.log")
    } else {
        PathBuf::from("pgview.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/pgview/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pgview").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `PGVIEW_CONFIG` environment variable
/// 3. Default path `~/.config/pgview/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("PGVIEW_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

fn style_for(key: &str, spec: &str) -> Result<Style, ConfigError> {
    parse_style(spec).map_err(|source| ConfigError::InvalidColor {
        key: key.to_string(),
        source,
    })
}

fn merge_style(target: &mut Style, key: &str, spec: Option<&String>) -> Result<(), ConfigError> {
    if let Some(spec) = spec {
        *target = style_for(key, spec)?;
    }
    Ok(())
}

fn merge_colors(scheme: &mut ColorScheme, colors: &ColorsSection) -> Result<(), ConfigError> {
    merge_style(&mut scheme.normal, "normal", colors.normal.as_ref())?;
    merge_style(&mut scheme.header_default, "header_default", colors.header_default.as_ref())?;
    merge_style(&mut scheme.signature, "signature", colors.signature.as_ref())?;
    merge_style(&mut scheme.attachment, "attachment", colors.attachment.as_ref())?;
    merge_style(&mut scheme.search, "search", colors.search.as_ref())?;
    merge_style(&mut scheme.markers, "markers", colors.markers.as_ref())?;
    merge_style(&mut scheme.tilde, "tilde", colors.tilde.as_ref())?;
    merge_style(&mut scheme.message, "message", colors.message.as_ref())?;
    merge_style(&mut scheme.error, "error", colors.error.as_ref())?;
    merge_style(&mut scheme.status, "status", colors.status.as_ref())?;
    if let Some(spec) = &colors.bold {
        scheme.bold = Some(style_for("bold", spec)?);
    }
    if let Some(spec) = &colors.underline {
        scheme.underline = Some(style_for("underline", spec)?);
    }
    if let Some(palette) = &colors.quoted {
        scheme.quoted = palette
            .iter()
            .enumerate()
            .map(|(i, spec)| style_for(&format!("quoted[{i}]"), spec))
            .collect::<Result<_, _>>()?;
    }
    Ok(())
}

fn rule_specs(colors: &ColorsSection) -> Result<Vec<RuleSpec>, ConfigError> {
    let groups = [
        (RuleContext::Header, "header", &colors.header),
        (RuleContext::Body, "body", &colors.body),
        (RuleContext::Attachment, "attachment_rules", &colors.attachment_rules),
    ];
    let mut specs = Vec::new();
    for (context, key, entries) in groups {
        for entry in entries {
            specs.push(RuleSpec {
                context,
                pattern: entry.regex.clone(),
                style: style_for(&format!("{key} rule {:?}", entry.regex), &entry.color)?,
            });
        }
    }
    Ok(specs)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
///
/// # Errors
///
/// Returns `ConfigError::InvalidColor` for an unparsable color spec.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let mut scheme = defaults.scheme;
    let mut rules = defaults.rules;
    if let Some(colors) = &config.colors {
        merge_colors(&mut scheme, colors)?;
        rules = rule_specs(colors)?;
    }

    Ok(ResolvedConfig {
        wrap: config.wrap.unwrap_or(defaults.wrap),
        no_wrap: defaults.no_wrap,
        smart_wrap: config.smart_wrap.unwrap_or(defaults.smart_wrap),
        markers: config.markers.unwrap_or(defaults.markers),
        tilde: config.tilde.unwrap_or(defaults.tilde),
        allow_ansi: config.allow_ansi.unwrap_or(defaults.allow_ansi),
        header_color_partial: config
            .header_color_partial
            .unwrap_or(defaults.header_color_partial),
        pager_context: config.pager_context.unwrap_or(defaults.pager_context),
        search_context: config.search_context.unwrap_or(defaults.search_context),
        wrap_search: config.wrap_search.unwrap_or(defaults.wrap_search),
        skip_quoted_offset: config
            .skip_quoted_offset
            .unwrap_or(defaults.skip_quoted_offset),
        hide_quoted: config.hide_quoted.unwrap_or(defaults.hide_quoted),
        show_color: config.show_color.unwrap_or(defaults.show_color),
        show_types: defaults.show_types,
        message_log: defaults.message_log,
        body_only: defaults.body_only,
        quote_regex: config.quote_regex.unwrap_or(defaults.quote_regex),
        smileys: config.smileys.unwrap_or(defaults.smileys),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        scheme,
        rules,
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `PGVIEW_WRAP`: wrap margin (ignored with a warning if not an integer)
/// - `NO_COLOR`: any value turns coloring off
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(wrap) = std::env::var("PGVIEW_WRAP") {
        match wrap.trim().parse::<i32>() {
            Ok(wrap) => config.wrap = wrap,
            Err(err) => warn!(value = %wrap, error = %err, "Ignoring PGVIEW_WRAP"),
        }
    }

    if std::env::var_os("NO_COLOR").is_some() {
        config.show_color = false;
    }

    config
}

/// Flags given on the command line.
///
/// Boolean flags only ever switch a behavior on; leaving a flag out keeps
/// the configured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--wrap <N>`.
    pub wrap: Option<i32>,
    /// `--no-wrap`.
    pub no_wrap: bool,
    /// `--no-color`.
    pub no_color: bool,
    /// `--types`.
    pub show_types: bool,
    /// `--logs`.
    pub message_log: bool,
    /// `--body`.
    pub body_only: bool,
    /// `--hide-quoted`.
    pub hide_quoted: bool,
    /// `--tilde`.
    pub tilde: bool,
    /// `--allow-ansi`.
    pub allow_ansi: bool,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: &CliOverrides) -> ResolvedConfig {
    if let Some(wrap) = cli.wrap {
        config.wrap = wrap;
    }
    config.no_wrap |= cli.no_wrap;
    config.show_color &= !cli.no_color;
    config.show_types |= cli.show_types;
    config.message_log |= cli.message_log;
    config.body_only |= cli.body_only || cli.message_log;
    config.hide_quoted |= cli.hide_quoted;
    config.tilde |= cli.tilde;
    config.allow_ansi |= cli.allow_ansi;
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
