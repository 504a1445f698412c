//! pgview - Entry Point

use clap::Parser;
use pgview::config::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    CliOverrides,
};
use pgview::state::{PagerSession, ResumePosition, Viewport};
use pgview::view::StatusMessage;
use std::path::PathBuf;
use tracing::{info, warn};

/// pgview - pager with quote-aware coloring
#[derive(Parser, Debug)]
#[command(name = "pgview")]
#[command(version)]
#[command(about = "Terminal pager for mail bodies, logs and help text")]
pub struct Args {
    /// File to page (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Start with this line at the top (must be positive)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub line: u32,

    /// Start with search query active
    #[arg(short, long)]
    pub search: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Wrap margin: 0 = window width, N > 0 = at most N columns, N < 0 = width minus N
    #[arg(long, allow_negative_numbers = true)]
    pub wrap: Option<i32>,

    /// Wrap at the window width, ignoring the wrap margin
    #[arg(long)]
    pub no_wrap: bool,

    /// Classify lines even with colors off
    #[arg(long)]
    pub types: bool,

    /// Text is an application message log
    #[arg(long)]
    pub logs: bool,

    /// Text has no header block
    #[arg(long)]
    pub body: bool,

    /// Start with quoted text hidden
    #[arg(long)]
    pub hide_quoted: bool,

    /// Pad rows past the end of text with '~'
    #[arg(long)]
    pub tilde: bool,

    /// Apply ANSI color sequences found in the text
    #[arg(long)]
    pub allow_ansi: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            wrap: self.wrap,
            no_wrap: self.no_wrap,
            no_color: self.no_color,
            show_types: self.types,
            message_log: self.logs,
            body_only: self.body,
            hide_quoted: self.hide_quoted,
            tilde: self.tilde,
            allow_ansi: self.allow_ansi,
        }
    }

    fn resume(&self) -> ResumePosition {
        ResumePosition {
            logical_line: usize::try_from(self.line.saturating_sub(1)).unwrap_or(0),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = load_config_with_precedence(args.config.clone())?;
        let merged = merge_config(config_file)?;
        let with_env = apply_env_overrides(merged);
        apply_cli_overrides(with_env, &args.overrides())
    };

    pgview::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let input_source = pgview::source::detect_input_source(args.file.clone())?;

    let (rules, pattern_errors) = config.rule_set();
    for err in &pattern_errors {
        warn!(pattern = %err.pattern, reason = %err.reason, "Skipping style rule");
    }
    let message = pattern_errors
        .first()
        .map(|err| StatusMessage::error(err.to_string()));

    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let viewport = Viewport::new(width, height.saturating_sub(1));
    let session = PagerSession::open_at(
        input_source,
        rules,
        config.pager_options(),
        viewport,
        args.resume(),
    )?;

    let summary = pgview::view::run_pager(session, args.search.as_deref(), message)?;
    info!(
        name = %summary.name,
        line = summary.resume.logical_line + 1,
        "Pager closed"
    );

    Ok(())
}
