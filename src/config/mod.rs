//! Configuration module.
//!
//! Settings resolve in order: defaults, config file, environment, CLI flags.

pub mod colors;
pub mod keybindings;
pub mod loader;

pub use colors::{parse_color, parse_style, ColorSpecError};
pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ColorsSection,
    ConfigError, ConfigFile, ResolvedConfig, RuleEntry,
};
