//! Configuration for the converter
//!
//! Settings are layered: defaults, then an optional JSON file, then command
//! line flags. The merged result is validated before a conversion starts.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::core::{BaselinePolicy, EscapeOptions, RenderOptions};

/// CLI arguments for ansiart2utf8
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ansiart2utf8")]
#[command(version)]
#[command(about = "Convert CP437 ANSI art into UTF-8 terminal output", long_about = None)]
pub struct CliArgs {
    /// Path to a JSON config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Screen width in columns
    #[arg(short, long, value_name = "COLS")]
    pub width: Option<usize>,

    /// Render classic colors as xterm 256-color indices
    #[arg(short = 'x', long = "xterm256")]
    pub xterm256: bool,

    /// Maximum output bytes per row, 0 = unlimited
    #[arg(long = "bytes", value_name = "N")]
    pub max_bytes_per_row: Option<usize>,

    /// Log diagnostics and number the output rows
    #[arg(long)]
    pub debug: bool,

    /// Show emitted escapes as visible text
    #[arg(long)]
    pub visible_escapes: bool,

    /// Diff each row's first cell against the previous row
    #[arg(long)]
    pub carry_baseline: bool,

    /// Skip well-formed escapes that have no handler instead of aborting
    #[arg(long)]
    pub skip_unhandled: bool,

    /// Abort on escape sequences ending in an unknown terminator
    #[arg(long)]
    pub strict: bool,

    /// Maximum number of rows the screen may grow to, 0 = unlimited
    #[arg(long, value_name = "N")]
    pub max_rows: Option<usize>,

    /// Input files, `-` for stdin
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// What to do with well-formed escapes that have no handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnhandledPolicy {
    /// Stop the conversion with an error
    #[default]
    Abort,
    /// Report a diagnostic and continue
    Skip,
}

/// Converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen width in columns
    pub width: usize,
    /// Per-row output budget, 0 = unlimited
    pub max_bytes_per_row: usize,
    /// Render classic colors through the 256-color tables
    pub downsample_256: bool,
    /// Render emitted escapes visibly
    pub visible_escapes: bool,
    /// Prefix rows with their number and mark the row end
    pub number_rows: bool,
    /// Attribute diff baseline at row starts
    pub baseline: BaselinePolicy,
    /// Handling of escapes with no dispatch target
    pub unhandled: UnhandledPolicy,
    /// Treat foreign final bytes as unknown terminators
    pub strict_terminators: bool,
    /// Row growth limit, 0 = unlimited
    pub max_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 80,
            max_bytes_per_row: 0,
            downsample_256: false,
            visible_escapes: false,
            number_rows: false,
            baseline: BaselinePolicy::ResetPerRow,
            unhandled: UnhandledPolicy::Abort,
            strict_terminators: false,
            max_rows: 65536,
        }
    }
}

impl Config {
    /// Load configuration with precedence: CLI args > config file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Config::default(),
        };
        config.apply_cli_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply CLI overrides. Flags only ever switch features on.
    pub fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(bytes) = args.max_bytes_per_row {
            self.max_bytes_per_row = bytes;
        }
        if let Some(rows) = args.max_rows {
            self.max_rows = rows;
        }
        if args.xterm256 {
            self.downsample_256 = true;
        }
        if args.debug {
            self.number_rows = true;
        }
        if args.visible_escapes {
            self.visible_escapes = true;
        }
        if args.carry_baseline {
            self.baseline = BaselinePolicy::CarryAcrossRows;
        }
        if args.skip_unhandled {
            self.unhandled = UnhandledPolicy::Skip;
        }
        if args.strict {
            self.strict_terminators = true;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.screen_width().map(|_| ())
    }

    /// The screen width, rejecting zero
    pub fn screen_width(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.width).ok_or(ConfigError::InvalidWidth(self.width))
    }

    /// Serializer settings derived from this configuration
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_bytes_per_row: self.max_bytes_per_row,
            number_rows: self.number_rows,
            baseline: self.baseline,
            escapes: EscapeOptions {
                downsample: self.downsample_256,
                visible: self.visible_escapes,
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid width {0}: must be greater than zero")]
    InvalidWidth(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.width, 80);
        assert_eq!(config.max_bytes_per_row, 0);
        assert_eq!(config.max_rows, 65536);
        assert_eq!(config.baseline, BaselinePolicy::ResetPerRow);
        assert_eq!(config.unhandled, UnhandledPolicy::Abort);
        assert!(!config.strict_terminators);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_zero_width_rejected() {
        let config = Config {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWidth(0))));
    }

    #[test]
    fn test_config_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"width": 132, "unhandled": "skip", "baseline": "carry-across-rows"}"#)
                .unwrap();
        assert_eq!(config.width, 132);
        assert_eq!(config.unhandled, UnhandledPolicy::Skip);
        assert_eq!(config.baseline, BaselinePolicy::CarryAcrossRows);
        assert_eq!(config.max_rows, 65536);
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            width: 100,
            downsample_256: true,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_config_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Json(_))));
        assert!(matches!(
            Config::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"width": 40, "max_bytes_per_row": 100}"#).unwrap();

        let args = CliArgs {
            config: Some(path),
            width: Some(120),
            xterm256: true,
            debug: true,
            skip_unhandled: true,
            ..Default::default()
        };
        let config = Config::load_with_args(&args).unwrap();
        assert_eq!(config.width, 120);
        assert_eq!(config.max_bytes_per_row, 100);
        assert!(config.downsample_256);
        assert!(config.number_rows);
        assert_eq!(config.unhandled, UnhandledPolicy::Skip);
    }

    #[test]
    fn test_cli_parse() {
        let args = CliArgs::parse_from(["ansiart2utf8", "-w", "132", "-x", "--bytes", "500", "art.ans"]);
        assert_eq!(args.width, Some(132));
        assert!(args.xterm256);
        assert_eq!(args.max_bytes_per_row, Some(500));
        assert_eq!(args.files, vec![PathBuf::from("art.ans")]);
    }

    #[test]
    fn test_render_options() {
        let config = Config {
            max_bytes_per_row: 20,
            visible_escapes: true,
            ..Default::default()
        };
        let options = config.render_options();
        assert_eq!(options.max_bytes_per_row, 20);
        assert!(options.escapes.visible);
        assert!(!options.escapes.downsample);
    }
}
