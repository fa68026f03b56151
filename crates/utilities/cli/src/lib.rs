//! Shared CLI utilities for the bridge relay binaries.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

mod tracing;
pub use self::tracing::LogFormat;

/// Name of the log file written under [`LogArgs::log_file_directory`].
pub const LOG_FILE_NAME: &str = "bridge-relay.log";

/// Logging flags shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct LogArgs {
    /// Verbosity level: unset is info, `-v` is debug and `-vv` is trace.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
    /// Only log errors. Overrides `-v`.
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
    /// Format of the logs written to stdout.
    #[arg(
        long = "log.stdout.format",
        default_value = "full",
        global = true,
        env = "BRIDGE_RELAY_LOG_FORMAT"
    )]
    pub log_stdout_format: LogFormat,
    /// Directory to additionally write logs to.
    #[arg(long = "log.file.directory", global = true, env = "BRIDGE_RELAY_LOG_DIR")]
    pub log_file_directory: Option<PathBuf>,
    /// Format of the logs written to the log file.
    #[arg(long = "log.file.format", default_value = "json", global = true)]
    pub log_file_format: LogFormat,
    /// Rotation of the log file.
    #[arg(long = "log.file.rotation", default_value = "daily", global = true)]
    pub log_file_rotation: LogRotation,
}

impl LogArgs {
    /// Level enabled by the flags.
    pub const fn level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbosity {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Rotation policy of the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate every minute.
    Minutely,
    /// Rotate every hour.
    Hourly,
    /// Rotate every day.
    #[default]
    Daily,
    /// Never rotate.
    Never,
}

/// Stdout sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdoutLogConfig {
    /// Output format.
    pub format: LogFormat,
}

/// File sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogConfig {
    /// Directory of the log files.
    pub directory_path: PathBuf,
    /// Output format.
    pub format: LogFormat,
    /// Rotation policy.
    pub rotation: LogRotation,
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Most verbose level enabled.
    pub global_level: LevelFilter,
    /// Stdout sink, if any.
    pub stdout_logs: Option<StdoutLogConfig>,
    /// File sink, if any.
    pub file_logs: Option<FileLogConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global_level: LevelFilter::INFO,
            stdout_logs: Some(StdoutLogConfig { format: LogFormat::Full }),
            file_logs: None,
        }
    }
}

impl LogConfig {
    /// Resolves the logging configuration from CLI flags.
    pub fn new(args: LogArgs) -> Self {
        let global_level = args.level();
        let file_logs = args.log_file_directory.map(|directory_path| FileLogConfig {
            directory_path,
            format: args.log_file_format,
            rotation: args.log_file_rotation,
        });
        Self {
            global_level,
            stdout_logs: Some(StdoutLogConfig { format: args.log_stdout_format }),
            file_logs,
        }
    }
}

/// Help output styles shared by the binaries.
pub fn cli_styles() -> clap::builder::Styles {
    use clap::builder::styling::{AnsiColor, Color, Style};

    clap::builder::Styles::styled()
        .usage(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .header(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .valid(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}
