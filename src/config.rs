//! Configuration management for the moon phase widget.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `MOON_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use moon_phase_widget::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.into_command() {
//!     Command::Watch(config) => println!("refresh every {}s", config.update_interval),
//!     _ => {}
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `MOON_CACHE_DIR` - Artifact directory (default: system temp directory)
//! - `MOON_URL_TEMPLATE` - Image URL with `{year}`, `{month}`, `{day}` placeholders
//! - `MOON_FETCH_TIMEOUT` - Download timeout in seconds (default: 30)
//! - `MOON_INVERTED` - Show the inverted image for light themes (default: false)
//! - `MOON_PHASE_TABLE` - JSON file of phase instants (default: built-in table)
//! - `MOON_RAW_COUNTDOWN` - Count down to the very next phase (default: false)
//! - `MOON_LANG` - Display language (default: from `LANG`)
//! - `MOON_ICON_DIR` - Directory holding the bundled symbolic SVG icons
//! - `MOON_UPDATE_INTERVAL` - Refresh period of `watch` in seconds (default: 3600)

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Args, Parser, Subcommand};

use crate::error::PhaseError;
use crate::fetch::{UrlTemplate, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_URL_TEMPLATE};
use crate::i18n::Locale;
use crate::phase::{CountdownMode, PhaseTable};
use crate::raster::DisplayMode;

// =============================================================================
// Default Values
// =============================================================================

/// Default refresh period in seconds (1 hour).
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 3600;

/// Shortest accepted refresh period in seconds.
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 60;

// =============================================================================
// CLI Structure
// =============================================================================

/// Moon Phase Widget - the current lunar phase with a daily photographic icon.
#[derive(Parser, Debug, Clone)]
#[command(name = "moon-phase-widget")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the widget, refreshing periodically until interrupted
    Watch(WatchConfig),

    /// Produce the icon for one day and print its location
    Render(RenderConfig),

    /// Print the phase at an instant
    Phase(PhaseConfig),
}

// =============================================================================
// Shared Arguments
// =============================================================================

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory for downloaded and rendered images.
    ///
    /// Defaults to the system temp directory.
    #[arg(long, env = "MOON_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// URL template for the daily moon image.
    #[arg(long, default_value = DEFAULT_URL_TEMPLATE, env = "MOON_URL_TEMPLATE")]
    pub url_template: String,

    /// Image download timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, env = "MOON_FETCH_TIMEOUT")]
    pub fetch_timeout: u64,

    /// Use the inverted image, for light panel themes.
    #[arg(long, env = "MOON_INVERTED")]
    pub inverted: bool,

    /// JSON file of major phase instants replacing the built-in table.
    #[arg(long, env = "MOON_PHASE_TABLE")]
    pub phase_table: Option<PathBuf>,

    /// Count down to the next phase even when it is less than 12 hours away.
    #[arg(long, env = "MOON_RAW_COUNTDOWN")]
    pub raw_countdown: bool,

    /// Display language (e.g. "fr" or "de_DE.UTF-8").
    ///
    /// Falls back to the LANG environment variable, then English.
    #[arg(long, env = "MOON_LANG")]
    pub lang: Option<String>,

    /// Directory holding the bundled symbolic phase icons (*.svg).
    #[arg(long, env = "MOON_ICON_DIR")]
    pub icon_dir: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Validate the shared options.
    pub fn validate(&self) -> Result<(), String> {
        UrlTemplate::new(self.url_template.as_str()).map_err(|e| e.to_string())?;

        if self.fetch_timeout == 0 {
            return Err("fetch_timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn url_template(&self) -> Result<UrlTemplate, String> {
        UrlTemplate::new(self.url_template.as_str()).map_err(|e| e.to_string())
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_inverted(self.inverted)
    }

    pub fn countdown_mode(&self) -> CountdownMode {
        if self.raw_countdown {
            CountdownMode::Raw
        } else {
            CountdownMode::Adjusted
        }
    }

    /// Display language from `--lang`, then `LANG`.
    pub fn locale(&self) -> Locale {
        match &self.lang {
            Some(tag) => Locale::from_tag(tag),
            None => std::env::var("LANG")
                .map(|tag| Locale::from_tag(&tag))
                .unwrap_or_default(),
        }
    }

    /// Load the configured phase table, or build the default one.
    pub fn load_phase_table(&self) -> Result<Arc<PhaseTable>, PhaseError> {
        let table = match &self.phase_table {
            Some(path) => PhaseTable::from_file(path)?,
            None => PhaseTable::default(),
        };
        Ok(Arc::new(table))
    }
}

// =============================================================================
// Watch Command Configuration
// =============================================================================

/// Configuration for the `watch` subcommand.
#[derive(Args, Debug, Clone)]
pub struct WatchConfig {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Seconds between refreshes.
    #[arg(long, default_value_t = DEFAULT_UPDATE_INTERVAL_SECS, env = "MOON_UPDATE_INTERVAL")]
    pub update_interval: u64,
}

impl WatchConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.common.validate()?;

        if self.update_interval < MIN_UPDATE_INTERVAL_SECS {
            return Err(format!(
                "update_interval must be at least {} seconds",
                MIN_UPDATE_INTERVAL_SECS
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Render Command Configuration
// =============================================================================

/// Configuration for the `render` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Day to render (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.common.validate()
    }
}

// =============================================================================
// Phase Command Configuration
// =============================================================================

/// Configuration for the `phase` subcommand.
#[derive(Args, Debug, Clone)]
pub struct PhaseConfig {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Instant to query (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<FixedOffset>>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PhaseConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.common.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
