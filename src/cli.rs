//! Command-line argument parsing for QueryDeck.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Output format for headless mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Final state followed by the rendered screen.
    #[default]
    Text,
    /// JSON snapshot of state, catalog and screen.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Interactive client for a remote query service.
#[derive(Parser, Debug)]
#[command(name = "querydeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the query service (e.g., http://127.0.0.1:8000)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Use named server from config
    #[arg(short = 's', long, value_name = "NAME")]
    pub server: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    // === Headless mode options ===
    /// Run in headless mode (no terminal UI, for testing/automation)
    #[arg(long)]
    pub headless: bool,

    /// Use the in-memory demo service instead of HTTP
    #[arg(long)]
    pub mock: bool,

    /// Query to execute in headless mode (repeatable, run in order)
    #[arg(short = 'q', long = "query", value_name = "SQL")]
    pub queries: Vec<String>,

    /// Output format for headless mode
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Screen size for headless mode (WIDTHxHEIGHT, e.g., "100x30")
    #[arg(long, value_name = "SIZE", default_value = "100x30")]
    pub size: String,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Parses the screen size from the --size argument.
    pub fn parse_screen_size(&self) -> std::result::Result<(u16, u16), String> {
        let Some((width, height)) = self.size.split_once('x') else {
            return Err(format!(
                "Invalid size format: '{}'. Expected WIDTHxHEIGHT (e.g., 100x30)",
                self.size
            ));
        };
        let width = width
            .parse::<u16>()
            .map_err(|_| format!("Invalid width: '{width}'"))?;
        let height = height
            .parse::<u16>()
            .map_err(|_| format!("Invalid height: '{height}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("Screen size must be non-zero: '{}'", self.size));
        }
        Ok((width, height))
    }

    /// Parses the output format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output.parse()
    }
}
