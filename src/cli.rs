//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Phaseboard - cached rollup dashboard for a Jira initiative
///
/// Fetches an initiative, its phases (child epics) and their tasks from
/// Jira, rolls up progress and team workload, and serves the result from
/// a time-bound cache.
///
/// Examples:
///   phaseboard --base-url https://acme.atlassian.net --initiative BAC-18816
///   phaseboard --once --format markdown --output status.md
///   phaseboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Jira site URL (e.g. https://acme.atlassian.net)
    #[arg(long, value_name = "URL", env = "JIRA_BASE_URL")]
    pub base_url: Option<String>,

    /// Account email for Jira Basic auth
    #[arg(long, env = "JIRA_EMAIL")]
    pub email: Option<String>,

    /// API token for Jira Basic auth
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Key of the initiative to track
    #[arg(short, long, value_name = "KEY", env = "INITIATIVE_KEY")]
    pub initiative: Option<String>,

    /// Seconds a cached snapshot is served before rebuilding
    #[arg(long, value_name = "SECS", env = "CACHE_TTL")]
    pub cache_ttl: Option<u64>,

    /// Per-request timeout for Jira calls, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Records requested per search page
    #[arg(long, value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Address to bind the HTTP server to
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port for the HTTP server
    #[arg(short, long, env = "PHASEBOARD_PORT")]
    pub port: Option<u16>,

    /// Directory with dashboard.html and its assets
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .phaseboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build one snapshot, print or write it, and exit
    #[arg(long)]
    pub once: bool,

    /// Output format for --once (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file for --once (stdout when omitted)
    #[arg(short, long, value_name = "FILE", requires = "once")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .phaseboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for one-shot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON snapshot (default)
    #[default]
    Json,
    /// Markdown status report
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Jira base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.page_size == Some(0) {
            return Err("Page size must be at least 1".to_string());
        }

        if let Some(ref dir) = self.static_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "Static directory does not exist: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Default filter directive used when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> String {
        self.log_level().as_str().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            base_url: Some("https://acme.atlassian.net".to_string()),
            email: None,
            api_token: None,
            initiative: Some("BAC-1".to_string()),
            cache_ttl: None,
            timeout: None,
            page_size: None,
            host: None,
            port: None,
            static_dir: None,
            config: None,
            once: false,
            format: OutputFormat::Json,
            output: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.base_url = Some("acme.atlassian.net".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.page_size = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_output_requires_once() {
        let parsed = Args::try_parse_from(["phaseboard", "--output", "out.json"]);
        assert!(parsed.is_err());

        let parsed =
            Args::try_parse_from(["phaseboard", "--once", "--format", "markdown", "-o", "s.md"])
                .unwrap();
        assert_eq!(parsed.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_directive_parses_as_env_filter() {
        let mut args = make_args();
        assert_eq!(args.log_directive(), "info");

        args.verbose = true;
        assert_eq!(args.log_directive(), "debug");
        let filter = tracing_subscriber::EnvFilter::try_new(args.log_directive()).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }
}
