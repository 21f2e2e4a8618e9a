//! Spinarak CLI Application
//!
//! Counts how many times a word appears on each of a set of web pages.
//! This CLI application provides a user-friendly interface to the spinarak-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{CommandFactory, Parser};
use futures_util::StreamExt;
use spinarak_lib::{
    load_env_config, read_links_from_file, CheckConfig, ConfigManager, FileConfig, OutputFormat,
    PageChecker, PageResult, SpinarakError,
};
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for spinarak
#[derive(Parser, Debug)]
#[command(name = "spinarak")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Count how many times a word appears on web pages")]
#[command(
    long_about = "This program accepts one or more URLs as positional arguments and\noutputs the number of times the specified target word was found\non each page."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// URLs of the pages to scan
    #[arg(value_name = "URLS", help_heading = "Input")]
    pub urls: Vec<String>,

    /// Read additional URLs from a file (one per line)
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Input")]
    pub file: Option<String>,

    /// The word to search for
    #[arg(short = 'w', long = "word", value_name = "WORD", help_heading = "Search")]
    pub word: Option<String>,

    /// The number of workers to use [default: 1]
    #[arg(short = 'n', long = "workers", value_name = "N", help_heading = "Search")]
    pub workers: Option<usize>,

    /// Output results as a JSON array
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Colored output with progress and a summary
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging and full error messages
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Settings resolved from config files, environment and CLI arguments.
#[derive(Debug, Clone)]
struct Settings {
    check: CheckConfig,
    format: OutputFormat,
    pretty: bool,
}

/// Error statistics for aggregated reporting
#[derive(Debug, Default)]
pub(crate) struct ErrorStats {
    pub(crate) fetch_errors: Vec<String>,
    pub(crate) status_errors: Vec<String>,
    pub(crate) scan_errors: Vec<String>,
    pub(crate) other_errors: Vec<String>,
}

impl ErrorStats {
    fn add_error(&mut self, link: &str, error: &SpinarakError) {
        match error {
            SpinarakError::FetchError { .. } => self.fetch_errors.push(link.to_string()),
            SpinarakError::UnexpectedStatus { .. } => self.status_errors.push(link.to_string()),
            SpinarakError::ScanError { .. } => self.scan_errors.push(link.to_string()),
            _ => self.other_errors.push(link.to_string()),
        }
    }

    fn has_errors(&self) -> bool {
        self.total() > 0
    }

    fn total(&self) -> usize {
        self.fetch_errors.len()
            + self.status_errors.len()
            + self.scan_errors.len()
            + self.other_errors.len()
    }

    /// Labelled error groups, in display order.
    pub(crate) fn categories(&self) -> [(&'static str, &[String]); 4] {
        [
            ("fetch error", self.fetch_errors.as_slice()),
            ("unexpected status", self.status_errors.as_slice()),
            ("scan error", self.scan_errors.as_slice()),
            ("other error", self.other_errors.as_slice()),
        ]
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = validate_args(&args) {
        usage_error(&e);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the tracing subscriber; `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("spinarak={0},spinarak_lib={0}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error line followed by usage, then exit with status 1.
fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}\n", message);
    eprintln!("{}", Args::command().render_usage());
    eprintln!("\nFor more information, try '--help'.");
    process::exit(1);
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(word) = &args.word {
        if word.is_empty() {
            return Err("Need a word to process.".to_string());
        }
        if word.chars().any(char::is_whitespace) {
            return Err("The word must not contain whitespace.".to_string());
        }
    }

    if args.workers == Some(0) {
        return Err("Number of workers must be greater than 0.".to_string());
    }

    if args.urls.is_empty() && args.file.is_none() {
        return Err("Need links to process.".to_string());
    }

    if args.json && args.pretty {
        return Err("Cannot combine --json with --pretty".to_string());
    }

    Ok(())
}

/// Main counting logic
async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;

    // The word may come from a config file or the environment, so the final
    // check happens here rather than in validate_args.
    if let Err(e) = settings.check.validate() {
        match e {
            SpinarakError::ConfigError { message } => usage_error(&format!("{}.", message)),
            other => return Err(other.into()),
        }
    }

    let links = collect_links(&args)?;
    tracing::info!(links = links.len(), workers = settings.check.workers, "starting run");

    let checker = PageChecker::with_config(settings.check.clone())?;

    match settings.format {
        OutputFormat::Json => run_json(&checker, &links).await,
        OutputFormat::Text => run_text(&checker, &links, settings.pretty, args.debug).await,
    }
}

/// Positional URLs first, then any from --file.
fn collect_links(args: &Args) -> Result<Vec<String>, SpinarakError> {
    let mut links = args.urls.clone();
    if let Some(path) = &args.file {
        links.extend(read_links_from_file(path)?);
    }
    Ok(links)
}

/// Print each result as soon as its page completes.
async fn run_text(
    checker: &PageChecker,
    links: &[String],
    pretty: bool,
    debug: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if pretty {
        ui::print_header(checker.word(), links.len(), checker.config().workers);
    }

    let start_time = std::time::Instant::now();
    let total = links.len();
    let mut completed = 0usize;
    let mut matches = 0u64;
    let mut error_stats = ErrorStats::default();

    let mut stream = checker.check_pages_stream(links);
    while let Some(result) = stream.next().await {
        completed += 1;
        matches += result.count;
        if let Some(err) = &result.error {
            error_stats.add_error(&result.link, err);
        }

        if pretty {
            let counter = (total > 1).then_some((completed, total));
            ui::print_result(&result, debug, counter);
        } else {
            println!("{}", result);
        }
    }

    if pretty {
        println!();
        ui::print_summary(completed, matches, error_stats.total(), start_time.elapsed());
        if error_stats.has_errors() {
            println!();
            ui::print_error_summary(&error_stats);
        }
    }

    Ok(())
}

/// Collect every result, then print them as one JSON array.
async fn run_json(
    checker: &PageChecker,
    links: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = if links.len() > 1 {
        ui::Spinner::start(format!("Fetching {} pages...", links.len()))
    } else {
        None
    };

    let results: Vec<PageResult> = checker.check_pages(links).await;

    if let Some(s) = spinner {
        s.stop().await;
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Build settings from CLI arguments with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (SPINARAK_*)
/// 3. Explicit config file (--config or SPINARAK_CONFIG), otherwise
///    discovered files (./spinarak.toml, ~/.spinarak.toml, XDG)
/// 4. Built-in defaults
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings {
        check: CheckConfig::default(),
        format: OutputFormat::Text,
        pretty: false,
    };

    let config_manager = ConfigManager::new();
    let env_config = load_env_config();

    // Step 1: Load config files
    let explicit_path = args.config.clone().or_else(|| env_config.config.clone());
    let file_config = match explicit_path {
        Some(path) => config_manager
            .load_file(&path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?,
        None => config_manager.discover_and_load()?,
    };
    settings = merge_file_config(settings, &file_config);

    // Step 2: Apply environment variables
    if let Some(word) = env_config.word {
        settings.check.word = Some(word);
    }
    if let Some(workers) = env_config.workers {
        settings.check.workers = workers;
    }
    if let Some(json) = env_config.json {
        settings.format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
    }
    if let Some(pretty) = env_config.pretty {
        settings.pretty = pretty;
    }

    // Step 3: Apply CLI arguments (highest precedence)
    Ok(apply_cli_args(settings, args))
}

/// Merge a loaded FileConfig into the settings
fn merge_file_config(mut settings: Settings, file_config: &FileConfig) -> Settings {
    if let Some(defaults) = &file_config.defaults {
        if let Some(word) = &defaults.word {
            settings.check.word = Some(word.clone());
        }
        if let Some(workers) = defaults.workers {
            settings.check.workers = workers;
        }
        if let Some(agent) = &defaults.user_agent {
            settings.check.user_agent = Some(agent.clone());
        }
    }

    if let Some(format) = file_config.output_format() {
        settings.format = format;
    }
    if let Some(pretty) = file_config.output.as_ref().and_then(|o| o.pretty) {
        settings.pretty = pretty;
    }

    settings
}

/// Apply CLI arguments to settings (highest precedence).
fn apply_cli_args(mut settings: Settings, args: &Args) -> Settings {
    if let Some(word) = &args.word {
        settings.check.word = Some(word.clone());
    }
    if let Some(workers) = args.workers {
        settings.check.workers = workers;
    }
    if args.json {
        settings.format = OutputFormat::Json;
        settings.pretty = false;
    }
    if args.pretty {
        settings.format = OutputFormat::Text;
        settings.pretty = true;
    }
    settings
}
