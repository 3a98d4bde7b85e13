//! Subprobe main entry point
//!
//! This is the command-line interface for the Subprobe subdomain prober.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use subprobe::config::{load_config_with_hash, validate, Config, ScreenshotMode};
use subprobe::input::load_domains;
use subprobe::output::{print_summary, write_reports};
use subprobe::probe::{ConsoleProgress, Dispatcher, LogProgress, ProgressSink};
use tracing_subscriber::EnvFilter;

/// Hash recorded for runs that use the built-in defaults
const DEFAULT_CONFIG_HASH: &str = "defaults";

/// Subprobe: a concurrent subdomain liveness prober
///
/// Reads a list of candidate subdomains, checks each one over HTTP(S) with a
/// bounded number of concurrent requests, and reports which are alive.
#[derive(Parser, Debug)]
#[command(name = "subprobe")]
#[command(version)]
#[command(about = "Concurrent subdomain liveness prober", long_about = None)]
struct Cli {
    /// File with one domain per line
    #[arg(value_name = "DOMAINS")]
    domains: PathBuf,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent checks
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(short, long = "timeout-ms", value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Extract page title and type for alive domains
    #[arg(long)]
    extract_info: bool,

    /// Capture a screenshot of every valid domain
    #[arg(long, conflicts_with = "screenshot_alive")]
    screenshot: bool,

    /// Capture screenshots of alive domains only
    #[arg(long)]
    screenshot_alive: bool,

    /// Write a CSV report
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a self-contained HTML report
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Write a spreadsheet report
    #[arg(long, value_name = "FILE")]
    xlsx: Option<PathBuf>,

    /// Append the run to a SQLite database
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Only include alive domains in reports
    #[arg(long)]
    only_alive: bool,

    /// Disable the progress line
    #[arg(long)]
    no_progress: bool,

    /// Validate config and show what would be probed without probing
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => (Config::default(), DEFAULT_CONFIG_HASH.to_string()),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration after applying command-line options")?;

    let domains = load_domains(&cli.domains)?;
    tracing::info!(
        "Loaded {} domains from {}",
        domains.len(),
        cli.domains.display()
    );

    if cli.dry_run {
        handle_dry_run(&config, domains.len());
        return Ok(());
    }

    let dispatcher = Dispatcher::from_config(&config).context("Failed to set up the prober")?;

    // A redirected stderr gets log lines instead of carriage-return updates
    let sink: Option<Box<dyn ProgressSink>> = if !config.progress.enabled || cli.quiet {
        None
    } else if std::io::stderr().is_terminal() {
        Some(Box::new(ConsoleProgress::new()))
    } else {
        Some(Box::new(LogProgress))
    };

    let report = dispatcher.run_with_progress(&domains, sink).await;

    print_summary(&report.summary);

    write_reports(&config.output, &report, &config_hash).context("Failed to write report")?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("subprobe=info,warn"),
            1 => EnvFilter::new("subprobe=debug,info"),
            2 => EnvFilter::new("subprobe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(concurrency) = cli.concurrency {
        config.probe.concurrency = concurrency;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.probe.timeout_ms = timeout_ms;
    }
    if cli.extract_info {
        config.inspect.enabled = true;
    }
    if cli.screenshot {
        config.screenshot.mode = ScreenshotMode::All;
    } else if cli.screenshot_alive {
        config.screenshot.mode = ScreenshotMode::Alive;
    }
    if let Some(path) = &cli.output {
        config.output.csv_path = Some(path.clone());
    }
    if let Some(path) = &cli.html {
        config.output.html_path = Some(path.clone());
    }
    if let Some(path) = &cli.xlsx {
        config.output.xlsx_path = Some(path.clone());
    }
    if let Some(path) = &cli.db {
        config.output.database_path = Some(path.clone());
    }
    if cli.only_alive {
        config.output.only_alive = true;
    }
    if cli.no_progress {
        config.progress.enabled = false;
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, domain_count: usize) {
    println!("=== Subprobe Dry Run ===\n");

    println!("Probe:");
    println!("  Concurrency: {}", config.probe.concurrency);
    println!("  Timeout: {}ms", config.probe.timeout_ms);
    let schemes: Vec<_> = config.probe.schemes.iter().map(|s| s.as_str()).collect();
    println!("  Schemes: {}", schemes.join(", "));
    println!("  Max redirects: {}", config.probe.max_redirects);
    println!("  User agent: {}", config.probe.user_agent);

    println!("\nInspection:");
    println!("  Enabled: {}", config.inspect.enabled);
    println!("  Custom rules: {}", config.inspect.rules.len());
    println!("  Default rules: {}", config.inspect.default_rules);

    println!("\nScreenshots:");
    println!("  Mode: {:?}", config.screenshot.mode);
    if config.screenshot.mode != ScreenshotMode::Off {
        println!("  Browser: {}", config.screenshot.browser);
        println!("  Directory: {}", config.screenshot.output_dir.display());
    }

    println!("\nOutput:");
    let show = |path: &Option<PathBuf>| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("  CSV: {}", show(&config.output.csv_path));
    println!("  HTML: {}", show(&config.output.html_path));
    println!("  Spreadsheet: {}", show(&config.output.xlsx_path));
    println!("  Database: {}", show(&config.output.database_path));
    println!("  Only alive: {}", config.output.only_alive);

    println!("\n✓ Configuration is valid");
    println!("✓ Would probe {} domains", domain_count);
}
