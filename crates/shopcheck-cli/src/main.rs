//! shopcheck CLI - browser end-to-end checks for the saucedemo storefront
//!
//! Usage:
//!   shopcheck run                 Run the login and checkout scenarios
//!   shopcheck list                List scenarios in execution order
//!   shopcheck users               Show the scenario user table
//!   shopcheck screenshot <url>    Capture a page on demand
//!   shopcheck init                Write a default shopcheck.toml

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shopcheck_browser::screenshot::{take_screenshot, ScreenshotRequest};
use shopcheck_browser::{BrowserConfig, BrowserSession, Page};
use shopcheck_core::config::CONFIG_FILE;
use shopcheck_core::fail_open::fail_open;
use shopcheck_core::{Fixtures, SuiteConfig};
use shopcheck_harness::{default_suite, ChromeSessionFactory, Runner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "shopcheck")]
#[command(author, version, about = "Browser end-to-end checks with failure screenshots")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenarios
    Run(RunArgs),

    /// List scenarios in execution order
    List {
        /// Only list ids containing this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show the scenario users
    Users,

    /// Open a page and capture it
    Screenshot {
        /// Page to capture
        url: String,

        /// Base name of the file, without path separators
        #[arg(long, default_value = "screenshot")]
        name: String,

        /// Target directory (defaults to the configured screenshot directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Capture only the visible viewport
        #[arg(long)]
        viewport_only: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Only run tests whose id contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Storefront URL
    #[arg(long)]
    base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Delay after every browser interaction, in milliseconds
    #[arg(long, value_name = "MS")]
    slow_mo: Option<u64>,

    /// Where failure screenshots are written
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => {
            let success = cmd_run(&cli.config, args).await?;
            if !success {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::List { filter } => cmd_list(filter),
        Commands::Users => cmd_users(&cli.config),
        Commands::Screenshot {
            url,
            name,
            dir,
            viewport_only,
        } => cmd_screenshot(&cli.config, url, name, dir, viewport_only).await,
        Commands::Init { force } => cmd_init(&cli.config, force),
    }
}

fn load_config(path: &std::path::Path) -> Result<SuiteConfig> {
    SuiteConfig::load_or_default(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Command-line flags win over the file
fn apply_overrides(config: &mut SuiteConfig, args: &RunArgs) {
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(slow_mo) = args.slow_mo {
        config.browser.slow_mo_ms = slow_mo;
    }
    if let Some(dir) = &args.screenshot_dir {
        config.screenshot_dir = dir.clone();
    }
}

async fn cmd_run(config_path: &std::path::Path, args: RunArgs) -> Result<bool> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);

    let fixtures = Arc::new(Fixtures::from_config(&config).context("Invalid fixtures")?);
    let sessions = Arc::new(ChromeSessionFactory::new(BrowserConfig::from(&config.browser)));
    info!("Running against {}", config.base_url);

    let runner = Runner::new(sessions, fixtures)
        .with_filter(args.filter)
        .with_timeout(Duration::from_secs(config.browser.timeout_seconds));
    let report = runner.run(&default_suite()).await;

    println!();
    for test in &report.tests {
        println!("{:<28} {} ({}ms)", test.id, test.status, test.duration_ms);
        if let Some(failure) = &test.failure {
            println!("    {}", failure);
        }
        for artifact in &test.artifacts {
            println!("    screenshot: {}", artifact.display());
        }
    }
    println!(
        "\n{} passed, {} failed",
        report.passed(),
        report.failed()
    );

    if let Some(path) = &args.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(report.success())
}

fn cmd_list(filter: Option<String>) -> Result<()> {
    let suite = default_suite();
    let cases = suite.ordered(filter.as_deref());

    if cases.is_empty() {
        println!("No scenarios match");
        return Ok(());
    }

    println!("Scenarios:");
    for case in cases {
        match case.order() {
            Some(order) => println!("  [{}] {}", order, case.id()),
            None => println!("  [-] {}", case.id()),
        }
    }
    Ok(())
}

fn cmd_users(config_path: &std::path::Path) -> Result<()> {
    let config = load_config(config_path)?;
    let fixtures = Fixtures::from_config(&config).context("Invalid fixtures")?;

    println!("Users:");
    for (key, creds) in fixtures.users.iter() {
        let username = if creds.username.is_empty() {
            "<empty>"
        } else {
            creds.username.as_str()
        };
        let marker = if fixtures.login_failure_users.iter().any(|k| k == key) {
            "  (login failure)"
        } else {
            ""
        };
        println!("  {:<18} {}{}", key, username, marker);
    }
    Ok(())
}

async fn cmd_screenshot(
    config_path: &std::path::Path,
    url: String,
    name: String,
    dir: Option<PathBuf>,
    viewport_only: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let session = BrowserSession::launch_with_config(BrowserConfig::from(&config.browser))
        .await
        .context("Failed to launch browser")?;

    session
        .goto(&url)
        .await
        .with_context(|| format!("Failed to open {}", url))?;

    let mut request =
        ScreenshotRequest::named(&name).in_dir(dir.unwrap_or(config.screenshot_dir));
    if viewport_only {
        request = request.viewport_only();
    }

    let path = take_screenshot(&session, &request)
        .await
        .context("Failed to capture screenshot")?;
    fail_open("close browser", || session.close()).await;

    println!("Screenshot saved: {}", path.display());
    Ok(())
}

fn cmd_init(config_path: &std::path::Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    SuiteConfig::write_default(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Adjust base_url and [users] as needed");
    println!("  2. Run 'shopcheck run' to execute the scenarios");
    Ok(())
}
