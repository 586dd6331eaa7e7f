//! provision CLI — download static assets and seed the quotes table.

use clap::{Parser, Subcommand};
use provisioner::assets::{Fetcher, download_items, ensure_output_dir};
use provisioner::config::Config;
use provisioner::config::secrets::ExposeSecret;
use provisioner::db::Db;
use provisioner::db::quotes::quote_items;
use provisioner::engine::Provisioner;
use provisioner::manifest::{AssetManifest, QuoteManifest};
use provisioner::model::{Outcome, RunReport, WorkItem};
use provisioner::telemetry::{TelemetryConfig, init_telemetry};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "provision", about = "Idempotent batch provisioning")]
struct Cli {
    /// Print the run report as JSON instead of the human summary
    #[arg(long, global = true)]
    json: bool,

    /// Per-item timeout in seconds (overrides PROVISION_ACTION_TIMEOUT_SECS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the images listed in an asset manifest
    Assets {
        /// Asset manifest (TOML)
        #[arg(long, default_value = "manifests/images.toml")]
        manifest: PathBuf,
        /// Output directory (overrides PROVISION_ASSET_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Skip TLS certificate validation for this run
        #[arg(long)]
        insecure: bool,
    },
    /// Create the quotes table and insert seed rows
    Quotes {
        /// Quote seed manifest (TOML)
        #[arg(long, default_value = "manifests/quotes.toml")]
        seed: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "provisioner".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let mut provisioner = Provisioner::new();
    if let Some(limit) = cli.timeout.map(Duration::from_secs).or(config.action_timeout) {
        provisioner = provisioner.with_timeout(limit);
    }

    match cli.command {
        Command::Assets {
            manifest,
            out,
            insecure,
        } => cmd_assets(&config, &provisioner, manifest, out, insecure, cli.json).await,
        Command::Quotes { seed } => cmd_quotes(&config, &provisioner, seed, cli.json).await,
    }
}

async fn cmd_assets(
    config: &Config,
    provisioner: &Provisioner,
    manifest_path: PathBuf,
    out: Option<PathBuf>,
    insecure: bool,
    json: bool,
) -> anyhow::Result<()> {
    let manifest = AssetManifest::load(&manifest_path)?;
    let out_dir = out.unwrap_or_else(|| config.asset_dir.clone());
    ensure_output_dir(&out_dir).await?;

    let mut http = config.http.clone();
    http.accept_invalid_certs |= insecure;
    let fetcher = Fetcher::new(&http)?;

    if !json {
        banner(manifest.title.as_deref().unwrap_or("Downloading images"));
        println!("Into: {}", out_dir.display());
        println!();
    }

    let items = download_items(&manifest, &out_dir, &fetcher);
    let report = run(provisioner, items, json).await?;

    if !json {
        println!();
        println!("Manifest contents:");
        for (group, count) in manifest.groups() {
            println!("  - {group} ({count})");
        }
    }
    finish(&report, json)
}

async fn cmd_quotes(
    config: &Config,
    provisioner: &Provisioner,
    seed_path: PathBuf,
    json: bool,
) -> anyhow::Result<()> {
    let seeds = QuoteManifest::load(&seed_path)?;
    let db = Db::connect(config.database_url()?.expose_secret()).await?;

    if !json {
        banner("Provisioning quotes table");
    }

    let items = quote_items(&db, &seeds.quotes);
    let report = run(provisioner, items, json).await?;

    if !json {
        match db.count_quotes().await {
            Ok(count) => println!("\nDatabase has {count} quote(s)"),
            Err(e) => println!("\nCould not count quotes: {e}"),
        }
    }
    finish(&report, json)
}

async fn run(
    provisioner: &Provisioner,
    items: Vec<WorkItem>,
    json: bool,
) -> anyhow::Result<RunReport> {
    let report = provisioner
        .run_with(items, |item, outcome| {
            if json {
                return;
            }
            match outcome {
                Outcome::Skipped => println!("[SKIP]  {} (already exists)", item.name),
                Outcome::Succeeded => println!("[OK]    {}", item.name),
                Outcome::Failed(error) => println!("[ERROR] {}: {error}", item.name),
            }
        })
        .await?;
    Ok(report)
}

fn finish(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("{}", "=".repeat(60));
    println!(
        "{} ({} skipped, {} failed)",
        report.summary(),
        report.skipped,
        report.failed.len()
    );
    println!("{}", "=".repeat(60));
    if !report.is_clean() {
        println!("Failures:");
        for failure in &report.failed {
            println!("  {}: {}", failure.name, failure.error);
        }
    }
    Ok(())
}

fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}
