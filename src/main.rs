use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rfmedia::manifest::fetch_source_meta;
use rfmedia::net::HttpFetcher;
use rfmedia::platform::{NoopPlatform, StaticCapabilities};
use rfmedia::{format_time, Page, PageConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rfmedia")]
#[command(author, version, about = "Inspect adaptive-streaming video widgets")]
struct Cli {
    /// Fetch timeout in milliseconds
    #[arg(long, global = true, default_value = "30000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover the widgets of a page (URL or local HTML file) and print their state
    Scan {
        #[arg(required = true)]
        target: String,

        /// Base URL for relative sources when scanning a file
        #[arg(long)]
        base: Option<String>,

        /// Pretend the platform plays HLS natively
        #[arg(long)]
        native: bool,

        /// Pretend a segmented decoder is available
        #[arg(long)]
        decoder: bool,

        /// How long to wait for metadata prefetches, in milliseconds
        #[arg(long, default_value = "10000")]
        wait_ms: u64,
    },

    /// Resolve width, height and duration of an HLS source
    Probe {
        #[arg(required = true)]
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ScanEntry {
    config: rfmedia::WidgetConfig,
    view: rfmedia::WidgetView,
    attributes: Vec<(&'static str, String)>,
}

fn scan(
    config: PageConfig,
    target: &str,
    base: Option<&str>,
    caps: StaticCapabilities,
    wait: Duration,
) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(config.clone())?);
    let platform = Arc::new(NoopPlatform::new().with_capabilities(caps).with_fetcher(fetcher));
    let mut page = Page::new(config, platform);

    if target.starts_with("http://") || target.starts_with("https://") {
        page.load_url(target)?;
    } else {
        let path = PathBuf::from(target);
        let html = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        page.mount_document(&html, base)?;
    }

    if page.pending_prefetches() > 0 {
        page.wait_for_prefetches(wait);
    }

    let entries: Vec<ScanEntry> = page
        .ids()
        .into_iter()
        .filter_map(|id| page.widget(id))
        .map(|w| ScanEntry {
            config: w.config().clone(),
            view: w.view(),
            attributes: w.attributes(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn probe(config: PageConfig, url: &str, json: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(config)?;
    let meta = fetch_source_meta(&fetcher, url);
    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else if meta.is_empty() {
        println!("{}: no metadata", url);
    } else {
        println!("{}: {}x{} {}", url, meta.width, meta.height, format_time(meta.duration));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PageConfig { timeout_ms: cli.timeout_ms, ..Default::default() };
    config.validate()?;

    match cli.command {
        Commands::Scan { target, base, native, decoder, wait_ms } => scan(
            config,
            &target,
            base.as_deref(),
            StaticCapabilities::new(native, decoder),
            Duration::from_millis(wait_ms),
        ),
        Commands::Probe { url, json } => probe(config, &url, json),
    }
}
