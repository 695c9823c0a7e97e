// ABOUTME: CLI for running docsearch-core extraction over a single HTML page.
// ABOUTME: Loads a JSON site config and an HTML file or stdin, then prints the extracted levels as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use docsearch_core::{Config, PageExtractor, SelectorCache};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Extract leveled text from an HTML page and output JSON.
#[derive(Parser, Debug)]
#[command(name = "docsearch-cli")]
#[command(about = "Extract docsearch levels from a page and print JSON", long_about = None)]
struct Args {
    /// Path to the JSON site configuration.
    #[arg(long)]
    config: PathBuf,

    /// HTML file to extract from. Use "-" to read from stdin.
    #[arg(long)]
    html: String,

    /// Page URL, used to pick the selector set. Falls back to the default set when omitted.
    #[arg(long)]
    url: Option<String>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = load_config(&args.config)?;
    let cache = SelectorCache::new();
    cache.precompile(config.all_selectors())?;
    debug!(selectors = cache.len(), "precompiled selectors");

    let body = load_html(&args.html)?;
    let page = PageExtractor::new(&config, &cache).extract_html(args.url.as_deref(), &body)?;
    info!(
        selectors_key = %page.selectors_key,
        levels = page.levels.len(),
        "extracted page"
    );

    if args.compact {
        println!("{}", serde_json::to_string(&page)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&page)?);
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    Ok(Config::from_json_str(&json)?)
}

fn load_html(target: &str) -> Result<String> {
    if target == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    Ok(fs::read_to_string(path)?)
}
