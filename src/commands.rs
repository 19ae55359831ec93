//! Command-line interface
//!
//! `crawl` runs the adaptive crawl into per-page JSON files, `merge`
//! combines them, `export` writes the CSV and `flatten` turns nested
//! records into single-level objects.

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::fs;
use tracing::{info, warn};

use crate::application::{CrawlContext, WineCrawler};
use crate::domain::flatten::flatten_records;
use crate::infrastructure::config::{AppConfig, ConfigManager};
use crate::infrastructure::logging::{init_logging_with_config, log_system_info};
use crate::infrastructure::{export_csv, merge_pages, next_start_page, JsonPageStore, VivinoClient};

/// Vivino Harvest - adaptive price-range crawler for the Vivino wine search
#[derive(Parser, Debug)]
#[command(name = "vivino-harvest")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the search API into one JSON file per page
    Crawl(CrawlArgs),

    /// Merge page files 1..=N into one deduplicated file
    Merge {
        /// Base file name used by the crawl
        file_name: String,

        /// Number of page files to merge
        #[arg(long)]
        pages: u32,

        /// Directory holding the page files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Export a merged JSON file to CSV
    Export {
        /// Merged JSON file
        json_file: PathBuf,

        /// Target CSV file (defaults to the JSON path with a .csv extension)
        csv_file: Option<PathBuf>,
    },

    /// Flatten nested records into single-level objects
    Flatten {
        /// JSON file with an array of records or a {"wines": [...]} object
        json_file: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Base name of the page files, e.g. wines.json
    pub output_file: String,

    /// Global page index to start from
    #[arg(long, conflicts_with = "resume")]
    pub start_page: Option<u32>,

    /// Continue after the highest page file already on disk
    #[arg(long)]
    pub resume: bool,

    /// Directory for page and debug files
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Country code filter (repeatable)
    #[arg(long = "country")]
    pub countries: Vec<String>,

    /// Wine type id filter (repeatable)
    #[arg(long = "wine-type")]
    pub wine_types: Vec<u32>,

    /// Upper bound of the price domain
    #[arg(long)]
    pub price_max: Option<f64>,
}

/// Load the configuration, apply CLI overrides, start logging and dispatch.
pub async fn run(cli: Cli) -> Result<()> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Commands::Crawl(args) = &cli.command {
        apply_crawl_overrides(&mut config, args);
    }

    init_logging_with_config(&config.logging)?;
    log_system_info();

    match cli.command {
        Commands::Crawl(args) => crawl(&config, &args).await,
        Commands::Merge {
            file_name,
            pages,
            output_dir,
        } => merge(&output_dir, &file_name, pages).await,
        Commands::Export { json_file, csv_file } => export(&json_file, csv_file.as_deref()).await,
        Commands::Flatten { json_file, out } => flatten(&json_file, out.as_deref()).await,
    }
}

/// CLI filters replace the configured ones when given.
pub fn apply_crawl_overrides(config: &mut AppConfig, args: &CrawlArgs) {
    if !args.countries.is_empty() {
        config.filters.country_codes = args.countries.clone();
    }
    if !args.wine_types.is_empty() {
        config.filters.wine_type_ids = args.wine_types.clone();
    }
    if let Some(price_max) = args.price_max {
        config.crawler.price_max = price_max;
    }
}

async fn crawl(config: &AppConfig, args: &CrawlArgs) -> Result<()> {
    let start_page = match (args.start_page, args.resume) {
        (Some(page), _) => page,
        (None, true) => {
            let page = next_start_page(&args.output_dir, &args.output_file).await?;
            info!("🔄 Resuming at page {}", page);
            page
        }
        (None, false) => 1,
    };

    let client = VivinoClient::from_crawler_config(&config.crawler)?;
    let crawler = WineCrawler::new(Arc::new(client), &config.crawler, &config.filters);
    let mut sink = JsonPageStore::create(&args.output_dir, args.output_file.clone()).await?;
    let mut ctx = CrawlContext::new(start_page, config.crawler.debug_dumps);

    let summary = crawler.run(&mut ctx, &mut sink).await?;
    info!(
        "📊 Summary: {}",
        serde_json::to_string(&summary).context("Failed to serialize crawl summary")?
    );
    info!(
        "➡️  Merge with: vivino-harvest merge {} --pages {} --output-dir {}",
        args.output_file,
        summary.pages_visited,
        args.output_dir.display()
    );
    Ok(())
}

async fn merge(output_dir: &Path, file_name: &str, pages: u32) -> Result<()> {
    if pages == 0 {
        return Err(anyhow!("--pages must be at least 1"));
    }
    let merged = merge_pages(output_dir, file_name, pages).await?;
    info!("✅ {} unique wines in {:?}", merged.len(), output_dir.join(file_name));
    Ok(())
}

async fn export(json_file: &Path, csv_file: Option<&Path>) -> Result<()> {
    match export_csv(json_file, csv_file).await? {
        Some(path) => info!("✅ CSV written to {:?}", path),
        None => warn!("⚠️  Nothing to export from {:?}", json_file),
    }
    Ok(())
}

async fn flatten(json_file: &Path, out: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(json_file)
        .await
        .with_context(|| format!("Failed to read {:?}", json_file))?;
    let document: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", json_file))?;

    let flat = flatten_records(&document);
    let rendered = serde_json::to_string_pretty(&flat).context("Failed to serialize flattened records")?;

    match out {
        Some(path) => {
            fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("✅ {} flattened records written to {:?}", flat.len(), path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_arguments() {
        let cli = Cli::parse_from([
            "vivino-harvest",
            "--log-level",
            "debug",
            "crawl",
            "reds.json",
            "--start-page",
            "12",
            "--country",
            "pt",
            "--country",
            "es",
            "--price-max",
            "800",
        ]);

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl command");
        };
        assert_eq!(args.output_file, "reds.json");
        assert_eq!(args.start_page, Some(12));
        assert_eq!(args.countries, vec!["pt", "es"]);
        assert_eq!(args.output_dir, PathBuf::from("."));

        let mut config = AppConfig::default();
        apply_crawl_overrides(&mut config, &args);
        assert_eq!(config.filters.country_codes, vec!["pt", "es"]);
        assert_eq!(config.filters.wine_type_ids, vec![1]);
        assert_eq!(config.crawler.price_max, 800.0);
    }

    #[test]
    fn test_resume_conflicts_with_start_page() {
        let result = Cli::try_parse_from(["vivino-harvest", "crawl", "reds.json", "--resume", "--start-page", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_and_export_arguments() {
        let cli = Cli::parse_from(["vivino-harvest", "merge", "reds.json", "--pages", "228"]);
        assert!(matches!(cli.command, Commands::Merge { pages: 228, .. }));

        let cli = Cli::parse_from(["vivino-harvest", "export", "reds.json"]);
        assert!(matches!(cli.command, Commands::Export { csv_file: None, .. }));
    }

    #[tokio::test]
    async fn test_flatten_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reds.json");
        let out = dir.path().join("flat.json");
        std::fs::write(&input, r#"[{"a": {"b": 1}, "c": [2, 3]}]"#).unwrap();

        flatten(&input, Some(out.as_path())).await.unwrap();

        let flat: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(flat, serde_json::json!([{"a_b": 1, "c_0": 2, "c_1": 3}]));
    }
}
