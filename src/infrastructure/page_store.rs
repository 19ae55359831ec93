//! File-backed page storage
//!
//! One JSON file per processed page, named `<index>_<base>`, plus the
//! helpers that operate on those files after a crawl: page discovery for
//! auto-resume and the merge into a single deduplicated document.

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::dedup::dedupe_records;
use crate::domain::services::PageSink;
use crate::domain::wine_record::{WinePage, WineRecord};

const PAGE_FILE_PATTERN: &str = r"^(\d+)_(.+)$";

/// Path of the page unit with global index `index`.
pub fn page_file_path(output_dir: &Path, base_name: &str, index: u32) -> PathBuf {
    output_dir.join(format!("{}_{}", index, base_name))
}

/// `PageSink` writing `{"wines": [...]}` documents into a directory.
pub struct JsonPageStore {
    output_dir: PathBuf,
    base_name: String,
    pages_written: u32,
}

impl JsonPageStore {
    /// Create the store, making sure the output directory exists.
    pub async fn create(output_dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

        Ok(Self {
            output_dir,
            base_name: base_name.into(),
            pages_written: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn pages_written(&self) -> u32 {
        self.pages_written
    }
}

#[async_trait]
impl PageSink for JsonPageStore {
    async fn write_page(&mut self, page_index: u32, records: &[WineRecord]) -> Result<()> {
        let path = page_file_path(&self.output_dir, &self.base_name, page_index);
        let document = WinePage::new(records.to_vec());
        write_json(&path, &document).await?;

        self.pages_written += 1;
        debug!("💾 Wrote page {} ({} wines) to {:?}", page_index, records.len(), path);
        Ok(())
    }

    async fn write_debug(&mut self, label: &str, payload: &Value) -> Result<()> {
        let path = self.output_dir.join(format!("debug_{}.json", label));
        write_json(&path, payload).await?;
        info!("🐛 Saved {} sample to {:?}", label, path);
        Ok(())
    }
}

async fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Highest `n` among files named `<n>_<base_name>` in `output_dir`.
///
/// A missing directory means no pages.
pub async fn highest_page_index(output_dir: &Path, base_name: &str) -> Result<Option<u32>> {
    if !output_dir.exists() {
        return Ok(None);
    }

    let pattern = Regex::new(PAGE_FILE_PATTERN).context("Invalid page file pattern")?;
    let mut entries = fs::read_dir(output_dir)
        .await
        .with_context(|| format!("Failed to list {:?}", output_dir))?;

    let mut highest: Option<u32> = None;
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(caps) = pattern.captures(name) else {
            continue;
        };
        if &caps[2] != base_name {
            continue;
        }
        if let Ok(index) = caps[1].parse::<u32>() {
            highest = Some(highest.map_or(index, |h| h.max(index)));
        }
    }

    Ok(highest)
}

/// Page index an automatic resume should start from.
pub async fn next_start_page(output_dir: &Path, base_name: &str) -> Result<u32> {
    Ok(highest_page_index(output_dir, base_name)
        .await?
        .map_or(1, |n| n.saturating_add(1)))
}

/// Read one `{"wines": [...]}` document.
pub async fn read_page(path: &Path) -> Result<Vec<WineRecord>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    let page: WinePage =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(page.wines)
}

/// Merge page units `1..=page_count` into `<output_dir>/<base_name>`.
///
/// Missing or unreadable units are logged and skipped. Returns the merged,
/// deduplicated records.
pub async fn merge_pages(output_dir: &Path, base_name: &str, page_count: u32) -> Result<Vec<WineRecord>> {
    let mut all = Vec::new();

    for index in 1..=page_count {
        let path = page_file_path(output_dir, base_name, index);
        if !path.exists() {
            warn!("⚠️  Page file missing, skipping: {:?}", path);
            continue;
        }
        match read_page(&path).await {
            Ok(mut wines) => all.append(&mut wines),
            Err(e) => warn!("⚠️  Skipping unreadable page {:?}: {:#}", path, e),
        }
    }

    let before = all.len();
    let merged = dedupe_records(all);
    info!(
        "🔗 Merged {} pages: {} records, {} after removing duplicates",
        page_count,
        before,
        merged.len()
    );

    let target = output_dir.join(base_name);
    write_json(&target, &WinePage::new(merged.clone())).await?;
    info!("💾 Merged file written to {:?}", target);

    Ok(merged)
}
