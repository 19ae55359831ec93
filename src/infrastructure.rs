//! Infrastructure layer for HTTP access, file output, configuration and logging
//!
//! This module provides the concrete collaborators behind the domain seams:
//! the Vivino API client and the JSON page store.

pub mod config;
pub mod csv_export;
pub mod http_client;
pub mod logging;
pub mod page_store;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, CrawlerConfig, FilterConfig, LoggingConfig};
pub use csv_export::export_csv;
pub use http_client::{HttpClientConfig, VivinoClient};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use page_store::{highest_page_index, merge_pages, next_start_page, JsonPageStore};
