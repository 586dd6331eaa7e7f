//! Static asset download: an HTTP transport and the work items that use it.

pub mod download;
pub mod fetch;

pub use download::{DownloadAsset, download_items, ensure_output_dir};
pub use fetch::Fetcher;
