//! Download actions: one remote resource to one local file.

use crate::assets::Fetcher;
use crate::error::{Error, Result};
use crate::manifest::AssetManifest;
use crate::model::{Action, WorkItem};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Fetch `url` into `dest` unless `dest` already exists.
#[derive(Debug, Clone)]
pub struct DownloadAsset {
    pub url: String,
    pub dest: PathBuf,
    fetcher: Fetcher,
}

impl DownloadAsset {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>, fetcher: Fetcher) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            fetcher,
        }
    }

    /// Sibling temp path, so a partial write never shows up as `dest`.
    fn partial_path(&self) -> PathBuf {
        let file_name = self
            .dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dest
            .with_file_name(format!(".{file_name}.{}.part", Uuid::new_v4()))
    }
}

#[async_trait]
impl Action for DownloadAsset {
    fn kind(&self) -> &'static str {
        "http"
    }

    async fn preflight(&self) -> Result<()> {
        let dir = self
            .dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(Error::Precondition(format!(
                "{} is not a directory",
                dir.display()
            ))),
            Err(e) => Err(Error::Precondition(format!(
                "output directory {} is unavailable: {e}",
                dir.display()
            ))),
        }
    }

    async fn is_provisioned(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.dest).await?)
    }

    async fn provision(&self) -> Result<bool> {
        let body = self.fetcher.fetch(&self.url).await?;

        // Removed on every exit path, including cancellation by a timeout.
        let partial = PartialFile::new(self.partial_path());
        tokio::fs::write(partial.path(), &body).await.map_err(|e| {
            Error::Resource(format!("writing {}: {e}", partial.path().display()))
        })?;
        tokio::fs::rename(partial.path(), &self.dest)
            .await
            .map_err(|e| {
                Error::Resource(format!("moving download into {}: {e}", self.dest.display()))
            })?;
        partial.keep();
        Ok(true)
    }
}

/// A temp file that is deleted on drop unless [`keep`](Self::keep) is called.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The file has been moved into place; nothing to clean up.
    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Create `dir` if it does not exist yet.
pub async fn ensure_output_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        Error::Precondition(format!("cannot create output directory {}: {e}", dir.display()))
    })
}

/// One download item per manifest entry, in manifest order.
pub fn download_items(
    manifest: &AssetManifest,
    out_dir: &Path,
    fetcher: &Fetcher,
) -> Vec<WorkItem> {
    manifest
        .assets
        .iter()
        .map(|asset| {
            let dest = out_dir.join(&asset.name);
            let target = dest.display().to_string();
            WorkItem::new(
                asset.name.clone(),
                target,
                DownloadAsset::new(asset.url.clone(), dest, fetcher.clone()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    #[test]
    fn partial_path_is_hidden_sibling() {
        let fetcher = Fetcher::new(&HttpConfig::default()).unwrap();
        let action = DownloadAsset::new("https://example.com/a.jpg", "/tmp/out/a.jpg", fetcher);
        let partial = action.partial_path();
        assert_eq!(partial.parent(), Some(Path::new("/tmp/out")));
        let name = partial.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(".a.jpg."));
        assert!(name.ends_with(".part"));
    }

    #[test]
    fn partial_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".a.jpg.part");
        std::fs::write(&path, b"half").unwrap();

        drop(PartialFile::new(path.clone()));

        assert!(!path.exists());
    }

    #[test]
    fn kept_partial_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"whole").unwrap();

        PartialFile::new(path.clone()).keep();

        assert!(path.exists());
    }

    #[test]
    fn missing_partial_file_is_not_an_error_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        drop(PartialFile::new(dir.path().join("never-written.part")));
    }
}
