//! Manifest files: the ordered item lists a run is built from.
//!
//! Asset manifests map file names to URLs; quote manifests carry seed rows
//! for the quotes table. Both are TOML and keep file order.

use crate::db::quotes::NewQuote;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// A list of remote assets to download.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "asset")]
    pub assets: Vec<AssetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetEntry {
    /// Local file name; also the item name in reports.
    pub name: String,
    pub url: String,
    /// Display grouping (e.g., "Desserts").
    #[serde(default)]
    pub group: Option<String>,
}

/// Seed rows for the quotes table.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteManifest {
    #[serde(default, rename = "quote")]
    pub quotes: Vec<NewQuote>,
}

impl AssetManifest {
    pub fn from_toml(content: &str) -> Result<Self> {
        Self::parse(content, "asset manifest")
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&read(path)?, &path.display().to_string())
    }

    fn parse(content: &str, origin: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("bad {origin}: {e}")))?;
        manifest
            .validate()
            .map_err(|e| Error::Config(format!("{origin}: {e}")))?;
        Ok(manifest)
    }

    /// Asset counts per group, in first-seen order. Ungrouped assets are
    /// counted under "Other".
    pub fn groups(&self) -> Vec<(String, usize)> {
        let mut groups: Vec<(String, usize)> = Vec::new();
        for asset in &self.assets {
            let group = asset.group.as_deref().unwrap_or("Other");
            match groups.iter_mut().find(|(name, _)| name == group) {
                Some((_, count)) => *count += 1,
                None => groups.push((group.to_string(), 1)),
            }
        }
        groups
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for asset in &self.assets {
            validate_file_name(&asset.name)?;
            if asset.url.trim().is_empty() {
                return Err(format!("asset {} has an empty url", asset.name));
            }
            if !seen.insert(asset.name.as_str()) {
                return Err(format!("duplicate asset name {}", asset.name));
            }
        }
        Ok(())
    }
}

impl QuoteManifest {
    pub fn from_toml(content: &str) -> Result<Self> {
        Self::parse(content, "quote manifest")
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&read(path)?, &path.display().to_string())
    }

    fn parse(content: &str, origin: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("bad {origin}: {e}")))?;
        manifest
            .validate()
            .map_err(|e| Error::Config(format!("{origin}: {e}")))?;
        Ok(manifest)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for quote in &self.quotes {
            if quote.customer_email.trim().is_empty() {
                return Err(format!("quote for {} has no customer_email", quote.customer_name));
            }
            if !seen.insert(quote.customer_email.as_str()) {
                return Err(format!("duplicate quote for {}", quote.customer_email));
            }
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read manifest {}: {e}", path.display())))
}

/// Asset names become file names inside the output directory, so they
/// must not escape it.
fn validate_file_name(name: &str) -> std::result::Result<(), String> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(format!("invalid asset name {name:?}"));
    }
    Ok(())
}
