//! The manifests shipped in `manifests/` must always load.

use provisioner::manifest::{AssetManifest, QuoteManifest};
use std::path::Path;

fn shipped(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("manifests")
        .join(name)
}

#[test]
fn core_image_manifest_loads() {
    let manifest = AssetManifest::load(&shipped("images.toml")).unwrap();
    assert_eq!(manifest.assets.len(), 17);
    assert_eq!(manifest.assets[0].name, "hero-bg.jpg");
    assert!(
        manifest
            .assets
            .iter()
            .all(|a| a.url.starts_with("https://images.unsplash.com/"))
    );
}

#[test]
fn additional_image_manifest_loads() {
    let manifest = AssetManifest::load(&shipped("additional-images.toml")).unwrap();
    assert_eq!(manifest.assets.len(), 25);
    let total: usize = manifest.groups().iter().map(|(_, n)| n).sum();
    assert_eq!(total, 25);
}

#[test]
fn quote_seed_manifest_loads() {
    let manifest = QuoteManifest::load(&shipped("quotes.toml")).unwrap();
    let emails: Vec<_> = manifest
        .quotes
        .iter()
        .map(|q| q.customer_email.as_str())
        .collect();
    assert_eq!(emails, ["john@example.com", "jane@example.com"]);
    assert_eq!(manifest.quotes[1].payment_type, "deposit");
    assert_eq!(manifest.quotes[0].business_name.as_deref(), Some("Doe's Restaurant"));
}

#[test]
fn missing_manifest_is_a_config_error() {
    let err = AssetManifest::load(&shipped("does-not-exist.toml")).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("does-not-exist.toml"), "{err}");
}
